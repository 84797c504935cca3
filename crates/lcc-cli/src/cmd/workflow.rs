use crate::output::{option_targets, print_json, steps_table, Table};
use anyhow::Context;
use clap::Subcommand;
use lcc_core::workflow::{apply_choice, start_run, RunState, Step, Workflow};
use serde::Serialize;
use std::path::Path;

#[derive(Subcommand)]
pub enum WorkflowSubcommand {
    /// List workflows under .lcc/workflows/
    List,

    /// Show a workflow's steps
    Show { id: String },

    /// Walk a workflow from the first step
    Run {
        id: String,
        /// Answer for the next decision; repeat once per decision.
        /// Without any, answers are read from stdin one per line.
        #[arg(long = "choose", value_name = "LABEL")]
        choose: Vec<String>,
    },

    /// Check a workflow for authoring mistakes
    Validate { id: String },
}

pub fn run(root: &Path, subcmd: WorkflowSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WorkflowSubcommand::List => list(root, json),
        WorkflowSubcommand::Show { id } => show(root, &id, json),
        WorkflowSubcommand::Run { id, choose } => walk(root, &id, choose, json),
        WorkflowSubcommand::Validate { id } => validate(root, &id, json),
    }
}

fn load(root: &Path, id: &str) -> anyhow::Result<Workflow> {
    Workflow::load(root, id).with_context(|| format!("failed to load workflow '{id}'"))
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let workflows = Workflow::list(root).context("failed to list workflows")?;

    if json {
        let items: Vec<_> = workflows
            .iter()
            .map(|w| {
                serde_json::json!({
                    "id": w.id,
                    "name": w.name,
                    "steps": w.steps.len(),
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if workflows.is_empty() {
        println!("No workflows. Run: lcc init");
        return Ok(());
    }

    let mut table = Table::new(&["ID", "NAME", "STEPS"]);
    for w in &workflows {
        table.row([w.id.clone(), w.name.clone(), w.steps.len().to_string()]);
    }
    table.print();
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let workflow = load(root, id)?;

    if json {
        print_json(&workflow)?;
        return Ok(());
    }

    println!("{} ({})", workflow.name, workflow.id);
    println!();
    steps_table(&workflow).print();
    Ok(())
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RunOutput<'a> {
    workflow: &'a str,
    terminal: bool,
    state: &'a RunState,
}

fn walk(root: &Path, id: &str, choose: Vec<String>, json: bool) -> anyhow::Result<()> {
    let workflow = load(root, id)?;

    let mut answers: Box<dyn Iterator<Item = String>> = if choose.is_empty() {
        Box::new(std::io::stdin().lines().map_while(Result::ok))
    } else {
        Box::new(choose.into_iter())
    };

    if !json {
        println!("{}", workflow.name);
    }

    let mut state = start_run();
    while let Some(step) = workflow.current_step(&state) {
        let index = state.step_index;
        let next = match step {
            Step::Prompt { label } => {
                if !json {
                    println!("[{index}] {label}");
                }
                apply_choice(&workflow, &state, None)
            }
            Step::Note { text } => {
                if !json {
                    println!("[{index}] note: {text}");
                }
                apply_choice(&workflow, &state, None)
            }
            Step::Decision { label, .. } => {
                if !json {
                    println!("[{index}] {label} ({})", option_targets(step));
                }
                let Some(answer) = answers.next() else {
                    break;
                };
                let answer = answer.trim();
                let next = apply_choice(&workflow, &state, Some(answer));
                if next.history.len() == state.history.len() {
                    tracing::warn!(step = index, choice = answer, "unknown option");
                    if !json {
                        println!("    '{answer}' is not an option here");
                    }
                    continue;
                }
                if !json {
                    println!("    -> {answer}");
                }
                next
            }
        };
        tracing::debug!(from = index, to = next.step_index, "step");
        state = next;
    }

    let terminal = state.is_terminal(&workflow);
    if json {
        print_json(&RunOutput {
            workflow: &workflow.id,
            terminal,
            state: &state,
        })?;
        return Ok(());
    }

    println!();
    if terminal {
        println!("Finished after {} step(s).", state.history.len());
    } else {
        println!(
            "Stopped at step {} waiting for a choice ({} step(s) done).",
            state.step_index,
            state.history.len()
        );
    }
    for entry in &state.history {
        let when = entry.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S");
        match &entry.choice {
            Some(choice) => println!("  {when}  {}: {choice}", entry.label),
            None => println!("  {when}  {}", entry.label),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let workflow = load(root, id)?;
    let warnings = workflow.validate();

    if json {
        print_json(&serde_json::json!({
            "workflow": workflow.id,
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("Workflow '{}' is valid. No warnings.", workflow.id);
    } else {
        for w in &warnings {
            println!("[warning] {w}");
        }
    }
    Ok(())
}
