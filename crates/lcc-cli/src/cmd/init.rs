use crate::output::print_json;
use anyhow::Context;
use lcc_core::{
    config::Config,
    paths,
    workflow::{sample_workflow, Workflow},
};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("Initializing lcc in: {}", root.display());
    }

    let workflows_dir = paths::workflows_dir(root);
    std::fs::create_dir_all(&workflows_dir)
        .with_context(|| format!("failed to create {}", workflows_dir.display()))?;

    let mut created = Vec::new();

    if Config::default()
        .save_if_missing(root)
        .context("failed to write config")?
    {
        created.push(paths::CONFIG_FILE.to_string());
    }

    let sample = sample_workflow();
    if sample
        .save_if_missing(root)
        .context("failed to write sample workflow")?
    {
        created.push(format!("{}/{}.{}", paths::WORKFLOWS_DIR, sample.id, paths::WORKFLOW_EXT));
    }

    let workflows = Workflow::list(root).context("failed to list workflows")?;
    tracing::debug!(created = created.len(), workflows = workflows.len(), "init complete");

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "created": created,
            "workflows": workflows.len(),
        }))?;
    } else {
        for path in &created {
            println!("  created {path}");
        }
        if created.is_empty() {
            println!("Already initialized; nothing to do.");
        }
        println!("Try: lcc ask \"checklist\"  or  lcc workflow run {}", sample.id);
    }
    Ok(())
}
