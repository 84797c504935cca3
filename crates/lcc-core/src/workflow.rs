//! Declarative workflows and the walker that steps through them.
//!
//! A [`Workflow`] is an ordered list of [`Step`]s authored by the host.
//! A walk starts from [`start_run`] and advances one step per
//! [`apply_choice`] call. Every call returns a fresh [`RunState`]; the
//! input state is never touched, so hosts can keep earlier states around
//! for undo or display.
//!
//! The walker does not check `next_index` targets. A target past the end of
//! the step list simply ends the run. [`Workflow::validate`] reports such
//! targets for authors who want to know up front.

use crate::error::{LccError, Result};
use crate::{io, paths};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub label: String,
    #[serde(alias = "next")]
    pub next_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Prompt {
        label: String,
    },
    Decision {
        label: String,
        options: Vec<DecisionOption>,
    },
    Note {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Prompt,
    Decision,
    Note,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Prompt => "prompt",
            StepKind::Decision => "decision",
            StepKind::Note => "note",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Prompt { .. } => StepKind::Prompt,
            Step::Decision { .. } => StepKind::Decision,
            Step::Note { .. } => StepKind::Note,
        }
    }

    /// Notes carry text rather than a label.
    pub fn label(&self) -> Option<&str> {
        match self {
            Step::Prompt { label } | Step::Decision { label, .. } => Some(label.as_str()),
            Step::Note { .. } => None,
        }
    }

    /// What a host shows for this step.
    pub fn display_text(&self) -> &str {
        match self {
            Step::Prompt { label } | Step::Decision { label, .. } => label.as_str(),
            Step::Note { text } => text.as_str(),
        }
    }

    pub fn options(&self) -> &[DecisionOption] {
        match self {
            Step::Decision { options, .. } => options.as_slice(),
            Step::Prompt { .. } | Step::Note { .. } => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Workflow {
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// `None` once the run has walked off the end.
    pub fn current_step(&self, state: &RunState) -> Option<&Step> {
        self.step(state.step_index)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path, id: &str) -> Result<Self> {
        paths::validate_slug(id)?;
        let path = paths::workflow_path(root, id);
        if !path.exists() {
            return Err(LccError::WorkflowNotFound(id.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let workflow: Workflow = serde_yaml::from_str(&data)?;
        if workflow.id != id {
            return Err(LccError::WorkflowIdMismatch {
                file: id.to_string(),
                id: workflow.id,
            });
        }
        Ok(workflow)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        paths::validate_slug(&self.id)?;
        io::write_yaml(&paths::workflow_path(root, &self.id), self)
    }

    /// Save unless a file for this id already exists. Returns `true` when
    /// the file was created.
    pub fn save_if_missing(&self, root: &Path) -> Result<bool> {
        paths::validate_slug(&self.id)?;
        io::write_yaml_if_missing(&paths::workflow_path(root, &self.id), self)
    }

    /// Every workflow under `.lcc/workflows/` that [`Workflow::load`] can
    /// open, sorted by id. Unreadable files and files whose `id` differs
    /// from their file stem are skipped.
    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = paths::workflows_dir(root);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut workflows: Vec<Workflow> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext == paths::WORKFLOW_EXT)
            })
            .filter_map(|p| {
                let data = std::fs::read_to_string(&p).ok()?;
                let workflow: Workflow = serde_yaml::from_str(&data).ok()?;
                let stem = p.file_stem()?.to_str()?;
                (workflow.id == stem).then_some(workflow)
            })
            .collect();
        workflows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(workflows)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Authoring lint. The walker never calls this; a workflow with
    /// warnings still runs.
    pub fn validate(&self) -> Vec<WorkflowWarning> {
        let mut warnings = Vec::new();

        if self.steps.is_empty() {
            warnings.push(WorkflowWarning {
                step: None,
                message: "workflow has no steps; every run starts terminal".to_string(),
            });
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.display_text().trim().is_empty() {
                warnings.push(WorkflowWarning {
                    step: Some(index),
                    message: format!("{} step has no text", step.kind()),
                });
            }

            let Step::Decision { options, .. } = step else {
                continue;
            };

            if options.is_empty() {
                warnings.push(WorkflowWarning {
                    step: Some(index),
                    message: "decision has no options; the run cannot get past it".to_string(),
                });
            }

            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(option.label.as_str()) {
                    warnings.push(WorkflowWarning {
                        step: Some(index),
                        message: format!(
                            "duplicate option '{}'; only the first is reachable",
                            option.label
                        ),
                    });
                }
                if option.next_index >= self.steps.len() {
                    warnings.push(WorkflowWarning {
                        step: Some(index),
                        message: format!(
                            "option '{}' targets step {}, past the last step ({}); the run ends there",
                            option.label,
                            option.next_index,
                            self.steps.len().saturating_sub(1)
                        ),
                    });
                }
            }
        }

        warnings
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    pub message: String,
}

impl fmt::Display for WorkflowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(i) => write!(f, "step {i}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub step_index: usize,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl RunState {
    pub fn is_terminal(&self, workflow: &Workflow) -> bool {
        self.step_index >= workflow.steps.len()
    }

    fn advance(&self, step_index: usize, entry: HistoryEntry) -> RunState {
        let mut history = Vec::with_capacity(self.history.len() + 1);
        history.extend_from_slice(&self.history);
        history.push(entry);
        RunState {
            step_index,
            history,
        }
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

pub fn start_run() -> RunState {
    RunState::default()
}

/// Advance `state` by one step, stamping history with the current time.
///
/// Prompts and notes move to the next index and ignore `choice`. A decision
/// moves to the target of the option labelled exactly `choice`. Unknown or
/// missing choices, and states already past the end, come back unchanged.
pub fn apply_choice(workflow: &Workflow, state: &RunState, choice: Option<&str>) -> RunState {
    apply_choice_at(workflow, state, choice, Utc::now())
}

/// [`apply_choice`] with a caller-supplied clock reading.
pub fn apply_choice_at(
    workflow: &Workflow,
    state: &RunState,
    choice: Option<&str>,
    now: DateTime<Utc>,
) -> RunState {
    let Some(step) = workflow.current_step(state) else {
        return state.clone();
    };

    match step {
        Step::Decision { label, options } => {
            let Some(option) = choice.and_then(|c| options.iter().find(|o| o.label == c)) else {
                return state.clone();
            };
            state.advance(
                option.next_index,
                HistoryEntry {
                    timestamp: now,
                    label: label.clone(),
                    choice: Some(option.label.clone()),
                },
            )
        }
        Step::Prompt { .. } | Step::Note { .. } => {
            let label = step.label().unwrap_or(step.kind().as_str()).to_string();
            state.advance(
                state.step_index + 1,
                HistoryEntry {
                    timestamp: now,
                    label,
                    choice: None,
                },
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

pub const SAMPLE_WORKFLOW_ID: &str = "release-readiness";

/// Written by `lcc init` so a fresh project has something to run.
pub fn sample_workflow() -> Workflow {
    Workflow {
        id: SAMPLE_WORKFLOW_ID.to_string(),
        name: "Release readiness".to_string(),
        steps: vec![
            Step::Prompt {
                label: "Define objective".to_string(),
            },
            Step::Decision {
                label: "Assess risk".to_string(),
                options: vec![
                    DecisionOption {
                        label: "Low".to_string(),
                        next_index: 3,
                    },
                    DecisionOption {
                        label: "High".to_string(),
                        next_index: 2,
                    },
                ],
            },
            Step::Note {
                text: "Escalate to a reviewer before continuing.".to_string(),
            },
            Step::Note {
                text: "Proceed with the standard checklist.".to_string(),
            },
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
