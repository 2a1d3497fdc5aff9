//! Flow runner - drives a workflow against a session
//!
//! The runner owns no cursor of its own. Each turn it asks the engine
//! which step the session is at, feeds that step's fields from the
//! supplied values, submits, and repeats until the flow completes or a
//! step's inputs are not available. This mirrors how the portal pages
//! re-resolve their position on every mount instead of trusting the
//! address bar.

use super::engine::{FlowError, Outcome, resolve_entry_step, submit_step};
use crate::config::WorkflowConfig;
use crate::store::SessionStore;
use crate::template::render_prompt;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How a flow run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    /// The terminal step was accepted
    Completed,
    /// A step's fields were not supplied; the flow is parked there
    Pending { step: String, missing: Vec<String> },
    /// A submission failed
    Failed { step: String, error: FlowError },
}

/// One accepted step within a run
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Step name
    pub name: String,

    /// Position within the workflow (1-based, for display)
    pub index: usize,

    /// Rendered prompt, when the step declares one
    pub prompt: Option<String>,
}

/// Result of running a workflow
#[derive(Debug, Clone)]
pub struct FlowResult {
    /// Workflow name
    pub workflow: String,

    /// Steps accepted, in order
    pub steps: Vec<StepReport>,

    /// How the run ended
    pub status: FlowStatus,

    /// Total execution time
    pub duration: Duration,
}

impl FlowResult {
    /// Whether the run ended without a failure
    pub fn success(&self) -> bool {
        !matches!(self.status, FlowStatus::Failed { .. })
    }
}

/// Drives one workflow definition
pub struct FlowRunner {
    workflow: WorkflowConfig,
}

impl FlowRunner {
    /// Create a runner for a workflow
    pub fn new(workflow: WorkflowConfig) -> Self {
        Self { workflow }
    }

    /// Run the workflow against `store`, taking field values from `args`.
    ///
    /// Stops at the first step whose fields are not all present in
    /// `args`; that is a parked flow, not an error. Validation failures
    /// stop the run and leave the session as the engine left it
    /// (untouched by the failing step).
    pub fn run(&self, store: &mut dyn SessionStore, args: &HashMap<String, String>) -> FlowResult {
        let started = Instant::now();
        let mut reports = Vec::new();

        // Each accepted submission completes one more step, so a bound of
        // one pass per step always suffices.
        for _ in 0..=self.workflow.steps.len() {
            let Some(step) = resolve_entry_step(&self.workflow, store) else {
                return self.stalled(reports, started);
            };
            let index = self
                .workflow
                .steps
                .iter()
                .position(|s| s.name == step.name)
                .unwrap_or(0)
                + 1;

            let prompt = step.prompt.as_deref().map(|source| {
                render_prompt(source, store).unwrap_or_else(|e| {
                    tracing::warn!(step = %step.name, error = %e, "prompt render failed");
                    source.to_string()
                })
            });

            let missing: Vec<String> = step
                .fields
                .iter()
                .filter(|f| !args.contains_key(&f.name))
                .map(|f| f.name.clone())
                .collect();
            if !missing.is_empty() {
                tracing::info!(step = %step.name, ?missing, "flow parked awaiting input");
                return FlowResult {
                    workflow: self.workflow.name.clone(),
                    steps: reports,
                    status: FlowStatus::Pending {
                        step: step.name.clone(),
                        missing,
                    },
                    duration: started.elapsed(),
                };
            }

            let step_name = step.name.clone();
            match submit_step(&self.workflow, store, &step_name, args) {
                Ok(outcome) => {
                    tracing::info!(step = %step_name, ?outcome, "step accepted");
                    reports.push(StepReport {
                        name: step_name,
                        index,
                        prompt,
                    });
                    if outcome == Outcome::Complete {
                        return FlowResult {
                            workflow: self.workflow.name.clone(),
                            steps: reports,
                            status: FlowStatus::Completed,
                            duration: started.elapsed(),
                        };
                    }
                }
                Err(error) => {
                    tracing::info!(step = %step_name, %error, "step rejected");
                    return FlowResult {
                        workflow: self.workflow.name.clone(),
                        steps: reports,
                        status: FlowStatus::Failed {
                            step: step_name,
                            error,
                        },
                        duration: started.elapsed(),
                    };
                }
            }
        }

        // Only reachable when a definition cycles without completing,
        // which validation rejects.
        self.stalled(reports, started)
    }

    fn stalled(&self, reports: Vec<StepReport>, started: Instant) -> FlowResult {
        FlowResult {
            workflow: self.workflow.name.clone(),
            steps: reports,
            status: FlowStatus::Failed {
                step: String::new(),
                error: FlowError::Stalled {
                    workflow: self.workflow.name.clone(),
                },
            },
            duration: started.elapsed(),
        }
    }
}
