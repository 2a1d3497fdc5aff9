//! Workflow and step definitions
//!
//! A workflow is an ordered list of steps. Each step names the session
//! keys it requires before it may render, the keys it writes on a
//! successful submit, and its successor. Step ordering is enforced purely
//! through data presence; there is no separately persisted cursor.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Field kind - explicit, not inferred
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Any non-empty text after trimming. The recovery code uses this:
    /// any non-empty code is accepted, a stand-in for a backend check.
    Text,
    /// Non-empty, email-shaped; stored trimmed and lowercased
    Email,
    /// Raw input, length checked against `min_len`, never trimmed
    Password,
    /// One of the listed `options`
    Choice,
}

/// A single input within a step
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Field name (unique within the step, also the payload key)
    pub name: String,

    /// Field kind
    pub kind: FieldKind,

    /// Minimum length in characters (password fields)
    #[serde(default)]
    pub min_len: usize,

    /// Another field in the same step whose value this one must match
    pub confirm_with: Option<String>,

    /// Session key the value is written to (defaults to the field name)
    pub store_as: Option<String>,

    /// Allowed values (choice fields)
    #[serde(default)]
    pub options: Vec<String>,

    /// Label shown by the rendering adapter
    #[serde(default)]
    pub label: String,
}

impl FieldConfig {
    /// Session key this field writes to
    pub fn store_key(&self) -> &str {
        self.store_as.as_deref().unwrap_or(&self.name)
    }
}

/// Configuration for a workflow step
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Step name (unique within workflow)
    pub name: String,

    /// Session keys that must be present before this step may render
    #[serde(default)]
    pub requires: Vec<String>,

    /// Session keys written on successful submit
    #[serde(default)]
    pub produces: Vec<String>,

    /// Step to transition to on success (absent on the terminal step)
    pub on_success: Option<String>,

    /// Whether this step ends the workflow
    #[serde(default)]
    pub terminal: bool,

    /// Session keys removed after a successful terminal submit, so a
    /// finished flow cannot be replayed from stale state
    #[serde(default)]
    pub clears: Vec<String>,

    /// Prompt template rendered against the session (minijinja)
    pub prompt: Option<String>,

    /// Inputs this step collects
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl StepConfig {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Full workflow configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Workflow name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Steps in this workflow, in order
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

impl WorkflowConfig {
    /// Look up a step by name
    pub fn step(&self, name: &str) -> Option<&StepConfig> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Validate the workflow configuration
    ///
    /// The rules here are what make the engine's in-order entry walk
    /// sound: every `requires` key must come from an earlier step's
    /// `produces`, every non-terminal step must advance to a strictly
    /// later step, and only the final step may be terminal.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.steps.is_empty() {
            errors.push(format!("workflow '{}' has no steps", self.name));
        }

        // Check for duplicate step names
        let mut seen_names = HashSet::new();
        for step in &self.steps {
            if !seen_names.insert(&step.name) {
                errors.push(format!("duplicate step name: {}", step.name));
            }
        }

        let last_index = self.steps.len().saturating_sub(1);
        let mut produced_so_far: HashSet<&str> = HashSet::new();

        for (index, step) in self.steps.iter().enumerate() {
            // Guards may only reference keys some earlier step produces
            for key in &step.requires {
                if !produced_so_far.contains(key.as_str()) {
                    errors.push(format!(
                        "step '{}' requires '{}', which no earlier step produces",
                        step.name, key
                    ));
                }
            }
            for key in &step.produces {
                produced_so_far.insert(key);
            }

            // Transitions: forward-only, terminal only at the end
            match (&step.on_success, step.terminal) {
                (Some(next), false) => {
                    match self.steps.iter().position(|s| &s.name == next) {
                        Some(target) if target > index => {}
                        Some(_) => errors.push(format!(
                            "step '{}' transitions to '{}', which is not a later step",
                            step.name, next
                        )),
                        None => errors.push(format!(
                            "step '{}' transitions to unknown step '{}'",
                            step.name, next
                        )),
                    }
                }
                (Some(_), true) => errors.push(format!(
                    "terminal step '{}' must not declare on_success",
                    step.name
                )),
                (None, false) => errors.push(format!(
                    "step '{}' is not terminal and has no on_success",
                    step.name
                )),
                (None, true) => {}
            }

            if step.terminal && index != last_index {
                errors.push(format!(
                    "terminal step '{}' must be the last step",
                    step.name
                ));
            }

            // A non-terminal step that writes nothing would resolve as the
            // entry step forever
            if !step.terminal && step.produces.is_empty() {
                errors.push(format!(
                    "step '{}' is not terminal and produces nothing",
                    step.name
                ));
            }

            if !step.clears.is_empty() && !step.terminal {
                errors.push(format!(
                    "step '{}' declares clears but is not terminal",
                    step.name
                ));
            }

            // Every produced key must come from some field
            for key in &step.produces {
                if !step.fields.iter().any(|f| f.store_key() == key) {
                    errors.push(format!(
                        "step '{}' produces '{}' but no field writes it",
                        step.name, key
                    ));
                }
            }

            // Field-level checks
            let mut seen_fields = HashSet::new();
            for field in &step.fields {
                if !seen_fields.insert(&field.name) {
                    errors.push(format!(
                        "step '{}' has duplicate field '{}'",
                        step.name, field.name
                    ));
                }

                match field.kind {
                    FieldKind::Choice => {
                        if field.options.is_empty() {
                            errors.push(format!(
                                "choice field '{}' in step '{}' has no options",
                                field.name, step.name
                            ));
                        }
                    }
                    _ => {
                        if !field.options.is_empty() {
                            errors.push(format!(
                                "field '{}' in step '{}' has options but is not a choice",
                                field.name, step.name
                            ));
                        }
                    }
                }

                if let Some(ref other) = field.confirm_with {
                    if other == &field.name || step.field(other).is_none() {
                        errors.push(format!(
                            "field '{}' in step '{}' confirms unknown field '{}'",
                            field.name, step.name, other
                        ));
                    }
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
