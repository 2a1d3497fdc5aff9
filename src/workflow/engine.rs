//! Entry resolution and step submission
//!
//! The engine never keeps a cursor. The current step is recomputed from
//! session contents on every call, so a reload, a stale bookmark, or a
//! hand-edited session all resolve to the same place. Submissions are
//! all-or-nothing: the session is only touched after every field of the
//! step validates.

use crate::config::{FieldConfig, FieldKind, StepConfig, WorkflowConfig};
use crate::store::SessionStore;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// How a step submission can fail
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    /// Guard failed. Not user-visible as an error; the caller redirects
    /// to `redirect_to` and renders that step instead.
    #[error("step '{step}' is missing prerequisite state, redirect to '{redirect_to}'")]
    MissingPrerequisite { step: String, redirect_to: String },

    /// Local input invalid. Rendered inline; the session is unchanged.
    #[error("invalid '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("workflow '{workflow}' has no step named '{step}'")]
    UnknownStep { workflow: String, step: String },

    /// Definition cannot make progress (validation normally rejects these)
    #[error("workflow '{workflow}' cannot make progress")]
    Stalled { workflow: String },
}

/// Result of a successful step submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Step accepted; render the named successor next
    Advance(String),
    /// Terminal step accepted; the flow is finished and its keys cleared
    Complete,
}

/// Resolve which step of `workflow` should render for the current
/// session contents.
///
/// Walks the steps in order and returns the first one that is not
/// complete. A step counts as complete when it declares at least one
/// `produces` key and all of them are present; a terminal step declares
/// none and so is the entry exactly when everything before it is done.
/// The walk also stops at any step whose own guard fails, which keeps an
/// inconsistent session from ever resolving past the earliest
/// unsatisfied step.
///
/// Pure: same workflow and session contents always resolve to the same
/// step. Returns `None` only for a workflow with no steps.
pub fn resolve_entry_step<'a>(
    workflow: &'a WorkflowConfig,
    store: &dyn SessionStore,
) -> Option<&'a StepConfig> {
    for step in &workflow.steps {
        if !guard_satisfied(step, store) || !data_complete(step, store) {
            return Some(step);
        }
    }
    workflow.steps.last()
}

/// Submit `payload` to the named step.
///
/// Order of checks: the step must exist, its guard must pass, then every
/// field must validate. Only then are the `produces` keys written (and,
/// on a terminal step, the `clears` keys removed). A failed submission
/// leaves the session exactly as it was.
///
/// Resubmitting the same valid payload is safe: writes overwrite with
/// identical values and the returned transition is the same.
pub fn submit_step(
    workflow: &WorkflowConfig,
    store: &mut dyn SessionStore,
    step_name: &str,
    payload: &HashMap<String, String>,
) -> Result<Outcome, FlowError> {
    let step = workflow
        .step(step_name)
        .ok_or_else(|| FlowError::UnknownStep {
            workflow: workflow.name.clone(),
            step: step_name.to_string(),
        })?;

    if !guard_satisfied(step, store) {
        let redirect_to = resolve_entry_step(workflow, store)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        return Err(FlowError::MissingPrerequisite {
            step: step.name.clone(),
            redirect_to,
        });
    }

    // Validate everything before writing anything
    let mut writes: Vec<(&str, String)> = Vec::new();
    for field in &step.fields {
        let raw = payload.get(&field.name).map(String::as_str).unwrap_or("");
        let value = validate_field(field, raw, payload)?;
        if step.produces.iter().any(|k| k == field.store_key()) {
            writes.push((field.store_key(), value));
        }
    }

    for (key, value) in &writes {
        store.set(key, value);
    }
    for key in &step.clears {
        store.remove(key);
    }

    match &step.on_success {
        Some(next) if !step.terminal => Ok(Outcome::Advance(next.clone())),
        _ => Ok(Outcome::Complete),
    }
}

fn guard_satisfied(step: &StepConfig, store: &dyn SessionStore) -> bool {
    step.requires.iter().all(|key| store.contains(key))
}

fn data_complete(step: &StepConfig, store: &dyn SessionStore) -> bool {
    !step.produces.is_empty() && step.produces.iter().all(|key| store.contains(key))
}

/// Check one field and return the normalized value to store
fn validate_field(
    field: &FieldConfig,
    raw: &str,
    payload: &HashMap<String, String>,
) -> Result<String, FlowError> {
    let invalid = |message: String| FlowError::Validation {
        field: field.name.clone(),
        message,
    };

    let value = match field.kind {
        FieldKind::Text => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(invalid("cannot be empty".into()));
            }
            trimmed.to_string()
        }
        FieldKind::Email => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(invalid("cannot be empty".into()));
            }
            if !EMAIL_SHAPE.is_match(trimmed) {
                return Err(invalid("must be a valid email address".into()));
            }
            trimmed.to_lowercase()
        }
        FieldKind::Password => {
            if raw.is_empty() {
                return Err(invalid("cannot be empty".into()));
            }
            if raw.chars().count() < field.min_len {
                return Err(invalid(format!(
                    "must be at least {} characters",
                    field.min_len
                )));
            }
            raw.to_string()
        }
        FieldKind::Choice => {
            let trimmed = raw.trim();
            if !field.options.iter().any(|o| o == trimmed) {
                return Err(invalid(format!(
                    "must be one of: {}",
                    field.options.join(", ")
                )));
            }
            trimmed.to_string()
        }
    };

    if let Some(ref other) = field.confirm_with {
        let other_raw = payload.get(other).map(String::as_str).unwrap_or("");
        if raw != other_raw {
            return Err(invalid(format!("does not match {}", other)));
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PortalConfig, load_workflow};
    use crate::store::InMemorySession;
    use std::path::Path;

    fn recovery() -> WorkflowConfig {
        load_workflow(
            "recovery",
            Some(Path::new("/nonexistent")),
            &PortalConfig::default(),
        )
        .unwrap()
    }

    fn visit() -> WorkflowConfig {
        load_workflow(
            "visit",
            Some(Path::new("/nonexistent")),
            &PortalConfig::default(),
        )
        .unwrap()
    }

    fn payload(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn entry<'a>(workflow: &'a WorkflowConfig, store: &dyn SessionStore) -> &'a str {
        resolve_entry_step(workflow, store).unwrap().name.as_str()
    }

    #[test]
    fn test_empty_session_resolves_to_first_step() {
        let workflow = recovery();
        let store = InMemorySession::new();
        assert_eq!(entry(&workflow, &store), "request");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");

        assert_eq!(entry(&workflow, &store), entry(&workflow, &store));
    }

    #[test]
    fn test_email_only_resolves_to_verify_not_reset() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");

        assert_eq!(entry(&workflow, &store), "verify");
    }

    #[test]
    fn test_full_state_resolves_to_terminal_step() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");
        store.set("code", "123456");

        assert_eq!(entry(&workflow, &store), "reset");
    }

    #[test]
    fn test_tampered_session_never_resolves_ahead() {
        // A stale bookmark scenario: 'code' present but 'email' gone.
        // The earliest unsatisfied step wins.
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("code", "123456");

        assert_eq!(entry(&workflow, &store), "request");
    }

    #[test]
    fn test_blank_value_does_not_satisfy_a_guard() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("email", "");

        assert_eq!(entry(&workflow, &store), "request");
    }

    #[test]
    fn test_submit_writes_produces_and_advances() {
        let workflow = recovery();
        let mut store = InMemorySession::new();

        let outcome = submit_step(
            &workflow,
            &mut store,
            "request",
            &payload(&[("email", "A@B.com")]),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Advance("verify".into()));
        // Normalized before storage
        assert_eq!(store.get("email"), Some("a@b.com"));
    }

    #[test]
    fn test_submit_invalid_payload_leaves_store_unchanged() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");
        store.set("code", "123456");
        let before = store.snapshot();

        let err = submit_step(
            &workflow,
            &mut store,
            "reset",
            &payload(&[("password", "short"), ("confirm", "short")]),
        )
        .unwrap_err();

        assert!(matches!(err, FlowError::Validation { ref field, .. } if field == "password"));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_submit_mismatched_confirmation_rejected() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");
        store.set("code", "123456");
        let before = store.snapshot();

        let err = submit_step(
            &workflow,
            &mut store,
            "reset",
            &payload(&[("password", "longpassword"), ("confirm", "longpassw0rd")]),
        )
        .unwrap_err();

        assert!(matches!(err, FlowError::Validation { ref field, .. } if field == "confirm"));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_submit_rejects_malformed_email() {
        let workflow = recovery();
        let mut store = InMemorySession::new();

        for bad in ["not-an-email", "a@b", "a @b.com", "@b.com"] {
            let err = submit_step(
                &workflow,
                &mut store,
                "request",
                &payload(&[("email", bad)]),
            )
            .unwrap_err();
            assert!(
                matches!(err, FlowError::Validation { .. }),
                "accepted {:?}",
                bad
            );
        }
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_submit_guard_failure_redirects_backward() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        store.set("email", "a@b.com");

        let err = submit_step(
            &workflow,
            &mut store,
            "reset",
            &payload(&[("password", "longpassword"), ("confirm", "longpassword")]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            FlowError::MissingPrerequisite {
                step: "reset".into(),
                redirect_to: "verify".into(),
            }
        );
    }

    #[test]
    fn test_submit_unknown_step() {
        let workflow = recovery();
        let mut store = InMemorySession::new();

        let err = submit_step(&workflow, &mut store, "nope", &payload(&[])).unwrap_err();
        assert!(matches!(err, FlowError::UnknownStep { .. }));
    }

    #[test]
    fn test_full_recovery_sequence_completes_and_clears() {
        let workflow = recovery();
        let mut store = InMemorySession::new();

        let outcome = submit_step(
            &workflow,
            &mut store,
            "request",
            &payload(&[("email", "a@b.com")]),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Advance("verify".into()));

        let outcome = submit_step(
            &workflow,
            &mut store,
            "verify",
            &payload(&[("code", "123456")]),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Advance("reset".into()));

        let outcome = submit_step(
            &workflow,
            &mut store,
            "reset",
            &payload(&[("password", "longpassword"), ("confirm", "longpassword")]),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Complete);

        // Terminal step cleared its keys: the flow cannot be replayed
        assert_eq!(store.get("email"), None);
        assert_eq!(store.get("code"), None);
        assert_eq!(entry(&workflow, &store), "request");
    }

    #[test]
    fn test_resubmitting_identical_payload_is_idempotent() {
        let workflow = recovery();
        let mut store = InMemorySession::new();
        let request = payload(&[("email", "a@b.com")]);

        let first = submit_step(&workflow, &mut store, "request", &request).unwrap();
        let after_first = store.snapshot();

        let second = submit_step(&workflow, &mut store, "request", &request).unwrap();
        let after_second = store.snapshot();

        assert_eq!(first, second);
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_visit_flow_choice_validation() {
        let workflow = visit();
        let mut store = InMemorySession::new();

        let err = submit_step(
            &workflow,
            &mut store,
            "choose",
            &payload(&[("visit_action", "email")]),
        )
        .unwrap_err();
        assert!(matches!(err, FlowError::Validation { .. }));

        let outcome = submit_step(
            &workflow,
            &mut store,
            "choose",
            &payload(&[("visit_action", "recap")]),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Advance("workspace".into()));
        assert_eq!(store.get("visit_action"), Some("recap"));
    }

    #[test]
    fn test_visit_workspace_completes_without_fields() {
        let workflow = visit();
        let mut store = InMemorySession::new();
        store.set("visit_action", "call");

        assert_eq!(entry(&workflow, &store), "workspace");

        let outcome = submit_step(&workflow, &mut store, "workspace", &payload(&[])).unwrap();
        assert_eq!(outcome, Outcome::Complete);
        assert_eq!(store.get("visit_action"), None);
    }

    #[test]
    fn test_store_as_redirects_the_written_key() {
        let workflow: WorkflowConfig = toml::from_str(
            r#"
            name = "aliased"

            [[steps]]
            name = "first"
            produces = ["fp_email"]
            on_success = "second"

            [[steps.fields]]
            name = "email"
            kind = "email"
            store_as = "fp_email"

            [[steps]]
            name = "second"
            requires = ["fp_email"]
            terminal = true
            clears = ["fp_email"]
        "#,
        )
        .unwrap();
        assert!(workflow.validate().is_ok());

        let mut store = InMemorySession::new();
        submit_step(
            &workflow,
            &mut store,
            "first",
            &payload(&[("email", "a@b.com")]),
        )
        .unwrap();

        assert_eq!(store.get("fp_email"), Some("a@b.com"));
        assert_eq!(store.get("email"), None);
    }
}
