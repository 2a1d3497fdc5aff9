//! CLI command implementations

use super::output::{OutputEvent, OutputHandler};
use crate::config::{PortalConfig, list_workflows as list_workflow_names, load_workflow};
use crate::dashboard::{self, DateCycle};
use crate::data::{patients, schedule};
use crate::store::SessionStore;
use crate::workflow::{FlowRunner, FlowStatus};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

/// Run a workflow, feeding step fields from `key=value` args
pub fn run_workflow(
    workflow_name: &str,
    args: Vec<String>,
    project_dir: Option<&Path>,
    config: &PortalConfig,
    store: &mut dyn SessionStore,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    let workflow = load_workflow(workflow_name, project_dir, config)
        .map_err(|e| format!("Failed to load workflow '{}': {:#}", workflow_name, e))?;

    let total = workflow.steps.len();
    let parsed_args = parse_workflow_args(&args);

    handler.emit(OutputEvent::WorkflowStart {
        name: workflow.name.clone(),
        steps: total,
    });
    handler.emit(OutputEvent::Debug {
        message: format!("{} field value(s) supplied", parsed_args.len()),
    });

    let runner = FlowRunner::new(workflow);
    let result = runner.run(store, &parsed_args);

    for report in &result.steps {
        if let Some(ref prompt) = report.prompt {
            handler.emit(OutputEvent::StepPrompt {
                step: report.name.clone(),
                prompt: prompt.clone(),
            });
        }
        handler.emit(OutputEvent::StepComplete {
            name: report.name.clone(),
            index: report.index,
            total,
        });
    }

    let output = match &result.status {
        FlowStatus::Completed => Some(format!("{}: complete", result.workflow)),
        FlowStatus::Pending { step, missing } => {
            handler.emit(OutputEvent::StepPending {
                step: step.clone(),
                missing: missing.clone(),
            });
            Some(format!("{}: waiting at '{}'", result.workflow, step))
        }
        FlowStatus::Failed { step, error } => {
            handler.emit(OutputEvent::StepError {
                step: step.clone(),
                error: error.to_string(),
            });
            None
        }
    };

    handler.emit(OutputEvent::WorkflowComplete {
        success: result.success(),
        duration_ms: result.duration.as_millis() as u64,
        steps_completed: result.steps.len(),
    });
    handler.result(result.success(), output.as_deref());

    Ok(if result.success() { 0 } else { 1 })
}

/// Parse workflow arguments from CLI
fn parse_workflow_args(args: &[String]) -> HashMap<String, String> {
    let mut parsed = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once('=') {
            parsed.insert(key.to_string(), value.to_string());
        }
    }

    parsed
}

/// Validate a workflow without running it
pub fn validate_workflow(
    workflow_name: &str,
    project_dir: Option<&Path>,
    config: &PortalConfig,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    match load_workflow(workflow_name, project_dir, config) {
        Ok(workflow) => {
            handler.emit(OutputEvent::Info {
                message: format!(
                    "✓ Workflow '{}' is valid ({} steps)",
                    workflow.name,
                    workflow.steps.len()
                ),
            });
            Ok(0)
        }
        Err(e) => {
            handler.emit(OutputEvent::Info {
                message: format!("✗ {:#}", e),
            });
            Ok(1)
        }
    }
}

/// List available workflows
pub fn list_workflows(
    project_dir: Option<&Path>,
    config: &PortalConfig,
    handler: &dyn OutputHandler,
) -> Result<i32, String> {
    for (name, source) in list_workflow_names(project_dir) {
        let description = load_workflow(&name, project_dir, config)
            .map(|w| w.description)
            .unwrap_or_else(|_| "(invalid definition)".into());

        handler.emit(OutputEvent::Info {
            message: format!("{} [{}] - {}", name, source, description),
        });
    }
    Ok(0)
}

/// Show the dashboard: greeting plus the appointment list, cycling the
/// schedule variant once per distinct date
pub fn show_dashboard(
    dates: &[NaiveDate],
    config: &PortalConfig,
    store: &mut dyn SessionStore,
    json: bool,
) -> Result<i32, String> {
    let doctor = config
        .defaults
        .doctor_name
        .as_deref()
        .unwrap_or(dashboard::DEFAULT_DOCTOR);
    dashboard::sign_in(store, doctor);

    let today = chrono::Local::now().date_naive();
    let first = dates.first().copied().unwrap_or(today);
    let mut cycle = DateCycle::new(first, schedule::VARIANT_COUNT);

    let mut days: Vec<(NaiveDate, usize)> = vec![(first, cycle.variant())];
    for date in dates.iter().skip(1) {
        match cycle.select(*date) {
            Some(variant) => days.push((*date, variant)),
            None => tracing::debug!(%date, "date unchanged, selection ignored"),
        }
    }

    if json {
        let value = serde_json::json!({
            "greeting": dashboard::greeting(store),
            "days": days
                .iter()
                .map(|(date, variant)| {
                    serde_json::json!({
                        "date": date.to_string(),
                        "variant": variant,
                        "appointments": schedule::variant(*variant),
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return Ok(0);
    }

    println!("{}", dashboard::greeting(store));
    for (date, variant) in days {
        let appointments = schedule::variant(variant);
        println!();
        println!("{}", date.format("%A, %B %d, %Y"));
        if appointments.is_empty() {
            println!("  No appointments scheduled.");
        }
        for appt in appointments {
            println!(
                "  {}  {} ({} yrs, {}) - {}",
                appt.time, appt.name, appt.age, appt.sex, appt.note
            );
        }
    }
    Ok(0)
}

/// Show a patient detail record and the visit workspace options
pub fn show_patient(id: &str, json: bool) -> Result<i32, String> {
    let record = patients::patient(id).unwrap_or_else(|| {
        tracing::debug!(id, "unknown patient id, using fallback");
        patients::fallback_patient()
    });

    if json {
        let value = serde_json::json!({
            "patient": record,
            "options": patients::VISIT_OPTIONS,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return Ok(0);
    }

    println!("{}", record.name);
    println!("{}", record.meta);
    println!();
    println!("Chief Complaint");
    println!("  {}", record.complaint);
    println!();
    println!("Last Visit - {} ({})", record.last_visit.date, record.last_visit.visit_type);
    println!("  Assessment: {}", record.last_visit.assessment);
    println!("  Treatment:  {}", record.last_visit.treatment);
    println!("  Notes:      {}", record.last_visit.notes);
    println!();
    println!("Previous SOAP Notes");
    for entry in record.soap {
        println!("  {}  {}", entry.date, entry.time);
    }
    println!();
    println!("Visit options");
    for option in patients::VISIT_OPTIONS {
        println!("  {} {} - {}", option.icon, option.title, option.sub);
    }
    Ok(0)
}
