//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

impl OutputMode {
    /// Parse from string
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "quiet" => Self::Quiet,
            _ => Self::Console,
        }
    }
}

/// Events emitted while driving a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputEvent {
    WorkflowStart {
        name: String,
        steps: usize,
    },
    StepPrompt {
        step: String,
        prompt: String,
    },
    StepComplete {
        name: String,
        index: usize,
        total: usize,
    },
    StepPending {
        step: String,
        missing: Vec<String>,
    },
    StepError {
        step: String,
        error: String,
    },
    WorkflowComplete {
        success: bool,
        duration_ms: u64,
        steps_completed: usize,
    },
    Info {
        message: String,
    },
    Debug {
        message: String,
    },
}

/// Output handler trait
pub trait OutputHandler {
    /// Emit an event
    fn emit(&self, event: OutputEvent);

    /// Write final result
    fn result(&self, success: bool, output: Option<&str>);
}

/// Console output handler
pub struct ConsoleHandler {
    debug: bool,
}

impl ConsoleHandler {
    /// Create a new console handler
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn format_duration(ms: u64) -> String {
        if ms < 1000 {
            format!("{}ms", ms)
        } else {
            format!("{:.1}s", ms as f64 / 1000.0)
        }
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match event {
            OutputEvent::WorkflowStart { name, steps } => {
                eprintln!("Running workflow '{}' ({} steps)", name, steps);
            }
            OutputEvent::StepPrompt { prompt, .. } => {
                eprintln!("    {}", prompt);
            }
            OutputEvent::StepComplete { name, index, total } => {
                eprintln!("[{}/{}] {} ✓", index, total, name);
                let _ = io::stderr().flush();
            }
            OutputEvent::StepPending { step, missing } => {
                eprintln!(
                    "Waiting at '{}' for: {}",
                    step,
                    missing.join(", ")
                );
            }
            OutputEvent::StepError { step, error } => {
                eprintln!("Error in step '{}': {}", step, error);
            }
            OutputEvent::WorkflowComplete {
                success,
                duration_ms,
                steps_completed,
            } => {
                eprintln!();
                if success {
                    eprintln!(
                        "✓ Workflow completed ({} steps in {})",
                        steps_completed,
                        Self::format_duration(duration_ms)
                    );
                } else {
                    eprintln!(
                        "✗ Workflow failed after {} steps ({})",
                        steps_completed,
                        Self::format_duration(duration_ms)
                    );
                }
            }
            OutputEvent::Info { message } => {
                eprintln!("{}", message);
            }
            OutputEvent::Debug { message } => {
                if self.debug {
                    eprintln!("[debug] {}", message);
                }
            }
        }
    }

    fn result(&self, _success: bool, output: Option<&str>) {
        if let Some(out) = output {
            println!("{}", out);
        }
    }
}

/// JSON output handler
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    /// Create a new JSON handler
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        if let Ok(s) = json {
            println!("{}", s);
        }
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        self.print_json(&event);
    }

    fn result(&self, success: bool, output: Option<&str>) {
        #[derive(Serialize)]
        struct FinalResult<'a> {
            success: bool,
            output: Option<&'a str>,
        }

        self.print_json(&FinalResult { success, output });
    }
}

/// Quiet handler that emits nothing
pub struct QuietHandler;

impl OutputHandler for QuietHandler {
    fn emit(&self, _event: OutputEvent) {}
    fn result(&self, _success: bool, output: Option<&str>) {
        // Only print final output, nothing else
        if let Some(out) = output {
            println!("{}", out);
        }
    }
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode, debug: bool) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler::new(debug)),
        OutputMode::Json => Box::new(JsonHandler::new(true)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}
