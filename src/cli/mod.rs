//! CLI module for clinic-flow
//!
//! This module provides:
//! - Command implementations (run, validate, workflows, dashboard, patient)
//! - Output handlers (console, JSON, quiet)
//!
//! Commands are the thin adapter the engine design asks for: they load a
//! definition, hand the session store to the runner, and render whatever
//! the engine resolved. No navigation state lives here.

pub mod commands;
pub mod output;

pub use commands::{list_workflows, run_workflow, show_dashboard, show_patient, validate_workflow};
pub use output::{OutputEvent, OutputHandler, OutputMode, create_handler};
