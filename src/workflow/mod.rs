//! Guarded workflow engine for clinic-flow
//!
//! This module handles:
//! - Entry resolution: which step the session is currently at
//! - Step submission: validate, write outputs, advance
//! - Flow running: drive a whole definition from supplied field values
//!
//! Step order is enforced by data presence alone. A step may render only
//! when the keys it requires exist in the session; submitting it writes
//! the keys the next step will look for. Nothing remembers "the current
//! page", so stale navigation and reloads always re-resolve consistently.

mod engine;
mod runner;

pub use engine::{FlowError, Outcome, resolve_entry_step, submit_step};
pub use runner::{FlowResult, FlowRunner, FlowStatus, StepReport};
