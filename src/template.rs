//! Step prompt rendering
//!
//! Prompts are minijinja templates evaluated against a snapshot of the
//! session, so a step can echo state produced earlier in the flow
//! ("We sent a 6-digit code to {{ email }}."). Keys absent from the
//! session render as empty, the same as reading a missing storage key.

use crate::store::SessionStore;
use minijinja::Environment;
use thiserror::Error;

/// Errors from prompt rendering
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to render prompt: {0}")]
    Render(#[from] minijinja::Error),
}

/// Render a prompt template against the current session contents
pub fn render_prompt(source: &str, store: &dyn SessionStore) -> Result<String, TemplateError> {
    let env = Environment::new();
    let rendered = env.render_str(source, store.snapshot())?;
    Ok(rendered)
}
