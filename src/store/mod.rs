//! Session-scoped key/value storage for workflow state

mod session;

pub use session::{InMemorySession, SessionStore};
