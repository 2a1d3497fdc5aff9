//! Clinician dashboard state
//!
//! The greeting comes from the mock sign-in; the appointment list is
//! picked by the deterministic variant cycle in [`variant`].

mod variant;

pub use variant::{DateCycle, next_variant};

use crate::store::SessionStore;

/// Fallback display name when no sign-in has happened
pub const DEFAULT_DOCTOR: &str = "Dr. Jane";

/// Session key holding the signed-in clinician's display name
const DOCTOR_NAME_KEY: &str = "doctor_name";

/// Mock sign-in: stash the display name for the dashboard greeting.
/// Credentials are not checked; authentication is out of scope.
pub fn sign_in(store: &mut dyn SessionStore, name: &str) {
    store.set(DOCTOR_NAME_KEY, name);
}

/// Dashboard greeting line
pub fn greeting(store: &dyn SessionStore) -> String {
    let name = store
        .get(DOCTOR_NAME_KEY)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_DOCTOR);
    format!("Hello, {}", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySession;

    #[test]
    fn test_greeting_falls_back_without_sign_in() {
        let store = InMemorySession::new();
        assert_eq!(greeting(&store), "Hello, Dr. Jane");
    }

    #[test]
    fn test_greeting_uses_signed_in_name() {
        let mut store = InMemorySession::new();
        sign_in(&mut store, "Dr. Nair");
        assert_eq!(greeting(&store), "Hello, Dr. Nair");
    }
}
