//! Static mock data collaborators
//!
//! Everything here is fixed content with no query logic: the appointment
//! schedule variants and the patient detail records the portal renders.

pub mod patients;
pub mod schedule;
