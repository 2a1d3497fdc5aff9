//! Configuration types and loading for clinic-flow

mod loader;
mod workflow;

pub use loader::{Defaults, PortalConfig, list_workflows, load_workflow};
pub use workflow::{FieldConfig, FieldKind, StepConfig, WorkflowConfig};
