//! Triage domain models.
//!
//! Provides the data types for a triage allocation problem and its
//! solution. All entities are built once from the input instance and are
//! read-only for the duration of a planning run.
//!
//! # Domain Mappings
//!
//! | u-triage | Mass casualty |
//! |----------|---------------|
//! | Patient | Casualty with a survival curve |
//! | Resource | Treatment kind (duration, boost) |
//! | Responders | Medics on scene |
//! | Plan | Treatment schedule |

mod instance;
mod patient;
mod plan;
mod resource;

pub use instance::TriageInstance;
pub use patient::{is_survivor, Patient, MAX_PROBABILITY, SURVIVAL_THRESHOLD};
pub use plan::{AllocationResult, Assignment, Plan, Violation, ViolationType};
pub use resource::{Resource, ResourceCatalog};
