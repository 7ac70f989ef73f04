//! Mass-casualty triage scheduling for the U-Engine ecosystem.
//!
//! Allocates a pool of responders and a catalog of reusable treatments to
//! patients whose survival probability changes over time, maximizing the
//! aggregate expected survival over a bounded horizon.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Patient`, `Resource`, `ResourceCatalog`,
//!   `TriageInstance`, `Assignment`, `Plan`, `AllocationResult`
//! - **`scheduler`**: The allocation engine — capacity tracking, the DP
//!   planner, plan reconstruction, outcome aggregation
//! - **`validation`**: Input range checks (curve shape, probability range,
//!   durations, boosts)
//!
//! # Usage
//!
//! ```
//! let output = u_triage::allocate_json(
//!     r#"{"patients": [[10, 10], [10, 10]],
//!         "resources": [{"time": 1, "boost": 20}],
//!         "responders": 1,
//!         "total_time": 1}"#,
//! )
//! .unwrap();
//! assert_eq!(
//!     output,
//!     r#"{"assignments":[{"patient":0,"resource":0,"time":0}],"survivors":0,"total_survival_probability":40.0}"#
//! );
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Sacco et al. (2005), "Precise formulation and evidence-based
//!   application of resource-constrained triage"

pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::AllocationError;

use models::{AllocationResult, TriageInstance};
use scheduler::AllocationPlanner;

/// Plans an instance with the default planner configuration.
pub fn allocate(instance: &TriageInstance) -> Result<AllocationResult, AllocationError> {
    AllocationPlanner::new().allocate(instance)
}

/// Reads an instance record, plans it, and writes the result record.
pub fn allocate_json(input: &str) -> Result<String, AllocationError> {
    let instance = TriageInstance::from_json(input)?;
    allocate(&instance)?.to_json()
}
