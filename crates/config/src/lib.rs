//! Configuration & Validator (spec.md §4.3): the declarative
//! `ObservationPlan` schema and its discovery-backed validation.

#![forbid(unsafe_code)]

mod plan;
mod validate;

pub use plan::{ObservationPlan, ResolvedObservation, ResolvedPlan, ResourceObservation};
pub use validate::validate;
