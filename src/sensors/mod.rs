//! Device inputs the orchestrator samples on demand.
//!
//! Only geolocation today: a single time-bounded fix per Active session.

pub mod location;

pub use location::{LocationAcquirer, LocationFix};
