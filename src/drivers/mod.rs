//! Emergency subsystems driven by the orchestrator.

pub mod recorder;
pub mod siren;
pub mod strobe;
pub mod trigger;
