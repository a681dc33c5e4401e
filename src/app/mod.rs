//! Application core: domain logic behind port traits.
//!
//! Business rules for the emergency lifecycle live in [`service`]: trigger
//! classification, the countdown FSM, evidence capture bookkeeping, and
//! profile edits.  [`runtime`] drives the service from an async event loop.
//! All interaction with the device happens through **port traits** defined
//! in [`ports`], keeping this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod runtime;
pub mod service;
