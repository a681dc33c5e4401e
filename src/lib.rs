//! SafeGuard emergency core library.
//!
//! Exposes the orchestration logic (trigger detection, countdown FSM,
//! location, siren, evidence capture) behind port traits so it can be
//! driven by a platform shell, the host simulation, or tests.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod directory;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod outreach;
pub mod sensors;
