//! FleetPulse query server — library crate.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `fp-e2e-tests`) can reach `AppState`, `build_router`, and
//! `QueryDispatcher`.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod routes;
pub mod state;
