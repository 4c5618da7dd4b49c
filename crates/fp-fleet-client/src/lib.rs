//! Data-access layer for the FleetPulse record-keeping API.
//!
//! [`FleetBackend`] is the seam the query dispatcher talks to.
//! [`HttpFleetClient`] is the production implementation;
//! [`MockFleetBackend`] serves canned fleet data for tests and demos.

pub mod backend;
pub mod client;
pub mod error;
pub mod mock;

pub use backend::FleetBackend;
pub use client::{BackendConfig, HttpFleetClient};
pub use error::{BackendError, BackendResult};
pub use mock::MockFleetBackend;
