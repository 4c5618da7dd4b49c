//! Intent-routing engine for the FleetPulse fleet API.
//!
//! Turns an OpenAPI-style description into a priority-ordered set of
//! routing rules, then classifies free-text questions against them and
//! pulls out hostnames, package names, and time windows.
//!
//! Pipeline: `spec` → `patterns` → `synthesis` → `assembly` → `classifier`.
//! `emitter` renders an assembled config as standalone source for inspection.

pub mod assembly;
pub mod classifier;
pub mod emitter;
pub mod engine;
pub mod entities;
pub mod error;
pub mod matcher;
pub mod patterns;
pub mod spec;
pub mod synthesis;
pub mod templates;

pub use assembly::{assemble, build_routing_config, builtin_config};
pub use classifier::Classifier;
pub use engine::RoutingEngine;
pub use entities::{ExtractedEntities, TimeWindow, extract_entities};
pub use error::{RouterError, RouterResult};
pub use matcher::{contains_term, normalize_query};
pub use spec::{ApiSpec, SpecSource, extract_endpoints, load_spec};
pub use templates::{RuleTemplate, TemplateTable};
