//! Workspace umbrella crate.
//!
//! Re-exports the `core-service` façade so transport layers can depend on a
//! single crate and reach the catalog operations, configuration and models
//! without wiring each workspace member individually.

pub use core_service::*;
