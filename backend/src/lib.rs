//! Peer skill dashboard and travel booking core.
//!
//! The [`domain`] module holds the state model, the skill analysis, and the
//! booking pipeline behind ports; [`outbound`] provides the HTTP adapters
//! for those ports.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
