//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain types and the JSON shapes the
//! state API and the BAP service speak. They contain no business logic.
//!
//! - **http**: reqwest-backed clients for the state API and the BAP service

pub mod http;
