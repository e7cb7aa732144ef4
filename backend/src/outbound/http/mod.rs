//! HTTP outbound adapters.
//!
//! [`StateApiClient`] speaks to the dashboard state API and implements the
//! state, peer, skill match, and resource delivery ports. [`BapClient`] speaks
//! to the BAP service and implements the Beckn gateway and booking ports.

mod bap_client;
mod dto;
mod error;
mod state_client;

pub use bap_client::BapClient;
pub use state_client::StateApiClient;
