//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Every remote collaborator sits behind one of these traits. Each carries a
//! typed error built with `define_port_error!` so adapters map failures into
//! predictable variants and services can translate them into domain errors.

mod macros;
pub(crate) use macros::define_port_error;

mod beckn_gateway;
mod booking_repository;
mod peer_directory;
mod resource_delivery;
mod skill_match_source;
mod state_store;

#[cfg(test)]
pub use beckn_gateway::MockBecknGateway;
pub use beckn_gateway::{BecknGateway, BecknGatewayError, FixtureBecknGateway};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{
    BookingRepository, BookingRepositoryError, CreatedBooking, FixtureBookingRepository,
};
#[cfg(test)]
pub use peer_directory::MockPeerDirectory;
pub use peer_directory::{FixturePeerDirectory, PeerDirectory, PeerDirectoryError};
#[cfg(test)]
pub use resource_delivery::MockResourceDelivery;
pub use resource_delivery::{FixtureResourceDelivery, ResourceDelivery, ResourceDeliveryError};
#[cfg(test)]
pub use skill_match_source::MockSkillMatchSource;
pub use skill_match_source::{FixtureSkillMatchSource, SkillMatchSource, SkillMatchSourceError};
#[cfg(test)]
pub use state_store::MockStateStore;
pub use state_store::{FixtureStateStore, StateStore, StateStoreError};
