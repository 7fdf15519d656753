//! Geocoder Port
//!
//! Defines the interface for resolving a postal address to map coordinates.

use crate::domain::value_objects::Coordinates;
use async_trait::async_trait;
use thiserror::Error;

/// Failure raised by an address resolution attempt.
///
/// The two variants deliberately map to different HTTP classes: a missing
/// match is a user-input problem the caller can correct, while an
/// unavailable provider is a transient service fault.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The provider returned no match for the address.
    #[error("no match for the given address")]
    NoMatch,
    /// Network failure, timeout, or an unusable provider response.
    #[error("geocoding provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolver for free-text addresses.
///
/// Implementations query an external geocoding provider and are expected
/// to bound the lookup with a timeout. No retry is performed here; callers
/// resubmit the request themselves.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a human-entered address to coordinates.
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}
