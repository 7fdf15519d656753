//! Producer Store Port
//!
//! Defines the interface for persisting and listing producer records.
//! Exactly one implementation is active for the process lifetime, chosen
//! at startup: the row-oriented SQLite store or the remote document store.

use crate::domain::entities::{NewProducer, Producer, ProfileUpdate};
use crate::domain::value_objects::ProducerId;
use async_trait::async_trait;
use thiserror::Error;

/// Failure raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("producer not found")]
    NotFound,
    /// Any other storage failure; surfaced to clients as a generic
    /// internal error with no partial-state guarantee beyond "nothing was
    /// committed if the write itself failed".
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Repository for producer records.
///
/// This is an outbound port that abstracts the persistence representation.
/// The application layer calls this interface without knowing whether rows
/// or documents back it, so no handler ever branches on the active backend.
#[async_trait]
pub trait ProducerStore: Send + Sync {
    /// Persist a new producer and return the assigned identifier.
    async fn create(&self, producer: NewProducer) -> Result<ProducerId, StoreError>;

    /// List all producers in stable creation order.
    async fn list(&self) -> Result<Vec<Producer>, StoreError>;

    /// Fetch a single producer by identifier.
    async fn find_by_id(&self, id: &ProducerId) -> Result<Option<Producer>, StoreError>;

    /// Fetch a producer by exact login email, if any record carries one.
    async fn find_by_email(&self, email: &str) -> Result<Option<Producer>, StoreError>;

    /// Overwrite the mutable profile fields of an existing producer.
    ///
    /// Returns `StoreError::NotFound` when the identifier is unknown.
    async fn update_profile(
        &self,
        id: &ProducerId,
        update: ProfileUpdate,
    ) -> Result<(), StoreError>;
}
