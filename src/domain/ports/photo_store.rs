//! Photo Store Port
//!
//! Defines the interface for uploading product photos to blob storage.

use async_trait::async_trait;

/// Store for uploaded product photos.
///
/// Only available alongside the document backend; the row-oriented store
/// has no photo capability and runs without one. Uploads are independent
/// of the record write: a failed upload degrades the product entry to an
/// empty photo URL instead of aborting the registration.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Upload a photo and return its public URL.
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> anyhow::Result<String>;
}
