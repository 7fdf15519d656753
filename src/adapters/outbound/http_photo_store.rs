//! HTTP Photo Store
//!
//! Implements PhotoStore against remote object storage. Each photo is
//! uploaded under a generated object name and addressed afterwards by its
//! public URL.

use crate::domain::ports::PhotoStore;
use anyhow::Context;
use async_trait::async_trait;

/// Blob-store-backed photo store.
pub struct HttpPhotoStore {
    client: reqwest::Client,
    storage_url: String,
    api_key: String,
}

impl HttpPhotoStore {
    pub fn new(storage_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            storage_url: storage_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

/// Object names keep the original extension but replace the client-chosen
/// name, so concurrent uploads of "foto.jpg" never collide.
fn object_name(filename: &str) -> String {
    let key = uuid::Uuid::new_v4();
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{key}.{}", ext.to_lowercase()),
        _ => key.to_string(),
    }
}

fn content_type_for(object: &str) -> &'static str {
    match object.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl PhotoStore for HttpPhotoStore {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
        let object = object_name(filename);
        let url = format!("{}/{}", self.storage_url, object);

        self.client
            .put(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type_for(&object))
            .body(bytes)
            .send()
            .await
            .context("photo upload request failed")?
            .error_for_status()
            .context("photo upload rejected")?;

        tracing::debug!("uploaded photo {:?} as {}", filename, object);
        Ok(url)
    }
}
