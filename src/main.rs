//! Local-producer marketplace backend
//!
//! This is the composition root that wires together all the components.

use mapa_produtores::adapters::inbound::{ApiServer, ApiState};
use mapa_produtores::adapters::outbound::{
    DocumentStoreCredentials, HttpDocumentStore, HttpPhotoStore, NominatimGeocoder,
    SqliteProducerStore,
};
use mapa_produtores::application::ProducerService;
use mapa_produtores::config::load_config;
use mapa_produtores::domain::ports::{PhotoStore, ProducerStore};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!("starting producer API listen={}", cfg.listen_addr);

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Select the persistence backend once for the process lifetime.
    // The document store (plus its blob store) is active only when the
    // credentials file exists and parses; otherwise the local SQLite
    // store is used, seeded on first creation.
    let (store, photos, backend): (Arc<dyn ProducerStore>, Option<Arc<dyn PhotoStore>>, &str) =
        match DocumentStoreCredentials::from_file(&cfg.credentials_path) {
            Ok(credentials) => {
                tracing::info!(
                    "document store selected (credentials from {})",
                    cfg.credentials_path
                );
                let photos = credentials.storage_url.as_ref().map(|storage_url| {
                    Arc::new(HttpPhotoStore::new(
                        storage_url.clone(),
                        credentials.api_key.clone(),
                    )) as Arc<dyn PhotoStore>
                });
                if photos.is_none() {
                    tracing::warn!("no storage_url in credentials, photo uploads disabled");
                }
                (
                    Arc::new(HttpDocumentStore::new(&credentials)),
                    photos,
                    "document",
                )
            }
            Err(e) => {
                tracing::warn!(
                    "document store unavailable ({:#}), using SQLite at {}",
                    e,
                    cfg.db_path
                );
                let store = SqliteProducerStore::new(cfg.db_path.clone());
                store.initialize().await?;
                (Arc::new(store), None, "sqlite")
            }
        };

    // 2. Address resolver
    let geocoder = Arc::new(NominatimGeocoder::new(
        cfg.geocoder_url.clone(),
        cfg.country.clone(),
        Duration::from_secs(cfg.geocoder_timeout_secs),
        Duration::from_millis(cfg.geocoder_throttle_ms),
    )?);

    // 3. Application service
    let service = Arc::new(ProducerService::new(store, geocoder, photos));

    // 4. Inbound adapter
    let server = ApiServer::new(
        cfg.listen_addr.clone(),
        ApiState::new(service, backend),
        Duration::from_secs(cfg.request_timeout_secs),
    );

    server.run().await
}
