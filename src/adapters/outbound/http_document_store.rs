//! HTTP Document Store
//!
//! Implements ProducerStore against a remote key-document database reached
//! over its HTTP API, the document-oriented representation. Products are
//! stored as a structured list, so per-product photo URLs survive.
//!
//! The store is only activated when the credentials file configured at
//! startup exists and parses; otherwise the process falls back to the
//! local SQLite representation.

use crate::domain::entities::{NewProducer, Producer, Product, ProfileUpdate};
use crate::domain::ports::{ProducerStore, StoreError};
use crate::domain::value_objects::{Coordinates, ProducerId};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Credentials and endpoints for the document store, loaded from the JSON
/// file named by the startup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStoreCredentials {
    /// Base URL of the document database HTTP API
    pub api_url: String,
    /// Bearer token sent with every request
    pub api_key: String,
    /// Collection holding producer documents
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Base URL of the blob store for product photos, if provisioned
    #[serde(default)]
    pub storage_url: Option<String>,
}

fn default_collection() -> String {
    "produtores".to_string()
}

impl DocumentStoreCredentials {
    /// Load and parse the credentials file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading credentials file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing credentials file {}", path.display()))
    }
}

/// Wire form of one product inside a producer document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDocument {
    nome: String,
    #[serde(default)]
    foto_url: String,
}

/// Wire form of a producer document.
///
/// Field names are the collection's historical Portuguese names; the
/// document key is duplicated into the body so listings carry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProducerDocument {
    #[serde(default)]
    id: Option<String>,
    nome: String,
    morada: String,
    telefone: String,
    #[serde(default)]
    produtos: Vec<ProductDocument>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default = "default_disponivel")]
    disponivel: bool,
    #[serde(default)]
    foto: Option<String>,
}

fn default_disponivel() -> bool {
    true
}

impl ProducerDocument {
    fn from_new(id: &str, producer: NewProducer) -> Self {
        Self {
            id: Some(id.to_string()),
            nome: producer.name,
            morada: producer.address,
            telefone: producer.phone,
            produtos: producer
                .products
                .into_iter()
                .map(|p| ProductDocument {
                    nome: p.name,
                    foto_url: p.photo_url,
                })
                .collect(),
            latitude: producer.coordinates.latitude,
            longitude: producer.coordinates.longitude,
            email: producer.email,
            password: producer.password,
            disponivel: true,
            foto: None,
        }
    }

    /// Convert into the domain entity; `fallback_id` covers documents
    /// fetched by key, where the body may omit the duplicate.
    fn into_producer(self, fallback_id: Option<&str>) -> Option<Producer> {
        let id = self
            .id
            .or_else(|| fallback_id.map(str::to_string))?;
        Some(Producer {
            id: ProducerId::new(id),
            name: self.nome,
            address: self.morada,
            phone: self.telefone,
            products: self
                .produtos
                .into_iter()
                .map(|p| Product::with_photo(p.nome, p.foto_url))
                .collect(),
            coordinates: Coordinates::new(self.latitude, self.longitude),
            email: self.email,
            password: self.password,
            available: self.disponivel,
            photo: self.foto,
        })
    }
}

/// Document-database-backed producer store.
pub struct HttpDocumentStore {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    collection: String,
}

impl HttpDocumentStore {
    pub fn new(credentials: &DocumentStoreCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: credentials.api_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            collection: credentials.collection.clone(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/v1/{}", self.api_url, self.collection)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }
}

fn http_err(e: reqwest::Error) -> StoreError {
    StoreError::Backend(anyhow::Error::new(e).context("document store request failed"))
}

#[async_trait]
impl ProducerStore for HttpDocumentStore {
    async fn create(&self, producer: NewProducer) -> Result<ProducerId, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let document = ProducerDocument::from_new(&id, producer);

        self.client
            .put(self.document_url(&id))
            .bearer_auth(&self.api_key)
            .json(&document)
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?;

        Ok(ProducerId::new(id))
    }

    async fn list(&self) -> Result<Vec<Producer>, StoreError> {
        let documents: Vec<ProducerDocument> = self
            .client
            .get(self.collection_url())
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)?;

        let producers = documents
            .into_iter()
            .filter_map(|doc| {
                let nome = doc.nome.clone();
                let producer = doc.into_producer(None);
                if producer.is_none() {
                    tracing::warn!("skipping keyless producer document {:?}", nome);
                }
                producer
            })
            .collect();
        Ok(producers)
    }

    async fn find_by_id(&self, id: &ProducerId) -> Result<Option<Producer>, StoreError> {
        let response = self
            .client
            .get(self.document_url(id.as_str()))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(http_err)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: ProducerDocument = response
            .error_for_status()
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)?;

        Ok(document.into_producer(Some(id.as_str())))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Producer>, StoreError> {
        let documents: Vec<ProducerDocument> = self
            .client
            .get(self.collection_url())
            .query(&[("email", email)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?
            .json()
            .await
            .map_err(http_err)?;

        Ok(documents
            .into_iter()
            .find_map(|doc| doc.into_producer(None)))
    }

    async fn update_profile(
        &self,
        id: &ProducerId,
        update: ProfileUpdate,
    ) -> Result<(), StoreError> {
        let produtos: Vec<ProductDocument> = update
            .products
            .into_iter()
            .map(|p| ProductDocument {
                nome: p.name,
                foto_url: p.photo_url,
            })
            .collect();

        let response = self
            .client
            .patch(self.document_url(id.as_str()))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "nome": update.name,
                "telefone": update.phone,
                "produtos": produtos,
                "disponivel": update.available,
                "foto": update.photo,
            }))
            .send()
            .await
            .map_err(http_err)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        response.error_for_status().map_err(http_err)?;
        Ok(())
    }
}
