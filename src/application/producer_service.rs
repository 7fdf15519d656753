//! Producer Service - Main application use case
//!
//! Orchestrates the registration pipeline (validate, geocode, upload
//! photos, persist) plus listing, login and the profile operations. This
//! is the primary interface for the inbound HTTP adapter.

use crate::domain::entities::{NewProducer, Producer, Product, ProfileUpdate};
use crate::domain::ports::{GeocodeError, Geocoder, PhotoStore, ProducerStore, StoreError};
use crate::domain::value_objects::{Coordinates, ProducerId};
use std::sync::Arc;
use thiserror::Error;

/// One product entry of a registration, with an optional photo upload.
#[derive(Debug, Clone)]
pub struct ProductEntry {
    pub name: String,
    pub photo: Option<PhotoUpload>,
}

impl ProductEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photo: None,
        }
    }
}

/// Raw photo bytes received with a multipart registration.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Validated registration input, as assembled by the inbound adapter.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub products: Vec<ProductEntry>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisteredProducer {
    pub id: ProducerId,
    pub coordinates: Coordinates,
}

/// Failures of the registration pipeline.
///
/// Validation failures never reach the resolver or the store; the
/// resolver split (no match vs unavailable) is preserved so the HTTP
/// layer can answer 400 for the former and 500 for the latter.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("missing required fields")]
    MissingFields,
    #[error("empty product list")]
    NoProducts,
    #[error("address not found")]
    AddressNotFound,
    #[error("geocoding service unavailable")]
    GeocoderUnavailable,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Login failures. Unknown email and wrong password are deliberately
/// indistinguishable.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Profile fetch/update failures.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("producer not found")]
    NotFound,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ProfileError::NotFound,
            other => ProfileError::Store(other),
        }
    }
}

/// Producer service - main application use case.
///
/// Holds the ports chosen once at startup; no handler ever inspects which
/// backend is behind them.
pub struct ProducerService {
    store: Arc<dyn ProducerStore>,
    geocoder: Arc<dyn Geocoder>,
    photos: Option<Arc<dyn PhotoStore>>,
}

impl ProducerService {
    pub fn new(
        store: Arc<dyn ProducerStore>,
        geocoder: Arc<dyn Geocoder>,
        photos: Option<Arc<dyn PhotoStore>>,
    ) -> Self {
        Self {
            store,
            geocoder,
            photos,
        }
    }

    /// Register a producer.
    ///
    /// Pipeline: field validation, address resolution, photo upload,
    /// record write. A record is only ever written with resolved
    /// coordinates, and nothing is written when validation or resolution
    /// fails.
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<RegisteredProducer, RegisterError> {
        let name = registration.name.trim();
        let address = registration.address.trim();
        let phone = registration.phone.trim();

        if name.is_empty() || address.is_empty() || phone.is_empty() {
            return Err(RegisterError::MissingFields);
        }
        if registration.products.is_empty() {
            return Err(RegisterError::NoProducts);
        }

        let coordinates = self.geocoder.resolve(address).await.map_err(|e| match e {
            GeocodeError::NoMatch => RegisterError::AddressNotFound,
            GeocodeError::Unavailable(reason) => {
                tracing::error!("geocoding failed for {:?}: {}", address, reason);
                RegisterError::GeocoderUnavailable
            }
        })?;

        let mut products = Vec::with_capacity(registration.products.len());
        for entry in registration.products {
            products.push(self.upload_product_photo(entry).await);
        }

        let id = self
            .store
            .create(NewProducer {
                name: name.to_string(),
                address: address.to_string(),
                phone: phone.to_string(),
                products,
                coordinates,
                email: registration.email,
                password: registration.password,
            })
            .await?;

        tracing::info!("registered producer {} at {}", id, coordinates);

        Ok(RegisteredProducer { id, coordinates })
    }

    /// List all producers for map display.
    pub async fn list(&self) -> Result<Vec<Producer>, StoreError> {
        self.store.list().await
    }

    /// Exact-match credential check.
    pub async fn login(&self, email: &str, password: &str) -> Result<Producer, LoginError> {
        let producer = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        match &producer.password {
            Some(stored) if stored == password => Ok(producer),
            _ => Err(LoginError::InvalidCredentials),
        }
    }

    /// Fetch a producer's own record.
    pub async fn get_profile(&self, id: &ProducerId) -> Result<Producer, ProfileError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Overwrite the mutable profile fields. Last writer wins.
    pub async fn update_profile(
        &self,
        id: &ProducerId,
        update: ProfileUpdate,
    ) -> Result<(), ProfileError> {
        self.store.update_profile(id, update).await?;
        tracing::info!("updated profile of producer {}", id);
        Ok(())
    }

    /// Turn a registration entry into a stored product, uploading the
    /// photo when a photo store is configured. Upload failures degrade to
    /// an empty photo URL; already-uploaded photos are not rolled back.
    async fn upload_product_photo(&self, entry: ProductEntry) -> Product {
        let Some(photo) = entry.photo else {
            return Product::named(entry.name);
        };

        let Some(photos) = &self.photos else {
            return Product::named(entry.name);
        };

        match photos.upload(&photo.filename, photo.bytes).await {
            Ok(url) => Product::with_photo(entry.name, url),
            Err(e) => {
                tracing::warn!(
                    "photo upload failed for product {:?}: {:#}",
                    entry.name,
                    e
                );
                Product::named(entry.name)
            }
        }
    }
}
