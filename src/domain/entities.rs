//! Domain Entities - Core business objects
//!
//! The producer is the sole business entity: a seller of local goods shown
//! as a marker on the map. Entities here have no knowledge of how they are
//! stored or transported.

use crate::domain::value_objects::{Coordinates, ProducerId};

/// A product offered by a producer.
///
/// The photo URL is empty when no photo exists for the product. The
/// row-oriented store cannot keep photos at all, so records read from it
/// always carry empty photo URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product name as entered by the producer
    pub name: String,
    /// Public URL of the product photo, or empty
    pub photo_url: String,
}

impl Product {
    /// A product with no photo.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photo_url: String::new(),
        }
    }

    pub fn with_photo(name: impl Into<String>, photo_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photo_url: photo_url.into(),
        }
    }
}

/// A registered local producer.
///
/// Created only after validation and address resolution both succeed;
/// the coordinates are therefore always present. Product ordering is
/// preserved end-to-end: display order equals input order.
#[derive(Debug, Clone)]
pub struct Producer {
    /// Backend-assigned identifier, never reassigned
    pub id: ProducerId,
    /// Producer name
    pub name: String,
    /// Postal address, also the geocoding input
    pub address: String,
    /// Contact phone number
    pub phone: String,
    /// Ordered list of offered products
    pub products: Vec<Product>,
    /// Resolved map position
    pub coordinates: Coordinates,
    /// Login email, if the producer registered credentials
    pub email: Option<String>,
    /// Plaintext login password, if registered
    pub password: Option<String>,
    /// Whether the producer is currently selling
    pub available: bool,
    /// Profile photo (base64 or URL), stored opaquely
    pub photo: Option<String>,
}

/// Payload for creating a producer record.
///
/// Assembled by the registration pipeline once validation and geocoding
/// have succeeded; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewProducer {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub products: Vec<Product>,
    pub coordinates: Coordinates,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Mutable subset of a producer record.
///
/// Profile updates overwrite these fields wholesale; there is no merge
/// and no concurrency control, the last writer wins.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub products: Vec<Product>,
    pub available: bool,
    pub photo: Option<String>,
}
