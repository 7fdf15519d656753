//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees.
///
/// Produced exclusively by a successful address resolution; a producer
/// record is never persisted without one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Backend-assigned opaque producer identifier.
///
/// The SQLite store renders its auto-increment rowid as a decimal string;
/// the document store uses a generated UUID key. Assigned at creation and
/// never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProducerId(String);

impl ProducerId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build an identifier from a SQLite rowid.
    pub fn from_rowid(rowid: i64) -> Self {
        Self(rowid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the identifier back into a rowid, if it is one.
    pub fn as_rowid(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for ProducerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
