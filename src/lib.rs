//! Local-producer marketplace backend
//!
//! This module exposes the service components for use in integration
//! tests and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use application::{ProducerService, Registration};
pub use config::load_config;
pub use domain::entities::{NewProducer, Producer, Product, ProfileUpdate};
pub use domain::ports::{GeocodeError, Geocoder, PhotoStore, ProducerStore, StoreError};
pub use domain::value_objects::{Coordinates, ProducerId};
