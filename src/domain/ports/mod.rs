mod geocoder;
mod photo_store;
mod producer_store;

pub use geocoder::{GeocodeError, Geocoder};
pub use photo_store::PhotoStore;
pub use producer_store::{ProducerStore, StoreError};
