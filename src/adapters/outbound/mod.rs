mod http_document_store;
mod http_photo_store;
mod nominatim_geocoder;
mod sqlite_producer_store;

pub use http_document_store::{DocumentStoreCredentials, HttpDocumentStore};
pub use http_photo_store::HttpPhotoStore;
pub use nominatim_geocoder::NominatimGeocoder;
pub use sqlite_producer_store::SqliteProducerStore;
