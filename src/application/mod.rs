mod producer_service;

pub use producer_service::{
    LoginError, PhotoUpload, ProducerService, ProductEntry, ProfileError, RegisterError,
    RegisteredProducer, Registration,
};
