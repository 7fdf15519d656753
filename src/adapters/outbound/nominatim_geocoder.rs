//! Nominatim Geocoder
//!
//! Implements Geocoder against the Nominatim search API. A fixed country
//! qualifier is appended to every query, requests are bounded by a
//! timeout, and a throttle delay is awaited before each call to respect
//! the provider's usage policy.

use crate::domain::ports::{GeocodeError, Geocoder};
use crate::domain::value_objects::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// One match from the Nominatim search endpoint. Coordinates arrive as
/// JSON strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim-backed address resolver.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country: String,
    throttle: Duration,
}

impl NominatimGeocoder {
    /// `base_url` is the API root (overridable so tests can point at a
    /// local mock server); `country` the fixed qualifier appended to each
    /// address; `timeout` bounds the lookup; `throttle` is awaited before
    /// each call and may be zero.
    pub fn new(
        base_url: impl Into<String>,
        country: impl Into<String>,
        timeout: Duration,
        throttle: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            country: country.into(),
            throttle,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        // Usage-policy throttle, applied per request.
        tokio::time::sleep(self.throttle).await;

        let query = format!("{}, {}", address.trim(), self.country);
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Unavailable(format!(
                "provider answered {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Unavailable(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Err(GeocodeError::NoMatch);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodeError::Unavailable(format!("malformed latitude {:?}", place.lat)))?;
        let longitude: f64 = place.lon.parse().map_err(|_| {
            GeocodeError::Unavailable(format!("malformed longitude {:?}", place.lon))
        })?;

        tracing::debug!("resolved {:?} to ({}, {})", address, latitude, longitude);
        Ok(Coordinates::new(latitude, longitude))
    }
}
