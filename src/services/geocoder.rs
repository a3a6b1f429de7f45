use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::utils::geo::{BoundingBox, GeoPoint};

/// Turns a free-text address into a coordinate
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when nothing inside `region` matches the address
    async fn geocode(&self, address: &str, region: &BoundingBox) -> AppResult<Option<GeoPoint>>;
}

/// Client for a Nominatim-compatible `/search` endpoint
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            // Nominatim rejects requests without an identifying agent
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build geocoding client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str, region: &BoundingBox) -> AppResult<Option<GeoPoint>> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AppError::BadRequest("Address must not be empty".to_string()));
        }

        tracing::debug!(address = %address, "Geocoding address");

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("viewbox", region.to_viewbox().as_str()),
                ("bounded", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Geocoding service returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let results: Vec<SearchResult> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed geocoding response: {}", e)))?;

        let Some(first) = results.into_iter().next() else {
            tracing::debug!(address = %address, "No geocoding match");
            return Ok(None);
        };

        let parse = |value: &str| {
            value.parse::<f64>().map_err(|_| {
                AppError::Upstream(format!("Geocoding service returned bad coordinate '{}'", value))
            })
        };

        let point = GeoPoint::new_unchecked(parse(&first.lon)?, parse(&first.lat)?);
        tracing::debug!(
            address = %address,
            longitude = point.longitude,
            latitude = point.latitude,
            "Geocoded address"
        );

        Ok(Some(point))
    }
}
