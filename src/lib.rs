pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use services::{FarePredictor, Geocoder, HttpFarePredictor, NominatimGeocoder};

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub geocoder: Arc<dyn Geocoder>,
    pub predictor: Arc<dyn FarePredictor>,
}

impl AppState {
    /// Wire up the HTTP-backed geocoder and fare predictor from configuration
    pub fn from_config(config: Config) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.http_timeout_seconds);
        let geocoder = NominatimGeocoder::new(config.geocoder_url.clone(), timeout)?;
        let predictor = HttpFarePredictor::new(config.predict_url.clone(), timeout)?;

        Ok(Self {
            config,
            geocoder: Arc::new(geocoder),
            predictor: Arc::new(predictor),
        })
    }
}
