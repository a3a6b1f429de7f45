use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::RideRequest;

/// Produces a fare for a ride
#[async_trait]
pub trait FarePredictor: Send + Sync {
    async fn predict(&self, ride: &RideRequest) -> AppResult<f64>;
}

/// Calls a remote prediction API with the ride as query parameters
#[derive(Clone)]
pub struct HttpFarePredictor {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    fare: Option<f64>,
}

impl HttpFarePredictor {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build prediction client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FarePredictor for HttpFarePredictor {
    async fn predict(&self, ride: &RideRequest) -> AppResult<f64> {
        let params = ride.prediction_params();
        tracing::debug!(?params, url = %self.url, "Requesting fare prediction");

        let response = self.client.get(&self.url).query(&params).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Error calling the API. Status code: {}. Response: {}",
                status.as_u16(),
                body
            )));
        }

        let prediction: PredictionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed prediction response: {}", e)))?;

        let fare = prediction
            .fare
            .ok_or_else(|| AppError::Upstream("Prediction response has no fare".to_string()))?;

        tracing::info!(fare, "Fare predicted");
        Ok(fare)
    }
}
