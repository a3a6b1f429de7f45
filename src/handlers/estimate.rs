use axum::{extract::State, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::models::{EstimateForm, LocationInput, MapView, RideRequest};
use crate::utils::geo::{self, DistanceResult, EmissionsEstimate, GeoPoint};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub pickup_datetime: String,
    pub passenger_count: u8,
    pub distance: DistanceResult,
    pub emissions: EmissionsEstimate,
    pub fare: f64,
    pub map: MapView,
}

#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub pickup: LocationInput,
    pub dropoff: LocationInput,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub distance: DistanceResult,
    pub emissions: EmissionsEstimate,
    pub map: MapView,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

/// Resolve a location from the form into a point, geocoding addresses within the service area
async fn resolve_location(state: &AppState, input: &LocationInput, label: &str) -> AppResult<GeoPoint> {
    match input {
        LocationInput::Coordinates { longitude, latitude } => {
            let point = GeoPoint::new(*longitude, *latitude)?;
            if !state.config.service_area.contains(point) {
                tracing::warn!(
                    longitude = point.longitude,
                    latitude = point.latitude,
                    "{} is outside the service area",
                    label
                );
            }
            Ok(point)
        }
        LocationInput::Address { address } => state
            .geocoder
            .geocode(address, &state.config.service_area)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Could not find {} address '{}'", label, address))),
    }
}

async fn resolve_route(
    state: &AppState,
    pickup: &LocationInput,
    dropoff: &LocationInput,
) -> AppResult<(GeoPoint, GeoPoint)> {
    tokio::try_join!(
        resolve_location(state, pickup, "pickup"),
        resolve_location(state, dropoff, "dropoff"),
    )
}

/// Resolve the ride, compute its distance and emissions, and ask the prediction API for a fare
pub async fn estimate(
    State(state): State<AppState>,
    AppJson(form): AppJson<EstimateForm>,
) -> AppResult<Json<EstimateResponse>> {
    let pickup_datetime = form.pickup_datetime(Local::now().date_naive())?;
    let (pickup, dropoff) = resolve_route(&state, &form.pickup, &form.dropoff).await?;
    let ride = RideRequest::new(
        pickup,
        dropoff,
        pickup_datetime,
        form.passenger_count.unwrap_or(1),
    )?;

    let distance = ride.distance();
    let emissions = geo::emissions(distance.kilometers);
    let fare = state.predictor.predict(&ride).await?;

    tracing::info!(
        kilometers = distance.kilometers,
        passengers = ride.passenger_count,
        fare,
        "Estimated ride"
    );

    Ok(Json(EstimateResponse {
        pickup_datetime: ride.formatted_pickup_datetime(),
        passenger_count: ride.passenger_count,
        distance,
        emissions,
        fare,
        map: MapView::new(pickup, dropoff),
    }))
}

/// Distance and emissions only, without calling the prediction API
pub async fn metrics(
    State(state): State<AppState>,
    AppJson(payload): AppJson<MetricsRequest>,
) -> AppResult<Json<MetricsResponse>> {
    let (pickup, dropoff) = resolve_route(&state, &payload.pickup, &payload.dropoff).await?;
    let distance = geo::distance(pickup, dropoff);

    Ok(Json(MetricsResponse {
        distance,
        emissions: geo::emissions(distance.kilometers),
        map: MapView::new(pickup, dropoff),
    }))
}

/// Look up a single address
pub async fn geocode(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<GeocodeQuery>,
) -> AppResult<Json<GeoPoint>> {
    let location = LocationInput::Address {
        address: query.address,
    };
    resolve_location(&state, &location, "requested").await.map(Json)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
