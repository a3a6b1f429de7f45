use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use taxi_fare_estimator::{
    models::RideRequest,
    services::{FarePredictor, Geocoder, HttpFarePredictor, NominatimGeocoder},
    utils::geo::{BoundingBox, GeoPoint},
    AppError,
};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Serve `router` on an ephemeral local port and return its base URL
async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn ride() -> RideRequest {
    RideRequest::new(
        GeoPoint::new_unchecked(-73.987822, 40.730006),
        GeoPoint::new_unchecked(-73.966388, 40.780006),
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(9, 7, 3).unwrap(),
        2,
    )
    .unwrap()
}

async fn predict_ok(State(seen): State<Seen>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    seen.lock().unwrap().push(params);
    Json(json!({ "fare": 14.27 }))
}

#[tokio::test]
async fn test_predictor_sends_ride_parameters() {
    let seen = Seen::default();
    let base = spawn_stub(
        Router::new()
            .route("/predict", get(predict_ok))
            .with_state(seen.clone()),
    )
    .await;

    let predictor = HttpFarePredictor::new(format!("{}/predict", base), TIMEOUT).unwrap();
    let fare = predictor.predict(&ride()).await.unwrap();
    assert_eq!(fare, 14.27);

    let seen = seen.lock().unwrap();
    let params = &seen[0];
    assert_eq!(params["pickup_datetime"], "2024-03-05 09:07:03");
    assert_eq!(params["passenger_count"], "2");
    assert_eq!(params["pickup_longitude"].parse::<f64>().unwrap(), -73.987822);
    assert_eq!(params["pickup_latitude"].parse::<f64>().unwrap(), 40.730006);
    assert_eq!(params["dropoff_longitude"].parse::<f64>().unwrap(), -73.966388);
    assert_eq!(params["dropoff_latitude"].parse::<f64>().unwrap(), 40.780006);
}

#[tokio::test]
async fn test_predictor_reports_error_status() {
    let base = spawn_stub(Router::new().route(
        "/predict",
        get(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad passenger_count") }),
    ))
    .await;

    let predictor = HttpFarePredictor::new(format!("{}/predict", base), TIMEOUT).unwrap();
    let err = predictor.predict(&ride()).await.unwrap_err();

    let message = match err {
        AppError::Upstream(message) => message,
        other => panic!("expected upstream error, got {:?}", other),
    };
    assert!(message.contains("422"), "{}", message);
    assert!(message.contains("bad passenger_count"), "{}", message);
}

#[tokio::test]
async fn test_predictor_requires_fare() {
    let base = spawn_stub(Router::new().route(
        "/predict",
        get(|| async { Json(json!({ "prediction": 10.0 })) }),
    ))
    .await;

    let predictor = HttpFarePredictor::new(format!("{}/predict", base), TIMEOUT).unwrap();
    assert!(matches!(
        predictor.predict(&ride()).await,
        Err(AppError::Upstream(_))
    ));
}

#[tokio::test]
async fn test_predictor_unreachable() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let predictor = HttpFarePredictor::new(format!("http://{}/predict", addr), TIMEOUT).unwrap();
    assert!(matches!(
        predictor.predict(&ride()).await,
        Err(AppError::Upstream(_))
    ));
}

async fn search(State(seen): State<Seen>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let found = params.get("q").map(String::as_str) == Some("Times Square");
    seen.lock().unwrap().push(params);

    if found {
        Json(json!([{ "lat": "40.7579", "lon": "-73.9855", "display_name": "Times Square" }]))
    } else {
        Json(json!([]))
    }
}

#[tokio::test]
async fn test_geocoder_finds_address_within_region() {
    let seen = Seen::default();
    let base = spawn_stub(
        Router::new()
            .route("/search", get(search))
            .with_state(seen.clone()),
    )
    .await;

    let geocoder = NominatimGeocoder::new(base, TIMEOUT).unwrap();
    let point = geocoder
        .geocode("  Times Square ", &BoundingBox::NYC)
        .await
        .unwrap();
    assert_eq!(point, Some(GeoPoint::new_unchecked(-73.9855, 40.7579)));

    let missing = geocoder.geocode("Atlantis", &BoundingBox::NYC).await.unwrap();
    assert_eq!(missing, None);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0]["q"], "Times Square");
    assert_eq!(seen[0]["format"], "json");
    assert_eq!(seen[0]["viewbox"], "-74.3,40.9,-73.7,40.5");
    assert_eq!(seen[0]["bounded"], "1");
}

#[tokio::test]
async fn test_geocoder_rejects_blank_address() {
    let geocoder = NominatimGeocoder::new("http://127.0.0.1:9", TIMEOUT).unwrap();
    assert!(matches!(
        geocoder.geocode("   ", &BoundingBox::NYC).await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_geocoder_reports_error_status() {
    let base = spawn_stub(Router::new().route(
        "/search",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
    ))
    .await;

    let geocoder = NominatimGeocoder::new(format!("{}/", base), TIMEOUT).unwrap();
    let err = geocoder.geocode("Times Square", &BoundingBox::NYC).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(ref m) if m.contains("503")), "{:?}", err);
}
