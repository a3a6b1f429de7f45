use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::utils::geo::{self, BoundingBox, DistanceResult, EmissionsEstimate, GeoPoint};

pub const MIN_PASSENGERS: i32 = 1;
pub const MAX_PASSENGERS: i32 = 8;
pub const PICKUP_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where a ride starts or ends, either typed in directly or as an address to geocode
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Coordinates { longitude: f64, latitude: f64 },
    Address { address: String },
}

/// Body of `POST /api/estimate`
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateForm {
    /// `YYYY-MM-DD`, today when omitted
    pub date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`, noon when omitted
    pub time: Option<String>,
    pub pickup: LocationInput,
    pub dropoff: LocationInput,
    pub passenger_count: Option<i32>,
}

impl EstimateForm {
    pub fn pickup_datetime(&self, today: NaiveDate) -> AppResult<NaiveDateTime> {
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))?,
        };

        let time = match self.time.as_deref().map(str::trim) {
            None | Some("") => NaiveTime::from_hms_opt(12, 0, 0)
                .ok_or_else(|| AppError::Internal("Invalid default pickup time".to_string()))?,
            Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                .map_err(|_| AppError::BadRequest(format!("Invalid time '{}', expected HH:MM", raw)))?,
        };

        Ok(date.and_time(time))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RideRequest {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub pickup_datetime: NaiveDateTime,
    pub passenger_count: u8,
}

/// Query parameters understood by the fare prediction API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionParams {
    pub pickup_datetime: String,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub passenger_count: u8,
}

impl RideRequest {
    pub fn new(
        pickup: GeoPoint,
        dropoff: GeoPoint,
        pickup_datetime: NaiveDateTime,
        passenger_count: i32,
    ) -> AppResult<Self> {
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passenger_count) {
            return Err(AppError::BadRequest(format!(
                "Passenger count must be between {} and {}, got {}",
                MIN_PASSENGERS, MAX_PASSENGERS, passenger_count
            )));
        }

        Ok(Self {
            pickup,
            dropoff,
            pickup_datetime,
            passenger_count: passenger_count as u8,
        })
    }

    pub fn formatted_pickup_datetime(&self) -> String {
        self.pickup_datetime.format(PICKUP_DATETIME_FORMAT).to_string()
    }

    pub fn prediction_params(&self) -> PredictionParams {
        PredictionParams {
            pickup_datetime: self.formatted_pickup_datetime(),
            pickup_longitude: self.pickup.longitude,
            pickup_latitude: self.pickup.latitude,
            dropoff_longitude: self.dropoff.longitude,
            dropoff_latitude: self.dropoff.latitude,
            passenger_count: self.passenger_count,
        }
    }

    pub fn distance(&self) -> DistanceResult {
        geo::distance(self.pickup, self.dropoff)
    }

    pub fn emissions(&self) -> EmissionsEstimate {
        geo::emissions(self.distance().kilometers)
    }
}

/// What the page needs to frame the ride on its map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub center: GeoPoint,
    pub bounds: BoundingBox,
}

impl MapView {
    pub fn new(pickup: GeoPoint, dropoff: GeoPoint) -> Self {
        Self {
            pickup,
            dropoff,
            center: GeoPoint::new_unchecked(
                (pickup.longitude + dropoff.longitude) / 2.0,
                (pickup.latitude + dropoff.latitude) / 2.0,
            ),
            bounds: BoundingBox::around(pickup, dropoff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(12, 0, 0).unwrap()
    }

    fn manhattan_ride(passenger_count: i32) -> AppResult<RideRequest> {
        RideRequest::new(
            GeoPoint::new_unchecked(-73.987822, 40.730006),
            GeoPoint::new_unchecked(-73.966388, 40.780006),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(9, 7, 3).unwrap(),
            passenger_count,
        )
    }

    #[test]
    fn test_passenger_count_bounds() {
        assert!(manhattan_ride(1).is_ok());
        assert!(manhattan_ride(8).is_ok());
        assert!(matches!(manhattan_ride(0), Err(AppError::BadRequest(_))));
        assert!(matches!(manhattan_ride(9), Err(AppError::BadRequest(_))));
        assert!(matches!(manhattan_ride(-1), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_prediction_params() {
        let params = manhattan_ride(2).unwrap().prediction_params();
        assert_eq!(params.pickup_datetime, "2024-03-05 09:07:03");
        assert_eq!(params.pickup_longitude, -73.987822);
        assert_eq!(params.pickup_latitude, 40.730006);
        assert_eq!(params.dropoff_longitude, -73.966388);
        assert_eq!(params.dropoff_latitude, 40.780006);
        assert_eq!(params.passenger_count, 2);
    }

    #[test]
    fn test_ride_metrics_delegate_to_geo() {
        let ride = manhattan_ride(1).unwrap();
        let distance = ride.distance();
        assert_eq!(distance, geo::distance(ride.pickup, ride.dropoff));
        assert_eq!(ride.emissions(), geo::emissions(distance.kilometers));
    }

    #[test]
    fn test_form_defaults() {
        let form: EstimateForm = serde_json::from_value(serde_json::json!({
            "pickup": { "longitude": -73.987822, "latitude": 40.730006 },
            "dropoff": { "address": "Central Park" }
        }))
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(form.pickup_datetime(today).unwrap(), noon(today));
        assert_eq!(form.passenger_count, None);
        assert_eq!(
            form.pickup,
            LocationInput::Coordinates { longitude: -73.987822, latitude: 40.730006 }
        );
        assert_eq!(
            form.dropoff,
            LocationInput::Address { address: "Central Park".to_string() }
        );
    }

    #[test]
    fn test_form_date_and_time() {
        let mut form = EstimateForm {
            date: Some("2024-12-31".to_string()),
            time: Some("23:45".to_string()),
            pickup: LocationInput::Coordinates { longitude: 0.0, latitude: 0.0 },
            dropoff: LocationInput::Coordinates { longitude: 0.0, latitude: 0.0 },
            passenger_count: Some(1),
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let dt = form.pickup_datetime(today).unwrap();
        assert_eq!(dt.format(PICKUP_DATETIME_FORMAT).to_string(), "2024-12-31 23:45:00");

        form.time = Some("06:05:09".to_string());
        let dt = form.pickup_datetime(today).unwrap();
        assert_eq!(dt.format(PICKUP_DATETIME_FORMAT).to_string(), "2024-12-31 06:05:09");

        form.date = Some("31/12/2024".to_string());
        assert!(matches!(form.pickup_datetime(today), Err(AppError::BadRequest(_))));

        form.date = None;
        form.time = Some("25:00".to_string());
        assert!(matches!(form.pickup_datetime(today), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_map_view() {
        let a = GeoPoint::new_unchecked(-74.0, 40.7);
        let b = GeoPoint::new_unchecked(-73.9, 40.8);
        let view = MapView::new(a, b);

        assert!((view.center.longitude - -73.95).abs() < 1e-9);
        assert!((view.center.latitude - 40.75).abs() < 1e-9);
        assert!(view.bounds.contains(a) && view.bounds.contains(b));
    }
}
