use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const MILES_PER_KM: f64 = 0.621371;
/// Placeholder emission factor, not a calibrated vehicle model
pub const KG_CO2_PER_KM: f64 = 0.15;

/// A decimal-degree longitude/latitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Build a point from user input, rejecting anything that is not a real coordinate
    pub fn new(longitude: f64, latitude: f64) -> AppResult<Self> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::BadRequest(format!(
                "Longitude must be between -180 and 180, got {}",
                longitude
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::BadRequest(format!(
                "Latitude must be between -90 and 90, got {}",
                latitude
            )));
        }

        Ok(Self::new_unchecked(longitude, latitude))
    }

    pub const fn new_unchecked(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceResult {
    pub kilometers: f64,
    pub miles: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionsEstimate {
    pub kilograms_co2: f64,
}

/// Calculate the great-circle distance between two points using the Haversine formula
pub fn distance(a: GeoPoint, b: GeoPoint) -> DistanceResult {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let delta_lat = lat_b - lat_a;
    let delta_lon = b.longitude.to_radians() - a.longitude.to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    let kilometers = EARTH_RADIUS_KM * central_angle;

    DistanceResult {
        kilometers,
        miles: kilometers * MILES_PER_KM,
    }
}

/// Mock CO2 estimate, linear in the distance travelled
pub fn emissions(kilometers: f64) -> EmissionsEstimate {
    EmissionsEstimate {
        kilograms_co2: kilometers * KG_CO2_PER_KM,
    }
}

/// Rectangular service area in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
}

impl BoundingBox {
    pub const NYC: BoundingBox = BoundingBox {
        min_longitude: -74.3,
        min_latitude: 40.5,
        max_longitude: -73.7,
        max_latitude: 40.9,
    };

    /// Smallest box containing both points
    pub fn around(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            min_longitude: a.longitude.min(b.longitude),
            min_latitude: a.latitude.min(b.latitude),
            max_longitude: a.longitude.max(b.longitude),
            max_latitude: a.latitude.max(b.latitude),
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_longitude..=self.max_longitude).contains(&point.longitude)
            && (self.min_latitude..=self.max_latitude).contains(&point.latitude)
    }

    /// Parse `min_lon,min_lat,max_lon,max_lat`
    pub fn parse(value: &str) -> AppResult<Self> {
        let parts = value
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::BadRequest(format!("Invalid bounding box '{}': {}", value, e)))?;

        let &[min_longitude, min_latitude, max_longitude, max_latitude] = parts.as_slice() else {
            return Err(AppError::BadRequest(format!(
                "Bounding box needs 4 values, got {}",
                parts.len()
            )));
        };

        if min_longitude > max_longitude || min_latitude > max_latitude {
            return Err(AppError::BadRequest(format!(
                "Bounding box '{}' has min greater than max",
                value
            )));
        }

        Ok(Self {
            min_longitude,
            min_latitude,
            max_longitude,
            max_latitude,
        })
    }

    /// Nominatim `viewbox` order: left, top, right, bottom
    pub fn to_viewbox(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_longitude, self.max_latitude, self.max_longitude, self.min_latitude
        )
    }
}
