pub mod geocoder;
pub mod predictor;

pub use geocoder::{Geocoder, NominatimGeocoder};
pub use predictor::{FarePredictor, HttpFarePredictor};
