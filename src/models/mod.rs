pub mod ride;

pub use ride::{EstimateForm, LocationInput, MapView, PredictionParams, RideRequest};
