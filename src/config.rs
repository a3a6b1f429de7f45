use std::env;

use crate::utils::geo::BoundingBox;

pub const DEFAULT_PREDICT_URL: &str = "https://taxifare.lewagon.ai/predict";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Clone, Debug)]
pub struct Config {
    pub predict_url: String,
    pub geocoder_url: String,
    pub http_timeout_seconds: u64,
    pub service_area: BoundingBox,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            predict_url: DEFAULT_PREDICT_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            http_timeout_seconds: 10,
            service_area: BoundingBox::NYC,
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            predict_url: env::var("PREDICT_URL").unwrap_or(defaults.predict_url),
            geocoder_url: env::var("GEOCODER_URL").unwrap_or(defaults.geocoder_url),
            http_timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                .map(|v| v.parse().expect("HTTP_TIMEOUT_SECONDS must be a number"))
                .unwrap_or(defaults.http_timeout_seconds),
            service_area: env::var("SERVICE_AREA")
                .map(|v| {
                    BoundingBox::parse(&v)
                        .expect("SERVICE_AREA must be min_lon,min_lat,max_lon,max_lat")
                })
                .unwrap_or(defaults.service_area),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .map(|v| v.parse().expect("SERVER_PORT must be a number"))
                .unwrap_or(defaults.server_port),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
