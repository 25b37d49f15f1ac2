//! Reverse geocoding through Nominatim (OpenStreetMap).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client};
use serde::Deserialize;
use tracing::debug;

use super::Geocoder;

const AGENT: &str = concat!("weather-bot/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            url: format!("{}/reverse", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let res = self
            .http
            .get(&self.url)
            .header(USER_AGENT, AGENT)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .await
            .context("Failed to send reverse geocode request to Nominatim")?;

        let status = res.status();
        if !status.is_success() {
            debug!(%status, "Reverse geocode returned non-success status");
            return Ok(None);
        }

        let body: NominatimResponse =
            res.json().await.context("Failed to parse Nominatim reverse JSON")?;

        // Only a proper city counts; towns and villages are not looked up.
        let city = body.address.and_then(|a| a.city).filter(|c| !c.is_empty());
        debug!(latitude, longitude, ?city, "Reverse geocoded");
        Ok(city)
    }
}
