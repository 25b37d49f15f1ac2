use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::model::{CurrentWeather, WeatherLookup};

use super::{truncate_body, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    lang: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openweathermap.org".to_string(),
            lang: "ru".to_string(),
            http: Client::new(),
        }
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    async fn fetch_current(&self, place: &str) -> Result<WeatherLookup> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", place),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), place, "OpenWeather has no weather for place");
            return Ok(WeatherLookup::NotFound);
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| anyhow!("OpenWeather current response contained no weather conditions"))?;

        Ok(WeatherLookup::Found(CurrentWeather {
            description,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            pressure: parsed.main.pressure,
            humidity_pct: parsed.main.humidity,
            visibility_m: parsed.visibility,
            wind_speed_mps: parsed.wind.speed,
            wind_deg: parsed.wind.deg,
            sunrise: parsed.sys.sunrise,
            sunset: parsed.sys.sunset,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    visibility: f64,
    wind: OwWind,
    sys: OwSys,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, place: &str) -> Result<WeatherLookup> {
        self.fetch_current(place).await
    }
}
