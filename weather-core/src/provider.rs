use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use tracing::warn;

use crate::{
    config::{self, Config},
    model::{ReplyTarget, WeatherLookup},
    provider::{
        nominatim::NominatimGeocoder, openweather::OpenWeatherProvider,
        speechkit::SpeechKitProvider, telegram::TelegramGateway,
    },
};

pub mod nominatim;
pub mod openweather;
pub mod speechkit;
pub mod telegram;

/// Messaging gateway the updates come from and replies go to.
#[async_trait]
pub trait Messenger: Send + Sync + Debug {
    async fn send_message(&self, target: ReplyTarget, text: &str) -> anyhow::Result<()>;

    async fn send_voice(&self, target: ReplyTarget, audio: Vec<u8>) -> anyhow::Result<()>;

    /// Resolve a file id to its storage path.
    async fn get_file(&self, file_id: &str) -> anyhow::Result<String>;

    async fn download_file(&self, file_path: &str) -> anyhow::Result<Vec<u8>>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, place: &str) -> anyhow::Result<WeatherLookup>;
}

/// Speech-to-text and text-to-speech. `None` means the service declined.
#[async_trait]
pub trait SpeechProvider: Send + Sync + Debug {
    async fn recognize(&self, audio: Vec<u8>) -> anyhow::Result<Option<String>>;

    async fn synthesize(&self, text: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// City containing the coordinates, if the service knows one.
    async fn reverse(&self, latitude: f64, longitude: f64) -> anyhow::Result<Option<String>>;
}

/// Every remote collaborator the dispatcher talks to.
#[derive(Debug)]
pub struct Services {
    pub messenger: Box<dyn Messenger>,
    pub weather: Box<dyn WeatherProvider>,
    pub speech: Box<dyn SpeechProvider>,
    pub geocoder: Box<dyn Geocoder>,
}

impl Services {
    /// Build the production clients. Returns `None` when no bot token is configured.
    ///
    /// Missing provider keys only produce a warning: commands and fixed replies
    /// still work, and the calls that need the key fail when they are made.
    pub fn from_config(config: &Config) -> Option<Self> {
        let token = config.bot_token()?;

        let api_key = credential(&config.api_key, config::ENV_API_KEY);
        let weather_key = credential(&config.weather_api_key, config::ENV_WEATHER_API_KEY);
        let folder_id = credential(&config.speech_folder_id, config::ENV_SPEECH_FOLDER_ID);

        let http = Client::new();
        let endpoints = &config.endpoints;

        Some(Self {
            messenger: Box::new(TelegramGateway::new(
                http.clone(),
                &endpoints.telegram_api,
                token,
            )),
            weather: Box::new(
                OpenWeatherProvider::new(weather_key.to_owned())
                    .with_http(http.clone())
                    .with_base_url(&endpoints.openweather_api)
                    .with_lang(&config.weather_lang),
            ),
            speech: Box::new(SpeechKitProvider::new(
                http.clone(),
                api_key,
                folder_id,
                &config.speech_lang,
                &endpoints.speechkit_stt,
                &endpoints.speechkit_tts,
            )),
            geocoder: Box::new(NominatimGeocoder::new(http, &endpoints.nominatim)),
        })
    }
}

fn credential<'a>(value: &'a Option<String>, key: &'static str) -> &'a str {
    Config::require(value, key).unwrap_or_else(|err| {
        warn!(%key, error = %err, "Credential not configured");
        ""
    })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        Config {
            telegram_bot_token: Some("123:abc".into()),
            api_key: Some("key".into()),
            weather_api_key: Some("ow".into()),
            speech_folder_id: Some("folder".into()),
            ..Config::default()
        }
    }

    #[test]
    fn no_services_without_bot_token() {
        let cfg = Config { telegram_bot_token: None, ..configured() };
        assert!(Services::from_config(&cfg).is_none());
    }

    #[test]
    fn missing_provider_keys_still_build_services() {
        let cfg = Config {
            api_key: None,
            weather_api_key: None,
            speech_folder_id: Some(String::new()),
            ..configured()
        };
        assert!(Services::from_config(&cfg).is_some());
    }

    #[test]
    fn services_from_config_works_when_configured() {
        assert!(Services::from_config(&configured()).is_some());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "ж".repeat(300);
        let cut = truncate_body(&long);
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
