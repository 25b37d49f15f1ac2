//! Fakes shared by the binary's tests.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use weather_core::{
    model::WeatherLookup, Config, Dispatcher, Geocoder, Messenger, ReplyTarget, ReportFormatter,
    Services, SpeechProvider, WeatherProvider,
};

pub type Sent = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
struct RecordingMessenger(Sent);

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, _target: ReplyTarget, text: &str) -> Result<()> {
        self.0.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_voice(&self, _target: ReplyTarget, _audio: Vec<u8>) -> Result<()> {
        Ok(())
    }

    async fn get_file(&self, _file_id: &str) -> Result<String> {
        Err(anyhow!("offline"))
    }

    async fn download_file(&self, _file_path: &str) -> Result<Vec<u8>> {
        Err(anyhow!("offline"))
    }
}

#[derive(Debug)]
struct Offline;

#[async_trait]
impl WeatherProvider for Offline {
    async fn current_weather(&self, _place: &str) -> Result<WeatherLookup> {
        Ok(WeatherLookup::NotFound)
    }
}

#[async_trait]
impl SpeechProvider for Offline {
    async fn recognize(&self, _audio: Vec<u8>) -> Result<Option<String>> {
        Ok(None)
    }

    async fn synthesize(&self, _text: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

#[async_trait]
impl Geocoder for Offline {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Dispatcher whose text replies land in the returned log.
pub fn recording_dispatcher() -> (Dispatcher, Sent) {
    let sent = Sent::default();
    let services = Services {
        messenger: Box::new(RecordingMessenger(sent.clone())),
        weather: Box::new(Offline),
        speech: Box::new(Offline),
        geocoder: Box::new(Offline),
    };
    let offset = Config::default().display_offset().unwrap();
    (Dispatcher::new(Some(services), ReportFormatter::new(offset)), sent)
}

pub fn update_json(text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": 100,
        "message": {"message_id": 1, "chat": {"id": 2, "type": "private"}, "text": text}
    })
}
