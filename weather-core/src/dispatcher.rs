//! Routes one inbound update to the right chain of provider calls.
//!
//! Every branch ends in the same [`Acknowledgment`]: failures are logged and
//! never reach the platform, so it does not redeliver the update.

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::Config,
    error::ConfigError,
    model::{Acknowledgment, Location, MessageContent, ReplyTarget, Update, Voice, WeatherLookup},
    provider::Services,
    report::{self, ReportFormatter},
};

#[derive(Debug)]
pub struct Dispatcher {
    /// `None` when the bot has no token: updates are acknowledged and dropped.
    services: Option<Services>,
    formatter: ReportFormatter,
}

impl Dispatcher {
    pub fn new(services: Option<Services>, formatter: ReportFormatter) -> Self {
        Self { services, formatter }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let formatter = ReportFormatter::new(config.display_offset()?);
        let services = Services::from_config(config);

        if services.is_none() {
            warn!("No bot token configured; updates will be acknowledged and ignored");
        }

        Ok(Self::new(services, formatter))
    }

    pub fn is_enabled(&self) -> bool {
        self.services.is_some()
    }

    #[instrument(skip_all, fields(update_id = ?update.update_id))]
    pub async fn handle(&self, update: Update) -> Acknowledgment {
        let Some(services) = &self.services else {
            return Acknowledgment::OK;
        };

        let Some(message) = update.message else {
            debug!("Update carries no message");
            return Acknowledgment::OK;
        };

        let chain = Chain {
            services,
            formatter: &self.formatter,
            target: message.reply_target(),
        };

        if let Err(err) = chain.route(message.content).await {
            error!(error = ?err, chat_id = chain.target.chat_id, "Update handling stopped");
        }

        Acknowledgment::OK
    }
}

/// Per-update view over the shared services.
struct Chain<'a> {
    services: &'a Services,
    formatter: &'a ReportFormatter,
    target: ReplyTarget,
}

impl Chain<'_> {
    async fn route(&self, content: MessageContent) -> Result<()> {
        match content {
            MessageContent::Text(text) => self.on_text(&text).await,
            MessageContent::Voice(voice) => self.on_voice(&voice).await,
            MessageContent::Location(location) => self.on_location(location).await,
            MessageContent::Unsupported => self.reply(&report::unsupported_text()).await,
        }
    }

    async fn on_text(&self, text: &str) -> Result<()> {
        match text {
            "/start" | "/help" => self.reply(&report::help_text()).await,
            command if command.starts_with('/') => {
                debug!(command, "Ignoring unknown command");
                Ok(())
            }
            place => match self.weather_report(place).await? {
                Some(report) => self.reply(&report).await,
                None => Ok(()),
            },
        }
    }

    async fn on_voice(&self, voice: &Voice) -> Result<()> {
        if voice.duration > report::MAX_VOICE_SECONDS {
            info!(duration = voice.duration, "Voice message too long");
            return self.reply(report::VOICE_TOO_LONG).await;
        }

        let messenger = &self.services.messenger;
        let file_path = messenger.get_file(&voice.file_id).await?;
        let audio = messenger.download_file(&file_path).await?;

        let Some(transcript) = self
            .services
            .speech
            .recognize(audio)
            .await
            .context("Speech recognition failed")?
            .filter(|t| !t.is_empty())
        else {
            debug!("Nothing recognized in voice message");
            return Ok(());
        };

        let Some(report) = self.weather_report(transcript.trim()).await? else {
            return Ok(());
        };
        self.reply(&report).await?;

        match self
            .services
            .speech
            .synthesize(&report)
            .await
            .context("Speech synthesis failed")?
        {
            Some(audio) => messenger.send_voice(self.target, audio).await,
            None => {
                debug!("Speech synthesis produced no audio");
                Ok(())
            }
        }
    }

    async fn on_location(&self, location: Location) -> Result<()> {
        let city = self
            .services
            .geocoder
            .reverse(location.latitude, location.longitude)
            .await
            .context("Reverse geocoding failed")?;

        match city {
            Some(city) => match self.weather_report(&city).await? {
                Some(report) => self.reply(&report).await,
                None => Ok(()),
            },
            None => self.reply(report::UNKNOWN_LOCATION).await,
        }
    }

    /// `None` when the candidate is not a place name at all.
    async fn weather_report(&self, place: &str) -> Result<Option<String>> {
        if !report::is_place_name(place) {
            return Ok(None);
        }

        let lookup = self
            .services
            .weather
            .current_weather(place)
            .await
            .with_context(|| format!("Weather lookup for '{place}' failed"))?;

        Ok(Some(match lookup {
            WeatherLookup::Found(weather) => self.formatter.format(&weather),
            WeatherLookup::NotFound => report::place_not_found(place),
        }))
    }

    async fn reply(&self, text: &str) -> Result<()> {
        self.services.messenger.send_message(self.target, text).await
    }
}
