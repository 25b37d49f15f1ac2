//! Core library for the weather chat bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The inbound update model and the fixed acknowledgment
//! - Abstractions over the remote services (messaging, weather, speech, geocoding)
//! - Report formatting and the update dispatcher
//!
//! It is used by `weather-bot`, which exposes it as a webhook server and a one-shot handler.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, DecodeError};
pub use model::{Acknowledgment, Message, MessageContent, ReplyTarget, Update};
pub use provider::{Geocoder, Messenger, Services, SpeechProvider, WeatherProvider};
pub use report::ReportFormatter;
