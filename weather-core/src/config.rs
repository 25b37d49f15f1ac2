use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::error::ConfigError;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_SPEECH_FOLDER_ID: &str = "SPEECH_API_KEY";
pub const ENV_WEATHER_LANG: &str = "WEATHER_LANG";
pub const ENV_SPEECH_LANG: &str = "SPEECH_LANG";
pub const ENV_UTC_OFFSET: &str = "DISPLAY_UTC_OFFSET_HOURS";

/// Base URLs of the remote services. Overridable so a deployment can go
/// through a proxy and tests can point at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub telegram_api: String,
    pub openweather_api: String,
    pub speechkit_stt: String,
    pub speechkit_tts: String,
    pub nominatim: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            telegram_api: "https://api.telegram.org".to_string(),
            openweather_api: "https://api.openweathermap.org".to_string(),
            speechkit_stt: "https://stt.api.cloud.yandex.net".to_string(),
            speechkit_tts: "https://tts.api.cloud.yandex.net".to_string(),
            nominatim: "https://nominatim.openstreetmap.org".to_string(),
        }
    }
}

/// Static bot configuration, read once at startup.
///
/// Example TOML:
/// ```toml
/// telegram_bot_token = "123:abc"
/// api_key = "..."
/// weather_api_key = "..."
/// speech_folder_id = "b1g..."
///
/// [endpoints]
/// nominatim = "https://nominatim.example.org"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot credential. When absent the bot acknowledges updates and does nothing else.
    pub telegram_bot_token: Option<String>,

    /// Sent as `Authorization: Api-Key <key>` to the speech services.
    pub api_key: Option<String>,

    pub weather_api_key: Option<String>,

    /// Cloud folder the synthesis requests are billed to.
    pub speech_folder_id: Option<String>,

    /// Language of weather descriptions, e.g. "ru".
    pub weather_lang: String,

    /// Language of synthesized speech, e.g. "ru-RU".
    pub speech_lang: String,

    /// Offset of the wall clock used for sunrise/sunset times.
    pub display_utc_offset_hours: i32,

    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            api_key: None,
            weather_api_key: None,
            speech_folder_id: None,
            weather_lang: "ru".to_string(),
            speech_lang: "ru-RU".to_string(),
            display_utc_offset_hours: 3,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides on top.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Load config from `path`, or return the defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields with values returned by `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_BOT_TOKEN) {
            self.telegram_bot_token = Some(v);
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = get(ENV_WEATHER_API_KEY) {
            self.weather_api_key = Some(v);
        }
        if let Some(v) = get(ENV_SPEECH_FOLDER_ID) {
            self.speech_folder_id = Some(v);
        }
        if let Some(v) = get(ENV_WEATHER_LANG) {
            self.weather_lang = v;
        }
        if let Some(v) = get(ENV_SPEECH_LANG) {
            self.speech_lang = v;
        }
        if let Some(v) = get(ENV_UTC_OFFSET) {
            self.display_utc_offset_hours = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: ENV_UTC_OFFSET, value: v.clone() })?;
        }

        let endpoints = [
            ("TELEGRAM_API_URL", &mut self.endpoints.telegram_api),
            ("OPENWEATHER_API_URL", &mut self.endpoints.openweather_api),
            ("SPEECHKIT_STT_URL", &mut self.endpoints.speechkit_stt),
            ("SPEECHKIT_TTS_URL", &mut self.endpoints.speechkit_tts),
            ("NOMINATIM_URL", &mut self.endpoints.nominatim),
        ];
        for (key, slot) in endpoints {
            if let Some(v) = get(key) {
                *slot = v.trim_end_matches('/').to_string();
            }
        }

        Ok(())
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-bot", "weather-bot")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Bot token, if the bot is enabled at all.
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram_bot_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Look up a required credential, naming the env key when it is missing.
    pub fn require<'a>(
        value: &'a Option<String>,
        key: &'static str,
    ) -> Result<&'a str, ConfigError> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing { key })
    }

    /// Wall-clock offset used for sunrise/sunset.
    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.display_utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_UTC_OFFSET,
                value: self.display_utc_offset_hours.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_production_services() {
        let cfg = Config::default();

        assert_eq!(cfg.bot_token(), None);
        assert_eq!(cfg.weather_lang, "ru");
        assert_eq!(cfg.speech_lang, "ru-RU");
        assert_eq!(cfg.display_offset().unwrap(), FixedOffset::east_opt(3 * 3600).unwrap());
        assert_eq!(cfg.endpoints.telegram_api, "https://api.telegram.org");
    }

    #[test]
    fn env_overrides_credentials_and_endpoints() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[
            (ENV_BOT_TOKEN, "123:abc"),
            (ENV_API_KEY, "speech-key"),
            (ENV_WEATHER_API_KEY, "ow-key"),
            (ENV_SPEECH_FOLDER_ID, "folder"),
            (ENV_UTC_OFFSET, "-5"),
            ("NOMINATIM_URL", "http://127.0.0.1:9000/"),
        ]))
        .unwrap();

        assert_eq!(cfg.bot_token(), Some("123:abc"));
        assert_eq!(cfg.api_key.as_deref(), Some("speech-key"));
        assert_eq!(cfg.weather_api_key.as_deref(), Some("ow-key"));
        assert_eq!(cfg.speech_folder_id.as_deref(), Some("folder"));
        assert_eq!(cfg.display_utc_offset_hours, -5);
        assert_eq!(cfg.endpoints.nominatim, "http://127.0.0.1:9000");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config {
            weather_api_key: Some("from-file".into()),
            ..Config::default()
        };
        cfg.apply_env(env(&[(ENV_WEATHER_API_KEY, "  "), (ENV_BOT_TOKEN, "")])).unwrap();

        assert_eq!(cfg.weather_api_key.as_deref(), Some("from-file"));
        assert_eq!(cfg.bot_token(), None);
    }

    #[test]
    fn invalid_offset_is_reported() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[(ENV_UTC_OFFSET, "three")])).unwrap_err();

        assert!(err.to_string().contains(ENV_UTC_OFFSET));
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let cfg = Config { display_utc_offset_hours: 30, ..Config::default() };
        assert!(cfg.display_offset().is_err());
    }

    #[test]
    fn require_names_missing_key() {
        let cfg = Config::default();
        let err = Config::require(&cfg.weather_api_key, ENV_WEATHER_API_KEY).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Missing required setting WEATHER_API_KEY"));
        assert!(msg.contains("weather-bot configure"));
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("weather-bot-does-not-exist/config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_keeps_partial_file_defaults() {
        let dir = std::env::temp_dir().join(format!("weather-bot-cfg-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "weather_api_key = \"ow\"\n[endpoints]\nnominatim = \"http://geo\"\n")
            .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.weather_api_key.as_deref(), Some("ow"));
        assert_eq!(cfg.endpoints.nominatim, "http://geo");
        assert_eq!(cfg.endpoints.telegram_api, "https://api.telegram.org");
        assert_eq!(cfg.speech_lang, "ru-RU");

        let mut updated = cfg.clone();
        updated.telegram_bot_token = Some("t".into());
        updated.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), updated);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unparseable_file_is_reported_with_path() {
        let dir = std::env::temp_dir().join(format!("weather-bot-bad-{}", std::process::id()));
        let path = dir.join("config.toml");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "weather_api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        fs::remove_dir_all(&dir).ok();
    }
}
