//! Fixed reply texts and the weather report template.

use chrono::{DateTime, FixedOffset};

use crate::model::CurrentWeather;

const CAPABILITIES: &str = "- Текстовое сообщение с названием населенного пункта.\n\
                            - Голосовое сообщение с названием населенного пункта.\n\
                            - Сообщение с точкой на карте.";

pub const MAX_VOICE_SECONDS: u32 = 30;

pub const VOICE_TOO_LONG: &str = "Запись должна быть не длиннее 30 секунд";

pub const UNKNOWN_LOCATION: &str = "Я не знаю какая погода в этом месте.";

/// Compass labels starting at north, clockwise.
const DIRECTIONS: [&str; 8] = ["С", "СВ", "В", "ЮВ", "Ю", "ЮЗ", "З", "СЗ"];

pub fn help_text() -> String {
    format!("Я сообщу вам о погоде в том месте, которое сообщите мне.\nЯ могу ответить на:\n{CAPABILITIES}")
}

pub fn unsupported_text() -> String {
    format!("Я не могу ответить на такой тип сообщения.\nНо могу ответить на:\n{CAPABILITIES}")
}

pub fn place_not_found(place: &str) -> String {
    format!("Я не нашел населенный пункт {place}")
}

/// Whether a candidate can be looked up at all.
pub fn is_place_name(candidate: &str) -> bool {
    !candidate.is_empty() && !candidate.starts_with('/')
}

/// Eight-point compass label for a bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let index = (degrees / 45.0).round_ties_even().rem_euclid(8.0) as usize;
    DIRECTIONS[index % DIRECTIONS.len()]
}

/// Renders reports in the configured display time zone.
#[derive(Debug, Clone, Copy)]
pub struct ReportFormatter {
    offset: FixedOffset,
}

impl ReportFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn format(&self, weather: &CurrentWeather) -> String {
        let rounded = |v: f64| v.round_ties_even() as i64;

        format!(
            "Описание погоды: {}\n\
             Температура: {}°C, ощущается как: {}°C\n\
             Атмосферное давление: {} мм рт. ст.\n\
             Влажность: {}%\n\
             Видимость: {} метров\n\
             Ветер: {} м/с {}\n\
             Восход солнца: {} МСК. Закат: {} МСК.",
            weather.description,
            rounded(weather.temperature_c),
            rounded(weather.feels_like_c),
            rounded(weather.pressure),
            rounded(weather.humidity_pct),
            rounded(weather.visibility_m),
            rounded(weather.wind_speed_mps),
            wind_direction(weather.wind_deg),
            self.clock(weather.sunrise),
            self.clock(weather.sunset),
        )
    }

    fn clock(&self, ts: i64) -> String {
        DateTime::from_timestamp(ts, 0)
            .map(|utc| utc.with_timezone(&self.offset).format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }
}
