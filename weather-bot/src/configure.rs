use std::path::Path;

use anyhow::Context;
use inquire::{Password, PasswordDisplayMode, Text};
use weather_core::Config;

/// Prompt for every credential, keeping the stored value when the answer is empty.
pub fn run(path: &Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;

    prompt_secret("Telegram bot token:", &mut config.telegram_bot_token)?;
    prompt_secret("SpeechKit API key:", &mut config.api_key)?;
    prompt_secret("OpenWeather API key:", &mut config.weather_api_key)?;

    let folder = Text::new("SpeechKit folder id:")
        .with_default(config.speech_folder_id.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read folder id")?;
    merge(&mut config.speech_folder_id, folder);

    config.save_to(path)
}

fn prompt_secret(label: &str, slot: &mut Option<String>) -> anyhow::Result<()> {
    let help = if slot.is_some() { "Leave empty to keep the current value" } else { "Required" };

    let answer = Password::new(label)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()
        .with_context(|| format!("Failed to read {label}"))?;

    merge(slot, answer);
    Ok(())
}

fn merge(slot: &mut Option<String>, answer: String) {
    let answer = answer.trim();
    if !answer.is_empty() {
        *slot = Some(answer.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answer_keeps_existing_value() {
        let mut slot = Some("old".to_string());
        merge(&mut slot, "  ".into());
        assert_eq!(slot.as_deref(), Some("old"));
    }

    #[test]
    fn answer_replaces_value_trimmed() {
        let mut slot = None;
        merge(&mut slot, " new-key\n".into());
        assert_eq!(slot.as_deref(), Some("new-key"));
    }
}
