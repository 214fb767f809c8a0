use crate::api::ApiClient;
use crate::config::{config_path, Config};
use crate::types::ModelInfo;
use anyhow::Result;
use chrono::DateTime;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

pub async fn list_models(config: &Config, raw: bool) -> Result<()> {
    let client = ApiClient::new(config)?;
    let models = client.list_models().await?;
    write_model_list(&mut io::stdout().lock(), &models, raw)
}

pub fn write_model_list(out: &mut impl Write, models: &[ModelInfo], raw: bool) -> Result<()> {
    if raw {
        writeln!(out, "{}", serde_json::to_string_pretty(models)?)?;
        return Ok(());
    }

    writeln!(out, "Available models:")?;
    for model in models {
        match model.created.and_then(format_created) {
            Some(created) => writeln!(out, "- {} {}", model.id, created)?,
            None => writeln!(out, "- {}", model.id)?,
        }
    }
    Ok(())
}

fn format_created(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|created| created.format("%d-%m-%Y").to_string())
}

/// Updates the stored settings. Without flags both values are asked for on
/// stdin; an empty answer keeps the current value.
pub fn configure(api_key: Option<String>, api_url: Option<String>) -> Result<PathBuf> {
    let path = config_path()?;
    let mut config = Config::load_from(&path)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    apply_settings(&mut config, api_key, api_url, &mut stdin.lock(), &mut stdout)?;

    config.save_to(&path)?;
    writeln!(stdout, "Configuration saved to {}", path.display())?;
    Ok(path)
}

pub fn apply_settings(
    config: &mut Config,
    api_key: Option<String>,
    api_url: Option<String>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let (api_key, api_url) = if api_key.is_none() && api_url.is_none() {
        let current_key = config.api_key.as_deref().map(mask_secret);
        let key = ask(input, out, "API key", current_key.as_deref())?;
        let url = ask(input, out, "API URL", Some(&config.api_url))?;
        (key, url)
    } else {
        (api_key, api_url)
    };

    if let Some(api_key) = api_key.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        config.api_key = Some(api_key);
    }
    if let Some(api_url) = api_url.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        config.api_url = api_url;
    }
    Ok(())
}

fn ask(
    input: &mut impl BufRead,
    out: &mut impl Write,
    label: &str,
    current: Option<&str>,
) -> Result<Option<String>> {
    match current {
        Some(current) => write!(out, "{label} [{current}]: ")?,
        None => write!(out, "{label}: ")?,
    }
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

fn mask_secret(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{tail}")
}
