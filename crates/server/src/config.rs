use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub seed_file: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3004".into(),
            seed_file: None,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Defaults, then `server.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse {SETTINGS_FILE}"))?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.bind_addr = v.to_string();
    }
    if let Some(v) = file_cfg.get("seed_file").and_then(toml::Value::as_str) {
        settings.seed_file = Some(PathBuf::from(v));
    }
    if let Some(v) = file_cfg
        .get("max_body_bytes")
        .and_then(toml::Value::as_integer)
    {
        if let Ok(parsed) = usize::try_from(v) {
            settings.max_body_bytes = parsed;
        }
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SERVER_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = lookup("APP__SEED_FILE") {
        settings.seed_file = if v.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(v))
        };
    }

    if let Some(v) = lookup("APP__MAX_BODY_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_body_bytes = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
