use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{
    controller::{ControllerOptions, DEFAULT_REFRESH_DELAY},
    notification::DEFAULT_NOTIFICATION_DURATION,
    transport::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT},
};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "board.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_url: String,
    /// `0` disables the per-request timeout.
    pub request_timeout_ms: u64,
    pub notification_duration_ms: u64,
    pub refresh_delay_ms: u64,
    pub auto_confirm: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            notification_duration_ms: DEFAULT_NOTIFICATION_DURATION.as_millis() as u64,
            refresh_delay_ms: DEFAULT_REFRESH_DELAY.as_millis() as u64,
            auto_confirm: false,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            notification_duration: Duration::from_millis(self.notification_duration_ms),
            refresh_delay: Duration::from_millis(self.refresh_delay_ms),
        }
    }
}

/// Defaults, then the settings file (if present), then environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;
    if let Some(v) = file_cfg.get("api_url").and_then(toml::Value::as_str) {
        settings.api_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("request_timeout_ms").and_then(as_millis) {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = file_cfg.get("notification_duration_ms").and_then(as_millis) {
        settings.notification_duration_ms = v;
    }
    if let Some(v) = file_cfg.get("refresh_delay_ms").and_then(as_millis) {
        settings.refresh_delay_ms = v;
    }
    if let Some(v) = file_cfg.get("auto_confirm").and_then(toml::Value::as_bool) {
        settings.auto_confirm = v;
    }
    Ok(())
}

fn as_millis(value: &toml::Value) -> Option<u64> {
    value.as_integer().and_then(|v| u64::try_from(v).ok())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("POSTS_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    let millis = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
    if let Some(v) = millis("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = millis("APP__NOTIFICATION_MS") {
        settings.notification_duration_ms = v;
    }
    if let Some(v) = millis("APP__REFRESH_DELAY_MS") {
        settings.refresh_delay_ms = v;
    }
}
