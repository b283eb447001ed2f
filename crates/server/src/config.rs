use std::{env, fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;

const DEFAULT_CONFIG_FILE: &str = "server.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    Push,
    Poll,
}

impl NotifyMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "push" => Some(NotifyMode::Push),
            "poll" => Some(NotifyMode::Poll),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub admin_key: Option<String>,
    pub admin_panel_path: String,
    pub notify_mode: NotifyMode,
    pub event_buffer: usize,
    pub reject_unknown_elements: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            admin_key: None,
            admin_panel_path: "/admin.html".into(),
            notify_mode: NotifyMode::Push,
            event_buffer: 256,
            reject_unknown_elements: false,
        }
    }
}

/// Flat `server.toml` layout. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    admin_key: Option<String>,
    admin_panel_path: Option<String>,
    notify_mode: Option<NotifyMode>,
    event_buffer: Option<usize>,
    reject_unknown_elements: Option<bool>,
}

/// Defaults, then `server.toml` (or the file named by `SLIDESYNC_CONFIG`),
/// then environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = env::var("SLIDESYNC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
    if Path::new(&path).exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{path}'"))?;
    }

    apply_env(&mut settings, |key| env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file.admin_key {
        settings.admin_key = Some(v);
    }
    if let Some(v) = file.admin_panel_path {
        settings.admin_panel_path = v;
    }
    if let Some(v) = file.notify_mode {
        settings.notify_mode = v;
    }
    if let Some(v) = file.event_buffer {
        if v == 0 {
            bail!("event_buffer must be greater than zero");
        }
        settings.event_buffer = v;
    }
    if let Some(v) = file.reject_unknown_elements {
        settings.reject_unknown_elements = v;
    }
    Ok(())
}

/// Plain names are read first and `APP__` names override them.
pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |plain: &str, prefixed: &str| lookup(prefixed).or_else(|| lookup(plain));

    if let Some(v) = read("SERVER_BIND", "APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = read("ADMIN_KEY", "APP__ADMIN_KEY") {
        settings.admin_key = Some(v);
    }
    if let Some(v) = read("ADMIN_PANEL_PATH", "APP__ADMIN_PANEL_PATH") {
        settings.admin_panel_path = v;
    }
    if let Some(v) = read("NOTIFY_MODE", "APP__NOTIFY_MODE") {
        match NotifyMode::parse(&v) {
            Some(mode) => settings.notify_mode = mode,
            None => warn!(value = %v, "ignoring unknown notify mode"),
        }
    }
    if let Some(v) = read("EVENT_BUFFER", "APP__EVENT_BUFFER") {
        match v.parse::<usize>() {
            Ok(parsed) if parsed > 0 => settings.event_buffer = parsed,
            _ => warn!(value = %v, "ignoring invalid event buffer size"),
        }
    }
    if let Some(v) = read("REJECT_UNKNOWN_ELEMENTS", "APP__REJECT_UNKNOWN_ELEMENTS") {
        match parse_flag(&v) {
            Some(flag) => settings.reject_unknown_elements = flag,
            None => warn!(value = %v, "ignoring invalid reject_unknown_elements flag"),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
