use std::{
    fs,
    io::ErrorKind,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use dispatch::{
    debounce::{DEFAULT_HOLD_CONFIRM_INTERVAL, DEFAULT_RELEASE_INTERVAL},
    DebounceTimings,
};
use gateway::{GatewayConfig, DEFAULT_ACTUATOR_URL, DEFAULT_REQUEST_TIMEOUT};
use serde::Deserialize;
use server::ServerConfig;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "bridge.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub static_root: PathBuf,
    pub index_file: String,
    pub actuator_url: String,
    pub request_timeout_ms: u64,
    pub release_ms: u64,
    pub hold_confirm_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".into(),
            static_root: PathBuf::from("./public"),
            index_file: "index.html".into(),
            actuator_url: DEFAULT_ACTUATOR_URL.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            release_ms: DEFAULT_RELEASE_INTERVAL.as_millis() as u64,
            hold_confirm_ms: DEFAULT_HOLD_CONFIRM_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    static_root: Option<PathBuf>,
    index_file: Option<String>,
    actuator_url: Option<String>,
    request_timeout_ms: Option<u64>,
    release_ms: Option<u64>,
    hold_confirm_ms: Option<u64>,
}

/// Defaults, then the TOML file (if present), then environment overrides.
///
/// A missing file at the default location is fine; an explicitly requested
/// file must exist and parse.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<FileSettings>(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(error) if error.kind() == ErrorKind::NotFound && !required => {}
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.static_root {
        settings.static_root = v;
    }
    if let Some(v) = file_cfg.index_file {
        settings.index_file = v;
    }
    if let Some(v) = file_cfg.actuator_url {
        settings.actuator_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = file_cfg.release_ms {
        settings.release_ms = v;
    }
    if let Some(v) = file_cfg.hold_confirm_ms {
        settings.hold_confirm_ms = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    let lookup = |names: [&str; 2]| names.into_iter().rev().find_map(|name| var(name));
    let lookup_ms = |names: [&str; 2]| lookup(names).and_then(|v| v.parse::<u64>().ok());

    if let Some(v) = lookup(["BRIDGE_BIND_ADDR", "APP__BIND_ADDR"]) {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup(["BRIDGE_STATIC_ROOT", "APP__STATIC_ROOT"]) {
        settings.static_root = PathBuf::from(v);
    }
    if let Some(v) = lookup(["BRIDGE_INDEX_FILE", "APP__INDEX_FILE"]) {
        settings.index_file = v;
    }
    if let Some(v) = lookup(["BRIDGE_ACTUATOR_URL", "APP__ACTUATOR_URL"]) {
        settings.actuator_url = v;
    }
    if let Some(v) = lookup_ms(["BRIDGE_REQUEST_TIMEOUT_MS", "APP__REQUEST_TIMEOUT_MS"]) {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = lookup_ms(["BRIDGE_RELEASE_MS", "APP__RELEASE_MS"]) {
        settings.release_ms = v;
    }
    if let Some(v) = lookup_ms(["BRIDGE_HOLD_CONFIRM_MS", "APP__HOLD_CONFIRM_MS"]) {
        settings.hold_confirm_ms = v;
    }
}

impl Settings {
    pub fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let bind_addr: SocketAddr = self
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.bind_addr))?;
        Ok(ServerConfig {
            bind_addr,
            static_root: self.static_root.clone(),
            index_file: self.index_file.clone(),
        })
    }

    pub fn gateway_config(&self) -> anyhow::Result<GatewayConfig> {
        let endpoint = Url::parse(&self.actuator_url)
            .with_context(|| format!("invalid actuator url '{}'", self.actuator_url))?;
        Ok(GatewayConfig {
            endpoint,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        })
    }

    pub fn debounce_timings(&self) -> DebounceTimings {
        DebounceTimings {
            release: Duration::from_millis(self.release_ms),
            hold_confirm: Duration::from_millis(self.hold_confirm_ms),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
