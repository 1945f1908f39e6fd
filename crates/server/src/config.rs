use std::{fs, io::ErrorKind, net::SocketAddr, path::Path, time::Duration as StdDuration};

use anyhow::{bail, Context};
use chrono::Duration;
use picker::GridConfig;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_bind: String,
    pub grid: GridConfig,
    pub session_ttl_seconds: i64,
    pub sweep_interval_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5000".into(),
            grid: GridConfig::default(),
            session_ttl_seconds: 3600,
            sweep_interval_seconds: 60,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    bind_addr: Option<String>,
    grid_levels: Option<[u16; 3]>,
    session_ttl_seconds: Option<i64>,
    sweep_interval_seconds: Option<u64>,
}

impl Settings {
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_seconds)
    }

    pub fn sweep_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.sweep_interval_seconds)
    }

    /// Command-line overrides: `bind` replaces the address, `port` then
    /// replaces only its port.
    pub fn apply_overrides(&mut self, bind: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
        if let Some(bind) = bind {
            self.server_bind = bind;
        }
        if let Some(port) = port {
            let mut addr = self.bind_addr()?;
            addr.set_port(port);
            self.server_bind = addr.to_string();
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server_bind
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.server_bind))
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.grid.validate().context("invalid grid settings")?;
        if self.session_ttl_seconds <= 0 {
            bail!("session_ttl_seconds must be positive, got {}", self.session_ttl_seconds);
        }
        if self.sweep_interval_seconds == 0 {
            bail!("sweep_interval_seconds must be positive");
        }
        Ok(())
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.bind_addr {
            self.server_bind = v;
        }
        if let Some(v) = file_cfg.grid_levels {
            self.grid.levels = v;
        }
        if let Some(v) = file_cfg.session_ttl_seconds {
            self.session_ttl_seconds = v;
        }
        if let Some(v) = file_cfg.sweep_interval_seconds {
            self.sweep_interval_seconds = v;
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = env("PICKER_BIND") {
            self.server_bind = v;
        }
        if let Some(v) = env("APP__BIND_ADDR") {
            self.server_bind = v;
        }
        if let Some(v) = env("APP__GRID_LEVELS") {
            self.grid.levels = parse_levels(&v)?;
        }
        if let Some(v) = env("APP__SESSION_TTL_SECONDS") {
            self.session_ttl_seconds = parse_env("APP__SESSION_TTL_SECONDS", &v)?;
        }
        if let Some(v) = env("APP__SWEEP_INTERVAL_SECONDS") {
            self.sweep_interval_seconds = parse_env("APP__SWEEP_INTERVAL_SECONDS", &v)?;
        }
        Ok(())
    }
}

/// Defaults, then the settings file if it exists, then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            settings.apply_file(file_cfg);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
    }

    settings.apply_env(env)?;
    settings.validate()?;
    Ok(settings)
}

fn parse_levels(raw: &str) -> anyhow::Result<[u16; 3]> {
    let parsed = raw
        .split(',')
        .map(|part| part.trim().parse::<u16>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("APP__GRID_LEVELS must be three integers, got '{raw}'"))?;
    <[u16; 3]>::try_from(parsed)
        .map_err(|v| anyhow::anyhow!("APP__GRID_LEVELS needs exactly three values, got {}", v.len()))
}

fn parse_env<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has invalid value '{raw}'"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
