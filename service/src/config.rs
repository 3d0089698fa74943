use anyhow::{anyhow, bail};
use std::env;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Stackdriver,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "stackdriver" => Ok(LogFormat::Stackdriver),
            "pretty" => Ok(LogFormat::Pretty),
            other => bail!("unknown log format '{other}', expected json, stackdriver or pretty"),
        }
    }
}

/// Settings read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_format: LogFormat,
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<ServiceConfig> {
        ServiceConfig::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<ServiceConfig> {
        let defaults = ServiceConfig::default();
        Ok(ServiceConfig {
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            log_format: parse_var(&lookup, "LOG_FORMAT")?.unwrap_or(defaults.log_format),
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES")?
                .unwrap_or(defaults.max_body_bytes),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow!("invalid value for {key}: '{value}': {e}"))
        })
        .transpose()
}
