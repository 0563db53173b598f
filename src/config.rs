use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::constants::{defaults, keys};
use crate::models::RecordKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not read config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: java_properties::PropertiesError,
    },
    #[error("{0} may not be empty")]
    Missing(&'static str),
    #[error("{field} is not a valid URL: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{field} must be an http or https URL")]
    UnsupportedScheme { field: &'static str },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Base URL and login of one tenant
#[derive(Clone, PartialEq)]
pub struct TenantCredentials {
    pub url: Url,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for TenantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantCredentials")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Endpoint that copied alarms are submitted to on the target tenant.
///
/// `Event` reproduces how the tool has always behaved: alarms are posted to the event
/// collection and therefore arrive on the target as events. `Alarm` posts them to the
/// alarm collection instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlarmRoute {
    #[default]
    Event,
    Alarm,
}

impl AlarmRoute {
    pub fn kind(self) -> RecordKind {
        match self {
            AlarmRoute::Event => RecordKind::Event,
            AlarmRoute::Alarm => RecordKind::Alarm,
        }
    }
}

impl FromStr for AlarmRoute {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "event" => Ok(AlarmRoute::Event),
            "alarm" => Ok(AlarmRoute::Alarm),
            _ => Err(ConfigError::InvalidValue {
                key: keys::ALARM_ENDPOINT,
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub source: TenantCredentials,
    pub target: TenantCredentials,
    pub alarm_route: AlarmRoute,
    pub page_size: usize,
}

/// Read the Java properties file at `path`. Values are taken literally (no variable
/// substitution) and are not exported to the process environment.
pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let props = java_properties::read(BufReader::new(file)).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    from_properties(&props)
}

pub fn from_properties(props: &HashMap<String, String>) -> Result<Config, ConfigError> {
    for key in props.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            log::debug!("Ignoring unknown config key '{key}'");
        }
    }

    // Fields are checked in this order so that the first missing one is reported
    let source_url = required(props, keys::SOURCE_URL, "Source URL")?;
    let source_username = required(props, keys::SOURCE_USERNAME, "Source username")?;
    let source_password = required(props, keys::SOURCE_PASSWORD, "Source password")?;
    let target_url = required(props, keys::TARGET_URL, "Target URL")?;
    let target_username = required(props, keys::TARGET_USERNAME, "Target username")?;
    let target_password = required(props, keys::TARGET_PASSWORD, "Target password")?;

    let alarm_route = match optional(props, keys::ALARM_ENDPOINT) {
        Some(value) => value.parse()?,
        None => AlarmRoute::default(),
    };
    let page_size = match optional(props, keys::PAGE_SIZE) {
        Some(value) => parse_page_size(value)?,
        None => defaults::PAGE_SIZE,
    };

    Ok(Config {
        source: TenantCredentials {
            url: parse_url(source_url, "Source URL")?,
            username: source_username.to_string(),
            password: source_password.to_string(),
        },
        target: TenantCredentials {
            url: parse_url(target_url, "Target URL")?,
            username: target_username.to_string(),
            password: target_password.to_string(),
        },
        alarm_route,
        page_size,
    })
}

const KNOWN_KEYS: [&str; 8] = [
    keys::SOURCE_URL,
    keys::SOURCE_USERNAME,
    keys::SOURCE_PASSWORD,
    keys::TARGET_URL,
    keys::TARGET_USERNAME,
    keys::TARGET_PASSWORD,
    keys::ALARM_ENDPOINT,
    keys::PAGE_SIZE,
];

fn optional<'a>(props: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn required<'a>(
    props: &'a HashMap<String, String>,
    key: &str,
    field: &'static str,
) -> Result<&'a str, ConfigError> {
    optional(props, key).ok_or(ConfigError::Missing(field))
}

fn parse_url(raw: &str, field: &'static str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme { field }),
    }
}

fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidValue {
            key: keys::PAGE_SIZE,
            value: raw.to_string(),
        }),
    }
}
