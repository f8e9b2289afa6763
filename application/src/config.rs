//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Sessions configuration.
    pub sessions: Sessions,

    /// Bootstrap administrator account, created at startup when absent.
    pub bootstrap: Option<Bootstrap>,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            sessions: Sessions { store, watcher },
            bootstrap: _,
        } = value;
        Self {
            sessions: service::SessionsConfig {
                store: service::auth::store::Config {
                    token_size: store.token_size,
                },
                watcher: service::task::expire_sessions::Config {
                    interval: watcher.interval,
                    expire_after: watcher.expire_after,
                },
            },
        }
    }
}

/// Sessions configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Sessions {
    /// Session store configuration.
    pub store: SessionStore,

    /// Session watcher configuration.
    pub watcher: SessionWatcher,
}

/// Session store configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct SessionStore {
    /// Bytes of entropy per generated session token.
    #[default(16)]
    pub token_size: usize,
}

/// Session watcher configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct SessionWatcher {
    /// Interval between two sweeps.
    #[default(time::Duration::from_secs(60 * 3))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,

    /// Idle timeout after which a session expires.
    #[default(time::Duration::from_secs(3600 * 6))]
    #[serde(with = "humantime_serde")]
    pub expire_after: time::Duration,
}

/// Bootstrap administrator account.
#[derive(Clone, Debug, Deserialize)]
pub struct Bootstrap {
    /// Email address of the administrator.
    pub email: String,

    /// Clear password of the administrator.
    pub password: String,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
