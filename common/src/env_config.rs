use std::{env, path::PathBuf, sync::Arc};

use chrono::TimeDelta;

#[derive(Clone, Debug)]
/// Configuration struct for the roster.
///
/// Holds where the subscriber snapshot lives, how logging is set up
/// and how long success notifications stay visible.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// Location of the JSON snapshot holding every subscriber.
    pub snapshot_path: PathBuf,
    /// File the logger writes to in addition to stdout.
    pub log_file: PathBuf,
    /// Maximum level the logger lets through.
    pub log_level: log::LevelFilter,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// How long a success notification stays visible, in milliseconds.
    pub notification_millis: i64,
    /// Term the roster is filtered by when listed at startup.
    pub search_term: String,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Every setting is optional:
    /// - `ENVIRONMENT`: default "development"
    /// - `SNAPSHOT_PATH`: default "test_subscribers.json"
    /// - `LOG_FILE`: default "roster.log"
    /// - `LOG_LEVEL`: default "debug"
    /// - `ENABLE_CONSOLE_LOGGING`: default true
    /// - `NOTIFICATION_MILLIS`: default 2000
    /// - `SEARCH_TERM`: default ""
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "test_subscribers.json".to_string())
                .into(),
            log_file: env::var("LOG_FILE")
                .unwrap_or_else(|_| "roster.log".to_string())
                .into(),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "debug".to_string())
                .parse()
                .unwrap_or(log::LevelFilter::Debug),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            notification_millis: env::var("NOTIFICATION_MILLIS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .unwrap_or(2000),
            search_term: env::var("SEARCH_TERM").unwrap_or_default(),
        })
    }

    pub fn notification_interval(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.notification_millis.max(0))
    }
}
