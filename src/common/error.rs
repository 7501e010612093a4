use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The lifecycle extension is switched off in the host settings. Not a
    /// failure: the host matches on this and registers nothing.
    #[error("crawl telemetry is disabled in the host settings")]
    Disabled,

    #[error("invalid agent configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collector rejected event: status {0}")]
    CollectorStatus(u16),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration file parse failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
