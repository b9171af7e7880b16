use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("listing session closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
    #[cfg(feature = "http")]
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}
