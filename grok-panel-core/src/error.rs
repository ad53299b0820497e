/// Problems with the compiled-in shell configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Target URL '{url}' is not valid: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Target URL scheme '{scheme}' is not supported (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("Panel size {width}x{height} is not drawable")]
    InvalidPanelSize { width: f64, height: f64 },

    #[error("Fade duration of {millis}ms is longer than the 5000ms limit")]
    InvalidFadeDuration { millis: u64 },
}

/// Startup failures. Once the panel is up nothing returns errors.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("The shell must be started from the main thread")]
    NotMainThread,

    #[error("Platform error: {message}")]
    Platform { message: String },
}
