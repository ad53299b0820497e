use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::browser::BrowserConfig;
use crate::error::ConfigError;
use crate::geometry::Size;

/// The chat application shown in the panel.
pub const TARGET_URL: &str = "https://grok.com";

pub const DEFAULT_TITLE: &str = "Grok";
pub const DEFAULT_PANEL_WIDTH: f64 = 800.0;
pub const DEFAULT_PANEL_HEIGHT: f64 = 600.0;
pub const DEFAULT_FADE_MS: u64 = 200;
pub const DEFAULT_TITLE_BAR_HEIGHT: f64 = 28.0;

const MAX_FADE_MS: u64 = 5_000;

/// Panel geometry and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub width: f64,
    pub height: f64,
    pub fade_duration_ms: u64,
    /// Height of the draggable strip above the web content.
    pub title_bar_height: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            width: DEFAULT_PANEL_WIDTH,
            height: DEFAULT_PANEL_HEIGHT,
            fade_duration_ms: DEFAULT_FADE_MS,
            title_bar_height: DEFAULT_TITLE_BAR_HEIGHT,
        }
    }
}

impl PanelConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

/// Everything the shell needs at startup.
///
/// The values are compiled in. The `#[serde(default)]` keeps the type usable
/// for diagnostics dumps and tests without every field spelled out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub title: String,
    pub target_url: String,
    pub panel: PanelConfig,
    pub browser: BrowserConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            title: String::from(DEFAULT_TITLE),
            target_url: String::from(TARGET_URL),
            panel: PanelConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Parse the target URL, accepting only http(s).
    pub fn target_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.target_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.target_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target_url()?;
        if !self.panel.size().is_drawable() {
            return Err(ConfigError::InvalidPanelSize {
                width: self.panel.width,
                height: self.panel.height,
            });
        }
        if self.panel.fade_duration_ms > MAX_FADE_MS {
            return Err(ConfigError::InvalidFadeDuration {
                millis: self.panel.fade_duration_ms,
            });
        }
        Ok(())
    }

    /// One-line JSON rendering for the startup debug log.
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable config: {}>", e))
    }
}
