pub mod animation;
pub mod browser;
pub mod config;
pub mod error;
pub mod geometry;
pub mod panel;
pub mod paths;

pub use animation::{Fade, Transition, TransitionOutcome};
pub use browser::{
    BrowserConfig, BrowserEngine, BrowserHost, DataStore, LoggingObserver, NavigationEvent,
    NavigationHistory, NavigationId, NavigationObserver, NavigationSink, SequentialLoads,
};
pub use config::{PanelConfig, ShellConfig};
pub use error::{ConfigError, ShellError};
pub use geometry::{Point, Rect, Size};
pub use panel::{
    PanelBehavior, PanelChrome, PanelController, PanelPlatform, PanelState, PanelStyle,
    PanelSurface, WindowLevel,
};
