#[cfg(target_os = "macos")]
mod app;
#[cfg(target_os = "macos")]
mod browser;
#[cfg(target_os = "macos")]
mod window;

use grok_panel_core::ShellError;

#[cfg(target_os = "macos")]
fn run() -> Result<(), ShellError> {
    app::run()
}

#[cfg(not(target_os = "macos"))]
fn run() -> Result<(), ShellError> {
    Err(ShellError::Platform {
        message: "grok-panel-macos only runs on macOS; use the grok-panel binary elsewhere"
            .to_string(),
    })
}

fn main() {
    env_logger::init();
    log::info!("Grok panel starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
