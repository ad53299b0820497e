mod browser_view;
mod theme;
mod window;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;

use grok_panel_core::{
    BrowserHost, LoggingObserver, NavigationHistory, PanelController, ShellConfig, ShellError,
};

use crate::browser_view::WebKitView;
use crate::window::GtkPlatform;

const APP_ID: &str = "io.github.grokpanel.GrokPanel";

/// Everything that lives for the whole session once the panel is up.
struct Shell {
    panel: Rc<PanelController<GtkPlatform>>,
    history: NavigationHistory,
    _browser: BrowserHost<WebKitView>,
}

fn launch(app: &adw::Application, config: &ShellConfig) -> Result<Shell, ShellError> {
    let target = config.target_url()?;

    let panel = Rc::new(PanelController::new(
        GtkPlatform::new(app, &config.title),
        &config.panel,
    ));
    panel.setup_window();
    let surface = panel.surface().ok_or_else(|| ShellError::Platform {
        message: "panel window was not created".to_string(),
    })?;

    let history = NavigationHistory::new();
    let browser = BrowserHost::<WebKitView>::open(
        &(),
        &config.browser,
        target,
        vec![Box::new(LoggingObserver), Box::new(history.clone())],
    );
    surface.install_content(&config.title, browser.engine().widget());

    // Closing the panel only hides it; the app keeps running.
    let weak_panel = Rc::downgrade(&panel);
    surface.window().connect_close_request(move |_| {
        if let Some(panel) = weak_panel.upgrade() {
            panel.hide_window();
        }
        glib::Propagation::Stop
    });

    panel.show_window();
    Ok(Shell {
        panel,
        history,
        _browser: browser,
    })
}

fn main() -> glib::ExitCode {
    env_logger::init();

    let config = ShellConfig::default();
    if let Err(e) = config.validate() {
        log::error!("{}", e);
        return glib::ExitCode::FAILURE;
    }
    log::debug!("Effective config: {}", config.to_log_string());

    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_startup(|_app| {
        theme::load_css();
    });

    let shell: Rc<RefCell<Option<Shell>>> = Rc::new(RefCell::new(None));
    let session = shell.clone();
    app.connect_shutdown(move |_app| {
        if let Some(running) = session.borrow().as_ref() {
            running.history.log_summary();
        }
    });

    // GApplication is single-instance: launching the binary again activates
    // the running instance, which toggles the panel.
    app.connect_activate(move |app| {
        if let Some(running) = shell.borrow().as_ref() {
            running.panel.toggle_window();
            return;
        }
        match launch(app, &config) {
            Ok(started) => *shell.borrow_mut() = Some(started),
            Err(e) => {
                log::error!("Failed to start: {}", e);
                app.quit();
            }
        }
    });

    app.run()
}
