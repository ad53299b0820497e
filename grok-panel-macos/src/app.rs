// ---------------------------------------------------------------------------
// macOS application lifecycle
// ---------------------------------------------------------------------------
//
// - applicationDidFinishLaunching: create the panel, load the page, show it
// - applicationShouldHandleReopen: Dock icon click toggles the panel
// - applicationWillTerminate: log the navigation summary
// - applicationShouldTerminateAfterLastWindowClosed: false, hiding the panel
//   orders it out and the app keeps running

use std::cell::RefCell;
use std::rc::Rc;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy, NSApplicationDelegate};
use objc2_foundation::{NSNotification, NSObject, NSObjectProtocol};

use grok_panel_core::{
    BrowserHost, LoggingObserver, NavigationHistory, PanelController, ShellConfig, ShellError,
};

use crate::browser::WebKitView;
use crate::window::AppKitPlatform;

struct Shell {
    panel: Rc<PanelController<AppKitPlatform>>,
    history: NavigationHistory,
    _browser: BrowserHost<WebKitView>,
}

fn start(mtm: MainThreadMarker, config: &ShellConfig) -> Result<Shell, ShellError> {
    let target = config.target_url()?;

    let panel = Rc::new(PanelController::new(AppKitPlatform::new(mtm), &config.panel));
    panel.setup_window();
    let surface = panel.surface().ok_or_else(|| ShellError::Platform {
        message: "panel window was not created".to_string(),
    })?;

    let history = NavigationHistory::new();
    let browser = BrowserHost::<WebKitView>::open(
        &mtm,
        &config.browser,
        target,
        vec![Box::new(LoggingObserver), Box::new(history.clone())],
    );
    surface.install_content(
        &config.title,
        config.panel.title_bar_height,
        browser.engine().view(),
    );

    panel.show_window();
    #[allow(deprecated)]
    NSApplication::sharedApplication(mtm).activateIgnoringOtherApps(true);

    Ok(Shell {
        panel,
        history,
        _browser: browser,
    })
}

pub struct DelegateIvars {
    config: ShellConfig,
    shell: RefCell<Option<Shell>>,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "GrokPanelAppDelegate"]
    #[ivars = DelegateIvars]
    struct AppDelegate;

    unsafe impl NSObjectProtocol for AppDelegate {}

    unsafe impl NSApplicationDelegate for AppDelegate {
        #[unsafe(method(applicationDidFinishLaunching:))]
        fn did_finish_launching(&self, _notification: &NSNotification) {
            self.launch();
        }

        #[unsafe(method(applicationWillTerminate:))]
        fn will_terminate(&self, _notification: &NSNotification) {
            if let Some(shell) = self.ivars().shell.borrow().as_ref() {
                shell.history.log_summary();
            }
        }

        #[unsafe(method(applicationShouldHandleReopen:hasVisibleWindows:))]
        fn should_handle_reopen(&self, _sender: &NSApplication, _has_visible_windows: bool) -> bool {
            self.toggle();
            // Handled; skip AppKit's default reopen behavior.
            false
        }

        #[unsafe(method(applicationShouldTerminateAfterLastWindowClosed:))]
        fn should_terminate_after_last_window_closed(&self, _sender: &NSApplication) -> bool {
            false
        }
    }
);

impl AppDelegate {
    fn new(mtm: MainThreadMarker, config: ShellConfig) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(DelegateIvars {
            config,
            shell: RefCell::new(None),
        });
        unsafe { msg_send![super(this), init] }
    }

    fn launch(&self) {
        let ivars = self.ivars();
        if ivars.shell.borrow().is_some() {
            log::debug!("Already launched");
            return;
        }
        match start(self.mtm(), &ivars.config) {
            Ok(shell) => *ivars.shell.borrow_mut() = Some(shell),
            Err(e) => {
                log::error!("Failed to start: {}", e);
                NSApplication::sharedApplication(self.mtm()).terminate(None);
            }
        }
    }

    fn toggle(&self) {
        if let Some(shell) = self.ivars().shell.borrow().as_ref() {
            shell.panel.toggle_window();
        }
    }
}

/// Set up NSApplication with our delegate and run the event loop.
#[allow(unused_unsafe)]
pub fn run() -> Result<(), ShellError> {
    let config = ShellConfig::default();
    config.validate()?;
    log::debug!("Effective config: {}", config.to_log_string());

    let mtm = MainThreadMarker::new().ok_or(ShellError::NotMainThread)?;
    let app = NSApplication::sharedApplication(mtm);
    app.setActivationPolicy(NSApplicationActivationPolicy::Regular);

    let delegate = AppDelegate::new(mtm, config);
    app.setDelegate(Some(ProtocolObject::from_ref(&*delegate)));
    unsafe { app.run() };
    Ok(())
}
