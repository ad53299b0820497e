//! End-to-end launch flow against in-memory platform and engine fakes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use grok_panel_core::{
    BrowserConfig, BrowserEngine, BrowserHost, LoggingObserver, NavigationEvent,
    NavigationHistory, NavigationId, NavigationSink, PanelController, PanelPlatform, PanelState,
    PanelStyle, PanelSurface, Rect, ShellConfig, TransitionOutcome,
};
use url::Url;

struct Window {
    alpha: Cell<f64>,
    frame: Cell<Rect>,
    visible: Cell<bool>,
    content: RefCell<Option<String>>,
    animations: RefCell<Vec<(f64, Box<dyn FnOnce()>)>>,
    fades: RefCell<Vec<Duration>>,
}

impl Window {
    fn settle(&self) {
        let running: Vec<_> = self.animations.borrow_mut().drain(..).collect();
        for (target, done) in running {
            self.alpha.set(target);
            done();
        }
    }
}

impl PanelSurface for Window {
    fn alpha(&self) -> f64 {
        self.alpha.get()
    }
    fn set_alpha(&self, alpha: f64) {
        self.alpha.set(alpha);
    }
    fn animate_alpha(&self, target: f64, duration: Duration, on_complete: Box<dyn FnOnce()>) {
        self.fades.borrow_mut().push(duration);
        self.animations.borrow_mut().push((target, on_complete));
    }
    fn frame(&self) -> Rect {
        self.frame.get()
    }
    fn set_frame(&self, frame: Rect, _animate: bool) {
        self.frame.set(frame);
    }
    fn bring_to_front(&self) {
        self.visible.set(true);
    }
    fn order_out(&self) {
        self.visible.set(false);
    }
    fn is_on_screen(&self) -> bool {
        self.visible.get()
    }
}

struct Desktop;

impl PanelPlatform for Desktop {
    type Surface = Window;

    fn primary_work_area(&self) -> Option<Rect> {
        // 1920x1080 with a 25pt menu bar at the top (bottom-left origin).
        Some(Rect::new(0.0, 0.0, 1920.0, 1055.0))
    }

    fn create_surface(&self, frame: Rect, _style: &PanelStyle) -> Window {
        Window {
            alpha: Cell::new(1.0),
            frame: Cell::new(frame),
            visible: Cell::new(false),
            content: RefCell::new(None),
            animations: RefCell::new(Vec::new()),
            fades: RefCell::new(Vec::new()),
        }
    }
}

/// Holds the sink so the test can play the engine's part.
struct PageView {
    sink: NavigationSink,
    requested: RefCell<Vec<String>>,
}

impl BrowserEngine for PageView {
    type Context = ();

    fn build(_context: &(), config: &BrowserConfig, sink: NavigationSink) -> Self {
        assert!(config.javascript_enabled);
        PageView {
            sink,
            requested: RefCell::new(Vec::new()),
        }
    }

    fn load(&self, url: &Url) {
        self.requested.borrow_mut().push(url.to_string());
    }
}

#[tokio::test]
async fn launch_shows_panel_with_page_and_hides_on_toggle() {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = ShellConfig::default();
    config.validate().unwrap();

    let panel = Rc::new(PanelController::new(Desktop, &config.panel));
    assert!(panel.setup_window());
    let window = panel.surface().unwrap();

    let history = NavigationHistory::new();
    let browser = BrowserHost::<PageView>::open(
        &(),
        &config.browser,
        config.target_url().unwrap(),
        vec![Box::new(LoggingObserver), Box::new(history.clone())],
    );
    *window.content.borrow_mut() = Some(browser.target().to_string());

    let shown = panel.show_window();
    window.settle();
    assert_eq!(shown.await, TransitionOutcome::Completed);
    assert_eq!(window.alpha(), 1.0);
    assert!(window.is_on_screen());
    assert_eq!(window.frame(), Rect::new(560.0, 227.0, 800.0, 600.0));
    assert_eq!(
        window.content.borrow().as_deref(),
        Some("https://grok.com/")
    );

    assert_eq!(
        *browser.engine().requested.borrow(),
        vec!["https://grok.com/".to_string()]
    );
    // grok.com redirects client-side: the first load is cancelled by the second.
    let sink = &browser.engine().sink;
    sink.emit(NavigationId(1), NavigationEvent::Started);
    sink.emit(NavigationId(2), NavigationEvent::Started);
    sink.emit(
        NavigationId(1),
        NavigationEvent::Failed {
            error: "cancelled".to_string(),
        },
    );
    sink.emit(
        NavigationId(2),
        NavigationEvent::Finished {
            url: Some("https://grok.com/".to_string()),
        },
    );
    assert_eq!(history.finished_count(), 1);
    assert_eq!(history.failed_count(), 1);

    let hidden = panel.toggle_window();
    window.settle();
    assert_eq!(hidden.await, TransitionOutcome::Completed);
    assert_eq!(panel.state(), PanelState::Hidden);
    assert!(!window.is_on_screen());
    assert_eq!(window.alpha(), 0.0);
    assert_eq!(
        *window.fades.borrow(),
        vec![Duration::from_millis(200), Duration::from_millis(200)]
    );
}
