use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use gtk4::gdk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use libadwaita::prelude::*;

use grok_panel_core::{
    Fade, PanelChrome, PanelPlatform, PanelStyle, PanelSurface, Rect, WindowLevel,
};

/// Opacity is resampled at roughly 60 Hz while a fade runs.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Creates the panel as an undecorated libadwaita window.
pub struct GtkPlatform {
    app: adw::Application,
    title: String,
}

impl GtkPlatform {
    pub fn new(app: &adw::Application, title: &str) -> Self {
        GtkPlatform {
            app: app.clone(),
            title: title.to_string(),
        }
    }
}

impl PanelPlatform for GtkPlatform {
    type Surface = GtkPanel;

    /// On X11 this is the EWMH work area, which excludes panels and docks.
    /// Wayland has no such query, so the full monitor is used there.
    fn primary_work_area(&self) -> Option<Rect> {
        let display = gdk::Display::default()?;
        let monitor = display
            .monitors()
            .item(0)?
            .downcast::<gdk::Monitor>()
            .ok()?;
        let area = match monitor.downcast_ref::<gdk4_x11::X11Monitor>() {
            Some(x11) => x11.workarea(),
            None => monitor.geometry(),
        };
        Some(Rect::new(
            f64::from(area.x()),
            f64::from(area.y()),
            f64::from(area.width()),
            f64::from(area.height()),
        ))
    }

    fn create_surface(&self, frame: Rect, style: &PanelStyle) -> GtkPanel {
        let window = adw::ApplicationWindow::builder()
            .application(&self.app)
            .title(self.title.as_str())
            .default_width(frame.size.width as i32)
            .default_height(frame.size.height as i32)
            .resizable(false)
            .decorated(!style.chrome.contains(PanelChrome::BORDERLESS))
            .build();
        window.add_css_class("grok-panel");

        if style.level == WindowLevel::Floating {
            // GTK4 dropped gtk_window_set_keep_above; stacking is up to the compositor.
            log::debug!("Floating level requested; GTK4 cannot enforce keep-above");
        }

        GtkPanel {
            window,
            frame: Cell::new(frame),
            fade_source: Rc::new(RefCell::new(None)),
        }
    }
}

/// The panel window plus the timer of its running fade, if any.
pub struct GtkPanel {
    window: adw::ApplicationWindow,
    /// Last requested frame. GTK4 only lets clients pick a size, not a position.
    frame: Cell<Rect>,
    fade_source: Rc<RefCell<Option<glib::SourceId>>>,
}

impl GtkPanel {
    pub fn window(&self) -> &adw::ApplicationWindow {
        &self.window
    }

    /// Put `view` below a draggable title strip.
    pub fn install_content(&self, title: &str, view: &impl IsA<gtk4::Widget>) {
        let title_label = gtk4::Label::new(Some(title));
        title_label.add_css_class("grok-panel-title");
        title_label.set_halign(gtk4::Align::Start);

        let handle = gtk4::WindowHandle::new();
        handle.add_css_class("grok-panel-titlebar");
        handle.set_child(Some(&title_label));

        let column = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        column.add_css_class("grok-panel-frame");
        column.set_overflow(gtk4::Overflow::Hidden);
        column.append(&handle);
        column.append(view);

        self.window.set_content(Some(&column));
    }
}

impl PanelSurface for GtkPanel {
    fn alpha(&self) -> f64 {
        self.window.opacity()
    }

    fn set_alpha(&self, alpha: f64) {
        self.window.set_opacity(alpha);
    }

    fn animate_alpha(&self, target: f64, duration: Duration, on_complete: Box<dyn FnOnce()>) {
        // A newer fade replaces the old one; its completion is dropped.
        if let Some(previous) = self.fade_source.borrow_mut().take() {
            previous.remove();
        }

        let fade = Fade::new(self.window.opacity(), target, duration, Instant::now());
        let window = self.window.downgrade();
        let fade_source = self.fade_source.clone();
        let mut on_complete = Some(on_complete);

        let source = glib::timeout_add_local(FRAME_INTERVAL, move || {
            let Some(window) = window.upgrade() else {
                fade_source.borrow_mut().take();
                return glib::ControlFlow::Break;
            };
            let now = Instant::now();
            window.set_opacity(fade.sample(now));
            if !fade.is_finished(now) {
                return glib::ControlFlow::Continue;
            }
            fade_source.borrow_mut().take();
            if let Some(done) = on_complete.take() {
                done();
            }
            glib::ControlFlow::Break
        });
        *self.fade_source.borrow_mut() = Some(source);
    }

    fn frame(&self) -> Rect {
        self.frame.get()
    }

    fn set_frame(&self, frame: Rect, _animate: bool) {
        self.frame.set(frame);
        self.window
            .set_default_size(frame.size.width as i32, frame.size.height as i32);
        log::debug!(
            "Requested panel position ({}, {}); placement is left to the compositor",
            frame.origin.x,
            frame.origin.y
        );
    }

    fn bring_to_front(&self) {
        self.window.present();
    }

    fn order_out(&self) {
        self.window.set_visible(false);
    }

    fn is_on_screen(&self) -> bool {
        self.window.is_visible()
    }
}
