use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use bitflags::bitflags;

use crate::animation::{Transition, TransitionOutcome};
use crate::config::PanelConfig;
use crate::geometry::{Rect, Size};

bitflags! {
    /// How the panel behaves across spaces and window cycling.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PanelBehavior: u32 {
        /// Visible on every space / workspace.
        const JOIN_ALL_SPACES = 1 << 0;
        /// Not carried along by Exposé / Mission Control.
        const TRANSIENT = 1 << 1;
        /// Skipped by Cmd-` style window cycling.
        const IGNORE_CYCLE = 1 << 2;
    }
}

bitflags! {
    /// Window chrome.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PanelChrome: u32 {
        const BORDERLESS = 1 << 0;
        /// Clicking the panel does not activate the owning application.
        const NON_ACTIVATING = 1 << 1;
        /// Clear window background; the content view draws everything.
        const TRANSPARENT = 1 << 2;
        /// Dragging any background area moves the window.
        const MOVABLE_BY_BACKGROUND = 1 << 3;
        const SHADOW = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLevel {
    Normal,
    /// Above normal application windows.
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelStyle {
    pub level: WindowLevel,
    pub behavior: PanelBehavior,
    pub chrome: PanelChrome,
}

impl Default for PanelStyle {
    fn default() -> Self {
        PanelStyle {
            level: WindowLevel::Floating,
            behavior: PanelBehavior::JOIN_ALL_SPACES
                | PanelBehavior::TRANSIENT
                | PanelBehavior::IGNORE_CYCLE,
            chrome: PanelChrome::all(),
        }
    }
}

/// The on-screen window, as provided by a platform frontend.
///
/// All methods run on the UI thread. Implementations wrap reference-counted
/// toolkit handles, so everything takes `&self`.
pub trait PanelSurface {
    fn alpha(&self) -> f64;
    fn set_alpha(&self, alpha: f64);

    /// Animate alpha to `target` over `duration` and call `on_complete` on
    /// the UI thread when done. Starting a new animation may drop the
    /// callback of the previous one instead of calling it.
    fn animate_alpha(&self, target: f64, duration: Duration, on_complete: Box<dyn FnOnce()>);

    fn frame(&self) -> Rect;
    fn set_frame(&self, frame: Rect, animate: bool);

    /// Order the window in front of others and give it keyboard focus.
    fn bring_to_front(&self);

    /// Remove the window from the screen without destroying it.
    fn order_out(&self);

    fn is_on_screen(&self) -> bool;
}

/// Screen queries and window creation for one windowing system.
pub trait PanelPlatform {
    type Surface: PanelSurface + 'static;

    /// Visible work area of the primary screen (excluding menu bar, dock,
    /// panels), or `None` when no screen is attached.
    fn primary_work_area(&self) -> Option<Rect>;

    fn create_surface(&self, frame: Rect, style: &PanelStyle) -> Self::Surface;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Hidden,
    Showing,
    Visible,
    Hiding,
}

impl PanelState {
    /// Whether the user should currently see (or be about to see) the panel.
    pub fn is_shown(self) -> bool {
        matches!(self, PanelState::Showing | PanelState::Visible)
    }
}

struct Lifecycle<S> {
    surface: Option<Rc<S>>,
    state: PanelState,
    /// Bumped by every show / hide so stale completions can be ignored.
    generation: u64,
}

/// Owns the single floating panel and drives its visibility.
pub struct PanelController<P: PanelPlatform> {
    platform: P,
    size: Size,
    fade: Duration,
    style: PanelStyle,
    lifecycle: Rc<RefCell<Lifecycle<P::Surface>>>,
}

impl<P: PanelPlatform> PanelController<P> {
    pub fn new(platform: P, config: &PanelConfig) -> Self {
        PanelController {
            platform,
            size: config.size(),
            fade: config.fade_duration(),
            style: PanelStyle::default(),
            lifecycle: Rc::new(RefCell::new(Lifecycle {
                surface: None,
                state: PanelState::Hidden,
                generation: 0,
            })),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn surface(&self) -> Option<Rc<P::Surface>> {
        self.lifecycle.borrow().surface.clone()
    }

    pub fn state(&self) -> PanelState {
        self.lifecycle.borrow().state
    }

    /// Frame of the default-sized panel centered on the primary work area.
    pub fn centered_frame(&self) -> Option<Rect> {
        self.platform
            .primary_work_area()
            .map(|area| Rect::centered_in(self.size, &area))
    }

    /// Create the panel, hidden and fully transparent.
    ///
    /// Returns `false` and leaves the existing panel alone if one was
    /// already created.
    pub fn setup_window(&self) -> bool {
        if self.lifecycle.borrow().surface.is_some() {
            log::debug!("Panel already set up, keeping the existing window");
            return false;
        }

        let frame = self
            .centered_frame()
            .unwrap_or_else(|| Rect::from_size(self.size));
        let surface = Rc::new(self.platform.create_surface(frame, &self.style));
        surface.set_alpha(0.0);

        let mut lifecycle = self.lifecycle.borrow_mut();
        lifecycle.surface = Some(surface);
        lifecycle.state = PanelState::Hidden;
        log::debug!(
            "Panel created at ({}, {}) size {}x{}",
            frame.origin.x,
            frame.origin.y,
            frame.size.width,
            frame.size.height
        );
        true
    }

    /// Fade the panel in at the screen center and focus it.
    pub fn show_window(&self) -> Transition {
        let Some((surface, generation)) = self.begin(PanelState::Showing) else {
            log::debug!("show_window: no panel set up");
            return Transition::skipped();
        };

        surface.set_alpha(0.0);
        if let Some(frame) = self.centered_frame() {
            surface.set_frame(frame, false);
        }
        surface.bring_to_front();

        let (transition, signal) = Transition::pending();
        let lifecycle = Rc::downgrade(&self.lifecycle);
        surface.animate_alpha(
            1.0,
            self.fade,
            Box::new(move || {
                let current = lifecycle
                    .upgrade()
                    .map(|lifecycle| {
                        let mut lifecycle = lifecycle.borrow_mut();
                        let current = lifecycle.generation == generation;
                        if current {
                            lifecycle.state = PanelState::Visible;
                        }
                        current
                    })
                    .unwrap_or(false);
                signal.finish(if current {
                    TransitionOutcome::Completed
                } else {
                    TransitionOutcome::Superseded
                });
            }),
        );
        transition
    }

    /// Fade the panel out, then order it off screen.
    pub fn hide_window(&self) -> Transition {
        let Some((surface, generation)) = self.begin(PanelState::Hiding) else {
            log::debug!("hide_window: no panel set up");
            return Transition::skipped();
        };

        let (transition, signal) = Transition::pending();
        let lifecycle = Rc::downgrade(&self.lifecycle);
        let target = Rc::downgrade(&surface);
        surface.animate_alpha(
            0.0,
            self.fade,
            Box::new(move || {
                let current = lifecycle
                    .upgrade()
                    .map(|lifecycle| {
                        let mut lifecycle = lifecycle.borrow_mut();
                        let current = lifecycle.generation == generation;
                        if current {
                            lifecycle.state = PanelState::Hidden;
                        }
                        current
                    })
                    .unwrap_or(false);
                if !current {
                    signal.finish(TransitionOutcome::Superseded);
                    return;
                }
                if let Some(surface) = target.upgrade() {
                    surface.order_out();
                }
                signal.finish(TransitionOutcome::Completed);
            }),
        );
        transition
    }

    /// Hide if the panel is shown (or fading in), show otherwise.
    pub fn toggle_window(&self) -> Transition {
        let shown = {
            let lifecycle = self.lifecycle.borrow();
            match &lifecycle.surface {
                Some(surface) => lifecycle.state.is_shown() && surface.is_on_screen(),
                None => false,
            }
        };
        if shown {
            self.hide_window()
        } else {
            self.show_window()
        }
    }

    /// Move the panel back to the center of the primary work area.
    ///
    /// A hidden panel is repositioned but stays off screen.
    pub fn center_window(&self) {
        let Some(surface) = self.surface() else {
            log::debug!("center_window: no panel set up");
            return;
        };
        let Some(frame) = self.centered_frame() else {
            log::debug!("center_window: no primary screen");
            return;
        };
        surface.set_frame(frame, true);
        if self.state().is_shown() {
            surface.bring_to_front();
        }
    }

    fn begin(&self, state: PanelState) -> Option<(Rc<P::Surface>, u64)> {
        let mut lifecycle = self.lifecycle.borrow_mut();
        let surface = lifecycle.surface.clone()?;
        lifecycle.generation += 1;
        lifecycle.state = state;
        Some((surface, lifecycle.generation))
    }
}
