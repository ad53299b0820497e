// ---------------------------------------------------------------------------
// macOS panel window
// ---------------------------------------------------------------------------
//
// ┌──────────────────────────────────────┐
// │  title strip (drags the window)      │  NSVisualEffectView, behind-window
// ├──────────────────────────────────────┤
// │                                      │
// │              WKWebView               │
// │                                      │
// └──────────────────────────────────────┘

use std::cell::RefCell;
use std::ptr::NonNull;
use std::time::Duration;

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::{define_class, msg_send, ClassType, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{
    NSAnimatablePropertyContainer, NSAnimationContext, NSApplication, NSAutoresizingMaskOptions,
    NSBackingStoreType, NSColor, NSFont, NSFontWeightMedium, NSPanel, NSResponder, NSScreen,
    NSTextField, NSView, NSVisualEffectBlendingMode, NSVisualEffectMaterial, NSVisualEffectState,
    NSVisualEffectView, NSWindow, NSWindowCollectionBehavior, NSWindowStyleMask,
};
use objc2_foundation::{NSObject, NSPoint, NSRect, NSSize, NSString};

use grok_panel_core::{
    PanelBehavior, PanelChrome, PanelPlatform, PanelStyle, PanelSurface, Rect, WindowLevel,
};

const TITLE_FONT_SIZE: f64 = 13.0;
const TITLE_INSET: f64 = 12.0;

// CGWindowLevel values (kCGNormalWindowLevel, kCGFloatingWindowLevel).
const NORMAL_WINDOW_LEVEL: isize = 0;
const FLOATING_WINDOW_LEVEL: isize = 3;

define_class!(
    /// Borderless panels refuse key status by default; the chat page needs
    /// it to receive typing.
    #[unsafe(super(NSPanel, NSWindow, NSResponder, NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "GrokPanelWindow"]
    pub struct KeyablePanel;

    impl KeyablePanel {
        #[unsafe(method(canBecomeKeyWindow))]
        fn can_become_key_window(&self) -> bool {
            true
        }

        #[unsafe(method(canBecomeMainWindow))]
        fn can_become_main_window(&self) -> bool {
            false
        }
    }
);

impl KeyablePanel {
    fn new(mtm: MainThreadMarker, frame: NSRect, style: NSWindowStyleMask) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(());
        unsafe {
            msg_send![
                super(this),
                initWithContentRect: frame,
                styleMask: style,
                backing: NSBackingStoreType::Buffered,
                defer: false
            ]
        }
    }
}

fn to_ns_rect(rect: Rect) -> NSRect {
    NSRect::new(
        NSPoint::new(rect.origin.x, rect.origin.y),
        NSSize::new(rect.size.width, rect.size.height),
    )
}

fn from_ns_rect(rect: NSRect) -> Rect {
    Rect::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height)
}

fn style_mask(chrome: PanelChrome) -> NSWindowStyleMask {
    let mut mask = if chrome.contains(PanelChrome::BORDERLESS) {
        NSWindowStyleMask::Borderless
    } else {
        NSWindowStyleMask::Titled
            | NSWindowStyleMask::Closable
            | NSWindowStyleMask::FullSizeContentView
    };
    if chrome.contains(PanelChrome::NON_ACTIVATING) {
        mask |= NSWindowStyleMask::NonactivatingPanel;
    }
    mask
}

fn collection_behavior(behavior: PanelBehavior) -> NSWindowCollectionBehavior {
    let mut flags = NSWindowCollectionBehavior::empty();
    if behavior.contains(PanelBehavior::JOIN_ALL_SPACES) {
        flags |= NSWindowCollectionBehavior::CanJoinAllSpaces;
    }
    if behavior.contains(PanelBehavior::TRANSIENT) {
        flags |= NSWindowCollectionBehavior::Transient;
    }
    if behavior.contains(PanelBehavior::IGNORE_CYCLE) {
        flags |= NSWindowCollectionBehavior::IgnoresCycle;
    }
    flags
}

pub struct AppKitPlatform {
    mtm: MainThreadMarker,
}

impl AppKitPlatform {
    pub fn new(mtm: MainThreadMarker) -> Self {
        AppKitPlatform { mtm }
    }
}

impl PanelPlatform for AppKitPlatform {
    type Surface = AppKitPanel;

    fn primary_work_area(&self) -> Option<Rect> {
        NSScreen::mainScreen(self.mtm).map(|screen| from_ns_rect(screen.visibleFrame()))
    }

    #[allow(unused_unsafe)]
    fn create_surface(&self, frame: Rect, style: &PanelStyle) -> AppKitPanel {
        let panel = KeyablePanel::new(self.mtm, to_ns_rect(frame), style_mask(style.chrome));
        let chrome = style.chrome;

        unsafe {
            panel.setReleasedWhenClosed(false);
            // NSPanel hides itself when the app deactivates unless told otherwise.
            panel.setHidesOnDeactivate(false);
            panel.setFloatingPanel(style.level == WindowLevel::Floating);
            panel.setLevel(match style.level {
                WindowLevel::Floating => FLOATING_WINDOW_LEVEL,
                WindowLevel::Normal => NORMAL_WINDOW_LEVEL,
            });
            panel.setCollectionBehavior(collection_behavior(style.behavior));

            if chrome.contains(PanelChrome::TRANSPARENT) {
                panel.setOpaque(false);
                panel.setBackgroundColor(Some(&NSColor::clearColor()));
            }
            panel.setMovableByWindowBackground(chrome.contains(PanelChrome::MOVABLE_BY_BACKGROUND));
            panel.setHasShadow(chrome.contains(PanelChrome::SHADOW));
        }

        AppKitPanel {
            panel,
            mtm: self.mtm,
        }
    }
}

pub struct AppKitPanel {
    panel: Retained<KeyablePanel>,
    mtm: MainThreadMarker,
}

/// Dark appearance gets the HUD material, light the full-screen UI one.
/// Chosen once when the content is installed.
fn backdrop_material(mtm: MainThreadMarker) -> NSVisualEffectMaterial {
    let appearance = NSApplication::sharedApplication(mtm).effectiveAppearance();
    if appearance.name().to_string().contains("Dark") {
        NSVisualEffectMaterial::HUDWindow
    } else {
        NSVisualEffectMaterial::FullScreenUI
    }
}

impl AppKitPanel {
    /// Install `web_view` as the panel content below a `title_bar_height`
    /// strip showing `title`. The strip drags the window.
    #[allow(unused_unsafe)]
    pub fn install_content(&self, title: &str, title_bar_height: f64, web_view: &NSView) {
        let size = self.panel.frame().size;
        let bounds = NSRect::new(NSPoint::new(0.0, 0.0), size);
        let resizing =
            NSAutoresizingMaskOptions::ViewWidthSizable | NSAutoresizingMaskOptions::ViewHeightSizable;

        let backdrop =
            unsafe { NSVisualEffectView::initWithFrame(NSVisualEffectView::alloc(self.mtm), bounds) };
        unsafe {
            backdrop.setMaterial(backdrop_material(self.mtm));
            backdrop.setBlendingMode(NSVisualEffectBlendingMode::BehindWindow);
            backdrop.setState(NSVisualEffectState::Active);
            backdrop.setAutoresizingMask(resizing);

            // Bottom-left origin: the web view sits at y = 0 and stops short
            // of the top edge.
            let content_height = (size.height - title_bar_height).max(0.0);
            let content = NSRect::new(
                NSPoint::new(0.0, 0.0),
                NSSize::new(size.width, content_height),
            );
            web_view.setFrame(content);
            web_view.setAutoresizingMask(resizing);
            backdrop.addSubview(web_view);

            let label = NSTextField::labelWithString(&NSString::from_str(title), self.mtm);
            label.setFont(Some(&NSFont::systemFontOfSize_weight(
                TITLE_FONT_SIZE,
                NSFontWeightMedium,
            )));
            label.setTextColor(Some(&NSColor::secondaryLabelColor()));
            label.sizeToFit();
            let label_height = label.frame().size.height;
            label.setFrame(NSRect::new(
                NSPoint::new(
                    TITLE_INSET,
                    content_height + ((title_bar_height - label_height) / 2.0).max(0.0),
                ),
                NSSize::new((size.width - 2.0 * TITLE_INSET).max(0.0), label_height),
            ));
            label.setAutoresizingMask(
                NSAutoresizingMaskOptions::ViewWidthSizable
                    | NSAutoresizingMaskOptions::ViewMinYMargin,
            );
            backdrop.addSubview(&label);

            self.panel.setContentView(Some(&backdrop));
        }
    }
}

impl PanelSurface for AppKitPanel {
    fn alpha(&self) -> f64 {
        self.panel.alphaValue()
    }

    fn set_alpha(&self, alpha: f64) {
        self.panel.setAlphaValue(alpha);
    }

    fn animate_alpha(&self, target: f64, duration: Duration, on_complete: Box<dyn FnOnce()>) {
        let panel = self.panel.clone();
        let changes = RcBlock::new(move |context: NonNull<NSAnimationContext>| {
            let context = unsafe { context.as_ref() };
            context.setDuration(duration.as_secs_f64());
            panel.animator().setAlphaValue(target);
        });

        // Blocks are `Fn`; the completion must only run once.
        let on_complete = RefCell::new(Some(on_complete));
        let completion = RcBlock::new(move || {
            if let Some(done) = on_complete.borrow_mut().take() {
                done();
            }
        });

        unsafe {
            let _: () = msg_send![
                NSAnimationContext::class(),
                runAnimationGroup: &*changes,
                completionHandler: &*completion
            ];
        }
    }

    fn frame(&self) -> Rect {
        from_ns_rect(self.panel.frame())
    }

    fn set_frame(&self, frame: Rect, animate: bool) {
        self.panel
            .setFrame_display_animate(to_ns_rect(frame), true, animate);
    }

    fn bring_to_front(&self) {
        self.panel.makeKeyAndOrderFront(None);
    }

    fn order_out(&self) {
        self.panel.orderOut(None);
    }

    fn is_on_screen(&self) -> bool {
        self.panel.isVisible()
    }
}
