use gtk4::gdk;

const PANEL_CSS: &str = r#"
    window.grok-panel {
        background: transparent;
    }

    .grok-panel-frame {
        background-color: rgba(20, 20, 22, 0.92);
        border-radius: 12px;
    }

    .grok-panel-titlebar {
        min-height: 28px;
        padding: 0 12px;
    }

    .grok-panel-title {
        font-size: 13px;
        font-weight: 500;
        color: alpha(white, 0.8);
    }
"#;

/// Install the panel stylesheet on the default display.
pub fn load_css() {
    let Some(display) = gdk::Display::default() else {
        log::warn!("No default display, skipping panel CSS");
        return;
    };
    let provider = gtk4::CssProvider::new();
    provider.load_from_string(PANEL_CSS);
    gtk4::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
