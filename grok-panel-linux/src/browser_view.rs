use std::rc::Rc;

use gtk4::gdk;
use url::Url;
use webkit6::prelude::*;

use grok_panel_core::{
    paths, BrowserConfig, BrowserEngine, DataStore, NavigationEvent, NavigationSink,
    SequentialLoads,
};

/// A WebKitGTK view reporting its load lifecycle to a [`NavigationSink`].
pub struct WebKitView {
    webview: webkit6::WebView,
}

impl WebKitView {
    pub fn widget(&self) -> &webkit6::WebView {
        &self.webview
    }
}

fn network_session(store: DataStore) -> webkit6::NetworkSession {
    match store {
        DataStore::Ephemeral => webkit6::NetworkSession::new_ephemeral(),
        DataStore::Persistent => {
            let data_dir = paths::web_data_dir();
            let cache_dir = paths::web_cache_dir();
            log::debug!(
                "Web data in {:?}, cache in {:?}",
                data_dir.as_deref(),
                cache_dir.as_deref()
            );
            webkit6::NetworkSession::new(
                data_dir.as_deref().and_then(|p| p.to_str()),
                cache_dir.as_deref().and_then(|p| p.to_str()),
            )
        }
    }
}

impl BrowserEngine for WebKitView {
    type Context = ();

    fn build(_context: &(), config: &BrowserConfig, sink: NavigationSink) -> Self {
        let session = network_session(config.data_store);
        let webview = webkit6::WebView::builder()
            .network_session(&session)
            .hexpand(true)
            .vexpand(true)
            .build();

        // Let the panel's rounded frame show through until the page paints.
        webview.set_background_color(&gdk::RGBA::new(0.0, 0.0, 0.0, 0.0));

        if let Some(wk_settings) = webkit6::prelude::WebViewExt::settings(&webview) {
            wk_settings.set_enable_javascript(config.javascript_enabled);
        }

        // WebKitGTK has no per-load handle; loads are numbered as they start.
        let loads = Rc::new(SequentialLoads::new());

        let load_sink = sink.clone();
        let changed_loads = loads.clone();
        webview.connect_load_changed(move |view, event| match event {
            webkit6::LoadEvent::Started => {
                load_sink.emit(changed_loads.started(), NavigationEvent::Started)
            }
            webkit6::LoadEvent::Finished => load_sink.emit(
                changed_loads.finished(),
                NavigationEvent::Finished {
                    url: view.uri().map(|uri| uri.to_string()),
                },
            ),
            _ => {}
        });

        webview.connect_load_failed(move |_view, _event, failing_uri, error| {
            log::debug!("Load of {} failed", failing_uri);
            sink.emit(
                loads.failed(),
                NavigationEvent::Failed {
                    error: error.message().to_string(),
                },
            );
            // Let WebKit show its own error page.
            false
        });

        WebKitView { webview }
    }

    fn load(&self, url: &Url) {
        self.webview.load_uri(url.as_str());
    }
}
