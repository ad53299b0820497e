use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadMarker, MainThreadOnly};
use objc2_foundation::{NSError, NSObject, NSObjectProtocol, NSRect, NSString, NSURLRequest, NSURL};
use objc2_web_kit::{
    WKNavigation, WKNavigationDelegate, WKWebView, WKWebViewConfiguration, WKWebsiteDataStore,
};
use url::Url;

use grok_panel_core::{
    BrowserConfig, BrowserEngine, DataStore, NavigationEvent, NavigationId, NavigationSink,
};

/// WebKit passes one `WKNavigation` per load; its address identifies the load.
/// Some callbacks pass nil, and those share id 0.
fn navigation_id(navigation: Option<&WKNavigation>) -> NavigationId {
    NavigationId(navigation.map_or(0, |navigation| {
        navigation as *const WKNavigation as usize as u64
    }))
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "GrokPanelNavigationDelegate"]
    #[ivars = NavigationSink]
    struct NavigationDelegate;

    unsafe impl NSObjectProtocol for NavigationDelegate {}

    unsafe impl WKNavigationDelegate for NavigationDelegate {
        #[unsafe(method(webView:didStartProvisionalNavigation:))]
        fn did_start_provisional_navigation(
            &self,
            _web_view: &WKWebView,
            navigation: Option<&WKNavigation>,
        ) {
            self.ivars().emit(navigation_id(navigation), NavigationEvent::Started);
        }

        #[unsafe(method(webView:didFailProvisionalNavigation:withError:))]
        fn did_fail_provisional_navigation(
            &self,
            _web_view: &WKWebView,
            navigation: Option<&WKNavigation>,
            error: &NSError,
        ) {
            self.report_failure(navigation, error);
        }

        #[unsafe(method(webView:didFailNavigation:withError:))]
        fn did_fail_navigation(
            &self,
            _web_view: &WKWebView,
            navigation: Option<&WKNavigation>,
            error: &NSError,
        ) {
            self.report_failure(navigation, error);
        }

        #[unsafe(method(webView:didFinishNavigation:))]
        fn did_finish_navigation(&self, web_view: &WKWebView, navigation: Option<&WKNavigation>) {
            let url = unsafe { web_view.URL() }
                .and_then(|url| url.absoluteString())
                .map(|url| url.to_string());
            self.ivars().emit(navigation_id(navigation), NavigationEvent::Finished { url });
        }
    }
);

impl NavigationDelegate {
    fn new(mtm: MainThreadMarker, sink: NavigationSink) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(sink);
        unsafe { msg_send![super(this), init] }
    }

    fn report_failure(&self, navigation: Option<&WKNavigation>, error: &NSError) {
        log::debug!("WebKit navigation error: {:?}", error);
        self.ivars().emit(
            navigation_id(navigation),
            NavigationEvent::Failed {
                error: error.localizedDescription().to_string(),
            },
        );
    }
}

/// A `WKWebView` plus the delegate feeding its navigation callbacks into a
/// [`NavigationSink`].
pub struct WebKitView {
    web_view: Retained<WKWebView>,
    // WKWebView only holds its navigation delegate weakly.
    _delegate: Retained<NavigationDelegate>,
}

impl WebKitView {
    pub fn view(&self) -> &WKWebView {
        &self.web_view
    }
}

impl BrowserEngine for WebKitView {
    type Context = MainThreadMarker;

    #[allow(unused_unsafe)]
    fn build(mtm: &MainThreadMarker, config: &BrowserConfig, sink: NavigationSink) -> Self {
        let mtm = *mtm;
        let configuration = unsafe { WKWebViewConfiguration::new(mtm) };
        unsafe {
            let store = match config.data_store {
                DataStore::Persistent => WKWebsiteDataStore::defaultDataStore(mtm),
                DataStore::Ephemeral => WKWebsiteDataStore::nonPersistentDataStore(mtm),
            };
            configuration.setWebsiteDataStore(&store);
            configuration
                .defaultWebpagePreferences()
                .setAllowsContentJavaScript(config.javascript_enabled);
        }

        let web_view = unsafe {
            WKWebView::initWithFrame_configuration(WKWebView::alloc(mtm), NSRect::ZERO, &configuration)
        };
        let delegate = NavigationDelegate::new(mtm, sink);
        unsafe {
            web_view.setNavigationDelegate(Some(ProtocolObject::from_ref(&*delegate)));
        }

        WebKitView {
            web_view,
            _delegate: delegate,
        }
    }

    #[allow(unused_unsafe)]
    fn load(&self, url: &Url) {
        let Some(ns_url) = (unsafe { NSURL::URLWithString(&NSString::from_str(url.as_str())) })
        else {
            log::warn!("NSURL rejected {}", url);
            return;
        };
        let request = unsafe { NSURLRequest::requestWithURL(&ns_url) };
        let _navigation = unsafe { self.web_view.loadRequest(&request) };
    }
}
