use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use url::Url;

/// Which website data store the embedded browser uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStore {
    /// The engine's default on-disk store; logins survive restarts.
    Persistent,
    /// In-memory store discarded on exit.
    Ephemeral,
}

/// Immutable browser settings, consumed once when the engine is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub javascript_enabled: bool,
    pub data_store: DataStore,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        BrowserConfig {
            javascript_enabled: true,
            data_store: DataStore::Persistent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NavigationEvent {
    Started,
    Failed { error: String },
    Finished { url: Option<String> },
}

impl NavigationEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NavigationEvent::Started)
    }
}

/// Receives navigation lifecycle events. Purely observational.
pub trait NavigationObserver {
    fn on_navigation(&self, event: &NavigationEvent);
}

/// Logs every navigation event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl NavigationObserver for LoggingObserver {
    fn on_navigation(&self, event: &NavigationEvent) {
        match event {
            NavigationEvent::Started => log::info!("Started loading"),
            NavigationEvent::Failed { error } => log::warn!("Failed to load: {}", error),
            NavigationEvent::Finished { url } => log::info!(
                "Finished loading {}",
                url.as_deref().unwrap_or("<no url>")
            ),
        }
    }
}

/// Maximum number of navigation events kept for diagnostics.
const MAX_HISTORY: usize = 64;

#[derive(Default)]
struct HistoryInner {
    events: VecDeque<NavigationEvent>,
    finished: usize,
    failed: usize,
}

/// Bounded record of recent navigation events.
///
/// Clones share the same record, so one copy can be registered as an
/// observer while another is kept for inspection.
#[derive(Clone, Default)]
pub struct NavigationHistory {
    inner: Rc<RefCell<HistoryInner>>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.inner.borrow().events.iter().cloned().collect()
    }

    pub fn finished_count(&self) -> usize {
        self.inner.borrow().finished
    }

    pub fn failed_count(&self) -> usize {
        self.inner.borrow().failed
    }

    pub fn last(&self) -> Option<NavigationEvent> {
        self.inner.borrow().events.back().cloned()
    }

    /// Log the totals of the session, typically at shutdown.
    pub fn log_summary(&self) {
        log::info!(
            "Navigation summary: {} finished, {} failed",
            self.finished_count(),
            self.failed_count()
        );
        if let Some(last) = self.last() {
            log::debug!("Last navigation event: {:?}", last);
        }
    }
}

impl NavigationObserver for NavigationHistory {
    fn on_navigation(&self, event: &NavigationEvent) {
        let mut inner = self.inner.borrow_mut();
        match event {
            NavigationEvent::Finished { .. } => inner.finished += 1,
            NavigationEvent::Failed { .. } => inner.failed += 1,
            NavigationEvent::Started => {}
        }
        if inner.events.len() == MAX_HISTORY {
            inner.events.pop_front();
        }
        inner.events.push_back(event.clone());
    }
}

/// Identifies one navigation within an engine.
///
/// WebKit on macOS hands out a `WKNavigation` object per load, and its
/// address serves as the id. Engines without a per-load handle number their
/// loads with [`SequentialLoads`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigationId(pub u64);

/// Ended navigations remembered for dropping late terminal events.
const MAX_ENDED: usize = 16;

struct SinkInner {
    /// Navigations that already reported their terminal event, oldest first.
    ended: RefCell<VecDeque<NavigationId>>,
    observers: Vec<Box<dyn NavigationObserver>>,
}

/// Where engines report native navigation callbacks.
///
/// Guarantees one terminal event per navigation. A second "failed" or
/// "finished" for a navigation that already ended is dropped, while other
/// navigations in flight at the same time are unaffected.
#[derive(Clone)]
pub struct NavigationSink {
    inner: Rc<SinkInner>,
}

impl NavigationSink {
    pub fn new(observers: Vec<Box<dyn NavigationObserver>>) -> Self {
        NavigationSink {
            inner: Rc::new(SinkInner {
                ended: RefCell::new(VecDeque::new()),
                observers,
            }),
        }
    }

    pub fn emit(&self, id: NavigationId, event: NavigationEvent) {
        {
            let mut ended = self.inner.ended.borrow_mut();
            if event.is_terminal() {
                if ended.contains(&id) {
                    log::debug!("Ignoring {:?} after navigation {:?} already ended", event, id);
                    return;
                }
                if ended.len() == MAX_ENDED {
                    ended.pop_front();
                }
                ended.push_back(id);
            } else {
                // Recycled id: a fresh navigation.
                ended.retain(|done| *done != id);
            }
        }
        for observer in &self.inner.observers {
            observer.on_navigation(&event);
        }
    }
}

/// Numbers the loads of an engine that has no per-load handle and reports
/// them in order (WebKitGTK).
///
/// WebKitGTK follows every "failed" signal with a "finished" for the same
/// load. That trailing signal is attributed to the failed load; any other
/// terminal signal belongs to the oldest load still outstanding.
#[derive(Debug, Default)]
pub struct SequentialLoads {
    next: Cell<u64>,
    outstanding: RefCell<VecDeque<NavigationId>>,
    trailing: Cell<Option<NavigationId>>,
}

impl SequentialLoads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> NavigationId {
        let id = self.allocate();
        self.outstanding.borrow_mut().push_back(id);
        id
    }

    pub fn failed(&self) -> NavigationId {
        let id = self.take_oldest();
        self.trailing.set(Some(id));
        id
    }

    pub fn finished(&self) -> NavigationId {
        match self.trailing.take() {
            Some(id) => id,
            None => self.take_oldest(),
        }
    }

    fn take_oldest(&self) -> NavigationId {
        if let Some(id) = self.outstanding.borrow_mut().pop_front() {
            return id;
        }
        // Terminal signal without a start: give it an id of its own.
        self.allocate()
    }

    fn allocate(&self) -> NavigationId {
        let id = NavigationId(self.next.get());
        self.next.set(id.0 + 1);
        id
    }
}

/// An embedded browser surface supplied by a platform frontend.
pub trait BrowserEngine: Sized {
    /// Whatever the toolkit needs to build a view (e.g. a main-thread token).
    type Context;

    /// Build the surface from `config` and route its navigation callbacks
    /// into `sink`.
    fn build(context: &Self::Context, config: &BrowserConfig, sink: NavigationSink) -> Self;

    fn load(&self, url: &Url);
}

/// One embedded page pointed at a fixed URL.
pub struct BrowserHost<E: BrowserEngine> {
    engine: E,
    target: Url,
}

impl<E: BrowserEngine> BrowserHost<E> {
    /// Build the engine and issue the single load for `target`.
    pub fn open(
        context: &E::Context,
        config: &BrowserConfig,
        target: Url,
        observers: Vec<Box<dyn NavigationObserver>>,
    ) -> Self {
        let sink = NavigationSink::new(observers);
        let engine = E::build(context, config, sink);
        log::info!("Loading {}", target);
        engine.load(&target);
        BrowserHost { engine, target }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn target(&self) -> &Url {
        &self.target
    }
}
