//! Test doubles for the rendering environment.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use charts_core::{ControllerLookup, ResolvedConfig};
use charts_runtime::{
    ChartRuntime, ExtensionDescriptor, HostSurface, LoadError, ObserverGuard, RenderBackend,
    RenderError, RenderResult, RenderedChart, RuntimeConfig, ScriptLoader, TokioTimer,
};
use serde_json::Value;

pub const LIBRARY: &str = "lib/chart.js";
pub const PIXEL_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Counters shared between the backend and the instances it creates.
#[derive(Default)]
pub struct Counters {
    pub created: Cell<usize>,
    pub destroyed: Cell<usize>,
    pub resized: Cell<usize>,
    pub configs: RefCell<Vec<Value>>,
}

impl Counters {
    pub fn live(&self) -> usize {
        self.created.get() - self.destroyed.get()
    }

    pub fn last_config(&self) -> Value {
        self.configs.borrow().last().cloned().expect("a config was rendered")
    }
}

pub struct MockInstance {
    counters: Rc<Counters>,
    released: bool,
    capture: String,
}

impl RenderedChart for MockInstance {
    fn destroy(&mut self) {
        assert!(!self.released, "instance destroyed twice");
        self.released = true;
        self.counters.destroyed.set(self.counters.destroyed.get() + 1);
    }

    fn resize(&mut self) {
        assert!(!self.released, "resize reached a released instance");
        self.counters.resized.set(self.counters.resized.get() + 1);
    }

    fn capture(&self) -> RenderResult<String> {
        Ok(self.capture.clone())
    }
}

pub struct MockBackend {
    pub available: Rc<Cell<bool>>,
    pub controllers: RefCell<HashSet<String>>,
    pub registered: RefCell<Vec<String>>,
    pub counters: Rc<Counters>,
    pub capture: RefCell<String>,
    pub reject_create: Cell<bool>,
}

impl MockBackend {
    pub fn new(available: Rc<Cell<bool>>) -> Self {
        Self {
            available,
            controllers: RefCell::new(HashSet::new()),
            registered: RefCell::new(Vec::new()),
            counters: Rc::new(Counters::default()),
            capture: RefCell::new(PIXEL_URL.to_string()),
            reject_create: Cell::new(false),
        }
    }

    pub fn registrations(&self, name: &str) -> usize {
        self.registered.borrow().iter().filter(|n| *n == name).count()
    }
}

impl ControllerLookup for MockBackend {
    fn has_controller(&self, name: &str) -> bool {
        self.controllers.borrow().contains(name)
    }
}

impl RenderBackend for MockBackend {
    type Surface = MockSurface;

    fn is_available(&self) -> bool {
        self.available.get()
    }

    fn create(
        &self,
        surface: &MockSurface,
        config: &ResolvedConfig,
    ) -> RenderResult<Box<dyn RenderedChart>> {
        assert!(surface.drawable);
        if self.reject_create.get() {
            return Err(RenderError::Create("rejected".to_string()));
        }
        self.counters.created.set(self.counters.created.get() + 1);
        self.counters.configs.borrow_mut().push(config.to_value());
        Ok(Box::new(MockInstance {
            counters: Rc::clone(&self.counters),
            released: false,
            capture: self.capture.borrow().clone(),
        }))
    }

    fn register(&self, extension: &ExtensionDescriptor) -> RenderResult<()> {
        self.registered.borrow_mut().push(extension.name.clone());
        self.controllers
            .borrow_mut()
            .extend(extension.controllers.iter().cloned());
        Ok(())
    }
}

type ResizeCallback = Box<dyn Fn()>;

#[derive(Clone)]
pub struct MockSurface {
    pub drawable: bool,
    pub label: Rc<RefCell<Option<String>>>,
    pub on_resize: Rc<RefCell<Option<ResizeCallback>>>,
    pub disconnected: Rc<Cell<bool>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self {
            drawable: true,
            label: Rc::new(RefCell::new(None)),
            on_resize: Rc::new(RefCell::new(None)),
            disconnected: Rc::new(Cell::new(false)),
        }
    }

    pub fn detached() -> Self {
        Self {
            drawable: false,
            ..Self::new()
        }
    }

    /// Simulate the host changing size. Returns whether anyone was listening.
    pub fn fire_resize(&self) -> bool {
        match self.on_resize.borrow().as_ref() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl HostSurface for MockSurface {
    fn is_drawable(&self) -> bool {
        self.drawable
    }

    fn set_accessibility_label(&self, label: &str) {
        *self.label.borrow_mut() = Some(label.to_string());
    }

    fn observe_size(&self, on_resize: Box<dyn Fn()>) -> Option<ObserverGuard> {
        *self.on_resize.borrow_mut() = Some(on_resize);
        let slot = Rc::clone(&self.on_resize);
        let disconnected = Rc::clone(&self.disconnected);
        Some(ObserverGuard::new(move || {
            slot.borrow_mut().take();
            disconnected.set(true);
        }))
    }
}

/// Loader that records requests, waits `delay`, and can fail or hang.
pub struct MockLoader {
    pub requests: RefCell<Vec<String>>,
    pub delay: Duration,
    pub failing: HashSet<String>,
    pub hanging: HashSet<String>,
    pub library_flag: Rc<Cell<bool>>,
}

impl MockLoader {
    pub fn new(library_flag: Rc<Cell<bool>>) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            delay: Duration::from_millis(20),
            failing: HashSet::new(),
            hanging: HashSet::new(),
            library_flag,
        }
    }

    pub fn requests_for(&self, source: &str) -> usize {
        self.requests.borrow().iter().filter(|s| *s == source).count()
    }
}

#[async_trait(?Send)]
impl ScriptLoader for MockLoader {
    async fn load(&self, source: &str) -> Result<(), LoadError> {
        self.requests.borrow_mut().push(source.to_string());
        tokio::time::sleep(self.delay).await;
        if self.hanging.contains(source) {
            futures::future::pending::<()>().await;
        }
        if self.failing.contains(source) {
            return Err(LoadError::Failed {
                source_url: source.to_string(),
                reason: "404".to_string(),
            });
        }
        if source == LIBRARY {
            self.library_flag.set(true);
        }
        Ok(())
    }
}

pub fn config() -> RuntimeConfig {
    RuntimeConfig {
        library_source: LIBRARY.to_string(),
        ..RuntimeConfig::default()
    }
    .with_ready_timeout(Duration::from_secs(1))
}

pub fn source_of(config: &RuntimeConfig, name: &str) -> String {
    config.extension(name).expect("catalog entry").source.clone()
}

/// A runtime plus a handle to its loader.
pub fn runtime_with(
    config: RuntimeConfig,
    customize: impl FnOnce(&mut MockLoader),
) -> (ChartRuntime<MockBackend>, Rc<MockLoader>) {
    let flag = Rc::new(Cell::new(false));
    let mut loader = MockLoader::new(Rc::clone(&flag));
    customize(&mut loader);
    let loader = Rc::new(loader);
    let runtime = ChartRuntime::new(
        MockBackend::new(flag),
        Rc::clone(&loader) as Rc<dyn ScriptLoader>,
        Rc::new(TokioTimer),
        config,
    );
    (runtime, loader)
}

pub fn runtime() -> (ChartRuntime<MockBackend>, Rc<MockLoader>) {
    runtime_with(config(), |_| {})
}
