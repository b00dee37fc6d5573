//! Shared extension registry.
//!
//! One registry is shared by every chart created through a
//! [`ChartRuntime`](crate::ChartRuntime). Each script source is fetched at
//! most once no matter how many charts ask for it concurrently, and each
//! extension is registered with the backend at most once. A caller whose
//! deadline passes stops waiting but leaves the load running; later callers
//! join it instead of fetching the script again.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;

use crate::config::{ExtensionDescriptor, ExtensionKind, RuntimeConfig, LIBRARY_GLOBAL};
use crate::ready::{with_deadline, ScriptLoader, Timer};
use crate::{LoadError, RenderBackend, RenderResult};

/// Load progress of a script source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Never requested.
    NotLoaded,
    /// A load is in flight.
    Loading,
    /// Loaded successfully.
    Loaded,
    /// Loading failed; the reason is kept.
    Failed(String),
}

type SharedLoad = Shared<LocalBoxFuture<'static, Result<(), LoadError>>>;

/// One script source. The load future is created once and shared by every
/// waiter, so a waiter that gives up never cancels or restarts it.
struct SourceSlot {
    source: String,
    load: RefCell<Option<SharedLoad>>,
    outcome: Rc<RefCell<Option<Result<(), LoadError>>>>,
}

impl SourceSlot {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            load: RefCell::new(None),
            outcome: Rc::new(RefCell::new(None)),
        }
    }

    fn state(&self) -> LoadState {
        match self.outcome.borrow().as_ref() {
            Some(Ok(())) => LoadState::Loaded,
            Some(Err(e)) => LoadState::Failed(e.to_string()),
            None if self.load.borrow().is_some() => LoadState::Loading,
            None => LoadState::NotLoaded,
        }
    }
}

struct Inner {
    loader: Rc<dyn ScriptLoader>,
    library: SourceSlot,
    catalog: HashMap<String, ExtensionDescriptor>,
    sources: HashMap<String, Rc<SourceSlot>>,
    registered: RefCell<HashSet<String>>,
}

/// Handle to the shared registry. Clones share state.
#[derive(Clone)]
pub struct ExtensionRegistry {
    inner: Rc<Inner>,
}

impl ExtensionRegistry {
    /// Build a registry over the catalog in `config`.
    #[must_use]
    pub fn new(config: &RuntimeConfig, loader: Rc<dyn ScriptLoader>) -> Self {
        let mut sources: HashMap<String, Rc<SourceSlot>> = HashMap::new();
        let mut catalog = HashMap::new();
        for descriptor in &config.extensions {
            sources
                .entry(descriptor.source.clone())
                .or_insert_with(|| Rc::new(SourceSlot::new(&descriptor.source)));
            catalog.insert(descriptor.name.clone(), descriptor.clone());
        }

        Self {
            inner: Rc::new(Inner {
                loader,
                library: SourceSlot::new(&config.library_source),
                catalog,
                sources,
                registered: RefCell::new(HashSet::new()),
            }),
        }
    }

    /// Catalog entry for `name`.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&ExtensionDescriptor> {
        self.inner.catalog.get(name)
    }

    /// Names of plugin extensions, loaded for every chart.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .catalog
            .values()
            .filter(|d| d.kind == ExtensionKind::Plugin)
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Load state of an extension's source. Unknown names report `NotLoaded`.
    #[must_use]
    pub fn state(&self, name: &str) -> LoadState {
        match self.slot(name) {
            Some(slot) => slot.state(),
            None => LoadState::NotLoaded,
        }
    }

    /// Load state of the rendering library.
    #[must_use]
    pub fn library_state(&self) -> LoadState {
        self.inner.library.state()
    }

    /// Whether `name` has been registered with the backend.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.registered.borrow().contains(name)
    }

    fn slot(&self, name: &str) -> Option<&Rc<SourceSlot>> {
        let descriptor = self.inner.catalog.get(name)?;
        self.inner.sources.get(&descriptor.source)
    }

    fn load_slot(&self, slot: &SourceSlot) -> SharedLoad {
        if let Some(load) = slot.load.borrow().clone() {
            return load;
        }
        let loader = Rc::clone(&self.inner.loader);
        let source = slot.source.clone();
        let outcome = Rc::clone(&slot.outcome);
        let load = async move {
            tracing::info!("Loading script {}", source);
            let result = loader.load(&source).await;
            match &result {
                Ok(()) => tracing::info!("Loaded script {}", source),
                Err(e) => tracing::warn!("Script {} failed to load: {}", source, e),
            }
            *outcome.borrow_mut() = Some(result.clone());
            result
        }
        .boxed_local()
        .shared();
        *slot.load.borrow_mut() = Some(load.clone());
        load
    }

    /// Load an extension's source, or return the outcome of the earlier load.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not in the catalog or its source failed.
    pub async fn load_or_get(&self, name: &str) -> Result<(), LoadError> {
        let load = self
            .slot(name)
            .map(|slot| self.load_slot(slot))
            .ok_or_else(|| LoadError::UnknownExtension(name.to_string()))?;
        load.await
    }

    /// Register a loaded extension with `backend` unless already done.
    ///
    /// Returns `true` when this call performed the registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the extension.
    pub fn register_once<B: RenderBackend + ?Sized>(
        &self,
        name: &str,
        backend: &B,
    ) -> RenderResult<bool> {
        if self.is_registered(name) {
            return Ok(false);
        }
        let Some(descriptor) = self.descriptor(name) else {
            return Ok(false);
        };
        backend.register(descriptor)?;
        self.inner.registered.borrow_mut().insert(name.to_string());
        tracing::info!("Registered extension '{}'", name);
        Ok(true)
    }

    /// Make the rendering library available, loading it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the load fails, the deadline passes, or the
    /// library entry point is still missing afterwards.
    pub async fn ensure_library<B: RenderBackend + ?Sized>(
        &self,
        backend: &B,
        timer: &dyn Timer,
        timeout: Duration,
    ) -> Result<(), LoadError> {
        if backend.is_available() {
            return Ok(());
        }
        let library = &self.inner.library;
        with_deadline(self.load_slot(library), timeout, timer)
            .await
            .ok_or_else(|| LoadError::TimedOut(library.source.clone()))??;

        if backend.is_available() {
            Ok(())
        } else {
            Err(LoadError::Failed {
                source_url: library.source.clone(),
                reason: format!("global '{LIBRARY_GLOBAL}' missing after load"),
            })
        }
    }

    /// Load and register an extension within `timeout`.
    ///
    /// Failures are logged and reported as `false`; callers fall back to a
    /// built-in chart type.
    pub async fn ensure_extension<B: RenderBackend + ?Sized>(
        &self,
        name: &str,
        backend: &B,
        timer: &dyn Timer,
        timeout: Duration,
    ) -> bool {
        let Some(descriptor) = self.descriptor(name) else {
            tracing::warn!("Extension '{}' is not in the catalog", name);
            return false;
        };
        if descriptor.kind == ExtensionKind::Controller
            && !descriptor.controllers.is_empty()
            && descriptor.controllers.iter().all(|c| backend.has_controller(c))
        {
            return true;
        }

        match with_deadline(self.load_or_get(name), timeout, timer).await {
            None => {
                tracing::warn!("Extension '{}' did not load within {:?}", name, timeout);
                false
            }
            Some(Err(e)) => {
                tracing::warn!("Extension '{}' unavailable: {}", name, e);
                false
            }
            Some(Ok(())) => match self.register_once(name, backend) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!("{}", e);
                    false
                }
            },
        }
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("library", &self.inner.library.state())
            .field("extensions", &self.inner.catalog.len())
            .field("registered", &self.inner.registered.borrow().len())
            .finish_non_exhaustive()
    }
}
