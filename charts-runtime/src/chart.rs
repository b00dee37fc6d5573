//! Chart lifecycle: render, mutate, resize, export, destroy.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use charts_core::{
    resolve_config, ChartSpec, ChartType, DatasetSpec, InteractionHooks, ResolvedConfig, Theme,
};
use serde_json::Value;
use uuid::Uuid;

use crate::backend::{HostSurface, ObserverGuard, RenderBackend, RenderedChart};
use crate::config::RuntimeConfig;
use crate::ready::{ScriptLoader, Timer};
use crate::registry::ExtensionRegistry;
use crate::{ChartError, ChartResult, ExportedImage};

type InstanceSlot = Rc<RefCell<Option<Box<dyn RenderedChart>>>>;

/// Everything charts share: backend, registry, timer and settings.
pub struct ChartRuntime<B: RenderBackend> {
    backend: Rc<B>,
    registry: ExtensionRegistry,
    timer: Rc<dyn Timer>,
    config: Rc<RuntimeConfig>,
}

impl<B: RenderBackend> Clone for ChartRuntime<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
            registry: self.registry.clone(),
            timer: Rc::clone(&self.timer),
            config: Rc::clone(&self.config),
        }
    }
}

impl<B: RenderBackend> ChartRuntime<B> {
    /// Create a runtime with a fresh registry.
    #[must_use]
    pub fn new(
        backend: B,
        loader: Rc<dyn ScriptLoader>,
        timer: Rc<dyn Timer>,
        config: RuntimeConfig,
    ) -> Self {
        let registry = ExtensionRegistry::new(&config, loader);
        Self {
            backend: Rc::new(backend),
            registry,
            timer,
            config: Rc::new(config),
        }
    }

    /// The rendering backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The shared extension registry.
    #[must_use]
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Runtime settings.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    async fn ready_library(&self) -> ChartResult<()> {
        self.registry
            .ensure_library(self.backend.as_ref(), self.timer.as_ref(), self.config.ready_timeout)
            .await
            .map_err(|e| ChartError::NotReady(e.to_string()))
    }

    async fn ready_extension(&self, name: &str) -> bool {
        self.registry
            .ensure_extension(
                name,
                self.backend.as_ref(),
                self.timer.as_ref(),
                self.config.ready_timeout,
            )
            .await
    }
}

/// A chart bound to one host surface.
///
/// Methods take `&self` so a chart can be shared with event callbacks;
/// no borrow is held across an await.
pub struct Chart<B: RenderBackend> {
    id: Uuid,
    runtime: ChartRuntime<B>,
    surface: B::Surface,
    spec: RefCell<ChartSpec>,
    instance: InstanceSlot,
    observer: RefCell<Option<ObserverGuard>>,
    destroyed: Cell<bool>,
}

impl<B: RenderBackend> Chart<B> {
    /// Bind a chart to `surface`.
    ///
    /// Applies the accessibility label and subscribes to size changes.
    /// Nothing is drawn until [`Chart::render`].
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::InvalidTarget`] if the surface cannot be drawn on.
    pub fn new(
        runtime: ChartRuntime<B>,
        surface: B::Surface,
        spec: ChartSpec,
    ) -> ChartResult<Self> {
        if !surface.is_drawable() {
            return Err(ChartError::InvalidTarget(
                "surface has no drawing context".to_string(),
            ));
        }

        if let Some(label) = &spec.aria_label {
            surface.set_accessibility_label(label);
        }

        let instance: InstanceSlot = Rc::new(RefCell::new(None));
        let weak: Weak<RefCell<Option<Box<dyn RenderedChart>>>> = Rc::downgrade(&instance);
        let observer = surface.observe_size(Box::new(move || {
            if let Some(slot) = weak.upgrade() {
                if let Some(rendered) = slot.borrow_mut().as_mut() {
                    rendered.resize();
                }
            }
        }));

        let id = Uuid::new_v4();
        tracing::debug!("Created {} chart {}", spec.chart_type, id);

        Ok(Self {
            id,
            runtime,
            surface,
            spec: RefCell::new(spec),
            instance,
            observer: RefCell::new(observer),
            destroyed: Cell::new(false),
        })
    }

    /// Unique chart id.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// A copy of the current spec.
    #[must_use]
    pub fn spec(&self) -> ChartSpec {
        self.spec.borrow().clone()
    }

    /// The host surface.
    #[must_use]
    pub fn surface(&self) -> &B::Surface {
        &self.surface
    }

    /// Whether [`Chart::destroy`] has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Whether a rendered instance exists.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.instance.borrow().is_some()
    }

    /// The configuration the next render would use.
    #[must_use]
    pub fn resolved_config(&self) -> ResolvedConfig {
        resolve_config(&self.spec.borrow(), self.runtime.backend.as_ref())
    }

    fn ensure_alive(&self) -> ChartResult<()> {
        if self.destroyed.get() {
            Err(ChartError::Destroyed(self.id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Draw the chart, replacing any previous instance.
    ///
    /// Waits for the rendering library and any extension the chart type
    /// needs. An extension that fails to load makes the chart fall back to
    /// a built-in type.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Destroyed`] after destroy,
    /// [`ChartError::NotReady`] if the library does not load in time, or
    /// [`ChartError::Render`] if the backend rejects the configuration.
    pub async fn render(&self) -> ChartResult<()> {
        self.ensure_alive()?;
        self.runtime.ready_library().await?;

        for plugin in self.runtime.registry.plugin_names() {
            self.runtime.ready_extension(&plugin).await;
        }
        let chart_type = self.spec.borrow().chart_type;
        if let Some(extension) = chart_type.required_extension() {
            self.runtime.ready_extension(extension).await;
        }

        // Destroy may have run while waiting.
        self.ensure_alive()?;

        let config = self.resolved_config();
        if config.resolved_type.fell_back {
            tracing::warn!(
                "Chart {} falling back to '{}' for {}",
                self.id,
                config.tag(),
                chart_type
            );
        }

        self.release_instance();
        let rendered = self.runtime.backend.create(&self.surface, &config)?;
        *self.instance.borrow_mut() = Some(rendered);
        tracing::debug!("Rendered chart {} as '{}'", self.id, config.tag());
        Ok(())
    }

    async fn update<F>(&self, change: F) -> ChartResult<()>
    where
        F: FnOnce(&mut ChartSpec),
    {
        self.ensure_alive()?;
        change(&mut *self.spec.borrow_mut());
        self.render().await
    }

    /// Append a dataset and re-render.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn add_dataset(&self, dataset: DatasetSpec) -> ChartResult<()> {
        self.update(|spec| spec.datasets.push(dataset)).await
    }

    /// Remove the dataset at `index` and re-render.
    ///
    /// Returns `false` without re-rendering when `index` is out of range.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn remove_dataset(&self, index: usize) -> ChartResult<bool> {
        self.ensure_alive()?;
        let len = self.spec.borrow().datasets.len();
        if index >= len {
            tracing::debug!("remove_dataset: index {} out of range ({} datasets)", index, len);
            return Ok(false);
        }
        self.update(|spec| {
            spec.datasets.remove(index);
        })
        .await?;
        Ok(true)
    }

    /// Replace the data of the dataset at `index` and re-render.
    ///
    /// Returns `false` without re-rendering when `index` is out of range.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn update_dataset_data(&self, index: usize, data: Vec<Value>) -> ChartResult<bool> {
        self.ensure_alive()?;
        let len = self.spec.borrow().datasets.len();
        if index >= len {
            tracing::debug!(
                "update_dataset_data: index {} out of range ({} datasets)",
                index,
                len
            );
            return Ok(false);
        }
        self.update(|spec| spec.datasets[index].data = data).await?;
        Ok(true)
    }

    /// Replace the labels and re-render.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn set_labels(&self, labels: Vec<String>) -> ChartResult<()> {
        self.update(|spec| spec.labels = labels).await
    }

    /// Switch between dark and light and re-render.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn toggle_theme(&self) -> ChartResult<()> {
        self.update(|spec| spec.theme = spec.theme.toggled()).await
    }

    /// Set the theme and re-render.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn set_theme(&self, theme: Theme) -> ChartResult<()> {
        self.update(|spec| spec.theme = theme).await
    }

    /// Change the chart type and re-render.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn set_type(&self, chart_type: ChartType) -> ChartResult<()> {
        self.update(|spec| spec.chart_type = chart_type).await
    }

    /// Change the title and re-render.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn set_title(&self, title: impl Into<String>) -> ChartResult<()> {
        let title = title.into();
        self.update(|spec| spec.title_text = title).await
    }

    /// Replace the option overrides and re-render.
    ///
    /// # Errors
    ///
    /// See [`Chart::render`].
    pub async fn set_options(&self, options: Value) -> ChartResult<()> {
        self.update(|spec| spec.options = options).await
    }

    /// Replace the interaction callbacks. Takes effect on the next render.
    pub fn set_hooks(&self, hooks: InteractionHooks) {
        self.spec.borrow_mut().hooks = hooks;
    }

    /// Update the host's accessible name without re-rendering.
    pub fn set_accessibility_label(&self, label: &str) {
        self.surface.set_accessibility_label(label);
        self.spec.borrow_mut().aria_label = Some(label.to_string());
    }

    /// Re-fit the rendered instance to its surface. No-op before render.
    pub fn resize(&self) {
        if let Some(rendered) = self.instance.borrow_mut().as_mut() {
            rendered.resize();
        }
    }

    /// Capture the rendered chart as a PNG.
    ///
    /// An empty or missing `filename` uses the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::NotRendered`] before the first render, or
    /// [`ChartError::Export`] if the capture cannot be decoded.
    pub fn export(&self, filename: Option<&str>) -> ChartResult<ExportedImage> {
        self.ensure_alive()?;
        let filename = filename
            .filter(|name| !name.is_empty())
            .unwrap_or(self.runtime.config.default_export_filename.as_str());

        let data_url = self
            .instance
            .borrow()
            .as_ref()
            .ok_or(ChartError::NotRendered)?
            .capture()?;
        ExportedImage::from_data_url(&data_url, filename)
    }

    fn release_instance(&self) {
        let previous = self.instance.borrow_mut().take();
        if let Some(mut rendered) = previous {
            rendered.destroy();
        }
    }

    /// Release the rendered instance and stop observing size changes.
    ///
    /// Safe to call repeatedly.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.observer.borrow_mut().take();
        self.release_instance();
        tracing::debug!("Destroyed chart {}", self.id);
    }
}

impl<B: RenderBackend> Drop for Chart<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<B: RenderBackend> fmt::Debug for Chart<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("id", &self.id)
            .field("chart_type", &self.spec.borrow().chart_type)
            .field("rendered", &self.is_rendered())
            .field("destroyed", &self.destroyed.get())
            .finish_non_exhaustive()
    }
}
