//! Contracts between a chart and the environment that draws it.

use charts_core::{ControllerLookup, ResolvedConfig};

use crate::config::ExtensionDescriptor;
use crate::RenderResult;

/// A chart instance created by the rendering library.
pub trait RenderedChart {
    /// Release the instance. Called at most once.
    fn destroy(&mut self);

    /// Re-fit the instance to its surface.
    fn resize(&mut self);

    /// Capture the drawn visual as a `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot produce an image.
    fn capture(&self) -> RenderResult<String>;
}

/// The rendering library.
///
/// Controller queries go through [`ControllerLookup`] so type resolution
/// sees what is registered at render time.
pub trait RenderBackend: ControllerLookup {
    /// Drawing target handed to [`RenderBackend::create`].
    type Surface: HostSurface;

    /// Whether the library entry point is present.
    fn is_available(&self) -> bool;

    /// Create a chart instance on `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if the library rejects the configuration.
    fn create(
        &self,
        surface: &Self::Surface,
        config: &ResolvedConfig,
    ) -> RenderResult<Box<dyn RenderedChart>>;

    /// Register a loaded extension with the library.
    ///
    /// # Errors
    ///
    /// Returns an error if the library refuses the extension.
    fn register(&self, extension: &ExtensionDescriptor) -> RenderResult<()>;
}

/// The element a chart draws into.
pub trait HostSurface {
    /// Whether the element can be drawn on.
    fn is_drawable(&self) -> bool;

    /// Set the element's accessible name.
    fn set_accessibility_label(&self, label: &str);

    /// Subscribe to size changes. Returns `None` when the host cannot
    /// report them.
    fn observe_size(&self, on_resize: Box<dyn Fn()>) -> Option<ObserverGuard>;
}

/// Keeps a size subscription alive; dropping it disconnects.
pub struct ObserverGuard {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl ObserverGuard {
    /// Wrap a disconnect action.
    #[must_use]
    pub fn new(disconnect: impl FnOnce() + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl std::fmt::Debug for ObserverGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverGuard")
            .field("connected", &self.disconnect.is_some())
            .finish()
    }
}
