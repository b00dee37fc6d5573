//! Chart.js backend and canvas surface.

use charts_core::{
    ChartEvent, ChartEventKind, ControllerLookup, EventHandler, EventPoint, ResolvedConfig,
};
use charts_runtime::config::LIBRARY_GLOBAL;
use charts_runtime::{
    ExtensionDescriptor, HostSurface, ObserverGuard, RenderBackend, RenderError, RenderResult,
    RenderedChart,
};
use js_sys::{Array, Function, Reflect, JSON};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, ResizeObserver};

type PointerClosure = Closure<dyn FnMut(JsValue, JsValue)>;

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn global(name: &str) -> Option<JsValue> {
    let window = web_sys::window()?;
    Reflect::get(&window, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue, JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    method.apply(target, args)
}

fn number_field(value: &JsValue, name: &str) -> Option<f64> {
    Reflect::get(value, &JsValue::from_str(name))
        .ok()
        .as_ref()
        .and_then(JsValue::as_f64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn event_points(elements: &JsValue) -> Vec<EventPoint> {
    Array::from(elements)
        .iter()
        .filter_map(|element| {
            Some(EventPoint {
                dataset_index: number_field(&element, "datasetIndex")? as usize,
                index: number_field(&element, "index")? as usize,
            })
        })
        .collect()
}

fn pointer_closure(kind: ChartEventKind, handler: EventHandler) -> PointerClosure {
    Closure::wrap(Box::new(move |event: JsValue, elements: JsValue| {
        let chart_event = ChartEvent {
            kind,
            x: number_field(&event, "x").unwrap_or_default(),
            y: number_field(&event, "y").unwrap_or_default(),
            points: event_points(&elements),
        };
        handler(&chart_event);
    }) as Box<dyn FnMut(JsValue, JsValue)>)
}

/// Backend driving the `Chart` global installed by Chart.js.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsChartBackend;

impl JsChartBackend {
    fn library() -> RenderResult<JsValue> {
        global(LIBRARY_GLOBAL)
            .ok_or_else(|| RenderError::Unavailable(format!("window.{LIBRARY_GLOBAL} is missing")))
    }
}

impl ControllerLookup for JsChartBackend {
    fn has_controller(&self, name: &str) -> bool {
        let Ok(library) = Self::library() else {
            return false;
        };
        let Ok(registry) = Reflect::get(&library, &JsValue::from_str("registry")) else {
            return false;
        };
        // getController throws for unknown names.
        call_method(&registry, "getController", &Array::of1(&JsValue::from_str(name)))
            .is_ok_and(|controller| !controller.is_undefined())
    }
}

impl RenderBackend for JsChartBackend {
    type Surface = CanvasSurface;

    fn is_available(&self) -> bool {
        global(LIBRARY_GLOBAL).is_some()
    }

    fn create(
        &self,
        surface: &CanvasSurface,
        config: &ResolvedConfig,
    ) -> RenderResult<Box<dyn RenderedChart>> {
        let constructor: Function = Self::library()?.dyn_into().map_err(|_| {
            RenderError::Unavailable(format!("{LIBRARY_GLOBAL} is not a constructor"))
        })?;

        let js_config = JSON::parse(&config.to_value().to_string())
            .map_err(|e| RenderError::Create(describe(&e)))?;
        let options = Reflect::get(&js_config, &JsValue::from_str("options"))
            .map_err(|e| RenderError::Create(describe(&e)))?;

        let mut closures = Vec::new();
        let hooks = [
            ("onClick", ChartEventKind::Click, config.hooks.on_click.clone()),
            ("onHover", ChartEventKind::Hover, config.hooks.on_hover.clone()),
        ];
        for (key, kind, handler) in hooks {
            if let Some(handler) = handler {
                let closure = pointer_closure(kind, handler);
                Reflect::set(&options, &JsValue::from_str(key), closure.as_ref())
                    .map_err(|e| RenderError::Create(describe(&e)))?;
                closures.push(closure);
            }
        }

        let instance = Reflect::construct(
            &constructor,
            &Array::of2(surface.canvas.as_ref(), &js_config),
        )
        .map_err(|e| RenderError::Create(describe(&e)))?;

        Ok(Box::new(JsRenderedChart {
            instance,
            _closures: closures,
        }))
    }

    fn register(&self, extension: &ExtensionDescriptor) -> RenderResult<()> {
        // Controller bundles register themselves when their script runs.
        let Some(symbol) = &extension.global else {
            return Ok(());
        };
        let failed = |reason: String| RenderError::Register {
            name: extension.name.clone(),
            reason,
        };
        let plugin = global(symbol).ok_or_else(|| failed(format!("window.{symbol} is missing")))?;
        call_method(&Self::library()?, "register", &Array::of1(&plugin))
            .map(|_| ())
            .map_err(|e| failed(describe(&e)))
    }
}

/// A live Chart.js instance.
struct JsRenderedChart {
    instance: JsValue,
    _closures: Vec<PointerClosure>,
}

impl RenderedChart for JsRenderedChart {
    fn destroy(&mut self) {
        if let Err(e) = call_method(&self.instance, "destroy", &Array::new()) {
            tracing::warn!("Chart destroy failed: {}", describe(&e));
        }
    }

    fn resize(&mut self) {
        if let Err(e) = call_method(&self.instance, "resize", &Array::new()) {
            tracing::warn!("Chart resize failed: {}", describe(&e));
        }
    }

    fn capture(&self) -> RenderResult<String> {
        call_method(&self.instance, "toBase64Image", &Array::new())
            .map_err(|e| RenderError::Capture(describe(&e)))?
            .as_string()
            .ok_or_else(|| RenderError::Capture("toBase64Image returned no string".to_string()))
    }
}

/// A `<canvas>` element the chart draws into.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    /// Look up a canvas by element id.
    ///
    /// # Errors
    ///
    /// Returns a message if the element is missing or not a canvas.
    pub fn by_id(canvas_id: &str) -> Result<Self, String> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| "No document object".to_string())?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| format!("Canvas element '{canvas_id}' not found"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| format!("Element '{canvas_id}' is not a canvas"))?;
        Ok(Self { canvas })
    }
}

impl HostSurface for CanvasSurface {
    fn is_drawable(&self) -> bool {
        matches!(self.canvas.get_context("2d"), Ok(Some(_)))
    }

    fn set_accessibility_label(&self, label: &str) {
        let result = self
            .canvas
            .set_attribute("role", "img")
            .and_then(|()| self.canvas.set_attribute("aria-label", label));
        if let Err(e) = result {
            tracing::warn!("Failed to set aria-label: {}", describe(&e));
        }
    }

    fn observe_size(&self, on_resize: Box<dyn Fn()>) -> Option<ObserverGuard> {
        let callback = Closure::wrap(Box::new(move |_: Array, _: ResizeObserver| on_resize())
            as Box<dyn FnMut(Array, ResizeObserver)>);
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| tracing::debug!("ResizeObserver unavailable: {}", describe(&e)))
            .ok()?;

        let target = self
            .canvas
            .parent_element()
            .unwrap_or_else(|| self.canvas.clone().into());
        observer.observe(&target);

        Some(ObserverGuard::new(move || {
            observer.disconnect();
            drop(callback);
        }))
    }
}
