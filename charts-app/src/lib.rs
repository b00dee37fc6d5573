//! # Canvas Charts WASM Application
//!
//! Browser bindings that drive a Chart.js global from Rust.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web charts-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { ChartApp } from './pkg/charts_app.js';
//!
//! await init();
//! const chart = new ChartApp('sales', JSON.stringify({
//!     type: 'bar',
//!     labels: ['Q1', 'Q2'],
//!     datasets: [{ label: 'Revenue', data: [12, 19] }],
//! }));
//! await chart.render();
//! await chart.toggleTheme();
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dom;
pub mod loader;

use std::cell::RefCell;
use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

use base64::Engine;
use charts_core::{
    ChartEvent, ChartSpecDocument, ChartType, DatasetDocument, EventHandler, InteractionHooks,
};
use charts_runtime::{Chart, ChartRuntime, RuntimeConfig};
use js_sys::{Function, Promise, JSON};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlAnchorElement;

use crate::dom::{CanvasSurface, JsChartBackend};
use crate::loader::{JsTimer, ScriptTagLoader};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Canvas Charts WASM initialized");
}

thread_local! {
    static PAGE_RUNTIME: RefCell<Option<ChartRuntime<JsChartBackend>>> =
        const { RefCell::new(None) };
}

fn new_runtime(config: RuntimeConfig) -> ChartRuntime<JsChartBackend> {
    ChartRuntime::new(
        JsChartBackend,
        Rc::new(ScriptTagLoader),
        Rc::new(JsTimer),
        config,
    )
}

/// The runtime shared by every chart on the page.
fn page_runtime() -> ChartRuntime<JsChartBackend> {
    PAGE_RUNTIME.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| new_runtime(RuntimeConfig::default()))
            .clone()
    })
}

fn to_js(error: impl Display) -> JsValue {
    tracing::error!("{error}");
    JsValue::from_str(&error.to_string())
}

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| to_js(format!("Invalid {what}: {e}")))
}

fn js_handler(callback: Function) -> EventHandler {
    Rc::new(move |event: &ChartEvent| {
        let payload = serde_json::to_string(event)
            .map_err(|e| e.to_string())
            .and_then(|json| JSON::parse(&json).map_err(|e| format!("{e:?}")));
        match payload {
            Ok(payload) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                    tracing::warn!("Chart event handler threw: {e:?}");
                }
            }
            Err(e) => tracing::warn!("Failed to convert chart event: {e}"),
        }
    })
}

/// A chart bound to a canvas element.
#[wasm_bindgen]
pub struct ChartApp {
    chart: Rc<Chart<JsChartBackend>>,
}

impl ChartApp {
    fn create(
        runtime: ChartRuntime<JsChartBackend>,
        canvas_id: &str,
        spec_json: &str,
    ) -> Result<ChartApp, JsValue> {
        let spec = ChartSpecDocument::from_json(spec_json)
            .map_err(to_js)?
            .into_spec();
        let surface = CanvasSurface::by_id(canvas_id).map_err(to_js)?;
        let chart = Chart::new(runtime, surface, spec).map_err(to_js)?;
        Ok(Self {
            chart: Rc::new(chart),
        })
    }

    fn spawn<F, T>(&self, work: impl FnOnce(Rc<Chart<JsChartBackend>>) -> F) -> Promise
    where
        F: Future<Output = charts_runtime::ChartResult<T>> + 'static,
        T: Into<JsValue>,
    {
        let future = work(Rc::clone(&self.chart));
        future_to_promise(async move { future.await.map(Into::into).map_err(to_js) })
    }

    fn set_hook(&self, update: impl FnOnce(&mut InteractionHooks)) {
        let mut hooks = self.chart.spec().hooks;
        update(&mut hooks);
        self.chart.set_hooks(hooks);
    }
}

#[wasm_bindgen]
impl ChartApp {
    /// Bind a chart described by `spec_json` to the canvas with `canvas_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas is missing or not drawable, or the
    /// spec is malformed.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, spec_json: &str) -> Result<ChartApp, JsValue> {
        Self::create(page_runtime(), canvas_id, spec_json)
    }

    /// Like the constructor, but first installs a page runtime built from
    /// `config_json`. Charts created afterwards share it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or spec is malformed or the canvas
    /// cannot be used.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        canvas_id: &str,
        spec_json: &str,
        config_json: &str,
    ) -> Result<ChartApp, JsValue> {
        let config: RuntimeConfig = parse(config_json, "runtime config")?;
        let runtime = new_runtime(config);
        PAGE_RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime.clone()));
        Self::create(runtime, canvas_id, spec_json)
    }

    /// Unique chart id.
    #[must_use]
    pub fn id(&self) -> String {
        self.chart.id().to_string()
    }

    /// Draw the chart. Resolves once drawn.
    #[must_use]
    pub fn render(&self) -> Promise {
        self.spawn(|chart| async move { chart.render().await.map(|()| JsValue::UNDEFINED) })
    }

    /// Append a dataset given as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset JSON is malformed.
    #[wasm_bindgen(js_name = addDataset)]
    pub fn add_dataset(&self, dataset_json: &str) -> Result<Promise, JsValue> {
        let dataset: DatasetDocument = parse(dataset_json, "dataset")?;
        Ok(self.spawn(|chart| async move { chart.add_dataset(dataset).await.map(|()| JsValue::UNDEFINED) }))
    }

    /// Remove a dataset. Resolves to `false` if the index is out of range.
    #[wasm_bindgen(js_name = removeDataset)]
    #[must_use]
    pub fn remove_dataset(&self, index: usize) -> Promise {
        self.spawn(move |chart| async move { chart.remove_dataset(index).await })
    }

    /// Replace a dataset's data with a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if `data_json` is not an array.
    #[wasm_bindgen(js_name = updateDatasetData)]
    pub fn update_dataset_data(&self, index: usize, data_json: &str) -> Result<Promise, JsValue> {
        let data: Vec<Value> = parse(data_json, "dataset data")?;
        Ok(self.spawn(move |chart| async move { chart.update_dataset_data(index, data).await }))
    }

    /// Replace the labels with a JSON array of strings.
    ///
    /// # Errors
    ///
    /// Returns an error if `labels_json` is not a string array.
    #[wasm_bindgen(js_name = setLabels)]
    pub fn set_labels(&self, labels_json: &str) -> Result<Promise, JsValue> {
        let labels: Vec<String> = parse(labels_json, "labels")?;
        Ok(self.spawn(|chart| async move { chart.set_labels(labels).await.map(|()| JsValue::UNDEFINED) }))
    }

    /// Switch between dark and light.
    #[wasm_bindgen(js_name = toggleTheme)]
    #[must_use]
    pub fn toggle_theme(&self) -> Promise {
        self.spawn(|chart| async move { chart.toggle_theme().await.map(|()| JsValue::UNDEFINED) })
    }

    /// Change the chart type.
    ///
    /// # Errors
    ///
    /// Returns an error if `chart_type` is unknown.
    #[wasm_bindgen(js_name = setType)]
    pub fn set_type(&self, chart_type: &str) -> Result<Promise, JsValue> {
        let chart_type: ChartType = chart_type.parse().map_err(to_js)?;
        Ok(self.spawn(move |chart| async move { chart.set_type(chart_type).await.map(|()| JsValue::UNDEFINED) }))
    }

    /// Change the title.
    #[wasm_bindgen(js_name = setTitle)]
    #[must_use]
    pub fn set_title(&self, title: String) -> Promise {
        self.spawn(|chart| async move { chart.set_title(title).await.map(|()| JsValue::UNDEFINED) })
    }

    /// Replace the option overrides with a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if `options_json` is malformed.
    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&self, options_json: &str) -> Result<Promise, JsValue> {
        let options: Value = parse(options_json, "options")?;
        Ok(self.spawn(|chart| async move { chart.set_options(options).await.map(|()| JsValue::UNDEFINED) }))
    }

    /// Set the canvas's accessible name.
    #[wasm_bindgen(js_name = setAriaLabel)]
    pub fn set_aria_label(&self, label: &str) {
        self.chart.set_accessibility_label(label);
    }

    /// Call `callback` with `{kind, x, y, points}` on click. Applies from
    /// the next render.
    #[wasm_bindgen(js_name = onClick)]
    pub fn on_click(&self, callback: Function) {
        self.set_hook(|hooks| hooks.on_click = Some(js_handler(callback)));
    }

    /// Call `callback` with `{kind, x, y, points}` on hover. Applies from
    /// the next render.
    #[wasm_bindgen(js_name = onHover)]
    pub fn on_hover(&self, callback: Function) {
        self.set_hook(|hooks| hooks.on_hover = Some(js_handler(callback)));
    }

    /// Download the chart as a PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been rendered or the download
    /// cannot be started.
    #[wasm_bindgen(js_name = exportImage)]
    #[allow(clippy::needless_pass_by_value)]
    pub fn export_image(&self, filename: Option<String>) -> Result<(), JsValue> {
        let image = self.chart.export(filename.as_deref()).map_err(to_js)?;
        let href = format!(
            "data:{};base64,{}",
            image.mime,
            base64::engine::general_purpose::STANDARD.encode(&image.bytes)
        );

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| to_js("No document object"))?;
        let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        anchor.set_href(&href);
        anchor.set_download(&image.filename);
        anchor.click();
        tracing::debug!("Exported {} ({} bytes)", image.filename, image.bytes.len());
        Ok(())
    }

    /// Release the chart. Safe to call repeatedly.
    pub fn destroy(&self) {
        self.chart.destroy();
    }
}
