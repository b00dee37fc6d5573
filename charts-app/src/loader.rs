//! Script-tag loading and browser timers.

use std::time::Duration;

use async_trait::async_trait;
use charts_runtime::{LoadError, ScriptLoader, Timer};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

/// Loads scripts by appending `<script>` tags to the document head.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptTagLoader;

impl ScriptTagLoader {
    fn append(source: &str, resolve: &Function, reject: &Function) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
        script.set_src(source);
        script.set_async(true);
        script.set_onload(Some(resolve));
        script.set_onerror(Some(reject));
        let head = document
            .head()
            .ok_or_else(|| JsValue::from_str("Document has no head"))?;
        head.append_child(&script)?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl ScriptLoader for ScriptTagLoader {
    async fn load(&self, source: &str) -> Result<(), LoadError> {
        let failed = |reason: String| LoadError::Failed {
            source_url: source.to_string(),
            reason,
        };

        let mut append_error = None;
        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(e) = Self::append(source, &resolve, &reject) {
                append_error = Some(e);
            }
        });
        if let Some(e) = append_error {
            return Err(failed(format!("{e:?}")));
        }

        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|_| failed("script error".to_string()))
    }
}

/// Timer backed by `window.setTimeout`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsTimer;

impl Timer for JsTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|w| {
                w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                tracing::warn!("setTimeout unavailable; deadline will not fire");
            }
        });
        JsFuture::from(promise).map(|_| ()).boxed_local()
    }
}
