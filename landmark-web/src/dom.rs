use js_sys::{Function, Promise};
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response, Storage, Window};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("browser window is not available")]
    NoWindow,
    #[error("{0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_error_message(&value))
    }
}

/// Retrieve the global `window` object.
///
/// # Errors
/// Returns [`DomError::NoWindow`] outside a browser context.
pub fn window() -> Result<Window, DomError> {
    web_sys::window().ok_or(DomError::NoWindow)
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Milliseconds since the epoch from the JS clock.
#[must_use]
pub fn now_ms() -> u64 {
    let now = js_sys::Date::now();
    if now.is_finite() && now > 0.0 {
        // Date.now() is an integral millisecond count well inside u64.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let millis = now as u64;
        millis
    } else {
        0
    }
}

/// Yield execution for the requested number of milliseconds.
///
/// # Errors
/// Returns an error if the timer cannot be scheduled or the underlying JavaScript promise rejects.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn sleep_ms(duration_ms: i32) -> Result<(), DomError> {
    let mut resolve_slot: Option<Function> = None;
    let promise = Promise::new(&mut |resolve, _reject| {
        resolve_slot = Some(resolve);
    });

    let resolve = resolve_slot.ok_or_else(|| DomError::Js("timer promise not armed".into()))?;
    let closure = Closure::once(move || {
        let _ = resolve.call0(&JsValue::UNDEFINED);
    });

    window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        duration_ms,
    )?;
    closure.forget();

    JsFuture::from(promise).await?;
    Ok(())
}

/// [`sleep_ms`] for fire-and-forget timers: a failure is logged against
/// `label` and reported as `false` instead of an error.
#[allow(clippy::future_not_send)]
pub async fn pause_ms(duration_ms: i32, label: &str) -> bool {
    match sleep_ms(duration_ms).await {
        Ok(()) => true,
        Err(err) => {
            log::warn!("{label} timer failed: {err}");
            false
        }
    }
}

/// Status code and body text of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedText {
    pub status: u16,
    pub body: String,
}

impl FetchedText {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Issue a same-origin JSON request and read the body as text.
///
/// # Errors
/// Returns an error if the request cannot be built or sent, or the body
/// cannot be read. HTTP error statuses are not errors here.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn fetch_text(method: &str, url: &str, body: Option<&str>) -> Result<FetchedText, DomError> {
    let init = RequestInit::new();
    init.set_method(method);
    init.set_mode(RequestMode::SameOrigin);
    let headers = Headers::new()?;
    headers.set("Accept", "application/json")?;
    if let Some(body) = body {
        headers.set("Content-Type", "application/json")?;
        init.set_body(&JsValue::from_str(body));
    }
    init.set_headers(&headers);

    let request = Request::new_with_str_and_init(url, &init)?;
    let resp_value = JsFuture::from(window()?.fetch_with_request(&request)).await?;
    let response: Response = resp_value.dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;
    Ok(FetchedText {
        status: response.status(),
        body: text.as_string().unwrap_or_default(),
    })
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, DomError> {
    window()?
        .local_storage()?
        .ok_or_else(|| DomError::Js("localStorage unavailable".into()))
}
