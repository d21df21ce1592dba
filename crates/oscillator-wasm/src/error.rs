//! Errors raised while mounting the widget onto a page.

use oscillator::{ConfigError, InvalidParameterError};
use wasm_bindgen::{JsCast, JsValue};

/// Errors that can occur in [`mount`](crate::mount).
#[derive(thiserror::Error, Debug)]
pub enum MountError {
    /// No global `window` (not running in a browser main thread).
    #[error("no window available")]
    NoWindow,

    /// The window has no document.
    #[error("window has no document")]
    NoDocument,

    /// An element the widget binds to is not on the page.
    #[error("missing element #{0}")]
    MissingElement(String),

    /// An element exists but is not of the expected kind.
    #[error("element #{id} is not a {expected}")]
    WrongElementType {
        /// Element id.
        id: String,
        /// Expected DOM interface.
        expected: &'static str,
    },

    /// The canvas did not hand out a 2D context.
    #[error("canvas #{0} has no 2d context")]
    NoContext(String),

    /// The config JSON was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The values found in the input controls at load are not a valid oscillator.
    #[error("initial input values: {0}")]
    InitialParameters(#[from] InvalidParameterError),

    /// A browser API call failed.
    #[error("browser call failed: {0}")]
    Js(String),
}

impl MountError {
    /// Wraps a raw `JsValue` error from a browser API.
    pub(crate) fn js(value: &JsValue) -> Self {
        Self::Js(describe(value))
    }
}

impl From<MountError> for JsValue {
    fn from(err: MountError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
