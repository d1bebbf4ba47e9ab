use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures talking to the Supabase table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no window")]
    NoWindow,
    #[error("request could not be built: {0}")]
    Request(String),
    #[error("fetch failed: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("record {0} not found")]
    MissingRecord(u32),
}

/// Bad or missing host-supplied configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("unknown app mode `{0}` (expected `development` or `production`)")]
    Mode(String),
    #[error("unknown log level `{0}`")]
    LogLevel(String),
}

/// Failures on the page side of the service-worker channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("service workers are not supported in this context")]
    Unsupported,
    #[error("service worker call failed: {0}")]
    Platform(String),
}

/// Readable text for a value thrown across the JS boundary.
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

impl From<serde_wasm_bindgen::Error> for StoreError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Request(e.to_string())
    }
}
