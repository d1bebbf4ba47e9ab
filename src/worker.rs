//! Service-worker side of the skip-waiting handshake.
//!
//! The worker script forwards its `message` events here:
//!
//! ```js
//! self.addEventListener("message", (event) => wasm.worker_message(self, event));
//! ```

use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{MessageEvent, ServiceWorkerGlobalScope};

use crate::update::SKIP_WAITING;

/// Accepts both `{ type: "SKIP_WAITING" }` and the bare string form.
fn is_skip_waiting(data: &Value) -> bool {
    match data {
        Value::String(text) => text == SKIP_WAITING,
        Value::Object(fields) => fields.get("type").and_then(Value::as_str) == Some(SKIP_WAITING),
        _ => false,
    }
}

#[wasm_bindgen]
pub fn worker_message(sw: ServiceWorkerGlobalScope, event: MessageEvent) -> Result<(), JsValue> {
    let raw = event.data();
    let data: Value = serde_wasm_bindgen::from_value(raw.clone()).unwrap_or(Value::Null);
    if is_skip_waiting(&data) {
        log::info!("worker got {}", SKIP_WAITING);
        // The returned promise can be ignored.
        let _ = sw.skip_waiting()?;
        return Ok(());
    }

    log::debug!("worker ignored message: {:?}", raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_form_triggers_skip_waiting() {
        assert!(is_skip_waiting(&json!({ "type": "SKIP_WAITING" })));
        assert!(is_skip_waiting(&json!({ "type": "SKIP_WAITING", "from": "page" })));
    }

    #[test]
    fn bare_string_form_triggers_skip_waiting() {
        assert!(is_skip_waiting(&json!("SKIP_WAITING")));
    }

    #[test]
    fn other_messages_are_ignored() {
        assert!(!is_skip_waiting(&json!("skip_waiting")));
        assert!(!is_skip_waiting(&json!({ "type": "CLAIM" })));
        assert!(!is_skip_waiting(&json!({ "kind": "SKIP_WAITING" })));
        assert!(!is_skip_waiting(&json!(["SKIP_WAITING"])));
        assert!(!is_skip_waiting(&Value::Null));
    }
}
