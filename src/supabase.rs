use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::config::AppConfig;
use crate::error::{js_message, StoreError};
use crate::types::{NumberList, NUMBERS_RECORD_ID};

const NUMBERS_TABLE: &str = "my_set";
const NUMBERS_COLUMN: &str = "numbers";

/// Read and replace the one stored list.
///
/// The view only ever talks to this trait, so tests can hand it an in-memory double.
#[allow(async_fn_in_trait)]
pub trait NumberStore {
    async fn fetch_numbers(&self) -> Result<NumberList, StoreError>;
    async fn replace_numbers(&self, numbers: &NumberList) -> Result<(), StoreError>;
}

#[derive(Deserialize, Debug)]
struct NumbersRow {
    numbers: Option<Vec<String>>,
}

#[derive(Serialize, Debug)]
struct NumbersPatch<'a> {
    numbers: &'a NumberList,
}

/// PostgREST client for the `my_set` table. Built once at startup.
#[derive(Clone, Debug)]
pub struct SupabaseStore {
    base_url: String,
    key: String,
    record_id: u32,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.store_url.clone(),
            key: config.store_key.clone(),
            record_id: NUMBERS_RECORD_ID,
        }
    }

    fn select_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select={}&id=eq.{}",
            self.base_url, NUMBERS_TABLE, NUMBERS_COLUMN, self.record_id
        )
    }

    fn record_url(&self) -> String {
        format!("{}/rest/v1/{}?id=eq.{}", self.base_url, NUMBERS_TABLE, self.record_id)
    }

    fn patch_body(numbers: &NumberList) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&NumbersPatch { numbers })?)
    }

    fn first_row(&self, rows: Vec<NumbersRow>) -> Result<NumberList, StoreError> {
        let row = rows
            .into_iter()
            .next()
            .ok_or(StoreError::MissingRecord(self.record_id))?;
        Ok(NumberList::new(row.numbers.unwrap_or_default()))
    }

    fn get_headers(&self) -> Result<Headers, JsValue> {
        let headers = Headers::new()?;
        headers.set("apikey", &self.key)?;
        headers.set("Authorization", &format!("Bearer {}", self.key))?;
        headers.set("Content-Type", "application/json")?;
        Ok(headers)
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
    ) -> Result<Response, StoreError> {
        let window = web_sys::window().ok_or(StoreError::NoWindow)?;

        let headers = self.get_headers().map_err(|e| StoreError::Request(js_message(&e)))?;
        let opts = create_request_init(method, body, &headers);
        let request = Request::new_with_str_and_init(url, &opts)
            .map_err(|e| StoreError::Request(js_message(&e)))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| StoreError::Network(js_message(&e)))?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| StoreError::Decode("not a Response".into()))?;

        if !resp.ok() {
            return Err(StoreError::Http(resp.status()));
        }
        Ok(resp)
    }
}

fn create_request_init(method: &str, body: Option<&str>, headers: &Headers) -> RequestInit {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(b) = body {
        opts.set_body(&JsValue::from_str(b));
    }
    opts.set_headers(&JsValue::from(headers));
    opts
}

impl NumberStore for SupabaseStore {
    async fn fetch_numbers(&self) -> Result<NumberList, StoreError> {
        let resp = self.send("GET", &self.select_url(), None).await?;
        let json = JsFuture::from(resp.json().map_err(|e| StoreError::Decode(js_message(&e)))?)
            .await
            .map_err(|e| StoreError::Decode(js_message(&e)))?;
        let rows: Vec<NumbersRow> = serde_wasm_bindgen::from_value(json)?;
        let numbers = self.first_row(rows)?;
        log::info!("fetched numbers: [{}]", numbers.display());
        Ok(numbers)
    }

    async fn replace_numbers(&self, numbers: &NumberList) -> Result<(), StoreError> {
        log::debug!("writing numbers: [{}]", numbers.display());
        let body = Self::patch_body(numbers)?;
        self.send("PATCH", &self.record_url(), Some(&body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppMode;

    fn store() -> SupabaseStore {
        SupabaseStore::new(&AppConfig {
            store_url: "https://demo.supabase.co".into(),
            store_key: "anon".into(),
            mode: AppMode::Production,
            worker_url: None,
            log_level: log::Level::Info,
        })
    }

    #[test]
    fn urls_target_record_one() {
        let store = store();
        assert_eq!(
            store.select_url(),
            "https://demo.supabase.co/rest/v1/my_set?select=numbers&id=eq.1"
        );
        assert_eq!(store.record_url(), "https://demo.supabase.co/rest/v1/my_set?id=eq.1");
    }

    #[test]
    fn patch_body_replaces_whole_list() {
        let numbers = NumberList::from(&["1", "2", "3", "4"][..]);
        assert_eq!(
            SupabaseStore::patch_body(&numbers).unwrap(),
            r#"{"numbers":["1","2","3","4"]}"#
        );
    }

    #[test]
    fn first_row_handles_null_and_missing() {
        let store = store();
        let rows: Vec<NumbersRow> = serde_json::from_str(r#"[{"numbers":null}]"#).unwrap();
        assert!(store.first_row(rows).unwrap().is_empty());

        let rows: Vec<NumbersRow> = serde_json::from_str(r#"[{"numbers":["5","6"]}]"#).unwrap();
        assert_eq!(store.first_row(rows).unwrap().values(), ["5", "6"]);

        assert_eq!(store.first_row(Vec::new()), Err(StoreError::MissingRecord(1)));
    }
}
