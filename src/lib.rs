mod app;
pub mod config;
pub mod error;
pub mod shell;
pub mod supabase;
pub mod types;
pub mod update;
mod worker;

use leptos::*;
use wasm_bindgen::prelude::*;

use crate::app::{App, ConfigProblem};
use crate::config::AppConfig;
use crate::supabase::SupabaseStore;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::from_build_env();
    let level = config.as_ref().map(|c| c.log_level).unwrap_or(log::Level::Info);
    // Only fails when a logger is already installed.
    let _ = console_log::init_with_level(level);

    // Loaded inside the service worker too; there is no page to mount there.
    if web_sys::window().is_none() {
        return;
    }

    match config {
        Ok(config) => {
            log::info!("starting in {:?} mode", config.mode);
            let store = SupabaseStore::new(&config);
            mount_to_body(move || view! { <App config=config store=store/> });
        }
        Err(e) => {
            log::error!("{}", e);
            let message = e.to_string();
            mount_to_body(move || view! { <ConfigProblem message=message/> });
        }
    }
}
