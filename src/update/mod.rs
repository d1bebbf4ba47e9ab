//! Service-worker update notifications for the page.

mod channel;
mod tracker;
mod web;

pub use channel::{Registration, SignalSink, UpdateChannel};
pub use tracker::{LifecycleSignal, UpdateEvent, UpdateState, UpdateTracker};
pub use web::{current_registration, reload_page, WebListener, WebRegistration, SKIP_WAITING};
