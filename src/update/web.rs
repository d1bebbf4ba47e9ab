use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Event, ServiceWorker, ServiceWorkerContainer, ServiceWorkerRegistration, ServiceWorkerState,
};

use super::channel::{Registration, SignalSink};
use super::tracker::LifecycleSignal;
use crate::error::{js_message, UpdateError};

/// Message type the worker listens for before calling `skipWaiting()`.
pub const SKIP_WAITING: &str = "SKIP_WAITING";

#[derive(Serialize)]
struct ControlMessage {
    #[serde(rename = "type")]
    kind: &'static str,
}

fn platform(value: &JsValue) -> UpdateError {
    UpdateError::Platform(js_message(value))
}

type EventClosure = Closure<dyn FnMut(Event)>;

fn callback(closure: &EventClosure) -> &js_sys::Function {
    closure.as_ref().unchecked_ref()
}

/// Looks up the page's registration, registering `worker_url` first when given.
///
/// `Err(Unsupported)` when the browser context has no service-worker API and
/// `Ok(None)` when nothing is registered for this scope.
pub async fn current_registration(
    worker_url: Option<&str>,
) -> Result<Option<WebRegistration>, UpdateError> {
    let window = web_sys::window().ok_or(UpdateError::Unsupported)?;
    let navigator = window.navigator();
    let supported = js_sys::Reflect::has(navigator.as_ref(), &JsValue::from_str("serviceWorker"))
        .unwrap_or(false);
    if !supported {
        return Err(UpdateError::Unsupported);
    }
    let container = navigator.service_worker();
    if container.is_undefined() {
        return Err(UpdateError::Unsupported);
    }

    if let Some(url) = worker_url {
        JsFuture::from(container.register(url)).await.map_err(|e| platform(&e))?;
        log::debug!("registered service worker {}", url);
    }

    let value = JsFuture::from(container.get_registration()).await.map_err(|e| platform(&e))?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let registration: ServiceWorkerRegistration = value.dyn_into().map_err(|v| platform(&v))?;
    Ok(Some(WebRegistration { registration, container }))
}

/// Full page reload; the new worker serves the next load.
pub fn reload_page() {
    let result = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))
        .and_then(|w| w.location().reload());
    if let Err(e) = result {
        log::error!("page reload failed: {}", js_message(&e));
    }
}

/// A browser `ServiceWorkerRegistration` plus the container that owns `controllerchange`.
#[derive(Clone, Debug)]
pub struct WebRegistration {
    registration: ServiceWorkerRegistration,
    container: ServiceWorkerContainer,
}

impl Registration for WebRegistration {
    type Listener = WebListener;

    fn has_installing(&self) -> bool {
        self.registration.installing().is_some()
    }

    fn has_waiting(&self) -> bool {
        self.registration.waiting().is_some()
    }

    fn is_same(&self, other: &Self) -> bool {
        js_sys::Object::is(self.registration.as_ref(), other.registration.as_ref())
    }

    fn post_skip_waiting(&self) -> Result<bool, UpdateError> {
        let Some(worker) = self.registration.waiting() else {
            return Ok(false);
        };
        let message = serde_wasm_bindgen::to_value(&ControlMessage { kind: SKIP_WAITING })
            .map_err(|e| UpdateError::Platform(e.to_string()))?;
        worker.post_message(&message).map_err(|e| platform(&e))?;
        Ok(true)
    }

    fn listen(&self, sink: SignalSink) -> Result<WebListener, UpdateError> {
        let installing: Rc<RefCell<Option<WatchedWorker>>> = Rc::new(RefCell::new(None));

        if let Some(worker) = self.registration.installing() {
            *installing.borrow_mut() = Some(WatchedWorker::new(worker, &self.container, &sink)?);
        }

        let on_update_found = {
            let registration = self.registration.clone();
            let container = self.container.clone();
            let installing = Rc::clone(&installing);
            let sink = Rc::clone(&sink);
            EventClosure::new(move |_: Event| {
                sink(LifecycleSignal::UpdateFound);
                let Some(worker) = registration.installing() else {
                    return;
                };
                match WatchedWorker::new(worker, &container, &sink) {
                    Ok(watched) => *installing.borrow_mut() = Some(watched),
                    Err(e) => log::warn!("could not watch installing worker: {}", e),
                }
            })
        };
        self.registration
            .add_event_listener_with_callback("updatefound", callback(&on_update_found))
            .map_err(|e| platform(&e))?;

        let on_controller_change = {
            let sink = Rc::clone(&sink);
            EventClosure::new(move |_: Event| sink(LifecycleSignal::ControllerChange))
        };
        if let Err(e) = self
            .container
            .add_event_listener_with_callback("controllerchange", callback(&on_controller_change))
        {
            let _ = self
                .registration
                .remove_event_listener_with_callback("updatefound", callback(&on_update_found));
            return Err(platform(&e));
        }

        Ok(WebListener {
            registration: self.registration.clone(),
            container: self.container.clone(),
            on_update_found,
            on_controller_change,
            installing,
        })
    }
}

/// Browser listeners owned by one channel binding. Dropping it unhooks them.
pub struct WebListener {
    registration: ServiceWorkerRegistration,
    container: ServiceWorkerContainer,
    on_update_found: EventClosure,
    on_controller_change: EventClosure,
    installing: Rc<RefCell<Option<WatchedWorker>>>,
}

impl Drop for WebListener {
    fn drop(&mut self) {
        let _ = self
            .registration
            .remove_event_listener_with_callback("updatefound", callback(&self.on_update_found));
        let _ = self.container.remove_event_listener_with_callback(
            "controllerchange",
            callback(&self.on_controller_change),
        );
        self.installing.borrow_mut().take();
    }
}

/// `statechange` listener on the worker currently installing.
struct WatchedWorker {
    worker: ServiceWorker,
    on_state_change: EventClosure,
}

impl WatchedWorker {
    fn new(
        worker: ServiceWorker,
        container: &ServiceWorkerContainer,
        sink: &SignalSink,
    ) -> Result<Self, UpdateError> {
        let on_state_change = {
            let observed = worker.clone();
            let container = container.clone();
            let sink = Rc::clone(sink);
            EventClosure::new(move |_: Event| {
                if observed.state() == ServiceWorkerState::Installed {
                    sink(LifecycleSignal::Installed {
                        controlled: container.controller().is_some(),
                    });
                }
            })
        };
        worker
            .add_event_listener_with_callback("statechange", callback(&on_state_change))
            .map_err(|e| platform(&e))?;
        Ok(Self { worker, on_state_change })
    }
}

impl Drop for WatchedWorker {
    fn drop(&mut self) {
        let _ = self
            .worker
            .remove_event_listener_with_callback("statechange", callback(&self.on_state_change));
    }
}
