use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::tracker::{LifecycleSignal, UpdateEvent, UpdateState, UpdateTracker};
use crate::error::UpdateError;

/// Callback a registration uses to push lifecycle signals into the channel.
pub type SignalSink = Rc<dyn Fn(LifecycleSignal)>;

/// The platform side of a service-worker registration. Clones share the same handle.
pub trait Registration: Clone {
    /// Keeps the platform listeners alive. Dropping it removes them.
    type Listener;

    fn has_installing(&self) -> bool;
    fn has_waiting(&self) -> bool;
    fn is_same(&self, other: &Self) -> bool;
    /// Sends the skip-waiting message. `Ok(false)` when nothing is waiting.
    fn post_skip_waiting(&self) -> Result<bool, UpdateError>;
    fn listen(&self, sink: SignalSink) -> Result<Self::Listener, UpdateError>;
}

type Handler = Box<dyn FnMut()>;

struct Binding<R: Registration> {
    registration: R,
    _listener: R::Listener,
}

struct Inner<R: Registration> {
    binding: Option<Binding<R>>,
    /// Bumped on every attach/detach so stale sinks go quiet.
    generation: u64,
    tracker: UpdateTracker,
    on_installing: Option<Handler>,
    on_waiting: Option<Handler>,
    on_ready: Option<Handler>,
}

impl<R: Registration> Inner<R> {
    fn slot(&mut self, event: UpdateEvent) -> &mut Option<Handler> {
        match event {
            UpdateEvent::Installing => &mut self.on_installing,
            UpdateEvent::Waiting => &mut self.on_waiting,
            UpdateEvent::Ready => &mut self.on_ready,
        }
    }
}

/// Turns a registration's lifecycle into `installing`, `waiting` and `ready` events.
///
/// Each event has exactly one handler slot; setting a handler replaces the previous
/// one. There is a single consumer (the page shell), so there is no fan-out.
///
/// Handlers run with no internal borrow held and may call back into the channel.
pub struct UpdateChannel<R: Registration> {
    inner: Rc<RefCell<Inner<R>>>,
}

impl<R: Registration> Clone for UpdateChannel<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R: Registration + 'static> Default for UpdateChannel<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registration + 'static> UpdateChannel<R> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                binding: None,
                generation: 0,
                tracker: UpdateTracker::new(),
                on_installing: None,
                on_waiting: None,
                on_ready: None,
            })),
        }
    }

    pub fn on_installing(&self, handler: impl FnMut() + 'static) {
        self.inner.borrow_mut().on_installing = Some(Box::new(handler));
    }

    pub fn on_waiting(&self, handler: impl FnMut() + 'static) {
        self.inner.borrow_mut().on_waiting = Some(Box::new(handler));
    }

    /// Fires at most once per channel, when the new worker takes control.
    pub fn on_ready(&self, handler: impl FnMut() + 'static) {
        self.inner.borrow_mut().on_ready = Some(Box::new(handler));
    }

    pub fn state(&self) -> UpdateState {
        self.inner.borrow().tracker.state()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().binding.is_some()
    }

    /// Binds to `registration` and replays any worker already installing or waiting.
    ///
    /// Re-attaching the bound registration does nothing. Attaching a different one
    /// drops the old listeners first.
    pub fn attach(&self, registration: R) {
        let already_bound = self
            .inner
            .borrow()
            .binding
            .as_ref()
            .is_some_and(|b| b.registration.is_same(&registration));
        if already_bound {
            log::debug!("update channel already bound to this registration");
            return;
        }

        self.detach();
        let generation = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.generation
        };

        let weak = Rc::downgrade(&self.inner);
        let sink: SignalSink = Rc::new(move |signal| dispatch(&weak, generation, signal));
        let listener = match registration.listen(sink) {
            Ok(listener) => listener,
            Err(e) => {
                log::warn!("could not listen for service worker updates: {}", e);
                return;
            }
        };

        let events = {
            let mut inner = self.inner.borrow_mut();
            let events = inner
                .tracker
                .on_attach(registration.has_installing(), registration.has_waiting());
            inner.binding = Some(Binding {
                registration,
                _listener: listener,
            });
            events
        };
        for event in events {
            emit(&self.inner, event);
        }
    }

    /// Asks the waiting worker to skip waiting. Returns whether a message was sent.
    pub fn activate(&self) -> bool {
        let (registration, generation) = {
            let inner = self.inner.borrow();
            let Some(binding) = inner.binding.as_ref() else {
                log::debug!("activate ignored: no registration attached");
                return false;
            };
            (binding.registration.clone(), inner.generation)
        };
        // The platform may deliver signals while the message goes out.
        match registration.post_skip_waiting() {
            Ok(true) => {
                log::info!("asked waiting service worker to activate");
                let mut inner = self.inner.borrow_mut();
                if inner.generation == generation {
                    inner.tracker.begin_activation();
                }
                true
            }
            Ok(false) => {
                log::debug!("activate ignored: no waiting service worker");
                false
            }
            Err(e) => {
                log::warn!("skip waiting failed: {}", e);
                false
            }
        }
    }

    /// Removes every platform listener. Safe to call any number of times.
    pub fn detach(&self) {
        let binding = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.tracker.reset();
            inner.binding.take()
        };
        drop(binding);
    }
}

fn dispatch<R: Registration>(
    weak: &Weak<RefCell<Inner<R>>>,
    generation: u64,
    signal: LifecycleSignal,
) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let event = {
        let mut guard = inner.borrow_mut();
        if guard.generation != generation || guard.binding.is_none() {
            return;
        }
        guard.tracker.on_signal(signal)
    };
    if let Some(event) = event {
        emit(&inner, event);
    }
}

fn emit<R: Registration>(inner: &Rc<RefCell<Inner<R>>>, event: UpdateEvent) {
    log::info!("service worker update: {:?}", event);
    let handler = inner.borrow_mut().slot(event).take();
    let Some(mut handler) = handler else {
        return;
    };
    handler();
    let mut guard = inner.borrow_mut();
    let slot = guard.slot(event);
    // A handler installed while this one ran takes precedence.
    if slot.is_none() {
        *slot = Some(handler);
    }
}
