/// Where the current update cycle stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateState {
    #[default]
    Idle,
    Installing,
    Waiting,
    Activating,
    /// Terminal: the page is navigating away.
    Reloading,
}

/// Raw lifecycle signals coming from the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// `updatefound` on the registration.
    UpdateFound,
    /// The installing worker reached `installed`. `controlled` is whether the page
    /// already had a controlling worker at that moment.
    Installed { controlled: bool },
    /// `controllerchange` on the service-worker container.
    ControllerChange,
}

/// Named moments handed to the channel's handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateEvent {
    Installing,
    Waiting,
    Ready,
}

/// Tracks a single update cycle. A new `updatefound` overwrites the cycle in progress.
#[derive(Debug, Default)]
pub struct UpdateTracker {
    state: UpdateState,
    ready_fired: bool,
}

impl UpdateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Replays what a freshly attached registration already holds.
    pub fn on_attach(&mut self, has_installing: bool, has_waiting: bool) -> Vec<UpdateEvent> {
        let mut events = Vec::new();
        if self.state == UpdateState::Reloading {
            return events;
        }
        if has_installing {
            self.state = UpdateState::Installing;
            events.push(UpdateEvent::Installing);
        }
        if has_waiting {
            self.state = UpdateState::Waiting;
            events.push(UpdateEvent::Waiting);
        }
        events
    }

    pub fn on_signal(&mut self, signal: LifecycleSignal) -> Option<UpdateEvent> {
        if self.state == UpdateState::Reloading {
            return None;
        }
        match signal {
            LifecycleSignal::UpdateFound => {
                self.state = UpdateState::Installing;
                Some(UpdateEvent::Installing)
            }
            LifecycleSignal::Installed { controlled: true } => {
                self.state = UpdateState::Waiting;
                Some(UpdateEvent::Waiting)
            }
            // First install on an uncontrolled page: nothing to replace.
            LifecycleSignal::Installed { controlled: false } => {
                self.state = UpdateState::Idle;
                None
            }
            LifecycleSignal::ControllerChange => match self.state {
                UpdateState::Waiting | UpdateState::Activating if !self.ready_fired => {
                    self.ready_fired = true;
                    self.state = UpdateState::Reloading;
                    Some(UpdateEvent::Ready)
                }
                _ => None,
            },
        }
    }

    /// Called once the skip-waiting message went out.
    pub fn begin_activation(&mut self) {
        if self.state != UpdateState::Reloading {
            self.state = UpdateState::Activating;
        }
    }

    /// Forget the cycle in progress when binding to another registration.
    /// The one-shot reload guard survives.
    pub fn reset(&mut self) {
        if self.state != UpdateState::Reloading {
            self.state = UpdateState::Idle;
        }
    }
}
