//! State behind the single view: the number list, the input box, the update banner.
//!
//! Everything here is synchronous and browser-free. The component in `app.rs` feeds
//! [`Msg`]s in and carries out the returned [`Effect`]s.

use crate::types::NumberList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Initial fetch resolved.
    NumbersLoaded(NumberList),
    /// Initial fetch failed; the list stays as it was.
    LoadFailed(String),
    /// User edited the input box.
    InputChanged(String),
    /// User pressed Submit.
    Submitted,
    /// A fire-and-forget write came back with an error.
    SaveFailed(String),
    /// User closed the error line.
    ErrorDismissed,
    /// The update channel reported an installed update waiting to activate.
    UpdateWaiting,
    /// User pressed the banner's Update button.
    UpdateClicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the stored list with this one.
    PersistNumbers(NumberList),
    /// Tell the waiting service worker to take over.
    ActivateUpdate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    numbers: NumberList,
    input: String,
    update_waiting: bool,
    store_error: Option<String>,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn numbers(&self) -> &NumberList {
        &self.numbers
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn update_waiting(&self) -> bool {
        self.update_waiting
    }

    pub fn store_error(&self) -> Option<&str> {
        self.store_error.as_deref()
    }
}

/// Applies a message to state and returns any effects.
pub fn update(mut state: ShellState, msg: Msg) -> (ShellState, Vec<Effect>) {
    let effects = match msg {
        Msg::NumbersLoaded(numbers) => {
            state.numbers = numbers;
            Vec::new()
        }
        Msg::LoadFailed(reason) | Msg::SaveFailed(reason) => {
            state.store_error = Some(reason);
            Vec::new()
        }
        Msg::InputChanged(value) => {
            state.input = value;
            Vec::new()
        }
        Msg::Submitted => {
            let value = state.input.trim();
            if value.is_empty() {
                return (state, Vec::new());
            }
            let next = state.numbers.appended(value);
            state.numbers = next.clone();
            state.input.clear();
            vec![Effect::PersistNumbers(next)]
        }
        Msg::ErrorDismissed => {
            state.store_error = None;
            Vec::new()
        }
        Msg::UpdateWaiting => {
            state.update_waiting = true;
            Vec::new()
        }
        Msg::UpdateClicked => {
            if state.update_waiting {
                vec![Effect::ActivateUpdate]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}
