use numbers_pwa::shell::{update, Effect, Msg, ShellState};
use numbers_pwa::types::NumberList;

fn loaded(values: &[&str]) -> ShellState {
    let (state, effects) = update(ShellState::new(), Msg::NumbersLoaded(NumberList::from(values)));
    assert!(effects.is_empty());
    state
}

fn submit(state: ShellState, input: &str) -> (ShellState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::Submitted)
}

#[test]
fn list_is_empty_until_fetch_resolves() {
    let state = ShellState::new();
    assert!(state.numbers().is_empty());
    assert_eq!(state.numbers().display(), "");
}

#[test]
fn submit_appends_clears_input_and_persists_full_list() {
    let state = loaded(&["1", "2", "3"]);

    let (state, effects) = submit(state, "4");

    assert_eq!(state.numbers().display(), "1, 2, 3, 4");
    assert_eq!(state.input(), "");
    assert_eq!(
        effects,
        vec![Effect::PersistNumbers(NumberList::from(&["1", "2", "3", "4"][..]))]
    );
}

#[test]
fn appends_keep_submission_order() {
    let mut state = loaded(&["10"]);
    let mut writes = Vec::new();
    for value in ["3", "1", "2", "1"] {
        let (next, effects) = submit(state, value);
        state = next;
        writes.extend(effects);
    }

    assert_eq!(state.numbers().values(), ["10", "3", "1", "2", "1"]);
    assert_eq!(writes.len(), 4);
    assert_eq!(
        writes.last(),
        Some(&Effect::PersistNumbers(NumberList::from(&["10", "3", "1", "2", "1"][..])))
    );
}

#[test]
fn empty_input_is_rejected_and_kept() {
    let state = loaded(&["1"]);

    let (state, effects) = submit(state, "");
    assert!(effects.is_empty());
    assert_eq!(state.numbers().values(), ["1"]);

    let (state, effects) = submit(state, "   ");
    assert!(effects.is_empty());
    assert_eq!(state.numbers().values(), ["1"]);
    assert_eq!(state.input(), "   ");
}

#[test]
fn store_failures_show_a_dismissible_error() {
    let state = loaded(&["1"]);
    let (state, effects) = submit(state, "2");
    assert_eq!(effects.len(), 1);

    let (state, effects) = update(state, Msg::SaveFailed("HTTP error: 500".into()));
    assert!(effects.is_empty());
    assert_eq!(state.store_error(), Some("HTTP error: 500"));
    // No rollback: the optimistic append stays.
    assert_eq!(state.numbers().values(), ["1", "2"]);

    let (state, _) = update(state, Msg::ErrorDismissed);
    assert_eq!(state.store_error(), None);
}

#[test]
fn load_failure_leaves_list_empty() {
    let (state, effects) = update(ShellState::new(), Msg::LoadFailed("fetch failed".into()));
    assert!(effects.is_empty());
    assert!(state.numbers().is_empty());
    assert_eq!(state.store_error(), Some("fetch failed"));
}

#[test]
fn update_button_only_acts_when_an_update_waits() {
    let state = ShellState::new();
    let (state, effects) = update(state, Msg::UpdateClicked);
    assert!(effects.is_empty());
    assert!(!state.update_waiting());

    let (state, _) = update(state, Msg::UpdateWaiting);
    assert!(state.update_waiting());
    let (_, effects) = update(state, Msg::UpdateClicked);
    assert_eq!(effects, vec![Effect::ActivateUpdate]);
}
