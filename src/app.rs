use leptos::ev::MouseEvent;
use leptos::*;

use crate::config::AppConfig;
use crate::error::UpdateError;
use crate::shell::{self, Effect, Msg, ShellState};
use crate::supabase::NumberStore;
use crate::update::{self, UpdateChannel, WebRegistration};

/// Everything the view's event handlers need, copyable into each closure.
struct Shell<S: 'static> {
    state: RwSignal<ShellState>,
    store: StoredValue<S>,
    channel: StoredValue<UpdateChannel<WebRegistration>>,
}

impl<S: 'static> Clone for Shell<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: 'static> Copy for Shell<S> {}

impl<S> Shell<S>
where
    S: NumberStore + Clone + 'static,
{
    fn dispatch(self, msg: Msg) {
        // The view may already be gone when a request or worker event lands.
        let Some(current) = self.state.try_get_untracked() else {
            return;
        };
        let (next, effects) = shell::update(current, msg);
        self.state.set(next);
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(self, effect: Effect) {
        match effect {
            Effect::PersistNumbers(numbers) => {
                let Some(store) = self.store.try_get_value() else {
                    return;
                };
                spawn_local(async move {
                    if let Err(e) = store.replace_numbers(&numbers).await {
                        log::error!("saving numbers failed: {}", e);
                        self.dispatch(Msg::SaveFailed(e.to_string()));
                    }
                });
            }
            Effect::ActivateUpdate => {
                if let Some(channel) = self.channel.try_get_value() {
                    channel.activate();
                }
            }
        }
    }

    fn load(self) {
        let Some(store) = self.store.try_get_value() else {
            return;
        };
        spawn_local(async move {
            match store.fetch_numbers().await {
                Ok(numbers) => self.dispatch(Msg::NumbersLoaded(numbers)),
                Err(e) => {
                    log::error!("loading numbers failed: {}", e);
                    self.dispatch(Msg::LoadFailed(e.to_string()));
                }
            }
        });
    }

    fn watch_updates(self, worker_url: Option<String>) {
        let Some(channel) = self.channel.try_get_value() else {
            return;
        };
        channel.on_installing(|| log::info!("new service worker installing"));
        channel.on_waiting(move || self.dispatch(Msg::UpdateWaiting));
        channel.on_ready(update::reload_page);

        spawn_local(async move {
            match update::current_registration(worker_url.as_deref()).await {
                // Nothing to attach to once the view is gone.
                Ok(Some(registration)) => {
                    if let Some(channel) = self.channel.try_get_value() {
                        channel.attach(registration);
                    }
                }
                Ok(None) => log::info!("no service worker registered for this page"),
                Err(UpdateError::Unsupported) => {
                    log::info!("service workers unavailable; update prompts disabled")
                }
                Err(e) => log::warn!("service worker lookup failed: {}", e),
            }
        });
    }
}

#[component]
pub fn App<S>(config: AppConfig, store: S) -> impl IntoView
where
    S: NumberStore + Clone + 'static,
{
    let shell = Shell {
        state: create_rw_signal(ShellState::new()),
        store: store_value(store),
        channel: store_value(UpdateChannel::<WebRegistration>::new()),
    };
    let state = shell.state;

    create_effect(move |_| shell.load());

    if config.mode.watches_updates() {
        shell.watch_updates(config.worker_url.clone());
    } else {
        log::debug!("development mode: service worker updates not watched");
    }

    on_cleanup(move || {
        if let Some(channel) = shell.channel.try_get_value() {
            channel.detach();
        }
    });

    let waiting = Signal::derive(move || state.with(|s| s.update_waiting()));

    view! {
        <div class="App">
            <div>"numbers: " {move || state.with(|s| s.numbers().display())}</div>
            <br/>
            <div>
                <label for="insert">"Insert: "</label>
                <input
                    id="insert"
                    type="number"
                    prop:value=move || state.with(|s| s.input().to_string())
                    on:input=move |ev| shell.dispatch(Msg::InputChanged(event_target_value(&ev)))
                />
                <button on:click=move |_| shell.dispatch(Msg::Submitted)>"Submit"</button>
            </div>
            {move || state.with(|s| s.store_error().map(str::to_string)).map(|message| view! {
                <div class="store-error">
                    {message} " "
                    <button on:click=move |_| shell.dispatch(Msg::ErrorDismissed)>"Dismiss"</button>
                </div>
            })}
            <br/>
            <UpdateBanner
                waiting=waiting
                on_update=move |_: MouseEvent| shell.dispatch(Msg::UpdateClicked)
            />
        </div>
    }
}

#[component]
fn UpdateBanner(
    waiting: Signal<bool>,
    #[prop(into)] on_update: Callback<MouseEvent>,
) -> impl IntoView {
    move || {
        waiting.get().then(|| view! {
            <div class="update-banner">
                "Update waiting! "
                <button on:click=move |ev| on_update.call(ev)>"Update"</button>
            </div>
        })
    }
}

/// Shown instead of the app when the build was missing its store settings.
#[component]
pub fn ConfigProblem(message: String) -> impl IntoView {
    view! {
        <div class="config-error">"Configuration error: " {message}</div>
    }
}
