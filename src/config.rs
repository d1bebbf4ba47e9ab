use crate::error::ConfigError;

const STORE_URL_KEY: &str = "NUMBERS_STORE_URL";
const STORE_KEY_KEY: &str = "NUMBERS_STORE_KEY";
const APP_MODE_KEY: &str = "NUMBERS_APP_MODE";
const WORKER_URL_KEY: &str = "NUMBERS_WORKER_URL";
const LOG_LEVEL_KEY: &str = "NUMBERS_LOG_LEVEL";

/// Development builds run without a service worker, so the update channel stays off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AppMode {
    Development,
    #[default]
    Production,
}

impl AppMode {
    pub fn watches_updates(self) -> bool {
        self == AppMode::Production
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub store_url: String,
    pub store_key: String,
    pub mode: AppMode,
    /// Script passed to `navigator.serviceWorker.register` before looking up the registration.
    pub worker_url: Option<String>,
    pub log_level: log::Level,
}

impl AppConfig {
    /// Reads the values the host baked in at build time.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let baked = match key {
                STORE_URL_KEY => option_env!("NUMBERS_STORE_URL"),
                STORE_KEY_KEY => option_env!("NUMBERS_STORE_KEY"),
                APP_MODE_KEY => option_env!("NUMBERS_APP_MODE"),
                WORKER_URL_KEY => option_env!("NUMBERS_WORKER_URL"),
                LOG_LEVEL_KEY => option_env!("NUMBERS_LOG_LEVEL"),
                _ => None,
            };
            baked.map(str::to_string)
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store_url = get(STORE_URL_KEY)
            .ok_or(ConfigError::Missing(STORE_URL_KEY))?
            .trim_end_matches('/')
            .to_string();
        let store_key = get(STORE_KEY_KEY).ok_or(ConfigError::Missing(STORE_KEY_KEY))?;

        let mode = match get(APP_MODE_KEY).as_deref() {
            None => AppMode::default(),
            Some("development") => AppMode::Development,
            Some("production") => AppMode::Production,
            Some(other) => return Err(ConfigError::Mode(other.to_string())),
        };

        let log_level = match get(LOG_LEVEL_KEY) {
            None => log::Level::Info,
            Some(raw) => raw
                .parse::<log::Level>()
                .map_err(|_| ConfigError::LogLevel(raw))?,
        };

        Ok(Self {
            store_url,
            store_key,
            mode,
            worker_url: get(WORKER_URL_KEY),
            log_level,
        })
    }
}
