use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use juris_stream::{DEFAULT_BASE_URL, DEFAULT_STREAM_PATH, TransportConfig};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "juris";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "JURIS_";

pub const DEFAULT_SUBMIT_LABEL: &str = "Envoyer";
pub const DEFAULT_BUSY_LABEL: &str = "Génération...";
pub const DEFAULT_NO_BODY_MESSAGE: &str = "Erreur : Pas de corps de réponse.";
pub const DEFAULT_CONNECTION_ERROR_MESSAGE: &str = "Erreur lors de la connexion au serveur.";

/// Endpoint and user-visible strings of the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
    #[serde(default = "default_busy_label")]
    pub busy_label: String,
    #[serde(default = "default_no_body_message")]
    pub no_body_message: String,
    #[serde(default = "default_connection_error_message")]
    pub connection_error_message: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stream_path: default_stream_path(),
            submit_label: default_submit_label(),
            busy_label: default_busy_label(),
            no_body_message: default_no_body_message(),
            connection_error_message: default_connection_error_message(),
        }
    }
}

impl ChatSettings {
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(&self.base_url, &self.stream_path)
    }

    /// Trims every field and puts defaults back in place of blank values.
    pub fn normalized(self) -> Self {
        Self {
            base_url: non_blank_or(self.base_url, default_base_url),
            stream_path: non_blank_or(self.stream_path, default_stream_path),
            submit_label: non_blank_or(self.submit_label, default_submit_label),
            busy_label: non_blank_or(self.busy_label, default_busy_label),
            no_body_message: non_blank_or(self.no_body_message, default_no_body_message),
            connection_error_message: non_blank_or(
                self.connection_error_message,
                default_connection_error_message,
            ),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to load settings from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings resolved once at start-up: defaults, then the JSON file, then
/// `JURIS_`-prefixed environment variables.
pub struct SettingsStore {
    settings: ChatSettings,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".juris"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = match Self::try_load(&config_path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(
                    path = ?config_path,
                    error = %error,
                    "failed to parse settings, using defaults"
                );
                ChatSettings::default()
            }
        };

        Self {
            settings,
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn try_load(path: &Path) -> SettingsResult<ChatSettings> {
        if !path.exists() {
            tracing::info!(path = ?path, "settings file not found, using defaults and environment");
        }

        let figment = Figment::from(Serialized::defaults(ChatSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX));

        let settings = figment
            .extract::<ChatSettings>()
            .context(ExtractSnafu {
                stage: "extract-settings",
                path: path.to_path_buf(),
            })?;

        Ok(settings.normalized())
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

fn non_blank_or(value: String, default: fn() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default()
    } else {
        trimmed.to_string()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_stream_path() -> String {
    DEFAULT_STREAM_PATH.to_string()
}

fn default_submit_label() -> String {
    DEFAULT_SUBMIT_LABEL.to_string()
}

fn default_busy_label() -> String {
    DEFAULT_BUSY_LABEL.to_string()
}

fn default_no_body_message() -> String {
    DEFAULT_NO_BODY_MESSAGE.to_string()
}

fn default_connection_error_message() -> String {
    DEFAULT_CONNECTION_ERROR_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("absent.json");
            let settings = SettingsStore::try_load(&path).map_err(|error| error.to_string())?;
            assert_eq!(settings, ChatSettings::default());
            assert_eq!(settings.transport_config().endpoint(), "http://127.0.0.1:5000/stream");
            Ok(())
        });
    }

    #[test]
    fn file_values_override_defaults_and_blanks_fall_back() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.json",
                r#"{ "base_url": "http://juris.local:8080/", "busy_label": "   " }"#,
            )?;
            let settings = SettingsStore::try_load(&jail.directory().join("settings.json"))
                .map_err(|error| error.to_string())?;

            assert_eq!(settings.base_url, "http://juris.local:8080/");
            assert_eq!(settings.busy_label, DEFAULT_BUSY_LABEL);
            assert_eq!(
                settings.transport_config().endpoint(),
                "http://juris.local:8080/stream"
            );
            Ok(())
        });
    }

    #[test]
    fn environment_wins_over_file() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{ "stream_path": "/from-file" }"#)?;
            jail.set_env("JURIS_STREAM_PATH", "/from-env");
            let settings = SettingsStore::try_load(&jail.directory().join("settings.json"))
                .map_err(|error| error.to_string())?;

            assert_eq!(settings.stream_path, "/from-env");
            Ok(())
        });
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", "{ not json")?;
            let path = jail.directory().join("settings.json");

            assert!(SettingsStore::try_load(&path).is_err());
            let store = SettingsStore::new(path.clone());
            assert_eq!(store.settings(), &ChatSettings::default());
            assert_eq!(store.config_path(), path.as_path());
            Ok(())
        });
    }
}
