//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::editor::EditorSurface;
use crate::domain::identity::UserIdentity;
use crate::domain::media::DEFAULT_NAMESPACE;
use crate::infra::storage::FIREBASE_DEFAULT_ENDPOINT;

pub use cli::{
    CategoriesArgs, CategoriesCommand, CliArgs, Command, ComposeArgs, FatesArgs, FatesCommand,
    MediaArgs, MediaCommand, Overrides, PostsArgs, PostsCommand,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "postdesk";
const DEFAULT_API_BASE_URL: &str = "http://api.koistory.site/api/v1/";
const DEFAULT_STORAGE_BACKEND: &str = "local";
const DEFAULT_MEDIA_DIR: &str = "uploads";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub editor: EditorSettings,
    pub logging: LoggingSettings,
    pub identity: Option<UserIdentity>,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub namespace: String,
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Firebase {
        endpoint: Url,
        bucket: String,
        auth_token: Option<String>,
    },
    Local {
        directory: PathBuf,
        public_base_url: Option<Url>,
    },
}

#[derive(Debug, Clone)]
pub struct EditorSettings {
    pub surface: EditorSurface,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("POSTDESK").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    storage: RawStorageSettings,
    editor: RawEditorSettings,
    logging: RawLoggingSettings,
    identity: RawIdentitySettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(backend) = overrides.storage_backend.as_ref() {
            self.storage.backend = Some(backend.clone());
        }
        if let Some(bucket) = overrides.storage_bucket.as_ref() {
            self.storage.bucket = Some(bucket.clone());
        }
        if let Some(directory) = overrides.storage_directory.as_ref() {
            self.storage.directory = Some(directory.clone());
        }
        if let Some(namespace) = overrides.storage_namespace.as_ref() {
            self.storage.namespace = Some(namespace.clone());
        }
        if let Some(surface) = overrides.editor_surface.as_ref() {
            self.editor.surface = Some(surface.clone());
        }
        if let Some(id) = overrides.user_id.as_ref() {
            self.identity.user_id = Some(id.clone());
        }
        if let Some(name) = overrides.user_name.as_ref() {
            self.identity.user_name = Some(name.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            storage,
            editor,
            logging,
            identity,
        } = raw;

        Ok(Self {
            api: build_api_settings(api)?,
            storage: build_storage_settings(storage)?,
            editor: build_editor_settings(editor)?,
            logging: build_logging_settings(logging)?,
            identity: build_identity(identity)?,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let value = api
        .base_url
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let base_url = parse_http_url(&value).map_err(|reason| LoadError::invalid("api.base_url", reason))?;
    Ok(ApiSettings { base_url })
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let namespace = non_empty(storage.namespace)
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
        .trim_matches('/')
        .to_string();
    if namespace.is_empty() {
        return Err(LoadError::invalid(
            "storage.namespace",
            "namespace must not be empty",
        ));
    }

    let backend_name = non_empty(storage.backend)
        .unwrap_or_else(|| DEFAULT_STORAGE_BACKEND.to_string())
        .to_ascii_lowercase();

    let backend = match backend_name.as_str() {
        "firebase" => {
            let bucket = non_empty(storage.bucket).ok_or_else(|| {
                LoadError::invalid("storage.bucket", "required for the firebase backend")
            })?;
            let endpoint_value = non_empty(storage.endpoint)
                .unwrap_or_else(|| FIREBASE_DEFAULT_ENDPOINT.to_string());
            let endpoint = parse_http_url(&endpoint_value)
                .map_err(|reason| LoadError::invalid("storage.endpoint", reason))?;
            StorageBackend::Firebase {
                endpoint,
                bucket,
                auth_token: non_empty(storage.auth_token),
            }
        }
        "local" => {
            let directory = storage
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_DIR));
            if directory.as_os_str().is_empty() {
                return Err(LoadError::invalid(
                    "storage.directory",
                    "path must not be empty",
                ));
            }
            let public_base_url = non_empty(storage.public_base_url)
                .map(|value| parse_http_url(&value))
                .transpose()
                .map_err(|reason| LoadError::invalid("storage.public_base_url", reason))?;
            StorageBackend::Local {
                directory,
                public_base_url,
            }
        }
        other => {
            return Err(LoadError::invalid(
                "storage.backend",
                format!("unknown backend `{other}` (expected firebase or local)"),
            ));
        }
    };

    Ok(StorageSettings { namespace, backend })
}

fn build_editor_settings(editor: RawEditorSettings) -> Result<EditorSettings, LoadError> {
    let surface = match non_empty(editor.surface) {
        Some(value) => EditorSurface::from_str(&value)
            .map_err(|reason| LoadError::invalid("editor.surface", reason))?,
        None => EditorSurface::default(),
    };
    Ok(EditorSettings { surface })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_identity(identity: RawIdentitySettings) -> Result<Option<UserIdentity>, LoadError> {
    match (non_empty(identity.user_id), non_empty(identity.user_name)) {
        (Some(id), Some(user_name)) => Ok(Some(UserIdentity { id, user_name })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(LoadError::invalid(
            "identity.user_name",
            "required when identity.user_id is set",
        )),
        (None, Some(_)) => Err(LoadError::invalid(
            "identity.user_id",
            "required when identity.user_name is set",
        )),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_http_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value.trim()).map_err(|err| format!("invalid url: {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme `{other}`")),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    backend: Option<String>,
    namespace: Option<String>,
    endpoint: Option<String>,
    bucket: Option<String>,
    auth_token: Option<String>,
    directory: Option<PathBuf>,
    public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEditorSettings {
    surface: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawIdentitySettings {
    user_id: Option<String>,
    user_name: Option<String>,
}
