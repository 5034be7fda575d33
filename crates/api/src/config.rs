//! Configuration file, environment overrides and the live snapshot store.
//!
//! The file is TOML. Any `REDACTEDHOOK__*` environment variable listed in
//! [`AppConfig::apply_env`] wins over the file. The validated result is held
//! in a [`ConfigStore`] so a reload swaps the whole snapshot at once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::ArcSwap;
use redactedhook_core::error::CoreError;
use redactedhook_core::resolver::HookDefaults;
use redactedhook_core::size::ByteSize;
use redactedhook_core::types::UploaderMode;
use redactedhook_core::validation::MAX_MIN_RATIO;
use redactedhook_indexer::api::{OPS_API_URL, REDACTED_API_URL};
use redactedhook_indexer::IndexerEndpoints;
use serde::{Deserialize, Serialize};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "REDACTEDHOOK__";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Commented template written by `create-config`.
pub const CONFIG_TEMPLATE: &str = include_str!("../config.example.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// File sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 42135,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationSection {
    pub api_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerKeysSection {
    pub red_apikey: String,
    pub ops_apikey: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserIdSection {
    pub red_user_id: i64,
    pub ops_user_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioSection {
    pub minratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeCheckSection {
    pub minsize: ByteSize,
    pub maxsize: ByteSize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadersSection {
    pub uploaders: String,
    pub mode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordLabelsSection {
    pub record_labels: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicRatioSection {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    pub discord_webhook_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsSection {
    pub loglevel: String,
    pub logtofile: bool,
    pub logfilepath: String,
    pub maxbackups: usize,
}

impl Default for LogsSection {
    fn default() -> Self {
        Self {
            loglevel: "info".into(),
            logtofile: false,
            logfilepath: "redactedhook.log".into(),
            maxbackups: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexersSection {
    pub redacted_url: String,
    pub ops_url: String,
}

impl Default for IndexersSection {
    fn default() -> Self {
        Self {
            redacted_url: REDACTED_API_URL.into(),
            ops_url: OPS_API_URL.into(),
        }
    }
}

/// The whole configuration file. Missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub authorization: AuthorizationSection,
    pub indexer_keys: IndexerKeysSection,
    pub userid: UserIdSection,
    pub ratio: RatioSection,
    pub sizecheck: SizeCheckSection,
    pub uploaders: UploadersSection,
    pub record_labels: RecordLabelsSection,
    pub dynamic_ratio: DynamicRatioSection,
    pub notifications: NotificationsSection,
    pub logs: LogsSection,
    pub indexers: IndexersSection,
}

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

/// Captured `REDACTEDHOOK__*` variables, keyed without the prefix.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides(HashMap<String, String>);

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self(
            std::env::vars()
                .filter_map(|(k, v)| Some((k.strip_prefix(ENV_PREFIX)?.to_string(), v)))
                .collect(),
        )
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Enough to run without a config file.
    pub fn is_self_sufficient(&self) -> bool {
        self.get("API_TOKEN").is_some()
            && (self.get("RED_APIKEY").is_some() || self.get("OPS_APIKEY").is_some())
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file at `path` (when it exists), then apply `env`.
    pub fn load(path: &Path, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text, path)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && env.is_self_sufficient() => {
                tracing::info!(path = %path.display(), "No config file, using environment only");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `HOST`, `PORT`, `API_TOKEN`, `RED_APIKEY`, `OPS_APIKEY` and
    /// `LOGS_LOGLEVEL`.
    pub fn apply_env(&mut self, env: &EnvOverrides) -> Result<(), ConfigError> {
        if let Some(host) = env.get("HOST") {
            self.server.host = host.to_string();
        }
        if let Some(port) = env.get("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("invalid PORT value: {port}")))?;
        }
        if let Some(token) = env.get("API_TOKEN") {
            self.authorization.api_token = token.to_string();
        }
        if let Some(key) = env.get("RED_APIKEY") {
            self.indexer_keys.red_apikey = key.to_string();
        }
        if let Some(key) = env.get("OPS_APIKEY") {
            self.indexer_keys.ops_apikey = key.to_string();
        }
        if let Some(level) = env.get("LOGS_LOGLEVEL") {
            self.logs.loglevel = level.to_string();
        }
        Ok(())
    }

    /// Check every rule and report all failures together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.authorization.api_token.trim().is_empty() {
            errors.push("authorization.api_token is required".to_string());
        }
        if self.indexer_keys.red_apikey.is_empty() && self.indexer_keys.ops_apikey.is_empty() {
            errors.push("at least one of indexer_keys.red_apikey or indexer_keys.ops_apikey is required".to_string());
        }
        if self.server.host.trim().is_empty() {
            errors.push("server.host must not be empty".to_string());
        }
        if self.server.port == 0 {
            errors.push("server.port must not be 0".to_string());
        }
        if !(0.0..=MAX_MIN_RATIO).contains(&self.ratio.minratio) {
            errors.push(format!("ratio.minratio must be between 0 and {MAX_MIN_RATIO}"));
        }
        let (min, max) = (self.sizecheck.minsize, self.sizecheck.maxsize);
        if !min.is_zero() && !max.is_zero() && min > max {
            errors.push("sizecheck.minsize cannot be greater than sizecheck.maxsize".to_string());
        }
        if !self.uploaders.uploaders.trim().is_empty() {
            if let Err(CoreError::Validation(msg)) = UploaderMode::from_str(self.uploaders.mode.trim()) {
                errors.push(format!("uploaders.{msg}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }

    /// Defaults for omitted request fields. Empty and zero values in the file
    /// mean "no default".
    pub fn hook_defaults(&self) -> HookDefaults {
        fn text(s: &str) -> Option<String> {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        fn positive(id: i64) -> Option<i64> {
            (id > 0).then_some(id)
        }
        fn size(size: ByteSize) -> Option<ByteSize> {
            (!size.is_zero()).then_some(size)
        }

        HookDefaults {
            red_user_id: positive(self.userid.red_user_id),
            ops_user_id: positive(self.userid.ops_user_id),
            red_apikey: text(&self.indexer_keys.red_apikey),
            ops_apikey: text(&self.indexer_keys.ops_apikey),
            minratio: (self.ratio.minratio > 0.0).then_some(self.ratio.minratio),
            minsize: size(self.sizecheck.minsize),
            maxsize: size(self.sizecheck.maxsize),
            uploaders: text(&self.uploaders.uploaders),
            mode: text(&self.uploaders.mode),
            record_labels: text(&self.record_labels.record_labels),
        }
    }

    pub fn endpoints(&self) -> IndexerEndpoints {
        IndexerEndpoints {
            redacted: self.indexers.redacted_url.clone(),
            ops: self.indexers.ops_url.clone(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Write the commented template to `path`, refusing to overwrite.
pub fn write_template(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, CONFIG_TEMPLATE).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Snapshot store
// ---------------------------------------------------------------------------

/// Holds the current validated configuration.
///
/// Readers take an `Arc` snapshot with [`current`](Self::current) and keep a
/// consistent view for the rest of the request, however many reloads happen
/// meanwhile.
pub struct ConfigStore {
    current: ArcSwap<AppConfig>,
    path: PathBuf,
    env: EnvOverrides,
}

impl ConfigStore {
    /// Load, validate and wrap the configuration at `path`.
    pub fn load(path: impl Into<PathBuf>, env: EnvOverrides) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = AppConfig::load(&path, &env)?;
        Ok(Self {
            current: ArcSwap::from_pointee(config),
            path,
            env,
        })
    }

    /// Wrap an already-built configuration.
    pub fn from_config(config: AppConfig, path: impl Into<PathBuf>) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
            path: path.into(),
            env: EnvOverrides::default(),
        }
    }

    pub fn current(&self) -> Arc<AppConfig> {
        self.current.load_full()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time of the backing file, if it can be read.
    pub fn file_modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    /// Re-read the file and swap in the result. On any error the previous
    /// snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<AppConfig>, ConfigError> {
        let next = Arc::new(AppConfig::load(&self.path, &self.env)?);
        let previous = self.current.swap(Arc::clone(&next));
        log_changes(&previous, &next);
        Ok(next)
    }

    /// Raise the default minimum ratio to `ratio` floored to two decimals,
    /// if that is higher than the current default. Returns the new value
    /// when it changed. Only the in-memory snapshot is updated.
    ///
    /// Every passing ratio check ratchets the configured default, including
    /// checks run against a caller-supplied `minratio`. The result never
    /// exceeds [`MAX_MIN_RATIO`], so raised defaults still validate.
    pub fn raise_min_ratio(&self, ratio: f64) -> Option<f64> {
        let floored = ((ratio * 100.0).floor() / 100.0).min(MAX_MIN_RATIO);
        let mut raised = None;
        self.current.rcu(|cfg| {
            if floored > cfg.ratio.minratio {
                raised = Some(floored);
                let mut next = AppConfig::clone(cfg);
                next.ratio.minratio = floored;
                Arc::new(next)
            } else {
                raised = None;
                Arc::clone(cfg)
            }
        });
        raised
    }
}

fn log_changes(old: &AppConfig, new: &AppConfig) {
    let mut changed = Vec::new();
    if old.userid != new.userid {
        changed.push("userid");
    }
    if old.ratio != new.ratio {
        changed.push("ratio");
    }
    if old.sizecheck != new.sizecheck {
        changed.push("sizecheck");
    }
    if old.uploaders != new.uploaders {
        changed.push("uploaders");
    }
    if old.record_labels != new.record_labels {
        changed.push("record_labels");
    }
    if old.indexer_keys != new.indexer_keys {
        changed.push("indexer_keys");
    }
    if old.authorization != new.authorization {
        changed.push("authorization");
    }
    if old.dynamic_ratio != new.dynamic_ratio {
        changed.push("dynamic_ratio");
    }
    if old.notifications != new.notifications {
        changed.push("notifications");
    }

    if changed.is_empty() {
        tracing::debug!("Config reloaded, no changes");
    } else {
        tracing::info!(sections = %changed.join(", "), "Config reloaded");
    }
    if old.server != new.server || old.logs != new.logs || old.indexers != new.indexers {
        tracing::warn!("Changes to [server], [logs] or [indexers] take effect after a restart");
    }
}
