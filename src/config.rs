//! Configuration for ticket-desk
//!
//! Settings are layered: built-in defaults, then an optional configuration
//! file (`ticket-desk.toml`, `.yaml` or `.json` in the working directory, or
//! an explicit path), then environment variables such as
//! `TICKET_DESK__API__TIMEOUT_MS=2000`.

use crate::error::{Result, TicketDeskError};
use crate::import_export::{CsvDialect, DuplicateKey, DuplicatePolicy, format::MAX_FILE_SIZE};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Base name of the configuration file looked up in the working directory
pub const CONFIG_FILE_STEM: &str = "ticket-desk";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "TICKET_DESK";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub import: ImportConfig,
    pub export: ExportConfig,
    pub cache: CacheConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment
    ///
    /// An explicit `path` must exist; the implicit `ticket-desk.*` file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE_STEM).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Reject settings no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.ui.page_size == 0 {
            return Err(TicketDeskError::custom("ui.page_size must be at least 1"));
        }
        if self.api.timeout_ms == 0 {
            return Err(TicketDeskError::custom("api.timeout_ms must be at least 1"));
        }
        if self.storage.storage_key.trim().is_empty() {
            return Err(TicketDeskError::custom("storage.storage_key must not be empty"));
        }
        Ok(())
    }
}

/// Which persistence collaborator backs the ticket cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Whole collection as JSON in a key-value store on disk
    #[default]
    Local,
    /// In-memory API with simulated latency
    Mock,
}

impl std::str::FromStr for BackendKind {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "mock" => Ok(Self::Mock),
            other => Err(TicketDeskError::custom(format!(
                "Unknown backend '{other}'. Use local or mock"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    /// Key the ticket collection is stored under
    pub storage_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
            storage_key: "tickets".to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "ticket-desk").map_or_else(
        || PathBuf::from(".ticket-desk"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Backend operations with their own simulated latency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    List,
    Mutation,
    BulkImport,
    BulkUpdate,
}

/// Simulated API timings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub list_latency_ms: u64,
    pub default_latency_ms: u64,
    pub bulk_import_latency_ms: u64,
    pub bulk_update_latency_ms: u64,
    /// Upper bound for any single backend call
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            list_latency_ms: 500,
            default_latency_ms: 300,
            bulk_import_latency_ms: 500,
            bulk_update_latency_ms: 400,
            timeout_ms: 10_000,
        }
    }
}

impl ApiConfig {
    /// No latency at all, for tests and scripted use
    #[must_use]
    pub fn instant() -> Self {
        Self {
            list_latency_ms: 0,
            default_latency_ms: 0,
            bulk_import_latency_ms: 0,
            bulk_update_latency_ms: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn latency(&self, operation: ApiOperation) -> Duration {
        Duration::from_millis(match operation {
            ApiOperation::List => self.list_latency_ms,
            ApiOperation::Mutation => self.default_latency_ms,
            ApiOperation::BulkImport => self.bulk_import_latency_ms,
            ApiOperation::BulkUpdate => self.bulk_update_latency_ms,
        })
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Largest accepted import file, in bytes
    pub max_file_size: u64,
    pub duplicates: DuplicatePolicy,
    pub duplicate_key: DuplicateKey,
    pub csv_delimiter: char,
    pub csv_quote: char,
    /// Escape character inside quoted CSV fields; quotes are doubled when unset
    pub csv_escape: Option<char>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            duplicates: DuplicatePolicy::default(),
            duplicate_key: DuplicateKey::default(),
            csv_delimiter: ',',
            csv_quote: '"',
            csv_escape: None,
        }
    }
}

impl ImportConfig {
    /// The CSV grammar described by these settings
    ///
    /// Non-ASCII characters cannot be CSV control bytes and fall back to the defaults.
    #[must_use]
    pub fn csv_dialect(&self) -> CsvDialect {
        let defaults = CsvDialect::default();
        let ascii = |c: char| u8::try_from(c).ok().filter(u8::is_ascii);
        CsvDialect {
            delimiter: ascii(self.csv_delimiter).unwrap_or(defaults.delimiter),
            quote: ascii(self.csv_quote).unwrap_or(defaults.quote),
            escape: self.csv_escape.and_then(ascii),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub include_metadata: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_metadata: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Refetch the collection after every successful mutation
    pub refetch_after_mutation: bool,
    /// Capacity of the change-notification channel
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refetch_after_mutation: true,
            event_capacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub page_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}
