//! Error types for ticket-desk
//!
//! Field-level validation problems and malformed import documents are not
//! errors in this sense: they are reported as data inside an
//! [`ImportPreview`](crate::import_export::ImportPreview). Everything here is
//! propagated to the caller and must end up in front of the user.

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, TicketDeskError>;

/// Generic notices shown to users when an operation fails
pub mod notices {
    pub const FILE_TOO_LARGE: &str = "File size exceeds 10MB limit";
    pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload a CSV or JSON file";
    pub const NETWORK_ERROR: &str = "Network error. Please check your connection and try again";
    pub const VALIDATION_ERROR: &str = "Please check your input and try again";
    pub const IMPORT_FAILED: &str = "Failed to import tickets. Please try again";
    pub const EXPORT_FAILED: &str = "Failed to export tickets. Please try again";
}

/// Main error type for ticket-desk
#[derive(Error, Debug)]
pub enum TicketDeskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to write export {path}: {source}")]
    ExportWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid export file name '{0}': must not contain path components")]
    InvalidFileName(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File size {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Invalid ticket: {field}: {message}")]
    InvalidTicket { field: String, message: String },

    #[error("Ticket not found: {id}")]
    TicketNotFound { id: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Custom(String),
}

impl TicketDeskError {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid-ticket error for a single field
    pub fn invalid_ticket(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTicket {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for failures raised by the persistence backend or its transport
    pub const fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Backend(_) | Self::Timeout { .. } | Self::TicketNotFound { .. }
        )
    }

    /// The generic notice to show the user for this failure
    #[must_use]
    pub const fn user_notice(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => notices::FILE_TOO_LARGE,
            Self::UnsupportedFormat(_) => notices::INVALID_FILE_TYPE,
            Self::InvalidTicket { .. } => notices::VALIDATION_ERROR,
            Self::Backend(_) | Self::Timeout { .. } | Self::TicketNotFound { .. } => {
                notices::NETWORK_ERROR
            },
            Self::Parse(_) | Self::Csv(_) | Self::Json(_) => {
                notices::IMPORT_FAILED
            },
            Self::Serialization(_) | Self::ExportWrite { .. } => notices::EXPORT_FAILED,
            Self::InvalidFileName(_) | Self::Io(_) | Self::Config(_) | Self::Custom(_) => {
                notices::VALIDATION_ERROR
            },
        }
    }

    /// Get a user-friendly suggestion for resolving this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnsupportedFormat(_) => {
                Some("Use a .csv or .json file, or pass --content-type".to_string())
            },
            Self::TicketNotFound { .. } => {
                Some("Run 'ticket-desk list' to see available tickets".to_string())
            },
            Self::Timeout { .. } => {
                Some("Increase api.timeout_ms in the configuration".to_string())
            },
            Self::InvalidFileName(_) => {
                Some("Pass a plain file name and choose the directory with --out-dir".to_string())
            },
            Self::FileTooLarge { limit, .. } => Some(format!(
                "Split the file into parts smaller than {} bytes",
                limit
            )),
            _ => None,
        }
    }
}
