use crate::error::{Result, TicketDeskError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default upper bound for an import file
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported data formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    /// Get file extension for the format
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// MIME type used for exports and matched on imports
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }

    /// Format for a file extension (case-insensitive, without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Format for a content type; parameters such as `charset` are ignored
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/csv" => Some(Self::Csv),
            "application/json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Pick a format from the file name first, then the declared content type
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Result<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .or_else(|| content_type.and_then(Self::from_content_type))
            .ok_or_else(|| {
                TicketDeskError::UnsupportedFormat(format!(
                    "Unable to detect file format of '{file_name}'. Please use .csv or .json files."
                ))
            })
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DataFormat {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim())
            .ok_or_else(|| TicketDeskError::UnsupportedFormat(format!("Unsupported format: {s}")))
    }
}

/// A document handed to the import pipeline
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Wrap in-memory content
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// Declare the content type the file arrived with
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Detect the format from the name and declared content type
    pub fn format(&self) -> Result<DataFormat> {
        DataFormat::detect(&self.name, self.content_type.as_deref())
    }

    /// Reject files above `max_size` bytes
    pub fn check_size(&self, max_size: u64) -> Result<()> {
        if self.size() > max_size {
            return Err(TicketDeskError::FileTooLarge {
                size: self.size(),
                limit: max_size,
            });
        }
        Ok(())
    }

    /// The content as UTF-8 text, without a leading byte-order mark
    pub fn text(&self) -> Result<&str> {
        let text = std::str::from_utf8(&self.bytes)
            .map_err(|e| TicketDeskError::Parse(format!("File is not valid UTF-8: {e}")))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
    }
}
