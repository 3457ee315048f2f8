use super::format::DataFormat;
use crate::core::{Ticket, format_timestamp};
use crate::error::{Result, TicketDeskError};
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Version stamped into JSON exports
pub const EXPORT_VERSION: &str = "1.0";

/// Column order of CSV exports
pub const CSV_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "surname",
    "company",
    "email",
    "description",
    "priority",
    "createdAt",
];

/// Options for one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: DataFormat,
    /// Add `metadata` to JSON exports; ignored for CSV
    pub include_metadata: bool,
    /// File name to use instead of `tickets_<date>.<ext>`
    pub filename: Option<String>,
}

impl ExportOptions {
    #[must_use]
    pub const fn new(format: DataFormat) -> Self {
        Self {
            format,
            include_metadata: false,
            filename: None,
        }
    }
}

/// A serialized export, ready to be handed to whatever delivers files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub content: String,
    pub filename: String,
    pub mime_type: &'static str,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its file name
    ///
    /// The file name must be a single plain component, so the file always
    /// lands directly inside `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        check_file_name(&self.filename)?;
        let path = dir.join(&self.filename);
        let write_failed = |source: std::io::Error| TicketDeskError::ExportWrite {
            path: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(dir).map_err(write_failed)?;
        std::fs::write(&path, &self.content).map_err(write_failed)?;
        info!(path = %path.display(), bytes = self.content.len(), "Export written");
        Ok(path)
    }
}

/// Summary statistics included in JSON exports on request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub total_tickets: usize,
    pub priority_distribution: BTreeMap<String, usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    tickets: &'a [Ticket],
    export_date: String,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<ExportMetadata>,
}

/// Serialize `tickets` according to `options`
pub fn export_tickets(tickets: &[Ticket], options: &ExportOptions) -> Result<ExportArtifact> {
    export_tickets_at(tickets, options, Utc::now())
}

/// [`export_tickets`] with an explicit export time
pub fn export_tickets_at(
    tickets: &[Ticket],
    options: &ExportOptions,
    now: DateTime<Utc>,
) -> Result<ExportArtifact> {
    let content = match options.format {
        DataFormat::Csv => export_csv(tickets)?,
        DataFormat::Json => export_json(tickets, options.include_metadata, now)?,
    };

    let filename = match &options.filename {
        Some(name) => {
            check_file_name(name)?;
            with_extension(name, options.format)
        },
        None => default_filename(options.format, now),
    };

    info!(
        tickets = tickets.len(),
        format = %options.format,
        filename = %filename,
        "Exported tickets"
    );

    Ok(ExportArtifact {
        content,
        filename,
        mime_type: options.format.mime_type(),
    })
}

/// Export tickets to CSV, quoting every field
pub fn export_csv(tickets: &[Ticket]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .quote(b'"')
        .double_quote(true)
        .from_writer(vec![]);

    writer.write_record(CSV_COLUMNS).map_err(|e| {
        TicketDeskError::Serialization(format!("Failed to write CSV header: {e}"))
    })?;

    for ticket in tickets {
        let created_at = format_timestamp(&ticket.created_at);
        writer
            .write_record([
                ticket.id.as_str(),
                ticket.name.as_str(),
                ticket.surname.as_str(),
                ticket.company.as_str(),
                ticket.email.as_str(),
                ticket.description.as_str(),
                ticket.priority.as_str(),
                created_at.as_str(),
            ])
            .map_err(|e| {
                TicketDeskError::Serialization(format!("Failed to write CSV record: {e}"))
            })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TicketDeskError::Serialization(format!("Failed to get CSV data: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| TicketDeskError::Serialization(format!("Invalid UTF-8 in CSV: {e}")))
}

/// Export tickets to pretty-printed JSON
pub fn export_json(tickets: &[Ticket], include_metadata: bool, now: DateTime<Utc>) -> Result<String> {
    let document = JsonExport {
        tickets,
        export_date: format_timestamp(&now),
        version: EXPORT_VERSION,
        metadata: include_metadata.then(|| ExportMetadata {
            total_tickets: tickets.len(),
            priority_distribution: priority_distribution(tickets),
        }),
    };

    serde_json::to_string_pretty(&document).map_err(|e| {
        TicketDeskError::Serialization(format!("Failed to serialize to JSON: {e}"))
    })
}

/// Count tickets per priority; priorities with no tickets are absent
#[must_use]
pub fn priority_distribution(tickets: &[Ticket]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for ticket in tickets {
        *distribution
            .entry(ticket.priority.as_str().to_string())
            .or_insert(0) += 1;
    }
    distribution
}

/// `tickets_<YYYY-MM-DD>.<ext>`
#[must_use]
pub fn default_filename(format: DataFormat, now: DateTime<Utc>) -> String {
    format!("tickets_{}.{}", now.format("%Y-%m-%d"), format.extension())
}

fn check_file_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(only)), None) if only == name => Ok(()),
        _ => Err(TicketDeskError::InvalidFileName(name.to_string())),
    }
}

fn with_extension(name: &str, format: DataFormat) -> String {
    let suffix = format!(".{}", format.extension());
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}
