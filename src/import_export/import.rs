//! Import pipeline
//!
//! Importing happens in two steps. [`ImportPipeline::preview`] parses and
//! validates a document without touching any collection and returns an
//! [`ImportPreview`]. Once the caller accepts the preview, [`plan_import`]
//! applies the duplicate policy against an existing collection. The ticket
//! cache commits the resulting plan as a single mutation.

use super::format::{DataFormat, MAX_FILE_SIZE, SourceFile};
use super::parser::{CsvDialect, JsonDocument, RawRecord, parse_csv, parse_json};
use crate::config::ImportConfig;
use crate::core::{Priority, Ticket, TicketId, now_millis, parse_timestamp};
use crate::error::{Result, TicketDeskError};
use crate::validation::{is_recognized_priority, is_valid_email};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Fields every imported record must carry, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 6] = [
    "name",
    "surname",
    "company",
    "email",
    "description",
    "priority",
];

/// One validation failure found while importing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportError {
    /// 1-based position of the record in the source document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    /// The offending raw value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ImportError {
    fn field(row: usize, field: &str, message: impl Into<String>, value: Option<&Value>) -> Self {
        Self {
            row: Some(row),
            field: Some(field.to_string()),
            message: message.into(),
            value: value.cloned(),
        }
    }

    /// An error about the document as a whole
    pub fn structural(message: impl Into<String>) -> Self {
        Self {
            row: None,
            field: None,
            message: message.into(),
            value: None,
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, &self.field) {
            (Some(row), Some(field)) => write!(f, "row {row}, {field}: {}", self.message),
            (Some(row), None) => write!(f, "row {row}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Dry-run result of parsing and validating a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub tickets: Vec<Ticket>,
    pub errors: Vec<ImportError>,
    pub total_rows: usize,
    pub valid_rows: usize,
    /// Number of errors, not of rejected records; a record failing two checks counts twice
    pub invalid_rows: usize,
    /// Number of records that produced at least one error
    pub rejected_records: usize,
}

impl ImportPreview {
    /// Preview for a document whose overall shape could not be interpreted
    #[must_use]
    pub fn structural(message: impl Into<String>) -> Self {
        Self {
            errors: vec![ImportError::structural(message)],
            invalid_rows: 1,
            ..Self::default()
        }
    }

    /// True when every record became a ticket
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Where a batch of records came from; decides how rows are numbered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    /// Delimited text; the header occupies row 1
    Delimited,
    /// JSON array elements, numbered from 1
    Json,
}

impl RowOrigin {
    #[must_use]
    pub const fn row_number(self, index: usize) -> usize {
        match self {
            Self::Delimited => index + 2,
            Self::Json => index + 1,
        }
    }
}

/// Validate every record and build tickets from the ones that pass
pub fn process_records(records: &[RawRecord], origin: RowOrigin) -> ImportPreview {
    process_records_at(records, origin, now_millis())
}

/// [`process_records`] with an explicit clock, used for ids and missing timestamps
pub fn process_records_at(
    records: &[RawRecord],
    origin: RowOrigin,
    now: DateTime<Utc>,
) -> ImportPreview {
    let now = now.trunc_subsecs(3);
    let batch_millis = now.timestamp_millis();
    let mut preview = ImportPreview {
        total_rows: records.len(),
        ..ImportPreview::default()
    };

    for (index, record) in records.iter().enumerate() {
        let row = origin.row_number(index);
        let errors = check_record(record, row);

        if errors.is_empty() {
            preview.tickets.push(build_ticket(record, index, batch_millis, now));
        } else {
            debug!(row, errors = errors.len(), "Rejected import record");
            preview.rejected_records += 1;
            preview.errors.extend(errors);
        }
    }

    preview.valid_rows = preview.tickets.len();
    preview.invalid_rows = preview.errors.len();
    preview
}

/// Run all field checks for one record without stopping at the first failure
fn check_record(record: &RawRecord, row: usize) -> Vec<ImportError> {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        let raw = record.get(field);
        let Some(value) = record.non_blank(field) else {
            errors.push(ImportError::field(
                row,
                field,
                format!("{} is required", capitalize(field)),
                raw,
            ));
            continue;
        };

        match field {
            "email" if !is_valid_email(&value) => {
                errors.push(ImportError::field(row, field, "Invalid email format", raw));
            },
            "priority" if !is_recognized_priority(&value) => {
                errors.push(ImportError::field(
                    row,
                    field,
                    "Priority must be high, medium, or low",
                    raw,
                ));
            },
            _ => {},
        }
    }

    errors
}

fn build_ticket(record: &RawRecord, index: usize, batch_millis: i64, now: DateTime<Utc>) -> Ticket {
    let text = |field: &str| record.non_blank(field).unwrap_or_default();

    let id = record
        .non_blank("id")
        .map_or_else(|| TicketId::imported(batch_millis, index), TicketId::new);

    let created_at = match record.non_blank("createdAt") {
        Some(raw) => parse_timestamp(&raw).unwrap_or_else(|| {
            warn!(id = %id, value = %raw, "Unparsable createdAt, using import time");
            now
        }),
        None => now,
    };

    Ticket {
        id,
        name: text("name"),
        surname: text("surname"),
        company: text("company"),
        email: text("email"),
        description: text("description"),
        priority: Priority::normalize(&text("priority")),
        created_at,
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// What to do with an incoming ticket that matches an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Leave the existing ticket alone and drop the incoming one
    #[default]
    Skip,
    /// Replace the existing ticket's content and `createdAt`, keeping its id
    Overwrite,
    /// Shallow-merge incoming content, keeping the existing id and `createdAt`
    Merge,
}

impl FromStr for DuplicatePolicy {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            "merge" => Ok(Self::Merge),
            other => Err(TicketDeskError::custom(format!(
                "Unknown duplicate policy '{other}'. Use skip, overwrite or merge"
            ))),
        }
    }
}

/// How an incoming ticket is recognised as a duplicate
///
/// A matching id always counts. The key adds a content-based rule on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKey {
    /// Only identical ids match
    Id,
    /// Same email, compared case-insensitively
    Email,
    /// Same email and same first name
    #[default]
    EmailAndName,
}

impl DuplicateKey {
    /// Whether `incoming` should be reconciled with `existing`
    #[must_use]
    pub fn matches(self, existing: &Ticket, incoming: &Ticket) -> bool {
        let same_email = || {
            existing
                .email
                .trim()
                .eq_ignore_ascii_case(incoming.email.trim())
        };
        match self {
            Self::Id => false,
            Self::Email => same_email(),
            Self::EmailAndName => same_email() && existing.name.trim() == incoming.name.trim(),
        }
    }
}

impl FromStr for DuplicateKey {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "id" => Ok(Self::Id),
            "email" => Ok(Self::Email),
            "email_and_name" | "email_name" => Ok(Self::EmailAndName),
            other => Err(TicketDeskError::custom(format!(
                "Unknown duplicate key '{other}'. Use id, email or email-and-name"
            ))),
        }
    }
}

/// Options for one import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Declared format; detected from the file when `None`
    pub format: Option<DataFormat>,
    pub handle_duplicates: DuplicatePolicy,
    pub duplicate_key: DuplicateKey,
    /// Stop after the preview
    pub validate_only: bool,
}

impl ImportOptions {
    /// Defaults taken from configuration
    #[must_use]
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            handle_duplicates: config.duplicates,
            duplicate_key: config.duplicate_key,
            ..Self::default()
        }
    }
}

/// Counts of what a committed import did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub overwritten: usize,
    pub merged: usize,
    pub skipped: usize,
}

impl ImportSummary {
    #[must_use]
    pub const fn total_processed(&self) -> usize {
        self.imported + self.overwritten + self.merged + self.skipped
    }

    /// Incoming tickets that matched an existing one
    #[must_use]
    pub const fn duplicates(&self) -> usize {
        self.overwritten + self.merged + self.skipped
    }
}

/// The net effect of an import, computed before anything is applied
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    /// The whole collection as it will look after the import
    pub tickets: Vec<Ticket>,
    /// Tickets that are new or changed, one entry per id
    pub changed: Vec<Ticket>,
    pub summary: ImportSummary,
}

/// Apply the duplicate policy to `incoming` against `existing`
///
/// Incoming tickets are applied in order onto a working copy, so two incoming
/// tickets that match each other are reconciled the same way. Ids in the
/// result are unique.
#[must_use]
pub fn plan_import(existing: &[Ticket], incoming: &[Ticket], options: &ImportOptions) -> ImportPlan {
    let mut tickets = existing.to_vec();
    let mut changed: Vec<Ticket> = Vec::new();
    let mut summary = ImportSummary::default();

    for candidate in incoming {
        let position = tickets
            .iter()
            .position(|t| t.id == candidate.id)
            .or_else(|| {
                tickets
                    .iter()
                    .position(|t| options.duplicate_key.matches(t, candidate))
            });

        let Some(index) = position else {
            tickets.push(candidate.clone());
            record_change(&mut changed, candidate);
            summary.imported += 1;
            continue;
        };

        match options.handle_duplicates {
            DuplicatePolicy::Skip => {
                debug!(id = %candidate.id, existing = %tickets[index].id, "Skipping duplicate");
                summary.skipped += 1;
            },
            DuplicatePolicy::Overwrite => {
                let replacement = Ticket {
                    id: tickets[index].id.clone(),
                    ..candidate.clone()
                };
                record_change(&mut changed, &replacement);
                tickets[index] = replacement;
                summary.overwritten += 1;
            },
            DuplicatePolicy::Merge => {
                tickets[index].merge_from(candidate);
                record_change(&mut changed, &tickets[index]);
                summary.merged += 1;
            },
        }
    }

    ImportPlan {
        tickets,
        changed,
        summary,
    }
}

fn record_change(changed: &mut Vec<Ticket>, ticket: &Ticket) {
    match changed.iter_mut().find(|t| t.id == ticket.id) {
        Some(slot) => slot.clone_from(ticket),
        None => changed.push(ticket.clone()),
    }
}

/// Reads, parses and validates import documents
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    max_file_size: u64,
    dialect: CsvDialect,
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            dialect: CsvDialect::default(),
        }
    }
}

impl ImportPipeline {
    #[must_use]
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            dialect: config.csv_dialect(),
        }
    }

    /// Preview a file: detect its format, check its size, parse and validate
    pub fn preview(&self, file: &SourceFile, options: &ImportOptions) -> Result<ImportPreview> {
        let format = match options.format {
            Some(format) => format,
            None => file.format()?,
        };
        file.check_size(self.max_file_size)?;

        let preview = self.preview_text(file.text()?, format)?;
        info!(
            file = %file.name,
            %format,
            total = preview.total_rows,
            valid = preview.valid_rows,
            errors = preview.invalid_rows,
            "Import preview ready"
        );
        Ok(preview)
    }

    /// Preview already-decoded text in a known format
    pub fn preview_text(&self, text: &str, format: DataFormat) -> Result<ImportPreview> {
        match format {
            DataFormat::Csv => {
                let records = parse_csv(text, &self.dialect)?;
                Ok(process_records(&records, RowOrigin::Delimited))
            },
            DataFormat::Json => match parse_json(text)? {
                JsonDocument::Records(records) => Ok(process_records(&records, RowOrigin::Json)),
                JsonDocument::Malformed(message) => Ok(ImportPreview::structural(message)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TicketBuilder;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord::from_pairs(pairs.iter().copied())
    }

    fn complete_record() -> Vec<(&'static str, &'static str)> {
        vec![
            ("name", "A"),
            ("surname", "B"),
            ("company", "C"),
            ("email", "a@b.com"),
            ("description", "long enough desc"),
            ("priority", "HIGH"),
        ]
    }

    fn existing(id: &str, name: &str, email: &str) -> Ticket {
        TicketBuilder::new()
            .id(id)
            .name(name)
            .surname("Doe")
            .company("Tech Corp")
            .email(email)
            .description("Existing ticket description")
            .priority(Priority::Low)
            .created_at(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
            .build()
    }

    #[test]
    fn test_valid_record_becomes_ticket() {
        let preview = process_records_at(&[record(&complete_record())], RowOrigin::Delimited, fixed_now());
        assert!(preview.is_clean());
        assert_eq!(preview.valid_rows, 1);
        let ticket = &preview.tickets[0];
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.created_at, fixed_now());
        assert_eq!(
            ticket.id,
            TicketId::imported(fixed_now().timestamp_millis(), 0)
        );
    }

    #[test]
    fn test_values_are_trimmed_and_id_kept() {
        let mut pairs = complete_record();
        pairs[0] = ("name", "  Ann  ");
        pairs.push(("id", "T-9"));
        pairs.push(("createdAt", "2024-01-15T10:30:00.000Z"));
        let preview = process_records_at(&[record(&pairs)], RowOrigin::Json, fixed_now());
        let ticket = &preview.tickets[0];
        assert_eq!(ticket.name, "Ann");
        assert_eq!(ticket.id.as_str(), "T-9");
        assert_eq!(
            ticket.created_at,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_unparsable_created_at_uses_now() {
        let mut pairs = complete_record();
        pairs.push(("createdAt", "sometime"));
        let preview = process_records_at(&[record(&pairs)], RowOrigin::Json, fixed_now());
        assert_eq!(preview.tickets[0].created_at, fixed_now());
    }

    #[test]
    fn test_all_errors_of_a_record_are_collected() {
        let bad = record(&[("name", ""), ("email", "not-an-email"), ("priority", "urgent")]);
        let preview = process_records_at(&[bad], RowOrigin::Delimited, fixed_now());

        assert!(preview.tickets.is_empty());
        let fields: Vec<_> = preview
            .errors
            .iter()
            .map(|e| e.field.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(
            fields,
            ["name", "surname", "company", "email", "description", "priority"]
        );
        assert!(preview.errors.iter().all(|e| e.row == Some(2)));
        assert_eq!(preview.invalid_rows, 6);
        assert_eq!(preview.rejected_records, 1);
    }

    #[test]
    fn test_invalid_email_yields_exactly_one_email_error() {
        let mut pairs = complete_record();
        pairs[3] = ("email", "not-an-email");
        let preview = process_records_at(&[record(&pairs)], RowOrigin::Delimited, fixed_now());
        assert_eq!(preview.tickets.len(), 0);
        assert_eq!(preview.errors.len(), 1);
        assert_eq!(preview.errors[0].field.as_deref(), Some("email"));
        assert_eq!(preview.errors[0].message, "Invalid email format");
        assert_eq!(
            preview.errors[0].value,
            Some(Value::String("not-an-email".to_string()))
        );
    }

    #[test]
    fn test_row_numbering_differs_by_origin() {
        let bad = record(&[("name", "x")]);
        let good = record(&complete_record());
        let records = [good, bad];

        let csv = process_records_at(&records, RowOrigin::Delimited, fixed_now());
        assert_eq!(csv.errors[0].row, Some(3));

        let json = process_records_at(&records, RowOrigin::Json, fixed_now());
        assert_eq!(json.errors[0].row, Some(2));
    }

    #[test]
    fn test_generated_ids_are_unique_within_batch() {
        let records = vec![record(&complete_record()); 3];
        let preview = process_records_at(&records, RowOrigin::Json, fixed_now());
        let mut ids: Vec<_> = preview.tickets.iter().map(|t| t.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_structural_preview() {
        let preview = ImportPipeline::default()
            .preview_text(r#"{"notTickets": []}"#, DataFormat::Json)
            .unwrap();
        assert_eq!(preview.valid_rows, 0);
        assert_eq!(preview.invalid_rows, 1);
        assert_eq!(preview.total_rows, 0);
        assert_eq!(preview.errors[0].row, None);
        assert_eq!(preview.errors[0].field, None);
    }

    #[test]
    fn test_preview_detects_and_checks_size() {
        let file = SourceFile::new("t.csv", "name\nA\n");
        let pipeline = ImportPipeline::default();
        let preview = pipeline.preview(&file, &ImportOptions::default()).unwrap();
        assert_eq!(preview.total_rows, 1);

        let small = ImportPipeline {
            max_file_size: 3,
            ..ImportPipeline::default()
        };
        assert!(matches!(
            small.preview(&file, &ImportOptions::default()),
            Err(TicketDeskError::FileTooLarge { .. })
        ));

        let unknown = SourceFile::new("t.xml", "<tickets/>");
        assert!(matches!(
            pipeline.preview(&unknown, &ImportOptions::default()),
            Err(TicketDeskError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_declared_format_overrides_detection() {
        let file = SourceFile::new("upload.bin", r#"{"tickets": []}"#);
        let options = ImportOptions {
            format: Some(DataFormat::Json),
            ..ImportOptions::default()
        };
        let preview = ImportPipeline::default().preview(&file, &options).unwrap();
        assert!(preview.is_clean());
    }

    #[test]
    fn test_skip_excludes_matching_email_and_name() {
        let current = vec![existing("1", "John", "john@corp.com")];
        let incoming = vec![
            existing("imported-1-0", "John", "JOHN@corp.com"),
            existing("imported-1-1", "Ann", "ann@corp.com"),
        ];
        let plan = plan_import(&current, &incoming, &ImportOptions::default());

        assert_eq!(plan.tickets.len(), 2);
        assert_eq!(plan.summary.imported, 1);
        assert_eq!(plan.summary.skipped, 1);
        assert_eq!(plan.changed.len(), 1);
        assert_eq!(plan.changed[0].name, "Ann");
    }

    #[test]
    fn test_id_match_always_counts() {
        let current = vec![existing("1", "John", "john@corp.com")];
        let incoming = vec![existing("1", "Someone", "else@corp.com")];
        let options = ImportOptions {
            duplicate_key: DuplicateKey::Id,
            ..ImportOptions::default()
        };
        let plan = plan_import(&current, &incoming, &options);
        assert_eq!(plan.tickets.len(), 1);
        assert_eq!(plan.summary.skipped, 1);
    }

    #[test]
    fn test_overwrite_replaces_in_place_keeping_id() {
        let current = vec![
            existing("1", "John", "john@corp.com"),
            existing("2", "Jane", "jane@corp.com"),
        ];
        let mut incoming = existing("imported-5-0", "John", "john@corp.com");
        incoming.description = "Replaced description".to_string();
        incoming.created_at = fixed_now();

        let options = ImportOptions {
            handle_duplicates: DuplicatePolicy::Overwrite,
            ..ImportOptions::default()
        };
        let plan = plan_import(&current, &[incoming], &options);

        assert_eq!(plan.tickets.len(), 2);
        assert_eq!(plan.tickets[0].id.as_str(), "1");
        assert_eq!(plan.tickets[0].description, "Replaced description");
        assert_eq!(plan.tickets[0].created_at, fixed_now());
        assert_eq!(plan.summary.overwritten, 1);
    }

    #[test]
    fn test_merge_preserves_id_and_created_at() {
        let current = vec![existing("1", "John", "john@corp.com")];
        let mut incoming = existing("imported-5-0", "John", "john@corp.com");
        incoming.company = "Merged Corp".to_string();
        incoming.priority = Priority::High;
        incoming.created_at = fixed_now();

        let options = ImportOptions {
            handle_duplicates: DuplicatePolicy::Merge,
            ..ImportOptions::default()
        };
        let plan = plan_import(&current, &[incoming], &options);
        let merged = &plan.tickets[0];
        assert_eq!(merged.id.as_str(), "1");
        assert_eq!(merged.company, "Merged Corp");
        assert_eq!(merged.priority, Priority::High);
        assert_eq!(merged.created_at, current[0].created_at);
        assert_eq!(plan.summary.merged, 1);
    }

    #[test]
    fn test_intra_batch_duplicates_keep_ids_unique() {
        let incoming = vec![
            existing("X", "A", "a@corp.com"),
            existing("X", "B", "b@corp.com"),
        ];
        let options = ImportOptions {
            handle_duplicates: DuplicatePolicy::Overwrite,
            ..ImportOptions::default()
        };
        let plan = plan_import(&[], &incoming, &options);
        assert_eq!(plan.tickets.len(), 1);
        assert_eq!(plan.tickets[0].name, "B");
        assert_eq!(plan.changed.len(), 1);
        assert_eq!(plan.summary.total_processed(), 2);
        assert_eq!(plan.summary.duplicates(), 1);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("MERGE".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Merge);
        assert!("upsert".parse::<DuplicatePolicy>().is_err());
        assert_eq!(
            "email-and-name".parse::<DuplicateKey>().unwrap(),
            DuplicateKey::EmailAndName
        );
    }
}
