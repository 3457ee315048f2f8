//! Turns raw documents into untyped records
//!
//! The parser only cares about the document's grammar. Whether a record makes
//! a valid ticket is decided later by the import pipeline.

use crate::error::{Result, TicketDeskError};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use tracing::debug;

/// One untyped row or JSON object from a source document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Wrap a JSON object
    #[must_use]
    pub const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a record from `(field, text)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }

    /// The raw value of a field, as found in the source
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A field rendered as text
    ///
    /// Numbers and booleans are stringified; `null` and absent fields are `None`.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// A field that is present and non-blank, trimmed
    #[must_use]
    pub fn non_blank(&self, field: &str) -> Option<String> {
        self.text(field)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Characters of the delimited-text grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvDialect {
    pub delimiter: u8,
    pub quote: u8,
    /// Escape byte inside quoted fields; `None` means quotes are escaped by doubling
    pub escape: Option<u8>,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
        }
    }
}

/// Parse delimited text with a header row into records keyed by header name
///
/// Blank lines are skipped. Short rows simply lack the trailing fields and
/// extra trailing fields are dropped. A document the tokenizer cannot read
/// fails with [`TicketDeskError::Parse`].
pub fn parse_csv(text: &str, dialect: &CsvDialect) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .escape(dialect.escape)
        .double_quote(dialect.escape.is_none())
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| TicketDeskError::Parse(format!("CSV parsing failed: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| TicketDeskError::Parse(format!("CSV parsing failed: {e}")))?;
        records.push(RawRecord::from_pairs(
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.as_str(), value)),
        ));
    }

    debug!(rows = records.len(), columns = headers.len(), "Parsed CSV document");
    Ok(records)
}

/// Outcome of reading a JSON import document
#[derive(Debug, Clone, PartialEq)]
pub enum JsonDocument {
    /// The `tickets` array, one record per element
    Records(Vec<RawRecord>),
    /// Valid JSON that is not shaped like `{ "tickets": [...] }`
    Malformed(String),
}

/// Message reported when a JSON document lacks the `tickets` array
pub const MALFORMED_JSON_MESSAGE: &str =
    "Invalid JSON format: Expected object with \"tickets\" array";

/// Parse a JSON document of shape `{ "tickets": [...] }`
///
/// Text that is not JSON at all fails with [`TicketDeskError::Parse`]; JSON of
/// the wrong shape comes back as [`JsonDocument::Malformed`]. Array elements
/// that are not objects become empty records so they fail validation row by row.
pub fn parse_json(text: &str) -> Result<JsonDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| TicketDeskError::Parse(format!("JSON parsing failed: {e}")))?;

    let Some(Value::Array(items)) = value.get("tickets") else {
        debug!("JSON document has no tickets array");
        return Ok(JsonDocument::Malformed(MALFORMED_JSON_MESSAGE.to_string()));
    };

    let records: Vec<RawRecord> = items
        .iter()
        .map(|item| match item {
            Value::Object(map) => RawRecord::from_map(map.clone()),
            _ => RawRecord::default(),
        })
        .collect();

    debug!(records = records.len(), "Parsed JSON document");
    Ok(JsonDocument::Records(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_rows_keyed_by_header() {
        let text = "name,surname,company,email,description,priority\n\
                    A,B,C,a@b.com,\"long enough, desc\",HIGH\n";
        let rows = parse_csv(text, &CsvDialect::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("name").as_deref(), Some("A"));
        assert_eq!(rows[0].text("description").as_deref(), Some("long enough, desc"));
        assert_eq!(rows[0].text("priority").as_deref(), Some("HIGH"));
        assert_eq!(rows[0].text("id"), None);
    }

    #[test]
    fn test_csv_skips_blank_lines_and_tolerates_short_rows() {
        let text = "name,surname,email\n\nA,B\n\n";
        let rows = parse_csv(text, &CsvDialect::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("surname").as_deref(), Some("B"));
        assert_eq!(rows[0].text("email"), None);
    }

    #[test]
    fn test_csv_custom_dialect() {
        let dialect = CsvDialect {
            delimiter: b';',
            quote: b'\'',
            escape: Some(b'\\'),
        };
        let text = "name;description\n'O\\'Neil';'semi; colon'\n";
        let rows = parse_csv(text, &dialect).unwrap();
        assert_eq!(rows[0].text("name").as_deref(), Some("O'Neil"));
        assert_eq!(rows[0].text("description").as_deref(), Some("semi; colon"));
    }

    #[test]
    fn test_json_tickets_array() {
        let doc = parse_json(r#"{"tickets": [{"name": "A", "priority": 3}, 7]}"#).unwrap();
        let JsonDocument::Records(records) = doc else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("priority").as_deref(), Some("3"));
        assert_eq!(records[1], RawRecord::default());
    }

    #[test]
    fn test_json_wrong_shape_is_not_an_error() {
        for text in [r#"{"notTickets": []}"#, "[1, 2]", r#"{"tickets": {}}"#, "42"] {
            let doc = parse_json(text).unwrap();
            assert_eq!(
                doc,
                JsonDocument::Malformed(MALFORMED_JSON_MESSAGE.to_string()),
                "input {text}"
            );
        }
    }

    #[test]
    fn test_invalid_json_text_is_parse_error() {
        let err = parse_json("{tickets: ").unwrap_err();
        assert!(matches!(err, TicketDeskError::Parse(_)));
    }

    #[test]
    fn test_null_and_blank_fields() {
        let record = RawRecord::from_map(
            serde_json::json!({"name": null, "company": "  "})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(record.text("name"), None);
        assert_eq!(record.text("company").as_deref(), Some("  "));
        assert_eq!(record.non_blank("company"), None);
    }
}
