//! Bulk import and export of tickets as CSV or JSON

pub mod export;
pub mod format;
pub mod import;
pub mod parser;

pub use export::{
    EXPORT_VERSION, ExportArtifact, ExportMetadata, ExportOptions, export_tickets,
    export_tickets_at, priority_distribution,
};
pub use format::{DataFormat, SourceFile};
pub use import::{
    DuplicateKey, DuplicatePolicy, ImportError, ImportOptions, ImportPipeline, ImportPlan,
    ImportPreview, ImportSummary, RowOrigin, plan_import, process_records,
};
pub use parser::{CsvDialect, JsonDocument, RawRecord, parse_csv, parse_json};
