//! Import and export through the public API

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use ticket_desk::cache::TicketStore;
use ticket_desk::config::{ApiConfig, CacheConfig};
use ticket_desk::core::{Priority, TicketBuilder, TicketId, now_millis};
use ticket_desk::import_export::{
    DataFormat, DuplicatePolicy, ExportOptions, ImportOptions, ImportPipeline, SourceFile,
    export_tickets, export_tickets_at,
};
use ticket_desk::storage::{MockApiBackend, demo_tickets};

#[test]
fn test_json_export_then_import_is_lossless() {
    let tickets = demo_tickets();
    let mut options = ExportOptions::new(DataFormat::Json);
    options.include_metadata = true;
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();

    let artifact = export_tickets_at(&tickets, &options, now).unwrap();
    assert_eq!(artifact.filename, "tickets_2024-02-01.json");
    assert_eq!(artifact.mime_type, "application/json");

    let file = SourceFile::new(artifact.filename, artifact.content.into_bytes());
    let preview = ImportPipeline::default()
        .preview(&file, &ImportOptions::default())
        .unwrap();

    assert!(preview.errors.is_empty());
    assert_eq!(preview.tickets, tickets);
}

#[test]
fn test_csv_export_then_import_keeps_fields() {
    let tickets = demo_tickets();
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let artifact = export_tickets_at(&tickets, &ExportOptions::new(DataFormat::Csv), now).unwrap();

    let preview = ImportPipeline::default()
        .preview_text(&artifact.content, DataFormat::Csv)
        .unwrap();

    assert_eq!(preview.valid_rows, 5);
    assert_eq!(preview.tickets, tickets);
}

#[test]
fn test_freshly_created_ticket_round_trips_in_both_formats() {
    let created = TicketBuilder::new()
        .id("ticket-fresh")
        .name("Nina")
        .surname("Novak")
        .company("Orbit")
        .email("nina@orbit.io")
        .description("Cannot reset my password")
        .priority(Priority::Medium)
        .created_at(now_millis())
        .build();
    let tickets = vec![created];

    for format in [DataFormat::Json, DataFormat::Csv] {
        let artifact = export_tickets(&tickets, &ExportOptions::new(format)).unwrap();
        let preview = ImportPipeline::default()
            .preview_text(&artifact.content, format)
            .unwrap();
        assert_eq!(preview.tickets, tickets, "format {format}");
    }
}

#[test]
fn test_scenario_a_priority_is_normalized() {
    let csv = "name,surname,company,email,description,priority\nA,B,C,a@b.com,\"long enough desc\",HIGH";
    let preview = ImportPipeline::default()
        .preview_text(csv, DataFormat::Csv)
        .unwrap();

    assert_eq!(preview.tickets.len(), 1);
    assert_eq!(preview.tickets[0].priority, Priority::High);
    assert!(preview.errors.is_empty());
}

#[test]
fn test_scenario_b_invalid_email_in_csv() {
    let csv = "name,surname,company,email,description,priority\n\
               A,B,C,not-an-email,\"long enough desc\",high\n";
    let preview = ImportPipeline::default()
        .preview_text(csv, DataFormat::Csv)
        .unwrap();

    assert!(preview.tickets.is_empty());
    assert_eq!(preview.total_rows, 1);
    assert_eq!(preview.valid_rows, 0);
    assert_eq!(preview.errors.len(), 1);
    let error = &preview.errors[0];
    assert_eq!(error.row, Some(2));
    assert_eq!(error.field.as_deref(), Some("email"));
    assert_eq!(error.message, "Invalid email format");
}

#[test]
fn test_scenario_c_json_without_tickets_array() {
    let preview = ImportPipeline::default()
        .preview_text(r#"{"notTickets": []}"#, DataFormat::Json)
        .unwrap();

    assert_eq!(preview.valid_rows, 0);
    assert_eq!(preview.invalid_rows, 1);
    assert_eq!(preview.errors.len(), 1);
    assert_eq!(preview.errors[0].row, None);
}

#[test]
fn test_oversized_file_is_rejected_before_parsing() {
    let file = SourceFile::new("big.csv", vec![b'a'; 64]);
    let pipeline = ImportPipeline::new(&ticket_desk::config::ImportConfig {
        max_file_size: 32,
        ..Default::default()
    });
    let err = pipeline.preview(&file, &ImportOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ticket_desk::TicketDeskError::FileTooLarge { size: 64, limit: 32 }
    ));
}

#[tokio::test]
async fn test_import_file_into_store_with_merge() {
    let backend = Arc::new(MockApiBackend::seeded(ApiConfig::instant()));
    let store = TicketStore::load(backend, CacheConfig::default(), ApiConfig::default().timeout())
        .await
        .unwrap();

    let json = r#"{"tickets": [
        {"name": "John", "surname": "Doe", "company": "Tech Corp International",
         "email": "JOHN.DOE@techcorp.com", "description": "Login still broken on Safari",
         "priority": "low"},
        {"name": "Nina", "surname": "Novak", "company": "Orbit",
         "email": "nina@orbit.io", "description": "Cannot reset my password",
         "priority": "high"}
    ]}"#;
    let preview = ImportPipeline::default()
        .preview_text(json, DataFormat::Json)
        .unwrap();
    assert_eq!(preview.valid_rows, 2);

    let options = ImportOptions {
        handle_duplicates: DuplicatePolicy::Merge,
        ..ImportOptions::default()
    };
    let summary = store.bulk_import(preview.tickets, &options).await.unwrap();

    assert_eq!(summary.merged, 1);
    assert_eq!(summary.imported, 1);
    assert_eq!(store.len(), 6);

    let john = store.get(&TicketId::new("1")).unwrap();
    assert_eq!(john.company, "Tech Corp International");
    assert_eq!(john.priority, Priority::Low);
    assert_eq!(john.created_at, demo_tickets()[0].created_at);
}
