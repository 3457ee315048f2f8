use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ticket_desk::core::TicketBuilder;
use ticket_desk::import_export::{DataFormat, ExportOptions, ImportPipeline, export_tickets};
use ticket_desk::query::{TicketQuery, paginate};

fn sample_csv(rows: usize) -> String {
    let mut csv = String::from("name,surname,company,email,description,priority\n");
    for i in 0..rows {
        let priority = ["high", "MEDIUM", "low", "urgent"][i % 4];
        csv.push_str(&format!(
            "User{i},Tester,Company {i},user{i}@example.com,\"Description for ticket {i}\",{priority}\n"
        ));
    }
    csv
}

fn bench_import_preview(c: &mut Criterion) {
    let pipeline = ImportPipeline::default();
    let csv = sample_csv(1_000);
    c.bench_function("csv_preview_1000_rows", |b| {
        b.iter(|| pipeline.preview_text(black_box(&csv), DataFormat::Csv));
    });
}

fn bench_export_and_query(c: &mut Criterion) {
    let tickets: Vec<_> = (0..1_000)
        .map(|i| {
            TicketBuilder::new()
                .name(format!("User{i}"))
                .surname("Tester")
                .company(format!("Company {}", i % 50))
                .email(format!("user{i}@example.com"))
                .description("Something broke")
                .build()
        })
        .collect();

    c.bench_function("json_export_1000", |b| {
        let options = ExportOptions::new(DataFormat::Json);
        b.iter(|| export_tickets(black_box(&tickets), &options));
    });

    c.bench_function("search_sort_paginate_1000", |b| {
        let query = TicketQuery {
            search: Some("user1".to_string()),
            ..TicketQuery::default()
        };
        b.iter(|| paginate(&query.apply(black_box(&tickets)), 1, 20));
    });
}

criterion_group!(benches, bench_import_preview, bench_export_and_query);
criterion_main!(benches);
