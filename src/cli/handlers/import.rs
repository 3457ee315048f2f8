use super::HandlerContext;
use crate::cli::OutputFormatter;
use crate::error::{Result, TicketDeskError};
use crate::import_export::{
    DuplicateKey, DuplicatePolicy, ImportOptions, ImportPipeline, ImportPreview, ImportSummary,
    SourceFile,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Errors listed in text mode before the rest are summarized
const SHOWN_ERRORS: usize = 5;

/// Arguments for the `import` command
#[derive(Debug, Clone)]
pub struct ImportCommandArgs {
    pub file: PathBuf,
    pub content_type: Option<String>,
    pub duplicates: Option<DuplicatePolicy>,
    pub key: Option<DuplicateKey>,
    pub dry_run: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport<'a> {
    preview: &'a ImportPreview,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ImportSummary>,
}

/// Handler for the `import` command
///
/// Valid rows are imported even when other rows have errors; every error
/// is reported.
pub async fn handle_import_command(
    ctx: &HandlerContext,
    args: ImportCommandArgs,
    output: &OutputFormatter,
) -> Result<()> {
    let mut source = SourceFile::from_path(&args.file)?;
    if let Some(content_type) = args.content_type {
        source = source.with_content_type(content_type);
    }

    let mut options = ImportOptions::from_config(&ctx.config.import);
    if let Some(duplicates) = args.duplicates {
        options.handle_duplicates = duplicates;
    }
    if let Some(key) = args.key {
        options.duplicate_key = key;
    }
    options.validate_only = args.dry_run;

    let preview = ImportPipeline::new(&ctx.config.import).preview(&source, &options)?;
    if preview.tickets.is_empty() && !preview.errors.is_empty() {
        report_preview(&preview, output)?;
        return Err(TicketDeskError::custom(format!(
            "No valid tickets in {}",
            source.name
        )));
    }

    let summary = if args.dry_run {
        None
    } else {
        let summary = ctx
            .store
            .bulk_import(preview.tickets.clone(), &options)
            .await?;
        info!(?summary, file = %source.name, "Import committed");
        Some(summary)
    };

    if output.is_json() {
        return output.print_json(&ImportReport {
            preview: &preview,
            summary,
        });
    }

    report_preview(&preview, output)?;
    match summary {
        Some(summary) => output.success(&format!(
            "Imported {}, overwrote {}, merged {}, skipped {} duplicate(s)",
            summary.imported, summary.overwritten, summary.merged, summary.skipped
        )),
        None => output.info("Dry run, nothing was imported"),
    }
    Ok(())
}

fn report_preview(preview: &ImportPreview, output: &OutputFormatter) -> Result<()> {
    if output.is_json() {
        return output.print_json(&ImportReport {
            preview,
            summary: None,
        });
    }

    output.info(&format!(
        "{} row(s): {} valid, {} error(s)",
        preview.total_rows, preview.valid_rows, preview.invalid_rows
    ));
    for error in preview.errors.iter().take(SHOWN_ERRORS) {
        output.warning(&error.to_string());
    }
    if preview.errors.len() > SHOWN_ERRORS {
        output.warning(&format!(
            "...and {} more error(s)",
            preview.errors.len() - SHOWN_ERRORS
        ));
    }
    Ok(())
}
