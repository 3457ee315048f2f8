use super::HandlerContext;
use crate::cli::OutputFormatter;
use crate::error::Result;
use crate::import_export::{DataFormat, ExportOptions, export_tickets};
use std::path::Path;

/// Handler for the `export` command
pub fn handle_export_command(
    ctx: &HandlerContext,
    format: DataFormat,
    no_metadata: bool,
    filename: Option<String>,
    out_dir: &Path,
    output: &OutputFormatter,
) -> Result<()> {
    let tickets = ctx.store.tickets();
    let options = ExportOptions {
        format,
        include_metadata: ctx.config.export.include_metadata && !no_metadata,
        filename,
    };
    let artifact = export_tickets(&tickets, &options)?;
    let path = artifact.write_to(out_dir)?;

    if output.is_json() {
        return output.print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "filename": artifact.filename,
            "mimeType": artifact.mime_type,
            "tickets": tickets.len(),
        }));
    }
    output.success(&format!(
        "Exported {} ticket(s) to {}",
        tickets.len(),
        path.display()
    ));
    Ok(())
}
