use super::HandlerContext;
use crate::cli::OutputFormatter;
use crate::core::{NewTicket, Priority, TicketId, TicketPatch};
use crate::error::{Result, TicketDeskError};
use crate::query::{SortDirection, SortField, TicketQuery, paginate};

/// Arguments for the `list` command
#[derive(Debug, Clone, Default)]
pub struct ListCommandArgs {
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub sort: SortField,
    pub direction: Option<SortDirection>,
    pub page: usize,
    pub page_size: Option<usize>,
}

/// Handler for the `list` command
pub fn handle_list_command(
    ctx: &HandlerContext,
    args: ListCommandArgs,
    output: &OutputFormatter,
) -> Result<()> {
    let query = TicketQuery {
        search: args.search,
        priority: args.priority,
        sort_by: args.sort,
        direction: args.direction,
    };
    let matched = query.apply(&ctx.store.tickets());
    let page_size = args.page_size.unwrap_or(ctx.config.ui.page_size);
    let page = paginate(&matched, args.page, page_size);

    if output.is_json() {
        return output.print_json(&page);
    }

    if page.total_items == 0 {
        output.info("No tickets found");
        return Ok(());
    }
    for ticket in &page.items {
        output.ticket_line(ticket);
    }
    let range = page.range();
    output.info(&format!(
        "\nShowing {}-{} of {} (page {}/{})",
        range.start + 1,
        range.end,
        page.total_items,
        page.page,
        page.total_pages
    ));
    Ok(())
}

/// Handler for the `show` command
pub fn handle_show_command(ctx: &HandlerContext, id: &str, output: &OutputFormatter) -> Result<()> {
    let ticket = ctx.require_ticket(id)?;
    if output.is_json() {
        return output.print_json(&ticket);
    }
    output.ticket_details(&ticket);
    Ok(())
}

/// Handler for the `create` command
pub async fn handle_create_command(
    ctx: &HandlerContext,
    ticket: NewTicket,
    output: &OutputFormatter,
) -> Result<()> {
    let created = ctx.store.create(ticket).await?;
    if output.is_json() {
        return output.print_json(&created);
    }
    output.success(&format!("Created ticket {}", created.id));
    Ok(())
}

/// Handler for the `update` command
pub async fn handle_update_command(
    ctx: &HandlerContext,
    id: &str,
    patch: TicketPatch,
    output: &OutputFormatter,
) -> Result<()> {
    if patch.is_empty() {
        return Err(TicketDeskError::custom(
            "Nothing to update. Pass at least one field such as --email",
        ));
    }
    let updated = ctx.store.update(&TicketId::new(id), patch).await?;
    if output.is_json() {
        return output.print_json(&updated);
    }
    output.success(&format!("Updated ticket {}", updated.id));
    Ok(())
}

/// Handler for the `priority` command
pub async fn handle_priority_command(
    ctx: &HandlerContext,
    id: &str,
    priority: Priority,
    output: &OutputFormatter,
) -> Result<()> {
    let updated = ctx.store.set_priority(&TicketId::new(id), priority).await?;
    if output.is_json() {
        return output.print_json(&updated);
    }
    output.success(&format!("Moved {} to {}", updated.id, priority.title()));
    Ok(())
}

/// Handler for the `delete` command
pub async fn handle_delete_command(
    ctx: &HandlerContext,
    id: &str,
    output: &OutputFormatter,
) -> Result<()> {
    ctx.store.delete(&TicketId::new(id)).await?;
    if output.is_json() {
        return output.print_json(&serde_json::json!({ "deleted": id }));
    }
    output.success(&format!("Deleted ticket {id}"));
    Ok(())
}
