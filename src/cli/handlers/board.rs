//! Handler for the `board` command
//!
//! Shows tickets in high, medium and low priority columns.

use super::HandlerContext;
use crate::cli::{OutputFormatter, colored_priority};
use crate::error::Result;
use crate::query::{PriorityColumn, SortField, TicketQuery, priority_columns};
use colored::Colorize;

/// Handler for the `board` command
pub fn handle_board_command(ctx: &HandlerContext, output: &OutputFormatter) -> Result<()> {
    let newest_first = TicketQuery {
        sort_by: SortField::Date,
        ..TicketQuery::default()
    };
    let columns = priority_columns(&newest_first.apply(&ctx.store.tickets()));

    if output.is_json() {
        return output.print_json(&columns);
    }
    for column in &columns {
        output_column(column, output);
    }
    Ok(())
}

fn output_column(column: &PriorityColumn, output: &OutputFormatter) {
    output.info(&format!(
        "{} {} ({})",
        colored_priority(column.priority),
        column.title.bold(),
        column.tickets.len()
    ));
    if column.tickets.is_empty() {
        output.info("  (empty)");
    }
    for ticket in &column.tickets {
        output.info(&format!(
            "  {} {} · {}",
            ticket.id.as_str().dimmed(),
            ticket.full_name(),
            ticket.company
        ));
    }
    output.info("");
}
