//! Terminal output for the CLI
//!
//! Human-readable messages go to stdout with optional color; with `--json`
//! only machine-readable documents are printed.

use crate::core::{Priority, Ticket};
use crate::error::{Result, TicketDeskError};
use colored::Colorize;
use serde::Serialize;

/// Formats command results for the terminal
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    #[must_use]
    pub fn new(json: bool, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { json }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {message}", "✓".green().bold());
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.json {
            eprintln!("{} {message}", "!".yellow().bold());
        }
    }

    /// Errors are shown in both modes, on stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {message}", "✗".red().bold());
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| TicketDeskError::Serialization(format!("Failed to render JSON: {e}")))?;
        println!("{json}");
        Ok(())
    }

    /// One line per ticket: id, priority, name, company
    pub fn ticket_line(&self, ticket: &Ticket) {
        self.info(&format!(
            "{:<24} {:<8} {:<24} {}",
            ticket.id.as_str().dimmed(),
            colored_priority(ticket.priority),
            ticket.full_name(),
            ticket.company
        ));
    }

    pub fn ticket_details(&self, ticket: &Ticket) {
        self.info(&format!("{} {}", "ID:".bold(), ticket.id));
        self.info(&format!("{} {}", "Name:".bold(), ticket.full_name()));
        self.info(&format!("{} {}", "Company:".bold(), ticket.company));
        self.info(&format!("{} {}", "Email:".bold(), ticket.email));
        self.info(&format!("{} {}", "Priority:".bold(), colored_priority(ticket.priority)));
        self.info(&format!(
            "{} {}",
            "Created:".bold(),
            ticket.created_at.format("%Y-%m-%d %H:%M")
        ));
        self.info("");
        self.info(&ticket.description);
    }
}

/// Priority label colored like the board columns
#[must_use]
pub fn colored_priority(priority: Priority) -> String {
    let label = priority.as_str();
    match priority {
        Priority::High => label.red().to_string(),
        Priority::Medium => label.yellow().to_string(),
        Priority::Low => label.green().to_string(),
    }
}
