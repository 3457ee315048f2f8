//! Test utilities for ticket-desk
//!
//! Common fixtures shared by unit tests across the crate.

#![cfg(test)]

use crate::core::{NewTicket, Priority, Ticket, TicketBuilder};
use crate::storage::demo_tickets;
use chrono::{TimeZone, Utc};

/// A complete, valid ticket with a fixed timestamp
pub fn ticket(id: &str, name: &str) -> Ticket {
    TicketBuilder::new()
        .id(id)
        .name(name)
        .surname("Tester")
        .company("Test Corp")
        .email(format!("{}@example.com", name.to_lowercase()))
        .description("Something is broken again")
        .priority(Priority::High)
        .created_at(Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap())
        .build()
}

/// A valid creation form
pub fn new_ticket(name: &str) -> NewTicket {
    NewTicket {
        name: name.to_string(),
        surname: "Tester".to_string(),
        company: "Test Corp".to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        description: "Printer is on fire".to_string(),
        priority: Priority::Medium,
    }
}

/// The five demo tickets
pub fn sample_tickets() -> Vec<Ticket> {
    demo_tickets()
}

#[test]
fn test_fixtures_are_valid() {
    use crate::validation::validate_ticket_form;

    assert!(validate_ticket_form(&new_ticket("Ann")).is_empty());
    assert!(validate_ticket_form(&NewTicket::from(&ticket("1", "John"))).is_empty());
    assert_eq!(sample_tickets().len(), 5);
}
