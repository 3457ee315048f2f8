use super::{Priority, Ticket, TicketId, now_millis};
use chrono::{DateTime, Utc};

/// Builder for creating Ticket instances
#[derive(Default)]
pub struct TicketBuilder {
    id: Option<TicketId>,
    name: Option<String>,
    surname: Option<String>,
    company: Option<String>,
    email: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    created_at: Option<DateTime<Utc>>,
}

impl TicketBuilder {
    /// Create a new ticket builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticket ID
    #[must_use]
    pub fn id(mut self, id: impl Into<TicketId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the contact's first name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the contact's surname
    #[must_use]
    pub fn surname(mut self, surname: impl Into<String>) -> Self {
        self.surname = Some(surname.into());
        self
    }

    /// Set the company
    #[must_use]
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the email
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the priority
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set `created_at` timestamp
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Build the ticket
    ///
    /// Missing ids become random UUIDs and a missing `created_at` becomes now.
    pub fn build(self) -> Ticket {
        Ticket {
            id: self.id.unwrap_or_else(TicketId::random),
            name: self.name.unwrap_or_default(),
            surname: self.surname.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_else(now_millis),
        }
    }
}
