use super::repository::{TicketBackend, apply_updates, upsert_by_id};
use crate::config::{ApiConfig, ApiOperation};
use crate::core::{
    NewTicket, Priority, Ticket, TicketBuilder, TicketId, TicketPatch, now_millis,
};
use crate::error::{Result, TicketDeskError};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// In-memory stand-in for the remote ticket API
///
/// Every call waits for the configured latency before touching the
/// collection. Failures can be scripted with [`MockApiBackend::fail_next`].
pub struct MockApiBackend {
    config: ApiConfig,
    tickets: Mutex<Vec<Ticket>>,
    failures: AtomicUsize,
}

impl MockApiBackend {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self::with_tickets(config, Vec::new())
    }

    #[must_use]
    pub fn with_tickets(config: ApiConfig, tickets: Vec<Ticket>) -> Self {
        Self {
            config,
            tickets: Mutex::new(tickets),
            failures: AtomicUsize::new(0),
        }
    }

    /// A backend holding the demo collection
    #[must_use]
    pub fn seeded(config: ApiConfig) -> Self {
        Self::with_tickets(config, demo_tickets())
    }

    /// Make the next `count` calls fail with a backend error
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    async fn respond(&self, operation: ApiOperation) -> Result<()> {
        let latency = self.config.latency(operation);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            warn!(?operation, "Injected API failure");
            return Err(TicketDeskError::Backend(format!(
                "Simulated failure during {operation:?}"
            )));
        }
        Ok(())
    }
}

/// `ticket-<millis>`, bumped until it does not collide
fn next_ticket_id(tickets: &[Ticket]) -> TicketId {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let id = TicketId::new(format!("ticket-{millis}"));
        if tickets.iter().all(|t| t.id != id) {
            return id;
        }
        millis += 1;
    }
}

fn not_found(id: &TicketId) -> TicketDeskError {
    TicketDeskError::TicketNotFound { id: id.to_string() }
}

#[async_trait]
impl TicketBackend for MockApiBackend {
    async fn get_tickets(&self) -> Result<Vec<Ticket>> {
        self.respond(ApiOperation::List).await?;
        Ok(self.tickets.lock().await.clone())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        self.respond(ApiOperation::Mutation).await?;
        let mut tickets = self.tickets.lock().await;
        let created = Ticket::from_new(next_ticket_id(&tickets), ticket, now_millis());
        debug!(id = %created.id, "Mock API created ticket");
        tickets.insert(0, created.clone());
        Ok(created)
    }

    async fn update_ticket(&self, id: TicketId, patch: TicketPatch) -> Result<Ticket> {
        self.respond(ApiOperation::Mutation).await?;
        let mut tickets = self.tickets.lock().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(&id))?;
        ticket.apply_patch(&patch);
        Ok(ticket.clone())
    }

    async fn update_ticket_priority(&self, id: TicketId, priority: Priority) -> Result<Ticket> {
        self.update_ticket(id, TicketPatch::priority(priority)).await
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<()> {
        self.respond(ApiOperation::Mutation).await?;
        let mut tickets = self.tickets.lock().await;
        let position = tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(&id))?;
        tickets.remove(position);
        Ok(())
    }

    async fn bulk_import_tickets(&self, incoming: Vec<Ticket>) -> Result<Vec<Ticket>> {
        self.respond(ApiOperation::BulkImport).await?;
        let mut tickets = self.tickets.lock().await;
        debug!(count = incoming.len(), "Mock API bulk import");
        upsert_by_id(&mut tickets, incoming);
        Ok(tickets.clone())
    }

    async fn bulk_update_tickets(
        &self,
        updates: Vec<(TicketId, TicketPatch)>,
    ) -> Result<Vec<Ticket>> {
        self.respond(ApiOperation::BulkUpdate).await?;
        let mut tickets = self.tickets.lock().await;
        let (next, updated) = apply_updates(&tickets, &updates)?;
        *tickets = next;
        Ok(updated)
    }
}

/// The demo collection served by a freshly seeded mock API
#[must_use]
pub fn demo_tickets() -> Vec<Ticket> {
    let demo = |id: &str,
                (name, surname): (&str, &str),
                company: &str,
                email: &str,
                description: &str,
                priority: Priority,
                (day, hour, minute): (u32, u32, u32)| {
        TicketBuilder::new()
            .id(id)
            .name(name)
            .surname(surname)
            .company(company)
            .email(email)
            .description(description)
            .priority(priority)
            .created_at(
                Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
                    .single()
                    .unwrap_or_else(now_millis),
            )
            .build()
    };

    vec![
        demo(
            "1",
            ("John", "Doe"),
            "Tech Corp",
            "john.doe@techcorp.com",
            "Issue with login functionality",
            Priority::High,
            (15, 10, 30),
        ),
        demo(
            "2",
            ("Jane", "Smith"),
            "Design Studio",
            "jane.smith@designstudio.com",
            "Feature request for dark mode",
            Priority::Medium,
            (16, 14, 20),
        ),
        demo(
            "3",
            ("Mike", "Johnson"),
            "Startup Inc",
            "mike.johnson@startupinc.com",
            "Bug report in mobile view",
            Priority::High,
            (17, 9, 15),
        ),
        demo(
            "4",
            ("Sarah", "Williams"),
            "Enterprise Co",
            "sarah.williams@enterprise.com",
            "Performance optimization suggestion",
            Priority::Low,
            (18, 16, 45),
        ),
        demo(
            "5",
            ("Tom", "Brown"),
            "Digital Agency",
            "tom.brown@digitalagency.com",
            "Integration with third-party service",
            Priority::Medium,
            (19, 11, 30),
        ),
    ]
}
