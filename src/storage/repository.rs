use crate::core::{NewTicket, Priority, Ticket, TicketId, TicketPatch};
use crate::error::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Persistence backend behind the ticket cache
///
/// This trait is the request/response transport the cache talks to. Every
/// call may take a while and may fail; the cache treats failures uniformly
/// and rolls back its optimistic state.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TicketBackend: Send + Sync {
    /// Loads the full collection
    async fn get_tickets(&self) -> Result<Vec<Ticket>>;

    /// Stores a new ticket and returns it with its canonical id and timestamp
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket>;

    /// Applies a partial update; fails with `TicketNotFound` for unknown ids
    async fn update_ticket(&self, id: TicketId, patch: TicketPatch) -> Result<Ticket>;

    /// Moves a ticket to another priority; fails with `TicketNotFound` for unknown ids
    async fn update_ticket_priority(&self, id: TicketId, priority: Priority) -> Result<Ticket>;

    /// Removes a ticket; fails with `TicketNotFound` for unknown ids
    async fn delete_ticket(&self, id: TicketId) -> Result<()>;

    /// Inserts or replaces tickets by id and returns the resulting collection
    ///
    /// Either every ticket is stored or none is.
    async fn bulk_import_tickets(&self, tickets: Vec<Ticket>) -> Result<Vec<Ticket>>;

    /// Applies several partial updates; fails without changes if any id is unknown
    async fn bulk_update_tickets(&self, updates: Vec<(TicketId, TicketPatch)>)
    -> Result<Vec<Ticket>>;
}

/// Upsert `incoming` into `tickets` by id, keeping positions of replaced tickets
pub(crate) fn upsert_by_id(tickets: &mut Vec<Ticket>, incoming: Vec<Ticket>) {
    for ticket in incoming {
        match tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(slot) => *slot = ticket,
            None => tickets.push(ticket),
        }
    }
}

/// Apply `updates` to a copy of `tickets`, failing on the first unknown id
pub(crate) fn apply_updates(
    tickets: &[Ticket],
    updates: &[(TicketId, TicketPatch)],
) -> Result<(Vec<Ticket>, Vec<Ticket>)> {
    let mut next = tickets.to_vec();
    let mut updated = Vec::with_capacity(updates.len());
    for (id, patch) in updates {
        let ticket = next
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| crate::error::TicketDeskError::TicketNotFound { id: id.to_string() })?;
        ticket.apply_patch(patch);
        updated.push(ticket.clone());
    }
    Ok((next, updated))
}
