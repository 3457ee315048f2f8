use crate::core::{Ticket, TicketId};
use crate::events::MutationKind;

/// An optimistic mutation waiting for the backend
///
/// Holds the tickets the mutation touched as they were before its optimistic
/// effect, together with their positions, so a failure can put back exactly
/// those entries. Tickets other mutations changed in the meantime are left
/// alone.
#[derive(Debug)]
#[must_use = "a pending mutation must be reconciled"]
pub(crate) struct PendingMutation {
    pub(crate) kind: MutationKind,
    pub(crate) ids: Vec<TicketId>,
    pre_image: Vec<(usize, Ticket)>,
}

impl PendingMutation {
    /// Snapshot `visible`, then apply `effect` to it
    ///
    /// `effect` returns the ids it touched; only those are kept in the snapshot.
    pub(crate) fn apply<R>(
        kind: MutationKind,
        visible: &mut Vec<Ticket>,
        effect: impl FnOnce(&mut Vec<Ticket>) -> (Vec<TicketId>, R),
    ) -> (Self, R) {
        let before = visible.clone();
        let (ids, output) = effect(visible);
        let pre_image = before
            .into_iter()
            .enumerate()
            .filter(|(_, ticket)| ids.contains(&ticket.id))
            .collect();
        (
            Self {
                kind,
                ids,
                pre_image,
            },
            output,
        )
    }

    /// Undo this mutation's effect on `visible`
    ///
    /// Entries with a touched id are dropped, then the snapshotted ones go back
    /// at their old positions.
    pub(crate) fn restore(self, visible: &mut Vec<Ticket>) {
        visible.retain(|ticket| !self.ids.contains(&ticket.id));
        for (position, ticket) in self.pre_image {
            let position = position.min(visible.len());
            visible.insert(position, ticket);
        }
    }
}

/// Replace the ticket with `ticket.id`, or put it first when absent
pub(crate) fn replace_by_id(tickets: &mut Vec<Ticket>, ticket: &Ticket) {
    match tickets.iter_mut().find(|t| t.id == ticket.id) {
        Some(slot) => slot.clone_from(ticket),
        None => tickets.insert(0, ticket.clone()),
    }
}
