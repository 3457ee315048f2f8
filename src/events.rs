//! Change notifications from the ticket cache
//!
//! Renderers subscribe to learn when the visible collection changed and
//! whether a change was confirmed or undone.

use crate::core::TicketId;
use std::fmt;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Kind of cache mutation an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    SetPriority,
    Delete,
    BulkUpdate,
    BulkImport,
}

impl MutationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::SetPriority => "set priority",
            Self::Delete => "delete",
            Self::BulkUpdate => "bulk update",
            Self::BulkImport => "bulk import",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened to the visible collection
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The expected effect is visible; the backend has not answered yet
    Optimistic {
        kind: MutationKind,
        ids: Vec<TicketId>,
    },
    /// The backend accepted the mutation
    Committed {
        kind: MutationKind,
        ids: Vec<TicketId>,
    },
    /// The backend rejected the mutation and the pre-image is visible again
    RolledBack { kind: MutationKind, error: String },
    /// The collection was reloaded from the backend
    Refreshed { count: usize },
}

/// Broadcasts [`StoreEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn optimistic(&self, kind: MutationKind, ids: Vec<TicketId>) {
        self.send(StoreEvent::Optimistic { kind, ids });
    }

    pub fn committed(&self, kind: MutationKind, ids: Vec<TicketId>) {
        info!(%kind, count = ids.len(), "Mutation committed");
        self.send(StoreEvent::Committed { kind, ids });
    }

    pub fn rolled_back(&self, kind: MutationKind, error: &str) {
        warn!(%kind, %error, "Mutation rolled back");
        self.send(StoreEvent::RolledBack {
            kind,
            error: error.to_string(),
        });
    }

    pub fn refreshed(&self, count: usize) {
        self.send(StoreEvent::Refreshed { count });
    }

    fn send(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
