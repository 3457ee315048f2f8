use super::key_value::KeyValueStore;
use super::repository::{TicketBackend, apply_updates, upsert_by_id};
use crate::core::{NewTicket, Priority, Ticket, TicketId, TicketPatch, now_millis};
use crate::error::{Result, TicketDeskError};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Backend keeping the whole collection as one JSON value in a key-value store
///
/// The collection is read once when the backend is opened and written back
/// after every change. A change that cannot be written is not applied.
pub struct LocalStorageBackend<S> {
    store: S,
    key: String,
    tickets: Mutex<Vec<Ticket>>,
}

impl<S: KeyValueStore> LocalStorageBackend<S> {
    /// Open the collection stored under `key`
    ///
    /// Missing or unreadable state starts an empty collection.
    pub fn open(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let tickets = match store.get(&key) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Ticket>>(&raw).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Stored tickets are unreadable, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Could not read stored tickets, starting empty");
                Vec::new()
            },
        };
        debug!(key = %key, count = tickets.len(), "Opened local ticket storage");

        Self {
            store,
            key,
            tickets: Mutex::new(tickets),
        }
    }

    fn flush(&self, tickets: &[Ticket]) -> Result<()> {
        let json = serde_json::to_string(tickets).map_err(|e| {
            TicketDeskError::Serialization(format!("Failed to serialize tickets: {e}"))
        })?;
        self.store.set(&self.key, &json)
    }

    /// Run `change` on a copy of the collection, persist it, then keep it
    async fn mutate<T>(&self, change: impl FnOnce(&mut Vec<Ticket>) -> Result<T>) -> Result<T> {
        let mut tickets = self.tickets.lock().await;
        let mut next = tickets.clone();
        let output = change(&mut next)?;
        self.flush(&next)?;
        *tickets = next;
        Ok(output)
    }
}

fn find_mut<'a>(tickets: &'a mut [Ticket], id: &TicketId) -> Result<&'a mut Ticket> {
    tickets
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| TicketDeskError::TicketNotFound { id: id.to_string() })
}

#[async_trait]
impl<S: KeyValueStore> TicketBackend for LocalStorageBackend<S> {
    async fn get_tickets(&self) -> Result<Vec<Ticket>> {
        Ok(self.tickets.lock().await.clone())
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let created = Ticket::from_new(TicketId::random(), ticket, now_millis());
        self.mutate(|tickets| {
            tickets.insert(0, created.clone());
            Ok(created)
        })
        .await
    }

    async fn update_ticket(&self, id: TicketId, patch: TicketPatch) -> Result<Ticket> {
        self.mutate(|tickets| {
            let ticket = find_mut(tickets, &id)?;
            ticket.apply_patch(&patch);
            Ok(ticket.clone())
        })
        .await
    }

    async fn update_ticket_priority(&self, id: TicketId, priority: Priority) -> Result<Ticket> {
        self.update_ticket(id, TicketPatch::priority(priority)).await
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<()> {
        self.mutate(|tickets| {
            let before = tickets.len();
            tickets.retain(|t| t.id != id);
            if tickets.len() == before {
                return Err(TicketDeskError::TicketNotFound { id: id.to_string() });
            }
            Ok(())
        })
        .await
    }

    async fn bulk_import_tickets(&self, incoming: Vec<Ticket>) -> Result<Vec<Ticket>> {
        self.mutate(|tickets| {
            upsert_by_id(tickets, incoming);
            Ok(tickets.clone())
        })
        .await
    }

    async fn bulk_update_tickets(
        &self,
        updates: Vec<(TicketId, TicketPatch)>,
    ) -> Result<Vec<Ticket>> {
        self.mutate(|tickets| {
            let (next, updated) = apply_updates(tickets, &updates)?;
            *tickets = next;
            Ok(updated)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use crate::test_utils::{new_ticket, ticket};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_persists_under_key() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let backend = LocalStorageBackend::open(store.clone(), "tickets");

        let created = backend.create_ticket(new_ticket("Ann")).await.unwrap();
        assert!(!created.id.is_temporary());

        let raw = store.get("tickets").unwrap().unwrap();
        let stored: Vec<Ticket> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, vec![created]);
    }

    #[tokio::test]
    async fn test_reopen_reads_previous_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());
        {
            let backend = LocalStorageBackend::open(store.clone(), "tickets");
            backend
                .bulk_import_tickets(vec![ticket("1", "John"), ticket("2", "Jane")])
                .await
                .unwrap();
        }

        let reopened = LocalStorageBackend::open(store, "tickets");
        assert_eq!(reopened.get_tickets().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_state_starts_empty() {
        let store = MemoryKeyValueStore::new();
        store.set("tickets", "{not json").unwrap();
        let backend = LocalStorageBackend::open(store, "tickets");
        assert!(backend.get_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_fail() {
        let backend = LocalStorageBackend::open(MemoryKeyValueStore::new(), "tickets");
        let err = backend.delete_ticket(TicketId::new("nope")).await.unwrap_err();
        assert!(matches!(err, TicketDeskError::TicketNotFound { .. }));
        let err = backend
            .update_ticket(TicketId::new("nope"), TicketPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TicketDeskError::TicketNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_priority() {
        let backend = LocalStorageBackend::open(MemoryKeyValueStore::new(), "tickets");
        backend.bulk_import_tickets(vec![ticket("1", "John")]).await.unwrap();
        let updated = backend
            .update_ticket_priority(TicketId::new("1"), Priority::Low)
            .await
            .unwrap();
        assert_eq!(updated.priority, Priority::Low);
        assert_eq!(backend.get_tickets().await.unwrap()[0].priority, Priority::Low);
    }
}
