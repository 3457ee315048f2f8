//! Optimistic ticket cache
//!
//! [`TicketStore`] owns the collection the user sees. Every mutation first
//! applies its expected effect to that collection, then calls the backend,
//! then reconciles: canonical values are accepted on success and the
//! mutation's own snapshot is restored on failure.

mod pending;

use crate::config::CacheConfig;
use crate::core::{NewTicket, Priority, Ticket, TicketId, TicketPatch, now_millis};
use crate::error::{Result, TicketDeskError};
use crate::events::{EventBus, MutationKind, StoreEvent};
use crate::import_export::{ImportOptions, ImportSummary, plan_import};
use crate::storage::TicketBackend;
use crate::validation::{validate_patch, validate_ticket_form};
use pending::{PendingMutation, replace_by_id};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// The visible ticket collection and the mutations on it
pub struct TicketStore<B: ?Sized> {
    backend: Arc<B>,
    visible: RwLock<Vec<Ticket>>,
    config: CacheConfig,
    timeout: Duration,
    events: EventBus,
}

impl<B: TicketBackend + ?Sized> TicketStore<B> {
    /// Create a store and fill it from the backend
    pub async fn load(backend: Arc<B>, config: CacheConfig, timeout: Duration) -> Result<Self> {
        let store = Self {
            events: EventBus::new(config.event_capacity),
            backend,
            visible: RwLock::new(Vec::new()),
            config,
            timeout,
        };
        store.refresh().await?;
        Ok(store)
    }

    /// A copy of the visible collection
    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        self.read().clone()
    }

    #[must_use]
    pub fn get(&self, id: &TicketId) -> Option<Ticket> {
        self.read().iter().find(|t| &t.id == id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Replace the visible collection with the backend's
    pub async fn refresh(&self) -> Result<usize> {
        let tickets = self.bounded("load tickets", self.backend.get_tickets()).await?;
        let count = tickets.len();
        *self.write() = tickets;
        debug!(count, "Refreshed ticket cache");
        self.events.refreshed(count);
        Ok(count)
    }

    /// Create a ticket; it is visible under a temporary id until the backend answers
    pub async fn create(&self, ticket: NewTicket) -> Result<Ticket> {
        reject_invalid(validate_ticket_form(&ticket))?;

        let placeholder = Ticket::from_new(TicketId::temporary(), ticket.clone(), now_millis());
        let temporary_id = placeholder.id.clone();
        let (pending, ()) = self.begin(MutationKind::Create, |tickets| {
            tickets.insert(0, placeholder);
            (vec![temporary_id.clone()], ())
        });

        let outcome = self
            .bounded(pending.kind.as_str(), self.backend.create_ticket(ticket))
            .await;
        let created = self.reconcile(pending, outcome, |tickets, created: &Ticket| {
            match tickets.iter_mut().find(|t| t.id == temporary_id) {
                Some(slot) => slot.clone_from(created),
                None => replace_by_id(tickets, created),
            }
        })?;
        self.after_commit().await;
        Ok(created)
    }

    /// Apply a partial update to one ticket
    pub async fn update(&self, id: &TicketId, patch: TicketPatch) -> Result<Ticket> {
        reject_invalid(validate_patch(&patch))?;

        let (pending, ()) = self.begin(MutationKind::Update, |tickets| {
            if let Some(ticket) = tickets.iter_mut().find(|t| &t.id == id) {
                ticket.apply_patch(&patch);
            }
            (vec![id.clone()], ())
        });

        let outcome = self
            .bounded(pending.kind.as_str(), self.backend.update_ticket(id.clone(), patch))
            .await;
        let updated = self.reconcile(pending, outcome, replace_by_id)?;
        self.after_commit().await;
        Ok(updated)
    }

    /// Move a ticket to another priority column
    pub async fn set_priority(&self, id: &TicketId, priority: Priority) -> Result<Ticket> {
        let (pending, ()) = self.begin(MutationKind::SetPriority, |tickets| {
            if let Some(ticket) = tickets.iter_mut().find(|t| &t.id == id) {
                ticket.priority = priority;
            }
            (vec![id.clone()], ())
        });

        let outcome = self
            .bounded(
                pending.kind.as_str(),
                self.backend.update_ticket_priority(id.clone(), priority),
            )
            .await;
        let updated = self.reconcile(pending, outcome, replace_by_id)?;
        self.after_commit().await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &TicketId) -> Result<()> {
        let (pending, ()) = self.begin(MutationKind::Delete, |tickets| {
            tickets.retain(|t| &t.id != id);
            (vec![id.clone()], ())
        });

        let outcome = self
            .bounded(pending.kind.as_str(), self.backend.delete_ticket(id.clone()))
            .await;
        self.reconcile(pending, outcome, |tickets, _| tickets.retain(|t| &t.id != id))?;
        self.after_commit().await;
        Ok(())
    }

    /// Apply several partial updates as one mutation
    pub async fn bulk_update(&self, updates: Vec<(TicketId, TicketPatch)>) -> Result<Vec<Ticket>> {
        for (_, patch) in &updates {
            reject_invalid(validate_patch(patch))?;
        }

        let (pending, ()) = self.begin(MutationKind::BulkUpdate, |tickets| {
            for (id, patch) in &updates {
                if let Some(ticket) = tickets.iter_mut().find(|t| &t.id == id) {
                    ticket.apply_patch(patch);
                }
            }
            (updates.iter().map(|(id, _)| id.clone()).collect(), ())
        });

        let outcome = self
            .bounded(pending.kind.as_str(), self.backend.bulk_update_tickets(updates))
            .await;
        let updated = self.reconcile(pending, outcome, |tickets, updated: &Vec<Ticket>| {
            for ticket in updated {
                replace_by_id(tickets, ticket);
            }
        })?;
        self.after_commit().await;
        Ok(updated)
    }

    /// Add imported tickets, reconciling duplicates per `options`
    ///
    /// The duplicate policy is applied against the visible collection. With
    /// `validate_only`, or when nothing would change, the backend is not called.
    pub async fn bulk_import(
        &self,
        tickets: Vec<Ticket>,
        options: &ImportOptions,
    ) -> Result<ImportSummary> {
        if options.validate_only {
            let plan = plan_import(&self.read(), &tickets, options);
            return Ok(plan.summary);
        }

        let (pending, (changed, summary)) = self.begin(MutationKind::BulkImport, |visible| {
            let plan = plan_import(visible, &tickets, options);
            *visible = plan.tickets;
            let ids = plan.changed.iter().map(|t| t.id.clone()).collect();
            (ids, (plan.changed, plan.summary))
        });

        if changed.is_empty() {
            debug!(skipped = summary.skipped, "Import changes nothing");
            self.discard(pending);
            return Ok(summary);
        }

        let outcome = self
            .bounded(pending.kind.as_str(), self.backend.bulk_import_tickets(changed))
            .await;
        self.reconcile(pending, outcome, |visible, collection: &Vec<Ticket>| {
            visible.clone_from(collection);
        })?;
        self.after_commit().await;
        Ok(summary)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Ticket>> {
        self.visible.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Ticket>> {
        self.visible.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot and apply the optimistic effect in one step
    fn begin<R>(
        &self,
        kind: MutationKind,
        effect: impl FnOnce(&mut Vec<Ticket>) -> (Vec<TicketId>, R),
    ) -> (PendingMutation, R) {
        let (pending, output) = {
            let mut visible = self.write();
            PendingMutation::apply(kind, &mut visible, effect)
        };
        self.events.optimistic(kind, pending.ids.clone());
        (pending, output)
    }

    /// Settle a pending mutation against the backend's answer
    fn reconcile<T>(
        &self,
        pending: PendingMutation,
        outcome: Result<T>,
        accept: impl FnOnce(&mut Vec<Ticket>, &T),
    ) -> Result<T> {
        match outcome {
            Ok(value) => {
                accept(&mut *self.write(), &value);
                self.events.committed(pending.kind, pending.ids);
                Ok(value)
            },
            Err(e) => {
                error!(kind = %pending.kind, error = %e, "Backend rejected mutation, restoring snapshot");
                let kind = pending.kind;
                pending.restore(&mut *self.write());
                self.events.rolled_back(kind, &e.to_string());
                Err(e)
            },
        }
    }

    /// Drop a pending mutation whose effect turned out to be empty
    fn discard(&self, pending: PendingMutation) {
        self.events.committed(pending.kind, pending.ids);
    }

    async fn after_commit(&self) {
        if !self.config.refetch_after_mutation {
            return;
        }
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Refetch after mutation failed, keeping reconciled state");
        }
    }

    /// Bound a backend call by the transport timeout
    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TicketDeskError::Timeout {
                operation: operation.to_string(),
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

fn reject_invalid(errors: BTreeMap<&'static str, String>) -> Result<()> {
    match errors.into_iter().next() {
        Some((field, message)) => Err(TicketDeskError::invalid_ticket(field, message)),
        None => Ok(()),
    }
}
