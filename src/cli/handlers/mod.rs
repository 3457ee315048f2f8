//! Command handlers
//!
//! Each handler takes the opened [`HandlerContext`], its parsed arguments
//! and the [`OutputFormatter`](crate::cli::OutputFormatter).

mod board;
mod export;
mod import;
mod tickets;

pub use board::handle_board_command;
pub use export::handle_export_command;
pub use import::{ImportCommandArgs, handle_import_command};
pub use tickets::{
    ListCommandArgs, handle_create_command, handle_delete_command, handle_list_command,
    handle_priority_command, handle_show_command, handle_update_command,
};

use crate::cache::TicketStore;
use crate::config::AppConfig;
use crate::core::{Ticket, TicketId};
use crate::error::{Result, TicketDeskError};
use crate::storage::{TicketBackend, open_backend};

/// Configuration and the loaded ticket cache shared by all handlers
pub struct HandlerContext {
    pub config: AppConfig,
    pub store: TicketStore<dyn TicketBackend>,
}

impl HandlerContext {
    /// Open the configured backend and load the collection
    pub async fn open(config: AppConfig) -> Result<Self> {
        let backend = open_backend(&config.storage, &config.api);
        let store =
            TicketStore::load(backend, config.cache.clone(), config.api.timeout()).await?;
        Ok(Self { config, store })
    }

    /// Look a ticket up in the loaded collection
    pub fn require_ticket(&self, id: &str) -> Result<Ticket> {
        self.store
            .get(&TicketId::new(id))
            .ok_or_else(|| TicketDeskError::TicketNotFound { id: id.to_string() })
    }
}
