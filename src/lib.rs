//! ticket-desk - Support ticket management
//!
//! This crate provides:
//! - A ticket model with field validation
//! - CSV and JSON import with per-row error reports and duplicate handling
//! - CSV and JSON export
//! - An optimistic ticket cache over local storage or a simulated remote API
//! - Search, sorting, pagination and a priority board
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ticket_desk::cache::TicketStore;
//! use ticket_desk::config::{ApiConfig, CacheConfig};
//! use ticket_desk::core::{Priority, TicketId};
//! use ticket_desk::storage::MockApiBackend;
//!
//! # async fn demo() -> ticket_desk::Result<()> {
//! let backend = Arc::new(MockApiBackend::seeded(ApiConfig::default()));
//! let store = TicketStore::load(backend, CacheConfig::default(), ApiConfig::default().timeout()).await?;
//!
//! // Visible immediately, rolled back if the API rejects it
//! store.set_priority(&TicketId::new("4"), Priority::High).await?;
//! # Ok(())
//! # }
//! ```

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::too_many_lines)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod import_export;
pub mod query;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, TicketDeskError};
