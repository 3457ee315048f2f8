//! Core domain types: tickets, their ids, priorities and partial updates

mod builders;
mod priority;
mod ticket;

pub use builders::TicketBuilder;
pub use priority::Priority;
pub use ticket::{
    NewTicket, Ticket, TicketId, TicketPatch, format_timestamp, now_millis, parse_timestamp,
};
