//! Search, sorting, pagination and board grouping over a ticket snapshot

use crate::core::{Priority, Ticket};
use serde::Serialize;
use std::cmp::Ordering;
use std::ops::Range;

/// Column a ticket list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortField {
    #[default]
    Date,
    Name,
    Company,
}

impl SortField {
    /// Direction used when a list is first sorted by this field
    #[must_use]
    pub const fn default_direction(self) -> SortDirection {
        match self {
            Self::Date => SortDirection::Desc,
            Self::Name | Self::Company => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Filter and ordering for a ticket list
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
    pub search: Option<String>,
    pub priority: Option<Priority>,
    pub sort_by: SortField,
    /// Falls back to the field's default direction
    pub direction: Option<SortDirection>,
}

impl TicketQuery {
    /// Filter and sort a snapshot
    #[must_use]
    pub fn apply(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        let mut matched = match &self.search {
            Some(query) => search(tickets, query),
            None => tickets.to_vec(),
        };
        if let Some(priority) = self.priority {
            matched.retain(|t| t.priority == priority);
        }
        let direction = self
            .direction
            .unwrap_or_else(|| self.sort_by.default_direction());
        sort(&mut matched, self.sort_by, direction);
        matched
    }
}

/// Tickets whose name, surname, email or full name contain `query`, ignoring case
///
/// A blank query matches everything.
#[must_use]
pub fn search(tickets: &[Ticket], query: &str) -> Vec<Ticket> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return tickets.to_vec();
    }
    tickets
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&query)
                || t.surname.to_lowercase().contains(&query)
                || t.email.to_lowercase().contains(&query)
                || t.full_name().to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Stable sort by `field`
pub fn sort(tickets: &mut [Ticket], field: SortField, direction: SortDirection) {
    tickets.sort_by(|a, b| {
        let ordering = match field {
            SortField::Date => a.created_at.cmp(&b.created_at),
            SortField::Name => compare_text(&a.full_name(), &b.full_name()),
            SortField::Company => compare_text(&a.company, &b.company),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// One page of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped to the last page
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Index range of the page's items in the full list
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let start = (self.page - 1) * self.page_size;
        start..(start + self.items.len())
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Cut page `page` (1-based) out of `items`
///
/// Pages past the end yield the last page; an empty list has one empty page.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Page {
        items: items.get(start..end).unwrap_or_default().to_vec(),
        page,
        page_size,
        total_items: items.len(),
        total_pages,
    }
}

/// Tickets of one priority on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityColumn {
    pub priority: Priority,
    pub title: &'static str,
    pub tickets: Vec<Ticket>,
}

/// High, medium and low columns, in that order
#[must_use]
pub fn priority_columns(tickets: &[Ticket]) -> Vec<PriorityColumn> {
    Priority::ALL
        .iter()
        .map(|&priority| PriorityColumn {
            priority,
            title: priority.title(),
            tickets: tickets
                .iter()
                .filter(|t| t.priority == priority)
                .cloned()
                .collect(),
        })
        .collect()
}
