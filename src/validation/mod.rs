//! Field validation for tickets
//!
//! Two entry points share the same primitives:
//! - [`validate_field`] / [`validate_ticket_form`] check user-submitted
//!   tickets against declarative [`FieldRules`].
//! - [`is_valid_email`] and [`is_recognized_priority`] back the per-record
//!   checks of the import pipeline.
//!
//! Everything here is pure. Failures come back as messages, never as `Err`.

use crate::core::{NewTicket, Priority, TicketPatch};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Minimum trimmed length of a ticket description
pub const MIN_DESCRIPTION_LENGTH: usize = 10;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email pattern: {e}"))
});

/// Rules declared for one logical field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldRules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub is_email: bool,
}

impl FieldRules {
    /// Non-empty after trimming
    #[must_use]
    pub const fn required() -> Self {
        Self {
            required: true,
            min_length: None,
            is_email: false,
        }
    }

    #[must_use]
    pub const fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    #[must_use]
    pub const fn email(mut self) -> Self {
        self.is_email = true;
        self
    }
}

/// Check `value` against `rules`, returning the first failing rule's message
///
/// `None` means the value passed. Rules are checked in the order required,
/// minimum length, email shape. An empty optional value skips the email check.
#[must_use]
pub fn validate_field(value: &str, rules: &FieldRules) -> Option<String> {
    let trimmed = value.trim();

    if rules.required && trimmed.is_empty() {
        return Some("Required".to_string());
    }

    if let Some(min) = rules.min_length {
        if trimmed.chars().count() < min {
            return Some(format!("Must be at least {min} characters"));
        }
    }

    if rules.is_email && !trimmed.is_empty() && !is_valid_email(trimmed) {
        return Some("Must be a valid email address".to_string());
    }

    None
}

/// The fixed rule set for a ticket form, in field order
#[must_use]
pub const fn ticket_form_rules() -> [(&'static str, FieldRules); 5] {
    [
        ("name", FieldRules::required()),
        ("surname", FieldRules::required()),
        ("company", FieldRules::required()),
        ("email", FieldRules::required().email()),
        (
            "description",
            FieldRules::required().min_length(MIN_DESCRIPTION_LENGTH),
        ),
    ]
}

/// Validate a submitted ticket, keyed by field name
///
/// An empty map means the ticket is valid. Priority is typed and therefore
/// always valid here.
#[must_use]
pub fn validate_ticket_form(ticket: &NewTicket) -> BTreeMap<&'static str, String> {
    ticket_form_rules()
        .iter()
        .filter_map(|(field, rules)| {
            let value = match *field {
                "name" => &ticket.name,
                "surname" => &ticket.surname,
                "company" => &ticket.company,
                "email" => &ticket.email,
                _ => &ticket.description,
            };
            validate_field(value, rules).map(|message| (*field, message))
        })
        .collect()
}

/// Validate only the fields a patch sets
#[must_use]
pub fn validate_patch(patch: &TicketPatch) -> BTreeMap<&'static str, String> {
    ticket_form_rules()
        .iter()
        .filter_map(|(field, rules)| {
            let value = match *field {
                "name" => patch.name.as_ref(),
                "surname" => patch.surname.as_ref(),
                "company" => patch.company.as_ref(),
                "email" => patch.email.as_ref(),
                _ => patch.description.as_ref(),
            }?;
            validate_field(value, rules).map(|message| (*field, message))
        })
        .collect()
}

/// Whether `email` has the `local@domain.tld` shape
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Whether `priority` is high, medium or low in any letter case
#[must_use]
pub fn is_recognized_priority(priority: &str) -> bool {
    Priority::is_recognized(priority)
}
