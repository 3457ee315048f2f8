use super::Priority;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix of ids assigned to optimistic creates before the backend answers
const TEMPORARY_PREFIX: &str = "temp-";

/// Unique identifier for a ticket
///
/// Ids are opaque strings: the mock API hands out `ticket-<millis>`, local
/// storage uses UUIDs, and imports keep whatever id the source file carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Wrap an existing id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh UUIDv4 id
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// A client-side id for a record the backend has not confirmed yet
    #[must_use]
    pub fn temporary() -> Self {
        Self(format!("{TEMPORARY_PREFIX}{}", Uuid::new_v4()))
    }

    /// Id for the `index`-th record of an import batch started at `batch_millis`
    #[must_use]
    pub fn imported(batch_millis: i64, index: usize) -> Self {
        Self(format!("imported-{batch_millis}-{index}"))
    }

    /// Whether this id was assigned client-side and may still change
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_PREFIX)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TicketId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A support ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: String,
    pub description: String,
    pub priority: Priority,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Build a ticket from submitted fields
    #[must_use]
    pub fn from_new(id: TicketId, new: NewTicket, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            surname: new.surname,
            company: new.company,
            email: new.email,
            description: new.description,
            priority: new.priority,
            created_at,
        }
    }

    /// `"<name> <surname>"`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Apply a partial update. `id` and `created_at` are never touched.
    pub fn apply_patch(&mut self, patch: &TicketPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(surname) = &patch.surname {
            self.surname.clone_from(surname);
        }
        if let Some(company) = &patch.company {
            self.company.clone_from(company);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }

    /// Shallow-merge another ticket's content into this one
    ///
    /// Non-empty incoming fields win; `id` and `created_at` stay as they are.
    pub fn merge_from(&mut self, incoming: &Self) {
        let pick = |current: &mut String, incoming: &str| {
            if !incoming.trim().is_empty() {
                incoming.clone_into(current);
            }
        };
        pick(&mut self.name, &incoming.name);
        pick(&mut self.surname, &incoming.surname);
        pick(&mut self.company, &incoming.company);
        pick(&mut self.email, &incoming.email);
        pick(&mut self.description, &incoming.description);
        self.priority = incoming.priority;
    }

    /// The content fields as a patch, used to replay an update elsewhere
    #[must_use]
    pub fn to_patch(&self) -> TicketPatch {
        TicketPatch {
            name: Some(self.name.clone()),
            surname: Some(self.surname.clone()),
            company: Some(self.company.clone()),
            email: Some(self.email.clone()),
            description: Some(self.description.clone()),
            priority: Some(self.priority),
        }
    }
}

/// Fields submitted when creating a ticket
///
/// `id` and `created_at` are assigned by whoever stores the ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

impl From<&Ticket> for NewTicket {
    fn from(ticket: &Ticket) -> Self {
        Self {
            name: ticket.name.clone(),
            surname: ticket.surname.clone(),
            company: ticket.company.clone(),
            email: ticket.email.clone(),
            description: ticket.description.clone(),
            priority: ticket.priority,
        }
    }
}

/// Partial update of a ticket's content fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TicketPatch {
    /// A patch that only moves the ticket to another priority
    #[must_use]
    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The current time at the millisecond precision timestamps are stored with
///
/// Every `created_at` the crate assigns goes through here so that a ticket
/// reads back unchanged after being written out.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp the way exports and local storage write it
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Leniently parse a timestamp found in an import file
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and a
/// bare `YYYY-MM-DD`. Sub-millisecond digits are dropped.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_exact(raw.trim()).map(|ts| ts.trunc_subsecs(3))
}

fn parse_timestamp_exact(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter writing `createdAt` as `2024-01-15T10:30:00.000Z`
mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}
