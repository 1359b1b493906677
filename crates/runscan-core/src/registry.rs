//! Client registry seam and door screening.
//!
//! The venue keeps its clients, ban records and guest lists in an external
//! store.  This module defines the [`ClientRegistry`] trait the screening
//! logic receives as an injected dependency, keeping `runscan-core` free of
//! network or database dependencies.  [`MemoryRegistry`] is a `Vec`-backed
//! implementation for tests and for the CLI, which loads it from JSON.
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::{ScannedSubject, Sex};
use crate::decisions::{Incident, Visit};
use crate::run::Run;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A client known to the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// The client's RUN.
    pub run: Run,
    /// Given names as stored.
    #[serde(default)]
    pub given_names: String,
    /// Family names as stored.
    #[serde(default)]
    pub surnames: String,
    /// Nationality as stored.
    #[serde(default)]
    pub nationality: String,
    /// Sex as stored, when known.
    #[serde(default)]
    pub sex: Option<Sex>,
    /// When the client was first registered.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Whether the client is currently banned.
    #[serde(default)]
    pub is_banned: bool,
    /// Severity level recorded with the ban.
    #[serde(default)]
    pub ban_level: Option<u8>,
    /// Reason recorded with the ban.
    #[serde(default)]
    pub ban_reason: Option<String>,
    /// Free-text account of the incident behind the ban.
    #[serde(default)]
    pub ban_description: Option<String>,
    /// When the ban was imposed.
    #[serde(default)]
    pub banned_at: Option<DateTime<Utc>>,
}

impl ClientRecord {
    /// A record for `run` with nothing else known and no ban.
    pub fn new(run: Run) -> Self {
        Self {
            run,
            given_names: String::new(),
            surnames: String::new(),
            nationality: String::new(),
            sex: None,
            created_at: None,
            is_banned: false,
            ban_level: None,
            ban_reason: None,
            ban_description: None,
            banned_at: None,
        }
    }

    /// A new, unbanned record for `run` carrying the scanned subject's
    /// details, registered at `at`.
    pub fn from_subject(run: Run, subject: &ScannedSubject, at: DateTime<Utc>) -> Self {
        Self {
            given_names: subject.given_names.clone(),
            surnames: subject.surnames.clone(),
            nationality: subject.nationality.clone(),
            sex: subject.sex.clone(),
            created_at: Some(at),
            ..Self::new(run)
        }
    }

    /// Clears every ban field.
    pub(crate) fn lift_ban(&mut self) {
        self.is_banned = false;
        self.ban_level = None;
        self.ban_reason = None;
        self.ban_description = None;
        self.banned_at = None;
    }
}

/// An entry on the guest list.  Guests are listed by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestEntry {
    /// Given names.
    pub given_names: String,
    /// Family names.
    pub surnames: String,
}

// ---------------------------------------------------------------------------
// ClientRegistry
// ---------------------------------------------------------------------------

/// Lookups the door workflow needs from the client store.
///
/// Implementations may query a remote database, a local cache, or fixed
/// data.  The trait is object-safe.  A lookup that cannot be answered is
/// reported as "not found" (`None` / `false`); screening then proceeds as for
/// an unknown client.
pub trait ClientRegistry {
    /// Looks a client up by RUN.
    fn client_by_run(&self, run: &Run) -> Option<ClientRecord>;

    /// Looks a client up by name.  Comparison rules are up to the
    /// implementation.
    fn client_by_name(&self, given_names: &str, surnames: &str) -> Option<ClientRecord>;

    /// Returns `true` if the name is on tonight's guest list.
    fn is_guest(&self, given_names: &str, surnames: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Screening
// ---------------------------------------------------------------------------

/// Outcome of screening a scanned subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// A matching client record carries an active ban.
    Banned,
    /// The subject is on the guest list.
    Guest,
    /// Neither banned nor a guest.
    Regular,
    /// The scan produced neither a RUN nor a full name.
    Unidentified,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Banned => f.write_str("banned"),
            Self::Guest => f.write_str("guest"),
            Self::Regular => f.write_str("regular"),
            Self::Unidentified => f.write_str("unidentified"),
        }
    }
}

/// The result of [`screen`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screening {
    /// The subject's status at the door.
    pub status: ClientStatus,
    /// The matching client record, if any.
    pub client: Option<ClientRecord>,
}

/// Screens a scanned subject against the registry.
///
/// The client record is looked up by RUN when the scan produced one, and by
/// name otherwise.  A banned record yields [`ClientStatus::Banned`]; failing
/// that, a guest-list match yields [`ClientStatus::Guest`]; anyone else
/// identifiable is [`ClientStatus::Regular`].
pub fn screen(registry: &dyn ClientRegistry, subject: &ScannedSubject) -> Screening {
    if subject.run.is_none() && !subject.has_full_name() {
        tracing::debug!("subject has neither RUN nor full name");
        return Screening {
            status: ClientStatus::Unidentified,
            client: None,
        };
    }

    let client = match &subject.run {
        Some(run) => registry.client_by_run(run),
        None => registry.client_by_name(&subject.given_names, &subject.surnames),
    };

    let status = if client.as_ref().is_some_and(|c| c.is_banned) {
        ClientStatus::Banned
    } else if subject.has_full_name()
        && registry.is_guest(&subject.given_names, &subject.surnames)
    {
        ClientStatus::Guest
    } else {
        ClientStatus::Regular
    };

    tracing::debug!(
        run = subject.run.as_ref().map(Run::dotted).as_deref(),
        known = client.is_some(),
        %status,
        "screened subject"
    );
    Screening { status, client }
}

// ---------------------------------------------------------------------------
// MemoryRegistry
// ---------------------------------------------------------------------------

/// Errors produced when loading or saving a [`MemoryRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry document is not valid JSON or has the wrong shape.
    #[error("invalid registry: line {line}, column {column}: {detail}")]
    Json {
        /// 1-based line of the error.
        line: usize,
        /// 1-based column of the error.
        column: usize,
        /// Description from the JSON parser.
        detail: String,
    },

    /// The registry could not be encoded as JSON.
    #[error("cannot encode registry: {0}")]
    Encode(String),
}

/// An in-memory [`ClientRegistry`] and [`DecisionLog`](crate::DecisionLog).
///
/// Name comparisons ignore case and surrounding whitespace.  Visits and
/// incidents are kept in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryRegistry {
    /// Known clients.
    pub clients: Vec<ClientRecord>,
    /// Tonight's guest list.
    pub guests: Vec<GuestEntry>,
    /// Every admission recorded at the door.
    pub visits: Vec<Visit>,
    /// One entry per ban imposed.
    pub incidents: Vec<Incident>,
}

impl MemoryRegistry {
    /// Parses a registry from JSON of the form
    /// `{"clients": [...], "guests": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Json`] if the document is malformed or a
    /// client RUN fails validation.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(json).map_err(|e| RegistryError::Json {
            line: e.line(),
            column: e.column(),
            detail: e.to_string(),
        })
    }

    /// Encodes the registry, decisions included, as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, RegistryError> {
        serde_json::to_string_pretty(self).map_err(|e| RegistryError::Encode(e.to_string()))
    }
}

pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl ClientRegistry for MemoryRegistry {
    fn client_by_run(&self, run: &Run) -> Option<ClientRecord> {
        self.clients.iter().find(|c| &c.run == run).cloned()
    }

    fn client_by_name(&self, given_names: &str, surnames: &str) -> Option<ClientRecord> {
        self.clients
            .iter()
            .find(|c| same_name(&c.given_names, given_names) && same_name(&c.surnames, surnames))
            .cloned()
    }

    fn is_guest(&self, given_names: &str, surnames: &str) -> bool {
        self.guests
            .iter()
            .any(|g| same_name(&g.given_names, given_names) && same_name(&g.surnames, surnames))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
