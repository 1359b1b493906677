//! Door decisions: admitting and banning clients, and the visit log.
//!
//! [`DecisionLog`] is the write side of the client store.  [`admit`] and
//! [`ban_subject`] are the two door actions; both register the scanned
//! subject as a new client when the store does not know the RUN yet.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::{ScannedSubject, Sex};
use crate::registry::{ClientRecord, ClientRegistry, MemoryRegistry};
use crate::run::Run;

/// A ban as entered by door staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanDecision {
    /// Severity, as used by the venue's own scale.
    pub level: u8,
    /// Short reason, e.g. `"Agresion al personal"`.
    pub reason: String,
    /// Free-text account of what happened.
    pub description: String,
}

/// One admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// The admitted client.
    pub run: Run,
    /// When the client was let in.
    pub entry_time: DateTime<Utc>,
}

/// The record left behind by a ban.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// The banned client.
    pub run: Run,
    /// Ban level at the time.
    pub severity: u8,
    /// Reason given for the ban.
    pub reason: String,
    /// Account of the incident.
    #[serde(default)]
    pub description: String,
    /// When the ban was imposed.
    pub created_at: DateTime<Utc>,
}

/// Door activity for one UTC day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyStats {
    /// Visits recorded.
    pub total_visits: usize,
    /// Bans imposed.
    pub incidents: usize,
    /// Clients registered.
    pub new_clients: usize,
    /// Visits by male clients.
    pub male_visits: usize,
    /// Visits by female clients.
    pub female_visits: usize,
    /// Male clients registered.
    pub male_clients: usize,
    /// Female clients registered.
    pub female_clients: usize,
}

/// Errors from recording a door decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    /// The scan produced no RUN, so there is nothing to key the record on.
    #[error("the scan produced no RUN")]
    MissingRun,

    /// No client has this RUN.
    #[error("no client with RUN {0}")]
    UnknownClient(Run),

    /// A client with this RUN is already registered.
    #[error("client {0} is already registered")]
    DuplicateClient(Run),

    /// The client is banned and cannot be admitted.
    #[error("client {0} is banned")]
    Banned(Run),
}

/// Records door decisions in the client store.
///
/// The trait is object-safe.  Implementations persist however they like;
/// [`MemoryRegistry`] keeps everything in its own vectors.
pub trait DecisionLog: ClientRegistry {
    /// Registers a new client.
    ///
    /// # Errors
    ///
    /// [`DecisionError::DuplicateClient`] if the RUN is already known.
    fn add_client(&mut self, record: ClientRecord) -> Result<(), DecisionError>;

    /// Bans a known client and records an [`Incident`].  Banning an already
    /// banned client replaces the ban details.
    ///
    /// # Errors
    ///
    /// [`DecisionError::UnknownClient`] if the RUN is not registered.
    fn ban(
        &mut self,
        run: &Run,
        decision: &BanDecision,
        at: DateTime<Utc>,
    ) -> Result<ClientRecord, DecisionError>;

    /// Lifts a client's ban.  Lifting a ban that is not there is a no-op.
    ///
    /// # Errors
    ///
    /// [`DecisionError::UnknownClient`] if the RUN is not registered.
    fn unban(&mut self, run: &Run) -> Result<ClientRecord, DecisionError>;

    /// Records that a known client was let in at `at`.
    ///
    /// # Errors
    ///
    /// [`DecisionError::UnknownClient`] if the RUN is not registered.
    fn record_visit(&mut self, run: &Run, at: DateTime<Utc>) -> Result<Visit, DecisionError>;

    /// Returns a client's visits, most recent first.
    fn client_visits(&self, run: &Run) -> Vec<Visit>;

    /// Summarizes the activity of one UTC day.
    fn daily_stats(&self, day: NaiveDate) -> DailyStats;
}

/// Lets the subject in and records the visit.
///
/// An unknown RUN is registered first from the subject's details.
///
/// # Errors
///
/// - [`DecisionError::MissingRun`] if the subject has no RUN.
/// - [`DecisionError::Banned`] if the client is banned; nothing is recorded.
pub fn admit(
    log: &mut dyn DecisionLog,
    subject: &ScannedSubject,
    at: DateTime<Utc>,
) -> Result<Visit, DecisionError> {
    let run = subject.run.as_ref().ok_or(DecisionError::MissingRun)?;
    match log.client_by_run(run) {
        Some(client) if client.is_banned => return Err(DecisionError::Banned(client.run)),
        Some(_) => {}
        None => log.add_client(ClientRecord::from_subject(run.clone(), subject, at))?,
    }
    let visit = log.record_visit(run, at)?;
    tracing::debug!(run = %run, "visit recorded");
    Ok(visit)
}

/// Bans the subject.
///
/// An unknown RUN is registered first from the subject's details.
///
/// # Errors
///
/// [`DecisionError::MissingRun`] if the subject has no RUN.
pub fn ban_subject(
    log: &mut dyn DecisionLog,
    subject: &ScannedSubject,
    decision: &BanDecision,
    at: DateTime<Utc>,
) -> Result<ClientRecord, DecisionError> {
    let run = subject.run.as_ref().ok_or(DecisionError::MissingRun)?;
    if log.client_by_run(run).is_none() {
        log.add_client(ClientRecord::from_subject(run.clone(), subject, at))?;
    }
    let record = log.ban(run, decision, at)?;
    tracing::debug!(run = %run, level = decision.level, "client banned");
    Ok(record)
}

impl MemoryRegistry {
    fn client_mut(&mut self, run: &Run) -> Result<&mut ClientRecord, DecisionError> {
        self.clients
            .iter_mut()
            .find(|c| &c.run == run)
            .ok_or_else(|| DecisionError::UnknownClient(run.clone()))
    }

    fn sex_of(&self, run: &Run) -> Option<&Sex> {
        self.clients
            .iter()
            .find(|c| &c.run == run)
            .and_then(|c| c.sex.as_ref())
    }
}

impl DecisionLog for MemoryRegistry {
    fn add_client(&mut self, record: ClientRecord) -> Result<(), DecisionError> {
        if self.clients.iter().any(|c| c.run == record.run) {
            return Err(DecisionError::DuplicateClient(record.run));
        }
        self.clients.push(record);
        Ok(())
    }

    fn ban(
        &mut self,
        run: &Run,
        decision: &BanDecision,
        at: DateTime<Utc>,
    ) -> Result<ClientRecord, DecisionError> {
        let client = self.client_mut(run)?;
        client.is_banned = true;
        client.ban_level = Some(decision.level);
        client.ban_reason = Some(decision.reason.clone());
        client.ban_description = Some(decision.description.clone());
        client.banned_at = Some(at);
        let record = client.clone();

        self.incidents.push(Incident {
            run: run.clone(),
            severity: decision.level,
            reason: decision.reason.clone(),
            description: decision.description.clone(),
            created_at: at,
        });
        Ok(record)
    }

    fn unban(&mut self, run: &Run) -> Result<ClientRecord, DecisionError> {
        let client = self.client_mut(run)?;
        client.lift_ban();
        Ok(client.clone())
    }

    fn record_visit(&mut self, run: &Run, at: DateTime<Utc>) -> Result<Visit, DecisionError> {
        self.client_mut(run)?;
        let visit = Visit {
            run: run.clone(),
            entry_time: at,
        };
        self.visits.push(visit.clone());
        Ok(visit)
    }

    fn client_visits(&self, run: &Run) -> Vec<Visit> {
        let mut visits: Vec<Visit> = self
            .visits
            .iter()
            .filter(|v| &v.run == run)
            .cloned()
            .collect();
        visits.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        visits
    }

    fn daily_stats(&self, day: NaiveDate) -> DailyStats {
        let mut stats = DailyStats::default();

        for visit in self.visits.iter().filter(|v| v.entry_time.date_naive() == day) {
            stats.total_visits += 1;
            match self.sex_of(&visit.run) {
                Some(Sex::Male) => stats.male_visits += 1,
                Some(Sex::Female) => stats.female_visits += 1,
                Some(Sex::Other(_)) | None => {}
            }
        }

        stats.incidents = self
            .incidents
            .iter()
            .filter(|i| i.created_at.date_naive() == day)
            .count();

        for client in &self.clients {
            if client.created_at.map(|t| t.date_naive()) != Some(day) {
                continue;
            }
            stats.new_clients += 1;
            match client.sex {
                Some(Sex::Male) => stats.male_clients += 1,
                Some(Sex::Female) => stats.female_clients += 1,
                Some(Sex::Other(_)) | None => {}
            }
        }

        stats
    }
}
