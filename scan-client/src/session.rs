//! Scan session and mutation guard
//!
//! One `ScanSession` per scanning UI session. It owns the in-memory
//! member projection, enforces at most one in-flight mutation via the
//! status state (concurrent requests are silently dropped, never
//! queued), and re-synchronizes from a fresh directory read after every
//! mutation attempt, successful or not.

use std::time::{Duration, Instant};

use shared::client::MutationReceipt;
use shared::models::MemberRecord;
use tracing::{debug, warn};

use crate::adapter::WalletAdapter;
use crate::config::ScanConfig;
use crate::directory::{DirectoryClient, SearchOutcome};
use crate::engine::{self, LedgerMutation, MutationKind};
use crate::http::HttpClient;
use crate::normalize::{self, CanonicalIdentifier};
use crate::reward::{self, CardProgram};
use crate::{ScanError, ScanResult};

/// Session status surfaced to the UI as a single state object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    /// A mutation is in flight; further requests are dropped
    Busy(MutationKind),
    Succeeded {
        message: String,
        /// Set when the mutation completed the strip collection, so the
        /// UI can show a completion notification instead of the
        /// ordinary acknowledgment
        completed: bool,
    },
    Failed(String),
}

/// Result of a mutation request against the session
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    /// Committed; receipt fields are immediate feedback only
    Applied(MutationReceipt),
    /// Committed and the strip collection is now complete
    Completed(MutationReceipt),
    /// The backend reports the collection already complete; the caller
    /// must choose reset-with-redemption or reset-without
    ResetRequired,
    /// Another mutation was in flight; this request was dropped
    Dropped,
}

/// One scanning session: member projection, status machine, backends
pub struct ScanSession {
    directory: DirectoryClient,
    adapter: WalletAdapter,
    identifier: Option<CanonicalIdentifier>,
    member: Option<MemberRecord>,
    program: Option<CardProgram>,
    status: SessionStatus,
    status_set_at: Option<Instant>,
    status_ttl: Duration,
}

impl ScanSession {
    /// Default point credit per scan, adjustable by the operator
    pub const DEFAULT_DELTA: i64 = 10;

    /// How long a success/failure status stays visible before the
    /// session reads as idle again
    pub const STATUS_CLEAR: Duration = Duration::from_secs(3);

    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        let directory_http =
            HttpClient::new(&config.api_base_url, config.timeout, config.token.clone())?;
        Ok(Self {
            directory: DirectoryClient::new(directory_http),
            adapter: WalletAdapter::new(config)?,
            identifier: None,
            member: None,
            program: None,
            status: SessionStatus::Idle,
            status_set_at: None,
            status_ttl: Self::STATUS_CLEAR,
        })
    }

    /// Override the status-clear delay (tests)
    pub fn with_status_ttl(mut self, ttl: Duration) -> Self {
        self.status_ttl = ttl;
        self
    }

    // ==================== accessors ====================

    pub fn member(&self) -> Option<&MemberRecord> {
        self.member.as_ref()
    }

    pub fn program(&self) -> Option<&CardProgram> {
        self.program.as_ref()
    }

    pub fn identifier(&self) -> Option<&CanonicalIdentifier> {
        self.identifier.as_ref()
    }

    /// Current status; transient success/failure decays to idle after
    /// the clear delay
    pub fn status(&self) -> SessionStatus {
        match &self.status {
            SessionStatus::Succeeded { .. } | SessionStatus::Failed(_) => {
                let expired = self
                    .status_set_at
                    .is_some_and(|at| at.elapsed() >= self.status_ttl);
                if expired {
                    SessionStatus::Idle
                } else {
                    self.status.clone()
                }
            }
            other => other.clone(),
        }
    }

    /// Number of the next strip to grant for the selected member
    pub fn next_strip(&self) -> Option<i32> {
        let member = self.member.as_ref()?;
        let required = match &self.program {
            Some(CardProgram::Strips(structure)) => structure.total_required(),
            _ => member.strips_required,
        };
        Some(reward::next_strip(member.strips_collected, required))
    }

    /// Current tier index (0-based) of the selected member's program
    pub fn current_tier(&self) -> Option<usize> {
        let member = self.member.as_ref()?;
        match &self.program {
            Some(CardProgram::Strips(structure)) => {
                Some(reward::current_tier_index(structure, member.strips_collected))
            }
            _ => None,
        }
    }

    // ==================== member resolution ====================

    /// Start a session from a decoded scan payload
    ///
    /// Normalizes the payload, fetches the authoritative record and
    /// resolves its reward structure.
    pub async fn begin(&mut self, payload: &str) -> ScanResult<&MemberRecord> {
        let identifier = normalize::normalize(payload);
        debug!(serial = %identifier.value, kind = ?identifier.kind, "scan session begin");
        let serial = identifier.value.clone();
        self.identifier = Some(identifier);
        self.adopt(&serial).await
    }

    /// Search the directory by free text
    ///
    /// An exactly-one result is auto-selected (with the authoritative
    /// re-lookup); multiple matches are returned for explicit selection
    /// via [`Self::select`].
    pub async fn search(&mut self, term: &str) -> ScanResult<SearchOutcome> {
        match self.directory.search(term).await? {
            SearchOutcome::One(record) => {
                let fresh = self.adopt(&record.serial_number).await?.clone();
                Ok(SearchOutcome::One(fresh))
            }
            other => Ok(other),
        }
    }

    /// Adopt a record picked from a multi-match search result
    ///
    /// Always re-fetches by serial; search rows are not trusted as
    /// mutation inputs.
    pub async fn select(&mut self, record: &MemberRecord) -> ScanResult<&MemberRecord> {
        self.adopt(&record.serial_number).await
    }

    async fn adopt(&mut self, serial: &str) -> ScanResult<&MemberRecord> {
        let member = self.directory.lookup_by_serial(serial).await?;
        self.program = Some(reward::resolve(&member));
        Ok(self.member.insert(member))
    }

    // ==================== mutations ====================

    /// Project the new point total for a requested delta, locally
    ///
    /// Insufficient balance is reported without touching the status
    /// machine, so the UI can show live feedback while typing.
    pub fn preview_points(&self, delta: i64) -> ScanResult<i64> {
        let member = self
            .member
            .as_ref()
            .ok_or_else(|| ScanError::Validation("no member selected".to_string()))?;
        if delta < 0 && delta.unsigned_abs() > member.points.max(0) as u64 {
            return Err(ScanError::InsufficientBalance {
                requested: delta.unsigned_abs(),
                available: member.points,
            });
        }
        Ok(member.points.saturating_add(delta))
    }

    /// Grant the next strip in sequence
    pub async fn grant_next_strip(&mut self) -> ScanResult<ApplyOutcome> {
        let strip_number = self
            .next_strip()
            .ok_or_else(|| ScanError::Validation("no member selected".to_string()))?;
        self.apply(LedgerMutation::GrantStrip { strip_number }).await
    }

    /// Validate, commit and reconcile one ledger mutation
    ///
    /// State machine per attempt: idle, validating, committing,
    /// reconciled; a rejected or failed transition surfaces the error
    /// and the status decays back to idle. While a mutation is in
    /// flight, further requests return [`ApplyOutcome::Dropped`].
    pub async fn apply(&mut self, mutation: LedgerMutation) -> ScanResult<ApplyOutcome> {
        if let SessionStatus::Busy(kind) = &self.status {
            debug!(in_flight = ?kind, requested = ?mutation.kind(), "mutation dropped, session busy");
            return Ok(ApplyOutcome::Dropped);
        }

        let Some(member) = self.member.as_ref() else {
            return Err(ScanError::Validation("no member selected".to_string()));
        };
        let serial = member.serial_number.clone();
        let preference = member.wallet_type;

        debug!(%serial, kind = ?mutation.kind(), "validating mutation");
        if let Err(err) = engine::validate(&mutation, member) {
            self.set_status(SessionStatus::Failed(err.to_string()));
            return Err(err);
        }

        self.set_status(SessionStatus::Busy(mutation.kind()));
        debug!(%serial, kind = ?mutation.kind(), "committing mutation");

        match self.adapter.apply(&serial, &mutation, preference).await {
            Ok(receipt) => {
                self.project_receipt(&mutation, &receipt);
                let completed = receipt.is_complete.unwrap_or(false);
                let message = receipt_message(&mutation, &receipt);
                self.reconcile(&serial).await;
                self.set_status(SessionStatus::Succeeded {
                    message,
                    completed,
                });
                if completed {
                    Ok(ApplyOutcome::Completed(receipt))
                } else {
                    Ok(ApplyOutcome::Applied(receipt))
                }
            }
            Err(ScanError::CompletionConflict) => {
                // Not fatal: adopt the backend's view that the
                // collection is complete and offer the reset/redeem
                // choice instead of raw failure text.
                if let Some(m) = self.member.as_mut() {
                    m.reward_unlocked = true;
                }
                self.reconcile(&serial).await;
                self.set_status(SessionStatus::Idle);
                Ok(ApplyOutcome::ResetRequired)
            }
            Err(err) => {
                self.reconcile(&serial).await;
                self.set_status(SessionStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Optimistic projection from receipt fields, for immediate feedback
    fn project_receipt(&mut self, mutation: &LedgerMutation, receipt: &MutationReceipt) {
        let Some(member) = self.member.as_mut() else {
            return;
        };
        match mutation {
            LedgerMutation::PointsDelta(delta) => {
                member.points = receipt
                    .points
                    .unwrap_or_else(|| member.points.saturating_add(*delta));
            }
            LedgerMutation::GrantStrip { .. } => {
                member.strips_collected = receipt
                    .strips_collected
                    .unwrap_or_else(|| member.strips_collected.saturating_add(1));
                if let Some(required) = receipt.strips_required {
                    member.strips_required = required;
                }
                member.reward_unlocked = receipt.is_complete.unwrap_or_else(|| {
                    reward::is_complete(member.strips_collected, member.strips_required)
                });
            }
            LedgerMutation::ResetStrips { .. } => {
                member.strips_collected = 0;
                member.reward_unlocked = false;
            }
        }
    }

    /// Unconditional post-mutation re-fetch
    ///
    /// The mutation response is never the new source of truth; a failed
    /// re-fetch keeps the optimistic projection and logs.
    async fn reconcile(&mut self, serial: &str) {
        debug!(%serial, "reconciling member state");
        match self.directory.lookup_by_serial(serial).await {
            Ok(fresh) => {
                self.program = Some(reward::resolve(&fresh));
                self.member = Some(fresh);
            }
            Err(err) => {
                warn!(%serial, error = %err, "post-mutation re-fetch failed, keeping projection");
            }
        }
    }

    fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.status_set_at = Some(Instant::now());
    }
}

/// Human-readable acknowledgment for a committed mutation
fn receipt_message(mutation: &LedgerMutation, receipt: &MutationReceipt) -> String {
    match mutation {
        LedgerMutation::PointsDelta(delta) => {
            let applied = if *delta >= 0 {
                format!("+{delta}")
            } else {
                delta.to_string()
            };
            let mut msg = format!("Applied {applied} points.");
            if let Some(points) = receipt.points {
                msg.push_str(&format!(" New total: {points}."));
            }
            msg
        }
        LedgerMutation::GrantStrip { strip_number } => {
            if receipt.is_complete == Some(true) {
                match receipt.reward_title.as_deref() {
                    Some(title) => format!("Collection complete! {title} unlocked."),
                    None => "Collection complete! Reward unlocked.".to_string(),
                }
            } else {
                match (receipt.strips_collected, receipt.strips_required) {
                    (Some(collected), Some(required)) => {
                        format!("Strip {strip_number} collected ({collected}/{required}).")
                    }
                    _ => format!("Strip {strip_number} collected."),
                }
            }
        }
        LedgerMutation::ResetStrips { redeemed } => {
            if *redeemed {
                "Reward redeemed and collection reset.".to_string()
            } else {
                "Collection reset.".to_string()
            }
        }
    }
}
