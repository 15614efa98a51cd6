//! Ledger Mutation Engine: mutation types and local validation
//!
//! A mutation is validated against the freshly fetched member record
//! before anything touches the network; invariant violations are
//! rejected here with zero provider calls.

use shared::models::MemberRecord;

use crate::{ScanError, ScanResult};

/// Requested ledger mutation for one member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerMutation {
    /// Credit (positive) or debit (negative) the point balance
    PointsDelta(i64),
    /// Grant the numbered strip of the collection
    GrantStrip { strip_number: i32 },
    /// Reset a completed collection; `redeemed` records whether the
    /// reward was handed out
    ResetStrips { redeemed: bool },
}

/// Mutation kind, for status reporting and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Points,
    Strip,
    Reset,
}

impl LedgerMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            LedgerMutation::PointsDelta(_) => MutationKind::Points,
            LedgerMutation::GrantStrip { .. } => MutationKind::Strip,
            LedgerMutation::ResetStrips { .. } => MutationKind::Reset,
        }
    }
}

/// Validate a mutation against current member state, locally
///
/// - a debit larger than the balance is rejected without contacting the
///   backend
/// - a strip grant on an unlocked collection is rejected; the caller
///   must offer reset-with-redemption or reset-without instead
/// - a reset is always forwarded (the backend owns the final decision)
pub fn validate(mutation: &LedgerMutation, member: &MemberRecord) -> ScanResult<()> {
    match mutation {
        LedgerMutation::PointsDelta(delta) => {
            // Compared in the unsigned domain: `unsigned_abs() as i64`
            // wraps negative for i64::MIN and would let an extreme debit
            // through.
            if *delta < 0 && delta.unsigned_abs() > member.points.max(0) as u64 {
                return Err(ScanError::InsufficientBalance {
                    requested: delta.unsigned_abs(),
                    available: member.points,
                });
            }
            Ok(())
        }
        LedgerMutation::GrantStrip { strip_number } => {
            if *strip_number < 1 {
                return Err(ScanError::Validation(format!(
                    "strip number must be positive, got {strip_number}"
                )));
            }
            if member.reward_unlocked {
                return Err(ScanError::CollectionComplete);
            }
            Ok(())
        }
        LedgerMutation::ResetStrips { .. } => Ok(()),
    }
}
