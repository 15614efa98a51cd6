//! Reward Structure Resolver
//!
//! Pure functions deciding which reward structure applies to a member's
//! card and where the member stands in it. No I/O here; the session
//! feeds in a freshly fetched record.

use shared::models::{CardType, MemberRecord, RewardStructure, RewardTier};

/// Program classification of a member's card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardProgram {
    /// Accumulating point balance, no strip structure
    Points,
    /// Punch-card collection with the resolved reward structure
    Strips(RewardStructure),
}

impl CardProgram {
    pub fn is_strips(&self) -> bool {
        matches!(self, CardProgram::Strips(_))
    }
}

/// Resolve the reward structure applying to a member
///
/// A member is a strips card iff the directory's `card_type` says so.
/// For strips cards, a non-empty ordered tier list in the attached design
/// implies multi-tier; otherwise single with the configured total and
/// reward title, falling back to the member record's own fields when the
/// design is not expanded.
pub fn resolve(member: &MemberRecord) -> CardProgram {
    if member.card_type != CardType::Strips {
        return CardProgram::Points;
    }

    let strips_cfg = member.design.as_ref().and_then(|d| d.strips.as_ref());

    if let Some(cfg) = strips_cfg
        && let Some(tiers) = cfg.rewards.as_ref().filter(|r| !r.is_empty())
    {
        let tiers = tiers
            .iter()
            .map(|t| RewardTier {
                title: t.title.clone(),
                description: t.description.clone(),
                strips_required: t.strips_required,
            })
            .collect();
        return CardProgram::Strips(RewardStructure::MultiTier { tiers });
    }

    let required = strips_cfg
        .and_then(|c| c.total)
        .unwrap_or(member.strips_required);
    let title = strips_cfg
        .and_then(|c| c.reward_title.clone())
        .or_else(|| member.reward_title.clone())
        .unwrap_or_default();
    let description = strips_cfg
        .and_then(|c| c.reward_description.clone())
        .or_else(|| member.reward_description.clone());

    CardProgram::Strips(RewardStructure::Single {
        required,
        title,
        description,
    })
}

/// Number of the next strip to grant: `min(collected + 1, required)`
pub fn next_strip(collected: i32, required: i32) -> i32 {
    (collected + 1).min(required.max(1))
}

/// Whether the collection is complete, which unlocks the reward
pub fn is_complete(collected: i32, required: i32) -> bool {
    collected >= required
}

/// Current tier of a reward structure (0-based)
///
/// The first tier whose cumulative threshold exceeds the collected count.
/// Saturates at the last tier once every threshold is met.
pub fn current_tier_index(structure: &RewardStructure, collected: i32) -> usize {
    match structure {
        RewardStructure::Single { .. } => 0,
        RewardStructure::MultiTier { tiers } => {
            let mut cumulative = 0;
            for (i, tier) in tiers.iter().enumerate() {
                cumulative += tier.strips_required;
                if collected < cumulative {
                    return i;
                }
            }
            tiers.len().saturating_sub(1)
        }
    }
}
