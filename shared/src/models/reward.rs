//! Reward Structure Models
//!
//! Derived from a member's card design at resolution time, never
//! persisted independently.

use serde::{Deserialize, Serialize};

/// One threshold/reward pair of a multi-tier program
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardTier {
    pub title: String,
    pub description: Option<String>,
    /// Strictly positive strips needed to clear this tier
    pub strips_required: i32,
}

/// Reward structure applying to a strips card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RewardStructure {
    /// One fixed target and one reward
    Single {
        required: i32,
        title: String,
        description: Option<String>,
    },
    /// Ordered tier list, each with its own reward
    MultiTier { tiers: Vec<RewardTier> },
}

impl RewardStructure {
    /// Total strips required to complete the whole collection
    ///
    /// MultiTier: sum of per-tier thresholds.
    pub fn total_required(&self) -> i32 {
        match self {
            RewardStructure::Single { required, .. } => *required,
            RewardStructure::MultiTier { tiers } => {
                tiers.iter().map(|t| t.strips_required).sum()
            }
        }
    }

    /// Reward title of the tier at `index` (Single ignores the index)
    pub fn tier_title(&self, index: usize) -> Option<&str> {
        match self {
            RewardStructure::Single { title, .. } => Some(title.as_str()),
            RewardStructure::MultiTier { tiers } => {
                tiers.get(index).map(|t| t.title.as_str())
            }
        }
    }
}
