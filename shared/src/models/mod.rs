//! Domain models

pub mod member;
pub mod reward;

pub use member::{CardDesign, CardType, MemberRecord, StripsConfig, TierConfig, WalletProvider};
pub use reward::{RewardStructure, RewardTier};
