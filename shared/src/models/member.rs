//! Member & Card Design Models

use serde::{Deserialize, Serialize};

/// Card family a member is enrolled in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Accumulating point balance
    #[default]
    Points,
    /// Punch-card style strip collection
    Strips,
}

/// Backend wallet integration that issued a member's card
///
/// Absent on the wire means the issuing provider is unknown and the
/// adapter falls back Apple-first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalletProvider {
    Apple,
    Pwa,
}

/// Member record as returned by the directory API
///
/// Fetched fresh on every lookup and after every mutation; never cached
/// beyond a single scan session. Local copies are optimistic previews
/// only, discarded on the next fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub serial_number: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub strips_collected: i32,
    #[serde(default)]
    pub strips_required: i32,
    #[serde(default)]
    pub reward_title: Option<String>,
    #[serde(default)]
    pub reward_description: Option<String>,
    #[serde(default)]
    pub reward_unlocked: bool,
    #[serde(default)]
    pub wallet_type: Option<WalletProvider>,
    /// Card design configuration attached to the member's card, when the
    /// directory expands it (`design_json` of the card detail)
    #[serde(default)]
    pub design: Option<CardDesign>,
}

/// Card design configuration (`design_json`)
///
/// The design JSON is authored by the business owner in the console,
/// hence camelCase field names on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CardDesign {
    #[serde(default, rename = "cardType")]
    pub card_type: Option<CardType>,
    #[serde(default)]
    pub strips: Option<StripsConfig>,
}

/// Strips program configuration inside a card design
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripsConfig {
    /// Total strips to complete the collection (single-tier programs)
    #[serde(default)]
    pub total: Option<i32>,
    #[serde(default, rename = "rewardTitle")]
    pub reward_title: Option<String>,
    #[serde(default, rename = "rewardDescription")]
    pub reward_description: Option<String>,
    /// Ordered tier list; non-empty means the program is multi-tier
    #[serde(default)]
    pub rewards: Option<Vec<TierConfig>>,
}

/// One tier of a multi-tier strips program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "stripsRequired")]
    pub strips_required: i32,
}
