//! Wire DTOs shared between the scan engine and the backend APIs
//!
//! Request/response shapes of the directory endpoints and the two
//! wallet-provider integrations. Provider bodies are loosely typed
//! (every field optional) because neither backend guarantees a stable
//! success envelope; the engine classifies them explicitly.

use serde::{Deserialize, Serialize};

// =============================================================================
// Directory API DTOs
// =============================================================================

/// Body of `POST /users/getbyserial`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub serial: String,
}

/// Body of `POST /users/search`
///
/// Exactly one key is set, chosen by the shape of the search term.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Mutation request bodies
// =============================================================================

/// Points mutation body (Provider A path-addressed, Provider B embeds serial)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsDeltaBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    pub delta: i64,
}

/// Strip grant body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripGrantBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(rename = "stripNumber")]
    pub strip_number: i32,
}

/// Strip collection reset body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripResetBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    pub redeemed: bool,
}

// =============================================================================
// Provider A (Apple-style) response DTOs
// =============================================================================

/// `POST /wallets/internal/passes/{serial}/points` response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PointsResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /wallets/internal/passes/{serial}/strips` response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub strips_collected: Option<i32>,
    #[serde(default)]
    pub strips_required: Option<i32>,
    #[serde(default)]
    pub strip_number: Option<i32>,
    #[serde(default, rename = "isComplete")]
    pub is_complete: Option<bool>,
    #[serde(default)]
    pub reward_title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /wallets/internal/passes/{serial}/reset-strips` response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResetResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub strips_collected: Option<i32>,
    #[serde(default)]
    pub strips_required: Option<i32>,
    #[serde(default, rename = "isComplete")]
    pub is_complete: Option<bool>,
    #[serde(default)]
    pub reward_title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Provider B (PWA-style) response DTOs
// =============================================================================

/// `POST /wallet/update-points` response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PwaPointsResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub previous_points: Option<i64>,
}

/// `POST /wallet/add-stamp` response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PwaStripResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub strips_collected: Option<i32>,
    #[serde(default)]
    pub strips_required: Option<i32>,
    #[serde(default)]
    pub reward_title: Option<String>,
    #[serde(default, rename = "isComplete")]
    pub is_complete: Option<bool>,
}

/// `POST /wallet/reset-strips` response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PwaResetResponse {
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Normalized mutation receipt
// =============================================================================

/// Normalized success payload of a committed mutation
///
/// Produced only by the per-provider classification functions; a receipt
/// existing at all means the provider signalled success. Fields are used
/// for immediate UI feedback; the authoritative state comes from the
/// post-mutation directory re-fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReceipt {
    pub points: Option<i64>,
    pub previous_points: Option<i64>,
    pub strips_collected: Option<i32>,
    pub strips_required: Option<i32>,
    pub is_complete: Option<bool>,
    pub reward_title: Option<String>,
    pub message: Option<String>,
}
