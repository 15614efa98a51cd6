//! Identifier Normalizer
//!
//! Turns an arbitrary decoded scan payload (a bare UUID, a wallet URL
//! carrying a UUID, or an opaque legacy serial) into a canonical member
//! identifier. Never fails: a payload with no extractable UUID passes
//! through unchanged, classified as legacy.

use std::sync::LazyLock;

use regex::Regex;

/// UUID v4 textual grammar: 8-4-4-4-12 hex groups, version nibble 4,
/// variant nibble in {8,9,a,b}
const UUID_V4_PATTERN: &str =
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-4[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}";

static UUID_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{UUID_V4_PATTERN}$")).expect("static regex"));

static UUID_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{UUID_V4_PATTERN}")).expect("static regex"));

static UUID_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(UUID_V4_PATTERN).expect("static regex"));

/// Path segment marker of member-card URLs
const WALLET_MARKER: &str = "/wallet/";

/// How the canonical identifier was obtained from the scanned payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// The whole payload is a UUID
    Direct,
    /// A UUID was extracted from a URL-shaped payload
    Extracted,
    /// No UUID found; the raw payload is treated as an opaque legacy
    /// serial and routed to the Apple-style code path first
    Legacy,
}

/// Canonical member identifier plus its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalIdentifier {
    pub value: String,
    pub kind: IdentifierKind,
}

impl CanonicalIdentifier {
    /// Legacy serials are lower-confidence lookups
    pub fn is_legacy(&self) -> bool {
        self.kind == IdentifierKind::Legacy
    }
}

/// Whether a string matches the UUID v4 textual grammar exactly
pub fn is_uuid(value: &str) -> bool {
    UUID_EXACT.is_match(value)
}

/// Normalize a decoded scan payload to a canonical identifier
///
/// Strategies apply in strict order, stopping at the first match:
/// 1. whole payload is a UUID
/// 2. payload looks like a URL (or carries the `/wallet/` marker) and a
///    UUID can be pulled out of it
/// 3. a UUID-shaped substring exists anywhere in the payload
/// 4. the payload passes through as an opaque legacy serial
pub fn normalize(payload: &str) -> CanonicalIdentifier {
    let trimmed = payload.trim();

    if is_uuid(trimmed) {
        return CanonicalIdentifier {
            value: trimmed.to_string(),
            kind: IdentifierKind::Direct,
        };
    }

    if trimmed.contains(WALLET_MARKER) || reqwest::Url::parse(trimmed).is_ok() {
        if let Some(uuid) = extract_from_url_like(trimmed) {
            return CanonicalIdentifier {
                value: uuid,
                kind: IdentifierKind::Extracted,
            };
        }
    }

    if let Some(m) = UUID_ANY.find(trimmed) {
        return CanonicalIdentifier {
            value: m.as_str().to_string(),
            kind: IdentifierKind::Extracted,
        };
    }

    tracing::debug!(payload = %trimmed, "no UUID in payload, treating as legacy serial");
    CanonicalIdentifier {
        value: trimmed.to_string(),
        kind: IdentifierKind::Legacy,
    }
}

/// Pull a UUID out of a URL-shaped payload
///
/// Sub-strategies, first hit wins:
/// (a) direct match immediately after the `/wallet/` marker
/// (b) each path segment of a parsed URL
/// (c) each slash-delimited segment with a leading scheme stripped
/// (d) catch-all search across the whole payload
fn extract_from_url_like(payload: &str) -> Option<String> {
    if let Some(pos) = payload.find(WALLET_MARKER) {
        let rest = &payload[pos + WALLET_MARKER.len()..];
        if let Some(m) = UUID_HEAD.find(rest) {
            return Some(m.as_str().to_string());
        }
    }

    if let Ok(url) = reqwest::Url::parse(payload) {
        for segment in url.path_segments().into_iter().flatten() {
            if is_uuid(segment) {
                return Some(segment.to_string());
            }
        }
    }

    let without_scheme = payload
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(payload);
    for segment in without_scheme.split('/') {
        if is_uuid(segment) {
            return Some(segment.to_string());
        }
    }

    UUID_ANY.find(payload).map(|m| m.as_str().to_string())
}
