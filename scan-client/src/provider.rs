//! Wallet provider clients
//!
//! One client per backend wallet integration. Provider A (Apple-style)
//! addresses the pass by path segment on the directory API host;
//! Provider B (PWA-style) embeds the serial in the body on its own host.
//!
//! Both backends answer with loosely-typed JSON. Success is decided by an
//! explicit classification function per response shape: an explicit
//! truthy `ok` flag OR a numeric field characteristic of the mutation.
//! Anything else is an ambiguous response, which the adapter treats like
//! a transport failure.

use async_trait::async_trait;
use shared::client::{
    MutationReceipt, PointsDeltaBody, PointsResponse, PwaPointsResponse, PwaResetResponse,
    PwaStripResponse, ResetResponse, StripGrantBody, StripResetBody, StripResponse,
};
use shared::models::WalletProvider;
use tracing::debug;

use crate::engine::LedgerMutation;
use crate::http::HttpClient;
use crate::{ScanError, ScanResult};

/// Seam between the adapter and a concrete provider integration
///
/// Lets the fallback combinator run over an ordered attempt list and
/// lets tests substitute scripted backends.
#[async_trait]
pub trait WalletBackend: Send + Sync {
    fn provider(&self) -> WalletProvider;

    /// Commit a validated mutation against this provider
    async fn commit(&self, serial: &str, mutation: &LedgerMutation) -> ScanResult<MutationReceipt>;
}

// =============================================================================
// Provider A: Apple-style pass endpoints
// =============================================================================

/// Provider A client (legacy/primary, Apple-style pass endpoints)
#[derive(Debug, Clone)]
pub struct AppleWalletClient {
    http: HttpClient,
}

impl AppleWalletClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn update_points(&self, serial: &str, delta: i64) -> ScanResult<MutationReceipt> {
        let path = format!("/wallets/internal/passes/{}/points", encode_segment(serial));
        let body = PointsDeltaBody {
            serial: None,
            delta,
        };
        debug!(%serial, delta, "apple: update points");
        let resp: PointsResponse = self.http.post(&path, &body).await?;
        classify_points(resp.ok, resp.points, None, resp.message, "apple")
    }

    pub async fn update_strips(&self, serial: &str, strip_number: i32) -> ScanResult<MutationReceipt> {
        let path = format!("/wallets/internal/passes/{}/strips", encode_segment(serial));
        let body = StripGrantBody {
            serial: None,
            strip_number,
        };
        debug!(%serial, strip_number, "apple: grant strip");
        let resp: StripResponse = match self.http.post(&path, &body).await {
            // The pass backend answers 409 when the collection is already
            // complete; that routes the caller to the reset/redeem flow.
            Err(ScanError::Provider { status: 409, .. }) => {
                return Err(ScanError::CompletionConflict);
            }
            other => other?,
        };
        classify_strips(
            resp.ok,
            resp.strips_collected,
            resp.strips_required,
            resp.is_complete,
            resp.reward_title,
            resp.message.or(resp.error),
            "apple",
        )
    }

    pub async fn reset_strips(&self, serial: &str, redeemed: bool) -> ScanResult<MutationReceipt> {
        let path = format!(
            "/wallets/internal/passes/{}/reset-strips",
            encode_segment(serial)
        );
        let body = StripResetBody {
            serial: None,
            redeemed,
        };
        debug!(%serial, redeemed, "apple: reset strips");
        let resp: ResetResponse = self.http.post(&path, &body).await?;
        classify_strips(
            resp.ok,
            resp.strips_collected,
            resp.strips_required,
            resp.is_complete,
            resp.reward_title,
            resp.message,
            "apple",
        )
    }
}

#[async_trait]
impl WalletBackend for AppleWalletClient {
    fn provider(&self) -> WalletProvider {
        WalletProvider::Apple
    }

    async fn commit(&self, serial: &str, mutation: &LedgerMutation) -> ScanResult<MutationReceipt> {
        match mutation {
            LedgerMutation::PointsDelta(delta) => self.update_points(serial, *delta).await,
            LedgerMutation::GrantStrip { strip_number } => {
                self.update_strips(serial, *strip_number).await
            }
            LedgerMutation::ResetStrips { redeemed } => {
                self.reset_strips(serial, *redeemed).await
            }
        }
    }
}

// =============================================================================
// Provider B: PWA wallet endpoints
// =============================================================================

/// Provider B client (secondary, PWA-style endpoints)
#[derive(Debug, Clone)]
pub struct PwaWalletClient {
    http: HttpClient,
}

impl PwaWalletClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn update_points(&self, serial: &str, delta: i64) -> ScanResult<MutationReceipt> {
        let body = PointsDeltaBody {
            serial: Some(serial.to_string()),
            delta,
        };
        debug!(%serial, delta, "pwa: update points");
        let resp: PwaPointsResponse = self.http.post("/wallet/update-points", &body).await?;
        classify_points(resp.ok, resp.points, resp.previous_points, None, "pwa")
    }

    pub async fn add_stamp(&self, serial: &str, strip_number: i32) -> ScanResult<MutationReceipt> {
        let body = StripGrantBody {
            serial: Some(serial.to_string()),
            strip_number,
        };
        debug!(%serial, strip_number, "pwa: add stamp");
        let resp: PwaStripResponse = match self.http.post("/wallet/add-stamp", &body).await {
            Err(ScanError::Provider { status: 409, .. }) => {
                return Err(ScanError::CompletionConflict);
            }
            other => other?,
        };
        classify_strips(
            resp.ok,
            resp.strips_collected,
            resp.strips_required,
            resp.is_complete,
            resp.reward_title,
            None,
            "pwa",
        )
    }

    pub async fn reset_strips(&self, serial: &str, redeemed: bool) -> ScanResult<MutationReceipt> {
        let body = StripResetBody {
            serial: Some(serial.to_string()),
            redeemed,
        };
        debug!(%serial, redeemed, "pwa: reset strips");
        let resp: PwaResetResponse = self.http.post("/wallet/reset-strips", &body).await?;
        // The PWA reset body carries no counters; the explicit flag is
        // the only success signal.
        if resp.ok.unwrap_or(false) {
            Ok(MutationReceipt {
                message: resp.message,
                ..Default::default()
            })
        } else {
            Err(ScanError::AmbiguousResponse(
                "pwa reset response carried no success signal".to_string(),
            ))
        }
    }
}

#[async_trait]
impl WalletBackend for PwaWalletClient {
    fn provider(&self) -> WalletProvider {
        WalletProvider::Pwa
    }

    async fn commit(&self, serial: &str, mutation: &LedgerMutation) -> ScanResult<MutationReceipt> {
        match mutation {
            LedgerMutation::PointsDelta(delta) => self.update_points(serial, *delta).await,
            LedgerMutation::GrantStrip { strip_number } => {
                self.add_stamp(serial, *strip_number).await
            }
            LedgerMutation::ResetStrips { redeemed } => {
                self.reset_strips(serial, *redeemed).await
            }
        }
    }
}

// =============================================================================
// Response classification
// =============================================================================

/// Classify a points-mutation response
fn classify_points(
    ok: Option<bool>,
    points: Option<i64>,
    previous_points: Option<i64>,
    message: Option<String>,
    provider: &str,
) -> ScanResult<MutationReceipt> {
    if ok.unwrap_or(false) || points.is_some() {
        Ok(MutationReceipt {
            points,
            previous_points,
            message,
            ..Default::default()
        })
    } else {
        Err(ScanError::AmbiguousResponse(format!(
            "{provider} points response carried no success signal"
        )))
    }
}

/// Classify a strip-mutation (grant or reset) response
fn classify_strips(
    ok: Option<bool>,
    strips_collected: Option<i32>,
    strips_required: Option<i32>,
    is_complete: Option<bool>,
    reward_title: Option<String>,
    message: Option<String>,
    provider: &str,
) -> ScanResult<MutationReceipt> {
    if ok.unwrap_or(false) || strips_collected.is_some() {
        Ok(MutationReceipt {
            strips_collected,
            strips_required,
            is_complete,
            reward_title,
            message,
            ..Default::default()
        })
    } else {
        Err(ScanError::AmbiguousResponse(format!(
            "{provider} strips response carried no success signal"
        )))
    }
}

/// Percent-encode a path segment
///
/// Legacy pass serials can contain `.` and `/`; a raw `/` would split
/// the path.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_points_explicit_ok() {
        let receipt = classify_points(Some(true), None, None, None, "apple").unwrap();
        assert_eq!(receipt.points, None);
    }

    #[test]
    fn test_classify_points_numeric_field_without_ok() {
        // Backend sends points but the type never declared ok
        let receipt = classify_points(None, Some(130), None, None, "pwa").unwrap();
        assert_eq!(receipt.points, Some(130));
    }

    #[test]
    fn test_classify_points_no_signal_is_ambiguous() {
        let err = classify_points(None, None, None, Some("hola".into()), "apple").unwrap_err();
        assert!(matches!(err, ScanError::AmbiguousResponse(_)));
        assert!(err.triggers_fallback());
    }

    #[test]
    fn test_classify_points_explicit_false_without_numeric_is_ambiguous() {
        let err = classify_points(Some(false), None, None, None, "pwa").unwrap_err();
        assert!(matches!(err, ScanError::AmbiguousResponse(_)));
    }

    #[test]
    fn test_classify_strips_counter_is_success_signal() {
        let receipt =
            classify_strips(None, Some(5), Some(8), Some(false), None, None, "apple").unwrap();
        assert_eq!(receipt.strips_collected, Some(5));
        assert_eq!(receipt.is_complete, Some(false));
    }

    #[test]
    fn test_classify_strips_no_signal_is_ambiguous() {
        let err = classify_strips(None, None, None, None, None, None, "pwa").unwrap_err();
        assert!(matches!(err, ScanError::AmbiguousResponse(_)));
    }

    #[test]
    fn test_encode_segment_passthrough_for_plain_serials() {
        assert_eq!(
            encode_segment("3f2c1a9e-8b7d-4c6e-9f0a-1b2c3d4e5f6a"),
            "3f2c1a9e-8b7d-4c6e-9f0a-1b2c3d4e5f6a"
        );
        assert_eq!(encode_segment("pass.com.acme.loyalty.XK29"), "pass.com.acme.loyalty.XK29");
    }

    #[test]
    fn test_encode_segment_escapes_slash_and_space() {
        assert_eq!(encode_segment("pass.mx/abc def"), "pass.mx%2Fabc%20def");
    }
}
