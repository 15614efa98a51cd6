//! Dual-Backend Wallet Adapter
//!
//! Routes a validated mutation to the provider that owns the member's
//! card. An explicit preference (asserted by the directory) pins the
//! provider; a failure there surfaces directly. With no preference the
//! adapter walks an ordered attempt list, Apple-style first, carrying
//! the last error forward; the second provider's error is authoritative
//! when both fail.
//!
//! Fallback re-issues the same mutation against the second backend, so
//! the two backends are assumed to hold disjoint membership records (a
//! card is registered with exactly one provider). No compensating
//! transactions are attempted.

use shared::client::MutationReceipt;
use shared::models::WalletProvider;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::engine::LedgerMutation;
use crate::http::HttpClient;
use crate::provider::{AppleWalletClient, PwaWalletClient, WalletBackend};
use crate::{ScanError, ScanResult};

/// Ordered-attempt fallback combinator
///
/// Runs each backend strictly in sequence (an attempt starts only after
/// the previous one failed), stopping at the first success. Errors that
/// assert record ownership (completion conflict, local validation) stop
/// the chain immediately.
pub async fn apply_with_fallback(
    backends: &[&dyn WalletBackend],
    serial: &str,
    mutation: &LedgerMutation,
) -> ScanResult<MutationReceipt> {
    let mut last_error = ScanError::Internal("no wallet backend configured".to_string());

    for (i, backend) in backends.iter().enumerate() {
        let provider = backend.provider();
        debug!(?provider, attempt = i, %serial, "attempting wallet mutation");

        match backend.commit(serial, mutation).await {
            Ok(receipt) => {
                if i > 0 {
                    info!(?provider, %serial, "fallback provider succeeded");
                }
                return Ok(receipt);
            }
            Err(err) if err.triggers_fallback() => {
                warn!(?provider, %serial, error = %err, "provider attempt failed");
                last_error = err;
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_error)
}

/// Wallet adapter over both provider integrations
pub struct WalletAdapter {
    apple: AppleWalletClient,
    pwa: PwaWalletClient,
}

impl WalletAdapter {
    /// Build both provider clients from the engine configuration
    ///
    /// Provider A shares the directory API host; Provider B uses the
    /// wallet host. Each attempt is bounded by the configured timeout.
    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        let apple_http =
            HttpClient::new(&config.api_base_url, config.timeout, config.token.clone())?;
        let pwa_http =
            HttpClient::new(&config.wallet_base_url, config.timeout, config.token.clone())?;
        Ok(Self {
            apple: AppleWalletClient::new(apple_http),
            pwa: PwaWalletClient::new(pwa_http),
        })
    }

    pub fn from_parts(apple: AppleWalletClient, pwa: PwaWalletClient) -> Self {
        Self { apple, pwa }
    }

    /// Execute a validated mutation against the owning provider
    pub async fn apply(
        &self,
        serial: &str,
        mutation: &LedgerMutation,
        preference: Option<WalletProvider>,
    ) -> ScanResult<MutationReceipt> {
        match preference {
            Some(WalletProvider::Apple) => {
                debug!(%serial, "explicit apple preference, no fallback");
                self.apple.commit(serial, mutation).await
            }
            Some(WalletProvider::Pwa) => {
                debug!(%serial, "explicit pwa preference, no fallback");
                self.pwa.commit(serial, mutation).await
            }
            None => {
                debug!(%serial, "no provider preference, trying apple then pwa");
                apply_with_fallback(&[&self.apple, &self.pwa], serial, mutation).await
            }
        }
    }
}
