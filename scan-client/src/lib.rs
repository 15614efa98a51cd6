//! Scanned-code resolution and dual-backend ledger client
//!
//! Turns raw scanner payloads into canonical card serials, resolves the
//! member behind a serial, and commits point/strip mutations against
//! whichever wallet backend owns the card, with ordered fallback when
//! ownership is unknown.

pub mod adapter;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod http;
pub mod normalize;
pub mod provider;
pub mod reward;
pub mod session;

pub use adapter::WalletAdapter;
pub use config::ScanConfig;
pub use directory::{DirectoryClient, SearchKey, SearchOutcome};
pub use engine::{LedgerMutation, MutationKind};
pub use error::{ScanError, ScanResult};
pub use normalize::{normalize, CanonicalIdentifier, IdentifierKind};
pub use provider::{AppleWalletClient, PwaWalletClient, WalletBackend};
pub use reward::CardProgram;
pub use session::{ApplyOutcome, ScanSession, SessionStatus};
