//! Member Directory Lookup
//!
//! Resolves a canonical identifier, or a free-text search term, to
//! member records. Search results are never trusted as mutation inputs:
//! after any selection the authoritative record is re-fetched by serial.

use shared::client::{LookupRequest, SearchRequest};
use shared::models::MemberRecord;
use tracing::debug;

use crate::http::HttpClient;
use crate::normalize::is_uuid;
use crate::{ScanError, ScanResult};

/// Search key chosen by the shape of a free-text term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKey {
    /// Term matches the UUID grammar
    Serial(String),
    /// Term contains `@`
    Email(String),
    /// Everything else
    Phone(String),
}

impl SearchKey {
    /// Classify a search term by shape
    pub fn classify(term: &str) -> SearchKey {
        let term = term.trim();
        if is_uuid(term) {
            SearchKey::Serial(term.to_string())
        } else if term.contains('@') {
            SearchKey::Email(term.to_string())
        } else {
            SearchKey::Phone(term.to_string())
        }
    }

    fn into_request(self) -> SearchRequest {
        match self {
            SearchKey::Serial(serial) => SearchRequest {
                serial: Some(serial),
                ..Default::default()
            },
            SearchKey::Email(email) => SearchRequest {
                email: Some(email),
                ..Default::default()
            },
            SearchKey::Phone(phone) => SearchRequest {
                phone: Some(phone),
                ..Default::default()
            },
        }
    }
}

/// Outcome of a directory search
///
/// Exactly one match auto-selects; multiple matches are surfaced for
/// explicit selection; zero matches is an empty result, not an error.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    None,
    One(MemberRecord),
    Many(Vec<MemberRecord>),
}

/// Directory API client
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: HttpClient,
}

impl DirectoryClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch the authoritative record for a serial
    ///
    /// A 404 becomes `ScanError::NotFound`, an empty state the console
    /// renders as "no member", not a failure.
    pub async fn lookup_by_serial(&self, serial: &str) -> ScanResult<MemberRecord> {
        debug!(%serial, "directory lookup");
        let req = LookupRequest {
            serial: serial.to_string(),
        };
        match self.http.post::<MemberRecord, _>("/users/getbyserial", &req).await {
            Err(ScanError::Provider { status: 404, message }) => {
                Err(ScanError::NotFound(message))
            }
            other => other,
        }
    }

    /// Search by free text, routing on the term's shape
    pub async fn search(&self, term: &str) -> ScanResult<SearchOutcome> {
        let key = SearchKey::classify(term);
        debug!(?key, "directory search");
        let req = key.into_request();

        let records: Vec<MemberRecord> =
            match self.http.post("/users/search", &req).await {
                Err(ScanError::Provider { status: 404, .. }) => Vec::new(),
                other => other?,
            };

        Ok(match records.len() {
            0 => SearchOutcome::None,
            1 => SearchOutcome::One(records.into_iter().next().expect("len checked")),
            _ => SearchOutcome::Many(records),
        })
    }
}
