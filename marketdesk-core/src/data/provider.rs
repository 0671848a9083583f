//! Market source trait and structured error types.
//!
//! The MarketSource trait abstracts over the external movers providers (NSE
//! index quotes, BSE top movers) so the dashboard can treat them uniformly and
//! tests can swap in stubs.

use crate::domain::{MoverTables, SourceId};
use thiserror::Error;

/// Structured error types for market-data fetches.
///
/// Every variant is displayable as the detail part of a placeholder row.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("no data from {0}")]
    EmptyPayload(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("frame error: {0}")]
    Frame(String),

    #[error("scrip code table unavailable: {0}")]
    ScripCodes(String),

    #[error("http client setup failed: {0}")]
    ClientSetup(String),
}

impl DataError {
    /// Classify a transport error from reqwest.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if err.is_decode() {
            DataError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            DataError::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            DataError::NetworkUnreachable(err.to_string())
        }
    }
}

/// An external source of ranked gainers and losers.
pub trait MarketSource: Send + Sync {
    /// Which source this is.
    fn id(&self) -> SourceId;

    /// Fetch and rank gainers and losers. Blocking.
    fn fetch_movers(&self) -> Result<MoverTables, DataError>;

    /// Fetch, converting any failure into a placeholder row in both tables.
    fn movers_or_placeholder(&self) -> MoverTables {
        match self.fetch_movers() {
            Ok(movers) => movers,
            Err(err) => {
                tracing::warn!(source = %self.id(), error = %err, "market source failed");
                MoverTables::placeholder(placeholder_message(self.id(), &err))
            }
        }
    }
}

/// Text carried in the symbol column of a placeholder row.
pub fn placeholder_message(source: SourceId, err: &DataError) -> String {
    format!("{source} API Error: {err}")
}
