//! NSE index quotes provider.
//!
//! The JSON endpoint rejects requests that do not carry the cookies set by the
//! landing page, so every fetch is a two-step session: GET the home page with
//! a browser-like header set, then GET the API with the same cookie jar.
//!
//! Payload shape: `{"data": [{"symbol": ..., "open": ..., "dayHigh": ...,
//! "dayLow": ..., "lastPrice": ..., "previousClose": ..., "pChange": ...}]}`.

use super::frame::{FieldMap, QuoteFrame, RawRecord};
use super::provider::{DataError, MarketSource};
use crate::config::NseConfig;
use crate::domain::{MoverTables, SourceId};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, REFERER, USER_AGENT};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct IndexResponse {
    #[serde(default)]
    data: Vec<RawRecord>,
}

/// NSE equity-stockIndices provider.
pub struct NseProvider {
    config: NseConfig,
}

impl NseProvider {
    pub fn new(config: NseConfig) -> Self {
        Self { config }
    }

    fn headers(&self) -> Result<HeaderMap, DataError> {
        let value = |v: &str| {
            HeaderValue::from_str(v).map_err(|e| DataError::ClientSetup(format!("header: {e}")))
        };
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value(&self.config.user_agent)?);
        headers.insert(ACCEPT, value(&self.config.accept)?);
        headers.insert(REFERER, value(&self.config.home_url)?);
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        Ok(headers)
    }

    /// A fresh cookie-storing session. One per fetch; nothing is shared
    /// between dashboard requests.
    fn session(&self) -> Result<reqwest::blocking::Client, DataError> {
        reqwest::blocking::Client::builder()
            .cookie_store(true)
            .default_headers(self.headers()?)
            .timeout(self.config.timeout())
            .build()
            .map_err(|e| DataError::ClientSetup(e.to_string()))
    }

    /// Warm up the session, then fetch the index rows.
    pub fn fetch_records(&self) -> Result<Vec<RawRecord>, DataError> {
        let session = self.session()?;

        // Only the cookies matter here; the landing page status is not checked.
        session
            .get(&self.config.home_url)
            .send()
            .map_err(DataError::from_transport)?;

        let resp = session
            .get(&self.config.api_url)
            .send()
            .map_err(DataError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: self.config.api_url.clone(),
            });
        }

        let body = resp.text().map_err(DataError::from_transport)?;
        parse_payload(&body)
    }
}

/// Decode an index payload. A missing or empty `data` array is an error.
pub fn parse_payload(body: &str) -> Result<Vec<RawRecord>, DataError> {
    let payload: IndexResponse = serde_json::from_str(body)
        .map_err(|e| DataError::MalformedPayload(format!("NSE response: {e}")))?;
    if payload.data.is_empty() {
        return Err(DataError::EmptyPayload("NSE".into()));
    }
    Ok(payload.data)
}

impl MarketSource for NseProvider {
    fn id(&self) -> SourceId {
        SourceId::Nse
    }

    fn fetch_movers(&self) -> Result<MoverTables, DataError> {
        let records = self.fetch_records()?;
        tracing::debug!(rows = records.len(), "NSE index rows fetched");
        QuoteFrame::from_records(&records, &FieldMap::NSE)?.movers()
    }
}
