//! BSE top movers client.
//!
//! BSE publishes pre-ranked gainer and loser lists keyed by numeric scrip
//! codes. The client keeps a scrip code table (code -> security id) so rows
//! can be shown by ticker; with `update_codes` enabled the table is downloaded
//! on first use and again once it is older than `code_refresh_secs`.
//!
//! Movers payload: `{"Table": [{"scrip_cd": 500325, "scripname": ..., "openrate": ...,
//! "highrate": ..., "lowrate": ..., "ltradert": ..., "prevdayclose": ...,
//! "change_percent": ...}]}`.
//! Scrip list payload: `[{"SCRIP_CD": "500325", "scrip_id": "RELIANCE", ...}]`.

use super::frame::{FieldMap, QuoteFrame, RawRecord};
use super::provider::{DataError, MarketSource};
use crate::config::BseConfig;
use crate::domain::{Direction, MoverTables, RankedTable, SourceId, MAX_TABLE_ROWS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct MoversResponse {
    #[serde(rename = "Table", default)]
    table: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
struct ScripEntry {
    #[serde(rename = "SCRIP_CD")]
    code: Value,
    #[serde(rename = "scrip_id", default)]
    security_id: String,
}

/// Scrip code -> security id lookup.
#[derive(Debug, Clone, Default)]
pub struct ScripCodeTable {
    codes: HashMap<String, String>,
    refreshed_at: Option<Instant>,
}

impl ScripCodeTable {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            codes: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            refreshed_at: Some(Instant::now()),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn security_id(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    /// True if never loaded or older than `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.refreshed_at.map_or(true, |at| at.elapsed() >= max_age)
    }
}

/// Decode the active scrip list into a code table. Entries without a
/// security id are skipped.
pub fn parse_scrip_codes(body: &str) -> Result<ScripCodeTable, DataError> {
    let entries: Vec<ScripEntry> = serde_json::from_str(body)
        .map_err(|e| DataError::ScripCodes(format!("scrip list: {e}")))?;
    let pairs = entries
        .into_iter()
        .filter(|e| !e.security_id.trim().is_empty())
        .map(|e| (code_text(&e.code), e.security_id.trim().to_string()));
    Ok(ScripCodeTable::from_pairs(pairs))
}

/// Decode a gainer/loser payload. A missing or empty `Table` is an error.
pub fn parse_movers_payload(body: &str) -> Result<Vec<RawRecord>, DataError> {
    let payload: MoversResponse = serde_json::from_str(body)
        .map_err(|e| DataError::MalformedPayload(format!("BSE response: {e}")))?;
    if payload.table.is_empty() {
        return Err(DataError::EmptyPayload("BSE".into()));
    }
    Ok(payload.table)
}

/// Fill `securityID` on every record: table lookup, then the provider's scrip
/// name, then the raw code.
pub fn attach_security_ids(records: &mut [RawRecord], codes: &ScripCodeTable) {
    let symbol_key = FieldMap::BSE.symbol;
    for record in records.iter_mut() {
        let code = record.get("scrip_cd").map(code_text).unwrap_or_default();
        let symbol = codes
            .security_id(&code)
            .map(str::to_string)
            .or_else(|| {
                record
                    .get("scripname")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or(code);
        record.insert(symbol_key.to_string(), Value::String(symbol));
    }
}

/// Normalize one pre-ranked list and re-rank it in the common schema.
pub fn rank_movers(
    mut records: Vec<RawRecord>,
    codes: &ScripCodeTable,
    direction: Direction,
) -> Result<RankedTable, DataError> {
    attach_security_ids(&mut records, codes);
    QuoteFrame::from_records(&records, &FieldMap::BSE)?.rank(direction, MAX_TABLE_ROWS)
}

fn code_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// BSE movers client with an auto-refreshing scrip code table.
pub struct BseProvider {
    config: BseConfig,
    codes: RwLock<ScripCodeTable>,
}

impl BseProvider {
    pub fn new(config: BseConfig) -> Self {
        Self {
            config,
            codes: RwLock::new(ScripCodeTable::default()),
        }
    }

    fn client(&self) -> Result<reqwest::blocking::Client, DataError> {
        let value = |v: &str| {
            HeaderValue::from_str(v).map_err(|e| DataError::ClientSetup(format!("header: {e}")))
        };
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, value(&self.config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(REFERER, value(&self.config.referer)?);

        reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(self.config.timeout())
            .build()
            .map_err(|e| DataError::ClientSetup(e.to_string()))
    }

    fn get_text(
        client: &reqwest::blocking::Client,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, DataError> {
        let resp = client
            .get(url)
            .query(query)
            .send()
            .map_err(DataError::from_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        resp.text().map_err(DataError::from_transport)
    }

    /// Download the scrip list and replace the code table. Returns its size.
    fn refresh_codes(&self, client: &reqwest::blocking::Client) -> Result<usize, DataError> {
        let body = Self::get_text(client, &self.config.scrip_codes_url, &[])?;
        let table = parse_scrip_codes(&body)?;
        let count = table.len();
        let mut guard = self
            .codes
            .write()
            .map_err(|_| DataError::ScripCodes("code table lock poisoned".into()))?;
        *guard = table;
        tracing::info!(codes = count, "BSE scrip code table refreshed");
        Ok(count)
    }

    fn ensure_codes(&self, client: &reqwest::blocking::Client) -> Result<(), DataError> {
        if !self.config.update_codes {
            return Ok(());
        }
        let stale = self
            .codes
            .read()
            .map_err(|_| DataError::ScripCodes("code table lock poisoned".into()))?
            .is_stale(self.config.code_refresh_interval());
        if stale {
            self.refresh_codes(client)?;
        }
        Ok(())
    }

    fn codes_snapshot(&self) -> Result<ScripCodeTable, DataError> {
        self.codes
            .read()
            .map(|t| t.clone())
            .map_err(|_| DataError::ScripCodes("code table lock poisoned".into()))
    }

    fn movers_query(
        &self,
        client: &reqwest::blocking::Client,
        direction: Direction,
    ) -> Result<Vec<RawRecord>, DataError> {
        let kind = match direction {
            Direction::Gainers => "gainer",
            Direction::Losers => "loser",
        };
        let body = Self::get_text(client, &self.config.movers_url, &[("GLtype", kind)])?;
        parse_movers_payload(&body)
    }

    /// One provider list, labelled and re-ranked in the common schema.
    fn ranked(
        &self,
        client: &reqwest::blocking::Client,
        codes: &ScripCodeTable,
        direction: Direction,
    ) -> Result<RankedTable, DataError> {
        let records = self.movers_query(client, direction)?;
        rank_movers(records, codes, direction)
    }
}

impl MarketSource for BseProvider {
    fn id(&self) -> SourceId {
        SourceId::Bse
    }

    fn fetch_movers(&self) -> Result<MoverTables, DataError> {
        let client = self.client()?;
        // Without a fresh table rows fall back to scrip name, then code.
        if let Err(err) = self.ensure_codes(&client) {
            tracing::warn!(error = %err, "BSE scrip code refresh failed; keeping previous table");
        }
        let codes = self.codes_snapshot()?;
        Ok(MoverTables {
            gainers: self.ranked(&client, &codes, Direction::Gainers)?,
            losers: self.ranked(&client, &codes, Direction::Losers)?,
        })
    }
}
