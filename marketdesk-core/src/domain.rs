//! Domain types: quote rows, ranked tables, and the four-table dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of rows in any ranked table.
pub const MAX_TABLE_ROWS: usize = 20;

/// One instrument snapshot in the common column schema.
///
/// Both sources are normalized into this shape regardless of their native
/// field names. Numeric fields default to zero when the source omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRow {
    pub symbol: String,
    pub open: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub last_price: f64,
    pub previous_close: f64,
    pub percent_change: f64,
}

impl QuoteRow {
    /// A row with the given symbol and every numeric field at zero.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            open: 0.0,
            day_high: 0.0,
            day_low: 0.0,
            last_price: 0.0,
            previous_close: 0.0,
            percent_change: 0.0,
        }
    }
}

/// Ranking direction for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Largest positive percent change first.
    Gainers,
    /// Largest negative percent change first.
    Losers,
}

impl Direction {
    pub fn is_descending(self) -> bool {
        matches!(self, Direction::Gainers)
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Gainers => "Top Gainers",
            Direction::Losers => "Top Losers",
        }
    }
}

/// External market-data source a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Nse,
    Bse,
}

impl SourceId {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Nse => "NSE",
            SourceId::Bse => "BSE",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered table of at most [`MAX_TABLE_ROWS`] quote rows.
///
/// A failed fetch is represented as a table holding a single placeholder row
/// whose symbol carries the error message; `failure` keeps the same message so
/// renderers can blank out the numeric cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTable {
    pub direction: Direction,
    rows: Vec<QuoteRow>,
    failure: Option<String>,
}

impl RankedTable {
    /// Build a table from rows that are already ranked. Extra rows are dropped.
    pub fn from_ranked(direction: Direction, mut rows: Vec<QuoteRow>) -> Self {
        rows.truncate(MAX_TABLE_ROWS);
        Self {
            direction,
            rows,
            failure: None,
        }
    }

    /// Single-row error placeholder.
    pub fn placeholder(direction: Direction, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            direction,
            rows: vec![QuoteRow::empty(message.clone())],
            failure: Some(message),
        }
    }

    pub fn rows(&self) -> &[QuoteRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.failure.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

/// Gainers and losers produced by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverTables {
    pub gainers: RankedTable,
    pub losers: RankedTable,
}

impl MoverTables {
    /// The same placeholder row duplicated into both directions.
    pub fn placeholder(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            gainers: RankedTable::placeholder(Direction::Gainers, message.clone()),
            losers: RankedTable::placeholder(Direction::Losers, message),
        }
    }

    pub fn get(&self, direction: Direction) -> &RankedTable {
        match direction {
            Direction::Gainers => &self.gainers,
            Direction::Losers => &self.losers,
        }
    }
}

/// The four tables shown on the dashboard, one pair per source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub nse: MoverTables,
    pub bse: MoverTables,
}

impl Dashboard {
    pub fn table(&self, source: SourceId, direction: Direction) -> &RankedTable {
        match source {
            SourceId::Nse => self.nse.get(direction),
            SourceId::Bse => self.bse.get(direction),
        }
    }

    /// Tables in display order: NSE gainers, NSE losers, BSE gainers, BSE losers.
    pub fn sections(&self) -> [(SourceId, &RankedTable); 4] {
        [
            (SourceId::Nse, &self.nse.gainers),
            (SourceId::Nse, &self.nse.losers),
            (SourceId::Bse, &self.bse.gainers),
            (SourceId::Bse, &self.bse.losers),
        ]
    }
}
