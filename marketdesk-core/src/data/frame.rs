//! Quote frame: the normalizer/ranker shared by every source.
//!
//! Raw JSON records with source-specific field names are projected onto the
//! common column schema, missing numeric values are filled with zero, the
//! percent-change column is coerced to f64, and the frame is sorted and cut to
//! [`MAX_TABLE_ROWS`] per direction.

use super::provider::DataError;
use crate::domain::{Direction, MoverTables, QuoteRow, RankedTable, MAX_TABLE_ROWS};
use polars::prelude::*;
use serde_json::{Map, Value};

/// A raw row as decoded from a provider's JSON payload.
pub type RawRecord = Map<String, Value>;

pub const SYMBOL: &str = "symbol";
pub const OPEN: &str = "open";
pub const DAY_HIGH: &str = "dayHigh";
pub const DAY_LOW: &str = "dayLow";
pub const LAST_PRICE: &str = "lastPrice";
pub const PREVIOUS_CLOSE: &str = "previousClose";
pub const PERCENT_CHANGE: &str = "pChange";

/// Display order of the common schema.
pub const QUOTE_COLUMNS: [&str; 7] = [
    SYMBOL,
    OPEN,
    DAY_HIGH,
    DAY_LOW,
    LAST_PRICE,
    PREVIOUS_CLOSE,
    PERCENT_CHANGE,
];

const NUMERIC_COLUMNS: [&str; 6] = [
    OPEN,
    DAY_HIGH,
    DAY_LOW,
    LAST_PRICE,
    PREVIOUS_CLOSE,
    PERCENT_CHANGE,
];

/// Native field name for each column of the common schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub symbol: &'static str,
    pub open: &'static str,
    pub day_high: &'static str,
    pub day_low: &'static str,
    pub last_price: &'static str,
    pub previous_close: &'static str,
    pub percent_change: &'static str,
}

impl FieldMap {
    /// NSE equity-stockIndices rows already use the common names.
    pub const NSE: FieldMap = FieldMap {
        symbol: SYMBOL,
        open: OPEN,
        day_high: DAY_HIGH,
        day_low: DAY_LOW,
        last_price: LAST_PRICE,
        previous_close: PREVIOUS_CLOSE,
        percent_change: PERCENT_CHANGE,
    };

    /// BSE gainer/loser rows. `securityID` is filled in from the scrip code table.
    pub const BSE: FieldMap = FieldMap {
        symbol: "securityID",
        open: "openrate",
        day_high: "highrate",
        day_low: "lowrate",
        last_price: "ltradert",
        previous_close: "prevdayclose",
        percent_change: "change_percent",
    };

    fn native(&self, column: &str) -> &'static str {
        match column {
            OPEN => self.open,
            DAY_HIGH => self.day_high,
            DAY_LOW => self.day_low,
            LAST_PRICE => self.last_price,
            PREVIOUS_CLOSE => self.previous_close,
            PERCENT_CHANGE => self.percent_change,
            _ => self.symbol,
        }
    }
}

/// Expected polars schema of a normalized frame.
pub fn quote_schema() -> Schema {
    let mut fields = vec![Field::new(SYMBOL.into(), DataType::String)];
    fields.extend(
        NUMERIC_COLUMNS
            .iter()
            .map(|name| Field::new((*name).into(), DataType::Float64)),
    );
    Schema::from_iter(fields)
}

/// Normalized quotes from one source, before ranking.
#[derive(Debug, Clone)]
pub struct QuoteFrame {
    df: DataFrame,
}

impl QuoteFrame {
    /// Project raw records onto the common schema.
    ///
    /// Missing or null numeric values become 0. A percent change that is
    /// present but not numeric fails the whole frame.
    pub fn from_records(records: &[RawRecord], fields: &FieldMap) -> Result<Self, DataError> {
        let symbols: Vec<String> = records
            .iter()
            .map(|r| symbol_text(r.get(fields.symbol)))
            .collect();

        let mut columns = Vec::with_capacity(QUOTE_COLUMNS.len());
        columns.push(Column::new(SYMBOL.into(), symbols));

        for name in NUMERIC_COLUMNS {
            let native = fields.native(name);
            let strict = name == PERCENT_CHANGE;
            let values = records
                .iter()
                .enumerate()
                .map(|(i, r)| coerce_numeric(r.get(native), strict).map_err(|bad| {
                    DataError::MalformedPayload(format!(
                        "row {i}: {native} is not numeric: {bad}"
                    ))
                }))
                .collect::<Result<Vec<Option<f64>>, DataError>>()?;
            columns.push(Column::new(name.into(), values));
        }

        let df = DataFrame::new(columns).map_err(frame_err)?;
        let fills: Vec<Expr> = NUMERIC_COLUMNS
            .iter()
            .map(|name| col(*name).fill_null(lit(0.0)))
            .collect();
        let df = df.lazy().with_columns(fills).collect().map_err(frame_err)?;

        Ok(Self { df })
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Sort by percent change in the given direction and keep the top `limit`
    /// rows (capped at [`MAX_TABLE_ROWS`]).
    pub fn rank(&self, direction: Direction, limit: usize) -> Result<RankedTable, DataError> {
        let limit = limit.min(MAX_TABLE_ROWS);
        let ranked = self
            .df
            .clone()
            .lazy()
            .sort(
                [PERCENT_CHANGE],
                SortMultipleOptions::default()
                    .with_order_descending(direction.is_descending())
                    .with_maintain_order(true),
            )
            .limit(limit as IdxSize)
            .collect()
            .map_err(frame_err)?;

        Ok(RankedTable::from_ranked(direction, frame_to_rows(&ranked)?))
    }

    /// Both directions at the standard table size.
    pub fn movers(&self) -> Result<MoverTables, DataError> {
        Ok(MoverTables {
            gainers: self.rank(Direction::Gainers, MAX_TABLE_ROWS)?,
            losers: self.rank(Direction::Losers, MAX_TABLE_ROWS)?,
        })
    }
}

fn frame_err(e: PolarsError) -> DataError {
    DataError::Frame(e.to_string())
}

fn symbol_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Coerce a JSON value to f64.
///
/// Absent and null values are `None`. Numeric strings ("1,234.50", " 2.1 ")
/// are parsed. Other values are `None` unless `strict`, in which case the
/// offending text is returned as the error.
fn coerce_numeric(value: Option<&Value>, strict: bool) -> Result<Option<f64>, String> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ if strict => Err(value.map(|v| v.to_string()).unwrap_or_default()),
        _ => Ok(None),
    }
}

fn f64_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, DataError> {
    df.column(name)
        .map_err(frame_err)?
        .f64()
        .map_err(|e| DataError::Frame(format!("{name} column type: {e}")))
}

fn frame_to_rows(df: &DataFrame) -> Result<Vec<QuoteRow>, DataError> {
    let symbols = df
        .column(SYMBOL)
        .map_err(frame_err)?
        .str()
        .map_err(|e| DataError::Frame(format!("{SYMBOL} column type: {e}")))?;
    let open = f64_column(df, OPEN)?;
    let day_high = f64_column(df, DAY_HIGH)?;
    let day_low = f64_column(df, DAY_LOW)?;
    let last_price = f64_column(df, LAST_PRICE)?;
    let previous_close = f64_column(df, PREVIOUS_CLOSE)?;
    let percent_change = f64_column(df, PERCENT_CHANGE)?;

    Ok((0..df.height())
        .map(|i| QuoteRow {
            symbol: symbols.get(i).unwrap_or_default().to_string(),
            open: open.get(i).unwrap_or(0.0),
            day_high: day_high.get(i).unwrap_or(0.0),
            day_low: day_low.get(i).unwrap_or(0.0),
            last_price: last_price.get(i).unwrap_or(0.0),
            previous_close: previous_close.get(i).unwrap_or(0.0),
            percent_change: percent_change.get(i).unwrap_or(0.0),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn frame_matches_schema() {
        let frame = QuoteFrame::from_records(
            &records(json!([{ "symbol": "TCS", "pChange": 1.5 }])),
            &FieldMap::NSE,
        )
        .unwrap();
        let schema = quote_schema();
        for field in schema.iter_fields() {
            let dtype = frame.dataframe().schema().get(field.name()).cloned();
            assert_eq!(dtype.as_ref(), Some(field.dtype()), "column {}", field.name());
        }
    }

    #[test]
    fn missing_columns_default_to_zero() {
        let frame = QuoteFrame::from_records(
            &records(json!([{ "symbol": "INFY", "pChange": "2.5" }])),
            &FieldMap::NSE,
        )
        .unwrap();
        let table = frame.rank(Direction::Gainers, 20).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.symbol, "INFY");
        assert_eq!(row.open, 0.0);
        assert_eq!(row.day_high, 0.0);
        assert_eq!(row.previous_close, 0.0);
        assert_eq!(row.percent_change, 2.5);
    }

    #[test]
    fn null_and_missing_percent_change_default_to_zero() {
        let frame = QuoteFrame::from_records(
            &records(json!([
                { "symbol": "A", "pChange": null },
                { "symbol": "B" },
                { "symbol": "C", "pChange": -1.0 },
            ])),
            &FieldMap::NSE,
        )
        .unwrap();
        let losers = frame.rank(Direction::Losers, 20).unwrap();
        let symbols: Vec<_> = losers.rows().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "A", "B"]);
    }

    #[test]
    fn gainers_descend_and_losers_ascend() {
        let frame = QuoteFrame::from_records(
            &records(json!([
                { "symbol": "A", "pChange": 0.5 },
                { "symbol": "B", "pChange": "3.25" },
                { "symbol": "C", "pChange": -2 },
                { "symbol": "D", "pChange": "1,000.5" },
            ])),
            &FieldMap::NSE,
        )
        .unwrap();

        let movers = frame.movers().unwrap();
        let gainers: Vec<_> = movers.gainers.rows().iter().map(|r| r.symbol.as_str()).collect();
        let losers: Vec<_> = movers.losers.rows().iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(gainers, vec!["D", "B", "A", "C"]);
        assert_eq!(losers, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn rank_truncates_to_twenty() {
        let rows: Vec<Value> = (0..45)
            .map(|i| json!({ "symbol": format!("S{i}"), "pChange": i as f64 / 10.0 }))
            .collect();
        let frame = QuoteFrame::from_records(&records(Value::Array(rows)), &FieldMap::NSE).unwrap();
        assert_eq!(frame.height(), 45);

        let gainers = frame.rank(Direction::Gainers, 100).unwrap();
        assert_eq!(gainers.len(), MAX_TABLE_ROWS);
        assert_eq!(gainers.rows()[0].symbol, "S44");

        let short = frame.rank(Direction::Losers, 5).unwrap();
        assert_eq!(short.len(), 5);
        assert_eq!(short.rows()[0].symbol, "S0");
    }

    #[test]
    fn non_numeric_percent_change_is_malformed() {
        let err = QuoteFrame::from_records(
            &records(json!([{ "symbol": "X", "pChange": "n/a" }])),
            &FieldMap::NSE,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::MalformedPayload(_)));
    }

    #[test]
    fn non_numeric_price_field_defaults_to_zero() {
        let frame = QuoteFrame::from_records(
            &records(json!([{ "symbol": "X", "open": "-", "pChange": 1 }])),
            &FieldMap::NSE,
        )
        .unwrap();
        let table = frame.rank(Direction::Gainers, 20).unwrap();
        assert_eq!(table.rows()[0].open, 0.0);
    }

    #[test]
    fn bse_field_names_map_into_common_schema() {
        let frame = QuoteFrame::from_records(
            &records(json!([{
                "securityID": "RELIANCE",
                "openrate": 2900.0,
                "highrate": "2950.5",
                "lowrate": 2890.0,
                "ltradert": 2940.0,
                "prevdayclose": 2880.0,
                "change_percent": "2.08"
            }])),
            &FieldMap::BSE,
        )
        .unwrap();
        let row = frame.rank(Direction::Gainers, 20).unwrap().rows()[0].clone();
        assert_eq!(
            row,
            QuoteRow {
                symbol: "RELIANCE".into(),
                open: 2900.0,
                day_high: 2950.5,
                day_low: 2890.0,
                last_price: 2940.0,
                previous_close: 2880.0,
                percent_change: 2.08,
            }
        );
    }

    #[test]
    fn empty_records_rank_to_empty_tables() {
        let frame = QuoteFrame::from_records(&[], &FieldMap::NSE).unwrap();
        let movers = frame.movers().unwrap();
        assert!(movers.gainers.is_empty());
        assert!(movers.losers.is_empty());
    }
}
