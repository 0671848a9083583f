//! MarketDesk Core: market movers for the dashboard.
//!
//! - Domain types (quote rows, ranked tables, the four-table dashboard)
//! - NSE index quotes provider (cookie warm-up session)
//! - BSE movers client with an auto-refreshing scrip code table
//! - Polars-backed normalizer that maps both sources onto one schema and ranks
//! - Dashboard assembly with a uniform placeholder fallback

pub mod config;
pub mod dashboard;
pub mod data;
pub mod domain;

pub use config::{AppConfig, BseConfig, ConfigError, MarketConfig, NseConfig, ServerConfig};
pub use dashboard::assemble;
pub use data::{BseProvider, DataError, MarketSource, NseProvider};
pub use domain::{Dashboard, Direction, MoverTables, QuoteRow, RankedTable, SourceId, MAX_TABLE_ROWS};
