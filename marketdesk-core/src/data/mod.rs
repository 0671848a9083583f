//! Market data: source trait, NSE and BSE providers, and the shared normalizer.

pub mod bse;
pub mod frame;
pub mod nse;
pub mod provider;

pub use bse::{BseProvider, ScripCodeTable};
pub use frame::{FieldMap, QuoteFrame, RawRecord, QUOTE_COLUMNS};
pub use nse::NseProvider;
pub use provider::{placeholder_message, DataError, MarketSource};
