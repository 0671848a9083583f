//! Dashboard assembly: both sources, in sequence, each behind the placeholder
//! fallback.

use crate::data::MarketSource;
use crate::domain::Dashboard;
use std::time::Instant;

/// Fetch NSE then BSE and collect the four tables.
///
/// Blocking. Never fails: a source that errors contributes placeholder tables.
pub fn assemble(nse: &dyn MarketSource, bse: &dyn MarketSource) -> Dashboard {
    let started = Instant::now();
    let nse_movers = nse.movers_or_placeholder();
    let bse_movers = bse.movers_or_placeholder();
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        nse_ok = !nse_movers.gainers.is_placeholder(),
        bse_ok = !bse_movers.gainers.is_placeholder(),
        "dashboard assembled"
    );
    Dashboard {
        nse: nse_movers,
        bse: bse_movers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;
    use crate::domain::{Direction, MoverTables, QuoteRow, RankedTable, SourceId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        id: SourceId,
        calls: AtomicUsize,
        fail: bool,
    }

    impl Fixed {
        fn new(id: SourceId, fail: bool) -> Self {
            Self {
                id,
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl MarketSource for Fixed {
        fn id(&self) -> SourceId {
            self.id
        }

        fn fetch_movers(&self) -> Result<MoverTables, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DataError::Timeout("operation timed out".into()));
            }
            let row = QuoteRow {
                percent_change: 1.0,
                ..QuoteRow::empty(self.id.as_str())
            };
            Ok(MoverTables {
                gainers: RankedTable::from_ranked(Direction::Gainers, vec![row.clone()]),
                losers: RankedTable::from_ranked(Direction::Losers, vec![row]),
            })
        }
    }

    #[test]
    fn both_sources_called_once() {
        let nse = Fixed::new(SourceId::Nse, false);
        let bse = Fixed::new(SourceId::Bse, false);
        let dash = assemble(&nse, &bse);
        assert_eq!(nse.calls.load(Ordering::SeqCst), 1);
        assert_eq!(bse.calls.load(Ordering::SeqCst), 1);
        assert_eq!(dash.nse.gainers.rows()[0].symbol, "NSE");
        assert_eq!(dash.bse.losers.rows()[0].symbol, "BSE");
    }

    #[test]
    fn failing_bse_does_not_abort_dashboard() {
        let nse = Fixed::new(SourceId::Nse, false);
        let bse = Fixed::new(SourceId::Bse, true);
        let dash = assemble(&nse, &bse);
        assert!(!dash.nse.gainers.is_placeholder());
        assert!(dash.bse.gainers.is_placeholder());
        assert!(dash.bse.losers.is_placeholder());
        assert_eq!(
            dash.bse.gainers.rows()[0].symbol,
            "BSE API Error: request timed out: operation timed out"
        );
    }

    #[test]
    fn both_failing_still_yields_four_tables() {
        let dash = assemble(
            &Fixed::new(SourceId::Nse, true),
            &Fixed::new(SourceId::Bse, true),
        );
        for (_, table) in dash.sections() {
            assert_eq!(table.len(), 1);
            assert!(table.is_placeholder());
        }
    }
}
