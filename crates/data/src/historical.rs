//! Historical bar series.
//!
//! Bars are supplied by a collaborator, either as an in-memory vector or as
//! a CSV file (`timestamp,open,high,low,close,volume` with RFC 3339
//! timestamps). Symbol and date-range resolution happen outside the core.

use std::path::Path;

use chrono::DateTime;
use grid_core::{Error, PriceBar, Result};
use serde::Deserialize;

use crate::BarSource;

/// Replayable in-memory bar series.
pub struct HistoricalSource {
    bars: Vec<PriceBar>,
    index: usize,
}

impl HistoricalSource {
    /// Wrap a collaborator-supplied series. Timestamps must be strictly
    /// increasing; an empty series is allowed and simply ends the run at
    /// the first bar request.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        for pair in bars.windows(2) {
            if pair[1].ts_ms <= pair[0].ts_ms {
                return Err(Error::data(format!(
                    "bars out of order: {} follows {}",
                    pair[1].ts_ms, pair[0].ts_ms
                )));
            }
        }
        Ok(Self { bars, index: 0 })
    }

    /// Load a series from a CSV file.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(load_bars_csv(path)?)
    }

    /// Number of bars in the series.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

impl BarSource for HistoricalSource {
    fn next_bar(&mut self) -> Option<PriceBar> {
        let bar = self.bars.get(self.index)?.clone();
        self.index += 1;
        Some(bar)
    }

    fn reset(&mut self) {
        self.index = 0;
    }
}

#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Read bars from a CSV file with header
/// `timestamp,open,high,low,close,volume`.
pub fn load_bars_csv(path: impl AsRef<Path>) -> Result<Vec<PriceBar>> {
    let path = path.as_ref();
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| Error::data(format!("open {path:?}: {e}")))?;

    let mut bars = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        let row: BarRow = row.map_err(|e| Error::data(format!("row {}: {e}", line + 1)))?;
        let ts_ms = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| Error::data(format!("row {}: bad timestamp {:?}: {e}", line + 1, row.timestamp)))?
            .timestamp_millis();

        bars.push(PriceBar {
            ts_ms,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    tracing::debug!(count = bars.len(), ?path, "loaded historical bars");
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn bar(ts_ms: i64, close: f64) -> PriceBar {
        PriceBar {
            ts_ms,
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn test_replay_and_reset() {
        let mut source =
            HistoricalSource::new(vec![bar(1000, 100.0), bar(2000, 101.0)]).unwrap();

        assert_eq!(source.next_bar().unwrap().close, 100.0);
        assert_eq!(source.next_bar().unwrap().close, 101.0);
        assert!(source.next_bar().is_none());

        source.reset();
        assert_eq!(source.next_bar().unwrap().ts_ms, 1000);
    }

    #[test]
    fn test_rejects_out_of_order_bars() {
        let result = HistoricalSource::new(vec![bar(2000, 100.0), bar(1000, 101.0)]);
        assert!(result.is_err());

        // Duplicate timestamps are out of order too.
        let result = HistoricalSource::new(vec![bar(1000, 100.0), bar(1000, 101.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_series_is_allowed() {
        let mut source = HistoricalSource::new(Vec::new()).unwrap();
        assert!(source.is_empty());
        assert!(source.next_bar().is_none());
    }

    #[test]
    fn test_load_csv() {
        let path = Path::new("/tmp/grid_data_bars_test.csv");
        let data = "timestamp,open,high,low,close,volume\n\
                    2024-01-01T00:00:00Z,99.0,101.0,98.0,100.0,500.0\n\
                    2024-01-01T01:00:00Z,100.0,103.0,99.5,102.0,650.0\n";
        fs::write(path, data).unwrap();

        let bars = load_bars_csv(path).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].ts_ms, 1704067200000);
        assert_eq!(bars[1].close, 102.0);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_csv_bad_timestamp() {
        let path = Path::new("/tmp/grid_data_bad_ts_test.csv");
        let data = "timestamp,open,high,low,close,volume\n\
                    not-a-date,99.0,101.0,98.0,100.0,500.0\n";
        fs::write(path, data).unwrap();

        assert!(load_bars_csv(path).is_err());
        fs::remove_file(path).ok();
    }
}
