//! File-backed market data.
//!
//! Pools come from a JSON document (either a bare array or an object with a
//! `data` array, as yield aggregators return). Price histories come from one
//! CSV per symbol with a `timestamp,price` header.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use yield_risk_core::{FeedError, MarketDataSource, PricePoint, PriceSeries};

/// Unix timestamps above this are taken to be milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

pub struct FileMarketData {
    pools_path: PathBuf,
    prices_dir: Option<PathBuf>,
}

impl FileMarketData {
    #[must_use]
    pub fn new(pools_path: impl Into<PathBuf>) -> Self {
        Self {
            pools_path: pools_path.into(),
            prices_dir: None,
        }
    }

    /// Sets the directory holding `<SYMBOL>.csv` price histories.
    #[must_use]
    pub fn with_prices_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prices_dir = Some(dir.into());
        self
    }

    fn history_path(&self, symbol: &str) -> Option<PathBuf> {
        self.prices_dir
            .as_ref()
            .map(|dir| dir.join(format!("{symbol}.csv")))
    }
}

#[async_trait]
impl MarketDataSource for FileMarketData {
    async fn pool_records(&self) -> Result<Vec<Value>, FeedError> {
        let text = tokio::fs::read_to_string(&self.pools_path).await?;
        let records = parse_pool_document(&text)?;
        debug!(
            path = %self.pools_path.display(),
            count = records.len(),
            "Loaded raw pool records"
        );
        Ok(records)
    }

    async fn price_history(&self, symbol: &str) -> Result<PriceSeries, FeedError> {
        let path = self
            .history_path(symbol)
            .ok_or_else(|| FeedError::MissingHistory(symbol.to_string()))?;

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FeedError::MissingHistory(symbol.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        parse_price_csv(&text)
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Extracts the list of raw pool records from a JSON document.
///
/// # Errors
///
/// Returns an error if the text is not JSON, or is neither an array nor an
/// object with a `data` array.
pub fn parse_pool_document(text: &str) -> Result<Vec<Value>, FeedError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(FeedError::Malformed(
                "expected an array or an object with a `data` array".to_string(),
            )),
        },
        _ => Err(FeedError::Malformed(
            "expected an array or an object with a `data` array".to_string(),
        )),
    }
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    timestamp: String,
    price: f64,
}

/// Parses a `timestamp,price` CSV into a validated series.
///
/// Timestamps may be RFC 3339 strings or unix seconds/milliseconds. Rows are
/// sorted by time before validation.
///
/// # Errors
///
/// Returns an error on unreadable rows, unparseable timestamps, duplicate
/// timestamps or non-positive prices.
pub fn parse_price_csv(text: &str) -> Result<PriceSeries, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut points = Vec::new();
    for row in reader.deserialize::<PriceRow>() {
        let row = row.map_err(|e| FeedError::Csv(e.to_string()))?;
        points.push(PricePoint {
            timestamp: parse_timestamp(&row.timestamp)?,
            price: row.price,
        });
    }

    points.sort_by_key(|p| p.timestamp);
    Ok(PriceSeries::new(points)?)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, FeedError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let unix: i64 = raw
        .parse()
        .map_err(|_| FeedError::Malformed(format!("unparseable timestamp `{raw}`")))?;

    let parsed = if unix.abs() >= MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(unix).single()
    } else {
        Utc.timestamp_opt(unix, 0).single()
    };
    parsed.ok_or_else(|| FeedError::Malformed(format!("timestamp out of range `{raw}`")))
}

/// Fetches price histories for many symbols concurrently.
///
/// Symbols without a usable history are skipped with a warning; the
/// returned map only holds successful loads.
pub async fn fetch_histories<S>(source: &S, symbols: &[String]) -> HashMap<String, PriceSeries>
where
    S: MarketDataSource + ?Sized,
{
    let results = join_all(symbols.iter().map(|symbol| async move {
        (symbol.clone(), source.price_history(symbol).await)
    }))
    .await;

    let mut histories = HashMap::new();
    for (symbol, result) in results {
        match result {
            Ok(series) => {
                histories.insert(symbol, series);
            }
            Err(FeedError::MissingHistory(_)) => {
                debug!(%symbol, "No price history available");
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Skipping unusable price history");
            }
        }
    }

    info!(
        source = source.name(),
        requested = symbols.len(),
        loaded = histories.len(),
        "Fetched price histories"
    );
    histories
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ============================================
    // Pool document Tests
    // ============================================

    #[test]
    fn parses_bare_array() {
        let records = parse_pool_document(r#"[{"symbol": "A"}, {"symbol": "B"}]"#).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn parses_data_envelope() {
        let records =
            parse_pool_document(r#"{"status": "success", "data": [{"symbol": "A"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["symbol"], "A");
    }

    #[test]
    fn rejects_scalar_document() {
        assert!(matches!(
            parse_pool_document("42"),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(
            parse_pool_document("not json"),
            Err(FeedError::Json(_))
        ));
    }

    // ============================================
    // Price CSV Tests
    // ============================================

    #[test]
    fn parses_rfc3339_prices() {
        let csv = "timestamp,price\n\
                   2025-01-01T00:00:00Z,100.0\n\
                   2025-01-02T00:00:00Z,101.5\n";
        let series = parse_price_csv(csv).unwrap();
        assert_eq!(series.len(), 2);
        assert!((series.prices()[1] - 101.5).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_unix_seconds_and_millis() {
        let csv = "timestamp,price\n1735689600,1.0\n1735776000000,2.0\n";
        let series = parse_price_csv(csv).unwrap();
        assert_eq!(series.len(), 2);
        let gap = series.points()[1].timestamp - series.points()[0].timestamp;
        assert_eq!(gap.num_days(), 1);
    }

    #[test]
    fn sorts_unordered_rows() {
        let csv = "timestamp,price\n1735776000,2.0\n1735689600,1.0\n";
        let series = parse_price_csv(csv).unwrap();
        assert_eq!(series.prices(), vec![1.0, 2.0]);
    }

    #[test]
    fn rejects_non_positive_price() {
        let csv = "timestamp,price\n1735689600,1.0\n1735776000,-2.0\n";
        assert!(matches!(parse_price_csv(csv), Err(FeedError::Series(_))));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let csv = "timestamp,price\nyesterday,1.0\n";
        assert!(matches!(parse_price_csv(csv), Err(FeedError::Malformed(_))));
    }

    // ============================================
    // FileMarketData Tests
    // ============================================

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn file_source_loads_pools_and_histories() {
        let dir = TempDir::new().unwrap();
        let pools = write_file(&dir, "pools.json", r#"[{"symbol": "ETH", "apy": 4.0, "il7d": 30}]"#);
        write_file(
            &dir,
            "ETH.csv",
            "timestamp,price\n1735689600,3000\n1735776000,3100\n1735862400,3050\n",
        );

        let source = FileMarketData::new(pools).with_prices_dir(dir.path());

        let records = source.pool_records().await.unwrap();
        assert_eq!(records.len(), 1);

        let series = source.price_history("ETH").await.unwrap();
        assert_eq!(series.len(), 3);
    }

    #[tokio::test]
    async fn missing_history_is_reported_as_such() {
        let dir = TempDir::new().unwrap();
        let pools = write_file(&dir, "pools.json", "[]");
        let source = FileMarketData::new(pools).with_prices_dir(dir.path());

        let err = source.price_history("NOPE").await.unwrap_err();
        assert!(matches!(err, FeedError::MissingHistory(ref s) if s == "NOPE"));
    }

    #[tokio::test]
    async fn fetch_histories_skips_failures() {
        let dir = TempDir::new().unwrap();
        let pools = write_file(&dir, "pools.json", "[]");
        write_file(&dir, "A.csv", "timestamp,price\n1735689600,1.0\n1735776000,1.1\n");
        write_file(&dir, "B.csv", "timestamp,price\n1735689600,0.0\n");

        let source = FileMarketData::new(pools).with_prices_dir(dir.path());
        let symbols = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        let histories = fetch_histories(&source, &symbols).await;
        assert_eq!(histories.len(), 1);
        assert!(histories.contains_key("A"));
    }
}
