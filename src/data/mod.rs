//! Read-only holdings and trades tables
//!
//! Both tables are loaded once at construction and never mutated.

use crate::audit::compute_dataset_fingerprint;
use crate::error::AssistantError;
use crate::models::{HoldingRecord, TradeRecord};
use crate::Result;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const PORTFOLIO_COLUMN: &str = "PortfolioName";
pub const PL_YTD_COLUMN: &str = "PL_YTD";

/// In-memory snapshot of both datasets
#[derive(Debug, Clone)]
pub struct DataStore {
    holdings: Vec<HoldingRecord>,
    trades: Vec<TradeRecord>,
    has_pl_ytd: bool,
    fingerprint: String,
}

impl DataStore {
    /// Load both tables from delimited files on disk
    pub fn load(holdings_path: impl AsRef<Path>, trades_path: impl AsRef<Path>) -> Result<Self> {
        let holdings_path = holdings_path.as_ref();
        let trades_path = trades_path.as_ref();

        info!(
            holdings = %holdings_path.display(),
            trades = %trades_path.display(),
            "Loading datasets"
        );

        let holdings = open(holdings_path)?;
        let trades = open(trades_path)?;

        Self::from_readers(holdings, trades)
    }

    /// Build a store from any pair of CSV sources
    pub fn from_readers<H: Read, T: Read>(holdings: H, trades: T) -> Result<Self> {
        let (holdings, holdings_headers) = read_table::<HoldingRecord, _>(holdings, "holdings")?;
        let (trades, _) = read_table::<TradeRecord, _>(trades, "trades")?;

        let has_pl_ytd = holdings_headers.iter().any(|h| h == PL_YTD_COLUMN);
        let fingerprint = compute_dataset_fingerprint(&holdings, &trades);

        info!(
            holdings = holdings.len(),
            trades = trades.len(),
            has_pl_ytd,
            fingerprint = %fingerprint,
            "Datasets loaded"
        );

        Ok(Self {
            holdings,
            trades,
            has_pl_ytd,
            fingerprint,
        })
    }

    pub fn holdings(&self) -> &[HoldingRecord] {
        &self.holdings
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Whether the holdings header carries a PL_YTD column
    pub fn has_pl_ytd(&self) -> bool {
        self.has_pl_ytd
    }

    /// SHA-256 over the loaded rows
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Distinct fund names across both tables, longest first.
    ///
    /// Equal lengths fall back to lexicographic order so scans are reproducible.
    pub fn fund_names(&self) -> Vec<&str> {
        let distinct: BTreeSet<&str> = self
            .holdings
            .iter()
            .filter_map(|h| h.portfolio_name.as_deref())
            .chain(self.trades.iter().filter_map(|t| t.portfolio_name.as_deref()))
            .filter(|name| !name.is_empty())
            .collect();

        let mut names: Vec<&str> = distinct.into_iter().collect();
        // BTreeSet already yields lexicographic order; the sort is stable.
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        names
    }

    pub fn holdings_count(&self, fund: &str) -> usize {
        self.holdings
            .iter()
            .filter(|h| h.portfolio_name.as_deref() == Some(fund))
            .count()
    }

    pub fn trades_count(&self, fund: &str) -> usize {
        self.trades
            .iter()
            .filter(|t| t.portfolio_name.as_deref() == Some(fund))
            .count()
    }

    /// PL_YTD summed per fund, in ascending fund-name order.
    ///
    /// Missing and NaN values contribute nothing; a fund with no values sums to zero.
    /// Infinite values are summed like any other number.
    pub fn pl_ytd_by_fund(&self) -> Vec<(&str, f64)> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

        for holding in &self.holdings {
            let Some(fund) = holding.portfolio_name.as_deref() else {
                continue;
            };
            let entry = totals.entry(fund).or_insert(0.0);
            if let Some(value) = holding.pl_ytd.filter(|v| !v.is_nan()) {
                *entry += value;
            }
        }

        totals.into_iter().collect()
    }
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| {
        AssistantError::DataLoadError(format!("Failed to open '{}': {}", path.display(), e))
    })
}

/// Deserialize every row of a headed CSV, requiring the portfolio column.
fn read_table<T, R>(source: R, dataset: &'static str) -> Result<(Vec<T>, csv::StringRecord)>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == PORTFOLIO_COLUMN) {
        return Err(AssistantError::MissingColumn {
            dataset,
            column: PORTFOLIO_COLUMN,
        });
    }

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        let row = result.map_err(|e| {
            AssistantError::DataLoadError(format!("{} row {}: {}", dataset, index + 1, e))
        })?;
        rows.push(row);
    }

    debug!(dataset, rows = rows.len(), "Table parsed");

    Ok((rows, headers))
}
