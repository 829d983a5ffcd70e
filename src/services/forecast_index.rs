use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::models::{ForecastRecord, NearestForecast, PredictionWindow};
use crate::services::csv_fields::{parse_date, parse_number};

const FORECAST_DATE_FORMAT: &str = "%Y-%m-%d";

// Numeric cells are read as text so an empty or formatted cell gets a
// line/column error instead of a bare deserialization failure.
#[derive(Debug, Deserialize)]
struct CsvRow {
    ds: String,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "Close")]
    close: String,
    #[serde(rename = "Volume")]
    volume: String,
    #[serde(rename = "Close_Lag1")]
    close_lag1: String,
    #[serde(rename = "MA7")]
    ma7: String,
}

fn cell(value: &str, column: &str, line: usize) -> Result<f64> {
    parse_number(value).with_context(|| format!("Bad {} at line {}", column, line))
}

/// Date-ordered forecast table. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct ForecastIndex {
    records: Vec<ForecastRecord>,
}

impl ForecastIndex {
    /// Dates must be strictly increasing.
    pub fn new(records: Vec<ForecastRecord>) -> Result<Self> {
        if records.is_empty() {
            anyhow::bail!("Forecast table is empty");
        }
        if let Some(pair) = records.windows(2).find(|w| w[0].date >= w[1].date) {
            anyhow::bail!(
                "Forecast dates must be strictly increasing: {} is followed by {}",
                pair[0].date,
                pair[1].date
            );
        }
        Ok(Self { records })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open forecast table: {:?}", path))?;
        let index = Self::from_reader(file)
            .with_context(|| format!("Failed to load forecast table: {:?}", path))?;
        info!(
            "Loaded {} forecast rows from {:?} ({} to {})",
            index.len(),
            path,
            index.first_date(),
            index.last_date()
        );
        Ok(index)
    }

    /// Every row needs all five numeric columns filled; rows left empty by a
    /// lag or rolling window (the first `Close_Lag1`, the first six `MA7`)
    /// must be dropped before export.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (line_num, row) in reader.deserialize::<CsvRow>().enumerate() {
            let line = line_num + 2;
            let row = row.with_context(|| format!("Malformed forecast row at line {}", line))?;
            records.push(ForecastRecord {
                date: parse_date(&row.ds, FORECAST_DATE_FORMAT)
                    .with_context(|| format!("Bad ds at line {}", line))?,
                open: cell(&row.open, "Open", line)?,
                close: cell(&row.close, "Close", line)?,
                volume: cell(&row.volume, "Volume", line)?,
                close_lag1: cell(&row.close_lag1, "Close_Lag1", line)?,
                ma7: cell(&row.ma7, "MA7", line)?,
            });
        }

        Self::new(records)
    }

    /// Record whose date is closest to `date`; an equidistant tie goes to the earlier record.
    pub fn nearest(&self, date: NaiveDate) -> NearestForecast<'_> {
        let idx = self.records.partition_point(|r| r.date < date);

        let chosen = match (idx.checked_sub(1), self.records.get(idx)) {
            (None, _) => idx,
            (Some(before), None) => before,
            (Some(before), Some(after)) => {
                let to_before = (date - self.records[before].date).num_days();
                let to_after = (after.date - date).num_days();
                if to_before <= to_after {
                    before
                } else {
                    idx
                }
            }
        };

        let record = &self.records[chosen];
        NearestForecast {
            record,
            distance_days: (record.date - date).num_days().abs(),
        }
    }

    /// Whether every date in `window` has a forecast row on or after it.
    pub fn covers(&self, window: &PredictionWindow) -> bool {
        self.last_date() >= window.end
    }

    pub fn first_date(&self) -> NaiveDate {
        self.records[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
