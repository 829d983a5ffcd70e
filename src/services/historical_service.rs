use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::models::{HistoricalRecord, PredictionWindow};
use crate::services::csv_fields::{parse_date, parse_number};

const HISTORICAL_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Close")]
    close: String,
}

/// Observed closing prices, loaded once at start-up.
#[derive(Debug, Clone)]
pub struct HistoricalSeries {
    records: Vec<HistoricalRecord>,
    max_date: NaiveDate,
}

impl HistoricalSeries {
    pub fn new(records: Vec<HistoricalRecord>) -> Result<Self> {
        let max_date = records
            .iter()
            .map(|r| r.date)
            .max()
            .context("Historical price data is empty")?;
        Ok(Self { records, max_date })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open historical prices: {:?}", path))?;
        let series = Self::from_reader(file)
            .with_context(|| format!("Failed to load historical prices: {:?}", path))?;
        info!(
            "Loaded {} historical prices from {:?} (latest {})",
            series.len(),
            path,
            series.max_date
        );
        Ok(series)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (line_num, row) in reader.deserialize::<CsvRow>().enumerate() {
            // +2: header line, 1-based
            let line = line_num + 2;
            let row = row.with_context(|| format!("Malformed historical row at line {}", line))?;
            records.push(HistoricalRecord {
                date: parse_date(&row.date, HISTORICAL_DATE_FORMAT)
                    .with_context(|| format!("Bad Date at line {}", line))?,
                close: parse_number(&row.close)
                    .with_context(|| format!("Bad Close at line {}", line))?,
            });
        }

        Self::new(records)
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    pub fn prediction_window(&self) -> PredictionWindow {
        PredictionWindow::from_max_historical_date(self.max_date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
