use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Parse a numeric cell that may carry currency symbols or thousands separators.
pub fn parse_number(s: &str) -> Result<f64> {
    let cleaned = s
        .trim()
        .trim_start_matches("Rs.")
        .trim_start_matches(['₹', '$'])
        .replace(',', "")
        .trim()
        .to_string();

    if cleaned.is_empty() || cleaned == "-" {
        anyhow::bail!("Empty numeric value: {:?}", s);
    }

    let value = cleaned
        .parse::<f64>()
        .with_context(|| format!("Failed to parse number: {}", s))?;

    if !value.is_finite() {
        anyhow::bail!("Non-finite numeric value: {}", s);
    }
    Ok(value)
}

/// Parse a date column written either as a bare date or as a pandas timestamp.
pub fn parse_date(s: &str, format: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, format) {
        return Ok(date);
    }
    NaiveDateTime::parse_from_str(s, &format!("{format} %H:%M:%S"))
        .map(|dt| dt.date())
        .with_context(|| format!("Failed to parse date {:?} (expected {})", s, format))
}
