//! Parse bank-statement CSV exports into transaction drafts.
//!
//! Statement rows have no header and exactly 4 fields:
//!   02/01/2026,"-52.63","COLES 0645 OAKLEIGH 03",""
//! The fourth field is always present in exports but carries nothing.

use chrono::NaiveDate;
use thiserror::Error;

use reckon_core::TransactionDraft;

/// A statement row the parser could not accept. One bad row rejects the
/// whole import; there is no partial import. Row numbers are 1-based.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("row {row}: expected 4 fields, got {got}")]
    FieldCount { row: usize, got: usize },
    #[error("row {row}: invalid date `{value}` (expected DD/MM/YYYY)")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid amount `{value}`")]
    InvalidAmount { row: usize, value: String },
    #[error("row {row}: {source}")]
    Csv { row: usize, source: csv::Error },
}

/// Parse raw statement CSV text into ordered transaction drafts.
/// Fail-fast: the first malformed row rejects the whole batch.
pub fn parse_statement_csv(text: &str) -> Result<Vec<TransactionDraft>, ParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut drafts = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result.map_err(|source| ParseError::Csv { row, source })?;

        // Exports often end with trailing blank lines
        if record.len() == 1 && record.get(0).map(str::trim) == Some("") {
            continue;
        }
        if record.len() != 4 {
            return Err(ParseError::FieldCount {
                row,
                got: record.len(),
            });
        }

        let date_str = record.get(0).unwrap_or("").trim();
        let date = NaiveDate::parse_from_str(date_str, "%d/%m/%Y").map_err(|_| {
            ParseError::InvalidDate {
                row,
                value: date_str.to_string(),
            }
        })?;

        let amount_str = record.get(1).unwrap_or("").trim();
        let amount = parse_amount(amount_str).ok_or_else(|| ParseError::InvalidAmount {
            row,
            value: amount_str.to_string(),
        })?;

        drafts.push(TransactionDraft::new(
            date,
            amount,
            record.get(2).unwrap_or("").trim(),
        ));
    }

    Ok(drafts)
}

/// Strip quote and currency formatting, keep the sign.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '$' | ','))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
