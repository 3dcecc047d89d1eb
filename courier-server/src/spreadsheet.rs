//! Recipients spreadsheet reader
//!
//! Reads the first worksheet of an `.xlsx`/`.xls` file. The first row is the
//! header; column selection and contact cleanup happen in
//! [`courier_core::domain::recipient`].

use calamine::{Data, Range, Reader, open_workbook_auto};
use courier_core::domain::recipient::{Recipient, contact_column, recipients_from_rows};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("{0}")]
    Open(#[from] calamine::Error),

    #[error("workbook has no worksheet")]
    NoWorksheet,
}

/// Loads recipients from a spreadsheet file
pub fn read_recipients(path: &Path) -> Result<Vec<Recipient>, SpreadsheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoWorksheet)??;

    let recipients = recipients_from_range(&range);
    info!(
        "Loaded {} recipient(s) from {}",
        recipients.len(),
        path.display()
    );
    Ok(recipients)
}

/// Converts a worksheet range into recipients
pub fn recipients_from_range(range: &Range<Data>) -> Vec<Recipient> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();

    if let Some(column) = contact_column(&headers).filter(|c| !c.by_alias) {
        debug!(
            "No contact column found, using {:?}",
            headers[column.index]
        );
    }

    recipients_from_rows(
        &headers,
        rows.map(|row| row.iter().map(cell_text).collect::<Vec<_>>()),
    )
}

/// Renders a cell as text
///
/// Whole numbers drop their fractional part, so a phone number stored as a
/// numeric cell reads `15550100` rather than `15550100.0`.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
