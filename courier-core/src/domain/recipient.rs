//! Recipient domain types and table normalization
//!
//! Turning an uploaded table into recipients is a pure function of its
//! header row and cell text, kept here so the server's spreadsheet reader
//! stays a thin adapter.

use serde::{Deserialize, Serialize};

/// Header names accepted for the contact column, in precedence order.
///
/// Matching is case-insensitive on the trimmed header. When no header
/// matches, the first column is used.
pub const CONTACT_HEADER_ALIASES: [&str; 4] = ["contact", "phone", "number", "mobile"];

/// Header name of the optional message column (case-insensitive)
pub const MESSAGE_HEADER: &str = "message";

/// One row of a bulk send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Digits only
    pub contact: String,
    /// May be empty
    pub message: String,
}

impl Recipient {
    /// Creates a recipient, normalizing the contact
    pub fn new(contact: &str, message: impl Into<String>) -> Self {
        Self {
            contact: normalize_contact(contact),
            message: message.into(),
        }
    }
}

/// Strips every non-digit character from a contact
pub fn normalize_contact(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Which column holds contacts, and how it was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactColumn {
    pub index: usize,
    /// `false` when no alias matched and the first column was assumed
    pub by_alias: bool,
}

/// Picks the contact column from a header row
///
/// Aliases are tried in [`CONTACT_HEADER_ALIASES`] order; for each alias the
/// leftmost matching header wins. Returns `None` only for an empty header row.
pub fn contact_column<S: AsRef<str>>(headers: &[S]) -> Option<ContactColumn> {
    if headers.is_empty() {
        return None;
    }

    for alias in CONTACT_HEADER_ALIASES {
        if let Some(index) = find_header(headers, alias) {
            return Some(ContactColumn {
                index,
                by_alias: true,
            });
        }
    }

    Some(ContactColumn {
        index: 0,
        by_alias: false,
    })
}

/// Finds the message column, if the table has one
pub fn message_column<S: AsRef<str>>(headers: &[S]) -> Option<usize> {
    find_header(headers, MESSAGE_HEADER)
}

fn find_header<S: AsRef<str>>(headers: &[S], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
}

/// Builds recipients from a header row and data rows
///
/// Contacts are normalized, rows whose contact normalizes to empty are
/// dropped, and a missing message cell becomes an empty message. The message
/// column is never also used as the contact column.
pub fn recipients_from_rows<S, I>(headers: &[S], rows: I) -> Vec<Recipient>
where
    S: AsRef<str>,
    I: IntoIterator<Item = Vec<String>>,
{
    let Some(contact) = contact_column(headers) else {
        return Vec::new();
    };
    let message = message_column(headers).filter(|&m| m != contact.index);

    rows.into_iter()
        .filter_map(|row| {
            let contact = normalize_contact(row.get(contact.index).map_or("", String::as_str));
            if contact.is_empty() {
                return None;
            }
            let message = message
                .and_then(|m| row.get(m))
                .map(|m| m.trim().to_string())
                .unwrap_or_default();
            Some(Recipient { contact, message })
        })
        .collect()
}
