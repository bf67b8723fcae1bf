//! # Invoice Numbering
//!
//! Sale identifiers are zero-padded running numbers: `0001`, `0002`, ...
//! Numbers past 9999 simply grow wider (`10000`).
//!
//! ```text
//! counter (persisted) ──► next = counter + 1 ──► format_invoice_id(next) ──► "0042"
//! ```

/// Minimum width of an invoice number.
pub const INVOICE_WIDTH: usize = 4;

/// Formats a running number as an invoice identifier.
///
/// ```rust
/// use namaa_core::invoice::format_invoice_id;
///
/// assert_eq!(format_invoice_id(1), "0001");
/// assert_eq!(format_invoice_id(12345), "12345");
/// ```
pub fn format_invoice_id(number: i64) -> String {
    format!("{:0width$}", number, width = INVOICE_WIDTH)
}

/// Reads the running number back out of an invoice identifier.
///
/// Returns `None` for identifiers that are not plain digits (hand-edited or
/// foreign backups).
pub fn parse_invoice_number(id: &str) -> Option<i64> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}
