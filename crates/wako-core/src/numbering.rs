//! # Numbering
//!
//! Formats allocated sequence numbers into human-readable codes.
//!
//! ```text
//!   po_number counter ──► 7 ──► "0007" ──► WK-240501-0007
//!                                           │  └┬─┘└┬┘└┬┘
//!                                           │   YY  MM DD  (order date, local)
//!
//!   invoice_number counter ──► 12 ──► "0012" ──► INV-2405-0012
//!                                                 └┬─┘└┬┘
//!                                                  YY  MM  (order date, not issuance date)
//! ```
//!
//! Allocation itself lives in the database layer; this module is pure.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::{INVOICE_PREFIX, PO_PREFIX, SEQUENCE_WIDTH};

/// Zero-pads a sequence number to [`SEQUENCE_WIDTH`] digits.
///
/// Numbers wider than the padding keep every digit:
///
/// ```rust
/// use wako_core::numbering::pad_sequence;
///
/// assert_eq!(pad_sequence(7), "0007");
/// assert_eq!(pad_sequence(10_000), "10000");
/// ```
pub fn pad_sequence(number: i64) -> String {
    format!("{:0width$}", number, width = SEQUENCE_WIDTH)
}

/// Builds a purchase order code: `WK-YYMMDD-NNNN`.
pub fn po_code(date: NaiveDate, number: i64) -> String {
    format!(
        "{}{}-{}",
        PO_PREFIX,
        date.format("%y%m%d"),
        pad_sequence(number)
    )
}

/// Builds an invoice code: `INV-YYMM-NNNN`.
///
/// `order_date` is the purchase order's own date.
pub fn invoice_code(order_date: NaiveDate, number: i64) -> String {
    format!(
        "{}{}-{}",
        INVOICE_PREFIX,
        order_date.format("%y%m"),
        pad_sequence(number)
    )
}

/// Calendar date of a stored timestamp in the shop's local offset.
pub fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}
