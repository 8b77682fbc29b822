//! # Order Numbers
//!
//! Human-readable order identifiers of the form `YYYYMMDD-NNNN`.
//!
//! ```text
//!   20261019-0042
//!   ├──────┘ └──┘
//!   │         └── counter: 1 + highest suffix already used today (all stores)
//!   └──────────── UTC date of confirmation
//! ```
//!
//! The counter is zero-padded to four digits. From the 10000th order of a
//! day onward it simply grows wider (`20261019-10000`); it is never
//! truncated or wrapped, so uniqueness and ordering by numeric suffix hold.
//!
//! This module only formats. Finding the highest suffix is a
//! database query (see `kasser-db`), and it runs inside the order
//! transaction.

use chrono::NaiveDate;

/// Length of the `YYYYMMDD-` prefix.
pub const PREFIX_LEN: usize = 9;

/// Date part of every order number minted on `date`.
pub fn day_prefix(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Formats an order number.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use kasser_core::order_number;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
/// assert_eq!(order_number::format(day, 7), "20261019-0007");
/// ```
pub fn format(date: NaiveDate, counter: u32) -> String {
    format!("{}-{:04}", day_prefix(date), counter)
}

/// Counter that follows the highest suffix used so far (1 on a fresh day).
pub fn next_counter(highest_today: Option<i64>) -> u32 {
    match highest_today {
        Some(n) if n > 0 => u32::try_from(n).map(|n| n.saturating_add(1)).unwrap_or(u32::MAX),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_format_pads_to_four_digits() {
        assert_eq!(format(day(), 1), "20261019-0001");
        assert_eq!(format(day(), 42), "20261019-0042");
        assert_eq!(format(day(), 9999), "20261019-9999");
    }

    #[test]
    fn test_format_grows_past_9999() {
        // Wider suffix instead of truncation
        assert_eq!(format(day(), 10_000), "20261019-10000");
    }

    #[test]
    fn test_matches_expected_shape() {
        let number = format(day(), 3);
        assert_eq!(number.len(), 13);
        assert_eq!(&number[8..9], "-");
        assert!(number[..8].bytes().all(|b| b.is_ascii_digit()));
        assert!(number[PREFIX_LEN..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_next_counter() {
        assert_eq!(next_counter(None), 1);
        assert_eq!(next_counter(Some(0)), 1);
        assert_eq!(next_counter(Some(41)), 42);
        assert_eq!(next_counter(Some(9_999)), 10_000);
    }

    #[test]
    fn test_numeric_order_matches_mint_order() {
        let suffix = |n| format(day(), n)[PREFIX_LEN..].parse::<u32>().unwrap();
        assert!(suffix(10_000) > suffix(9_999));
        assert_eq!(suffix(next_counter(Some(9_999))), 10_000);
    }
}
