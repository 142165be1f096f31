#![forbid(unsafe_code)]

//! Width vector codec.
//!
//! The persisted form is a comma-joined list of decimal numbers, e.g.
//! `"30,30,40"`. Parsing is all-or-nothing: a single token that is not a
//! finite number makes the whole vector absent, so a partially numeric
//! string is never trusted.
//!
//! Values are rendered with Rust's shortest round-trip `Display` for `f64`,
//! which never switches to exponential notation, so anything this module
//! writes parses back to the same numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Total of a fully distributed width vector.
pub const FULL_WIDTH: f64 = 100.0;

/// Ordered per-column width percentages for one table.
///
/// An empty vector means "not yet computed".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnWidths(Vec<f64>);

impl ColumnWidths {
    /// Wrap an existing vector.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// The empty ("not yet computed") vector.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse a persisted width string.
    ///
    /// Splits on `,` and trims every token. Returns the empty vector unless
    /// every token is a finite number.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut values = Vec::new();
        for token in raw.split(',') {
            match token.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => values.push(value),
                _ => return Self::empty(),
            }
        }
        Self(values)
    }

    /// Equal distribution over `count` columns.
    ///
    /// Every entry is `floor(100 / count)` and the remainder is added to the
    /// last entry, so the vector sums to exactly 100. `count == 0` yields
    /// the empty vector.
    #[must_use]
    pub fn equal(count: usize) -> Self {
        if count == 0 {
            return Self::empty();
        }
        let base = (FULL_WIDTH / count as f64).floor();
        let mut values = vec![base; count];
        let remainder = FULL_WIDTH - base * count as f64;
        if let Some(last) = values.last_mut() {
            *last += remainder;
        }
        Self(values)
    }

    /// Serialize to the persisted comma-joined form.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Render as a CSS track list (`"30% 30% 40%"`).
    #[must_use]
    pub fn to_css_tracks(&self) -> String {
        self.0
            .iter()
            .map(|v| format!("{v}%"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Sum of all entries.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Whether this vector can lay out `column_count` columns: the lengths
    /// agree and no entry is negative.
    #[must_use]
    pub fn fits(&self, column_count: usize) -> bool {
        self.0.len() == column_count && self.0.iter().all(|v| *v >= 0.0)
    }

    /// Copy with `count` entries starting at `start` removed.
    ///
    /// The range is clamped to the vector.
    #[must_use]
    pub fn without_range(&self, start: usize, count: usize) -> Self {
        let start = start.min(self.0.len());
        let end = start.saturating_add(count).min(self.0.len());
        let mut values = Vec::with_capacity(self.0.len() - (end - start));
        values.extend_from_slice(&self.0[..start]);
        values.extend_from_slice(&self.0[end..]);
        Self(values)
    }

    /// Copy with `inserted` spliced in before `index` (clamped to the end).
    #[must_use]
    pub fn with_inserted(&self, index: usize, inserted: &[f64]) -> Self {
        let index = index.min(self.0.len());
        let mut values = Vec::with_capacity(self.0.len() + inserted.len());
        values.extend_from_slice(&self.0[..index]);
        values.extend_from_slice(inserted);
        values.extend_from_slice(&self.0[index..]);
        Self(values)
    }
}

impl fmt::Display for ColumnWidths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl From<Vec<f64>> for ColumnWidths {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for ColumnWidths {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Round to two decimal places.
#[inline]
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Width given to each of `inserted` new columns.
///
/// Every new column gets the average width of the columns that remain
/// after any removal in the same edit, floored at `min_share` and rounded
/// to two decimals. The vector is not renormalised afterwards; the next
/// drag commit or equalisation restores a 100% total.
///
/// With no remaining columns the new ones split 100 evenly.
///
/// `min_share` is a percentage, not derived from the 50px minimum column
/// width the resize handles enforce: the reconciler never knows how wide
/// the rendered table is, so a pixel floor has no percentage here.
#[must_use]
pub fn inserted_column_width(remaining: &ColumnWidths, inserted: usize, min_share: f64) -> f64 {
    if inserted == 0 {
        return 0.0;
    }
    let share = if remaining.is_empty() {
        FULL_WIDTH / inserted as f64
    } else {
        remaining.sum() / remaining.len() as f64
    };
    round2(share.max(min_share))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        assert_eq!(ColumnWidths::parse("30,30,40").as_slice(), &[30.0, 30.0, 40.0]);
        assert_eq!(ColumnWidths::parse(" 12.5 , 87.5 ").as_slice(), &[12.5, 87.5]);
        assert_eq!(ColumnWidths::parse("100").as_slice(), &[100.0]);
    }

    #[test]
    fn parse_rejects_partial_numeric() {
        assert!(ColumnWidths::parse("30,abc,40").is_empty());
        assert!(ColumnWidths::parse("30,,40").is_empty());
        assert!(ColumnWidths::parse("30,NaN").is_empty());
        assert!(ColumnWidths::parse("inf,1").is_empty());
        assert!(ColumnWidths::parse("").is_empty());
    }

    #[test]
    fn serialize_joins_without_exponent() {
        let widths = ColumnWidths::new(vec![33.33, 33.33, 33.34]);
        assert_eq!(widths.serialize(), "33.33,33.33,33.34");
        assert_eq!(ColumnWidths::new(vec![0.0000001]).serialize(), "0.0000001");
        assert_eq!(ColumnWidths::empty().serialize(), "");
    }

    #[test]
    fn equal_distribution_sums_to_100() {
        assert_eq!(ColumnWidths::equal(3).as_slice(), &[33.0, 33.0, 34.0]);
        assert_eq!(ColumnWidths::equal(4).as_slice(), &[25.0, 25.0, 25.0, 25.0]);
        assert_eq!(ColumnWidths::equal(7).sum(), 100.0);
        assert!(ColumnWidths::equal(0).is_empty());
    }

    #[test]
    fn css_tracks() {
        assert_eq!(
            ColumnWidths::new(vec![30.0, 30.5, 39.5]).to_css_tracks(),
            "30% 30.5% 39.5%"
        );
    }

    #[test]
    fn fits_checks_length_and_sign() {
        let widths = ColumnWidths::parse("50,50");
        assert!(widths.fits(2));
        assert!(!widths.fits(3));
        assert!(!ColumnWidths::parse("-5,105").fits(2));
    }

    #[test]
    fn remove_and_insert() {
        let widths = ColumnWidths::parse("30,30,40");
        let removed = widths.without_range(1, 1);
        assert_eq!(removed.as_slice(), &[30.0, 40.0]);
        let inserted = removed.with_inserted(1, &[35.0]);
        assert_eq!(inserted.as_slice(), &[30.0, 35.0, 40.0]);
        assert_eq!(widths.without_range(5, 2), widths);
        assert_eq!(removed.with_inserted(9, &[1.0]).as_slice(), &[30.0, 40.0, 1.0]);
    }

    #[test]
    fn inserted_width_is_average_of_remaining() {
        let remaining = ColumnWidths::parse("30,40");
        assert_eq!(inserted_column_width(&remaining, 1, 1.0), 35.0);
        assert_eq!(inserted_column_width(&remaining, 3, 1.0), 35.0);
        let thirds = ColumnWidths::parse("10,10,5");
        assert_eq!(inserted_column_width(&thirds, 1, 1.0), 8.33);
    }

    #[test]
    fn inserted_width_floor_and_empty() {
        let tiny = ColumnWidths::parse("0.2,0.2");
        assert_eq!(inserted_column_width(&tiny, 1, 1.0), 1.0);
        assert_eq!(inserted_column_width(&ColumnWidths::empty(), 4, 1.0), 25.0);
        assert_eq!(inserted_column_width(&tiny, 0, 1.0), 0.0);
    }

    #[test]
    fn serde_is_transparent() {
        let widths = ColumnWidths::parse("25,75");
        let json = serde_json::to_string(&widths).expect("serialize");
        assert_eq!(json, "[25.0,75.0]");
        let back: ColumnWidths = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, widths);
    }
}
