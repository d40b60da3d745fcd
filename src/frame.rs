//! Time-indexed tabular data shared by every generator output.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};

use crate::error::{Error, Result};

/// A point on a time axis usable as a [`TimeFrame`] index.
///
/// Implemented for naive timestamps (generator outputs) and timezone-aware
/// timestamps (schedule outputs). Arithmetic is in absolute time, so adding a
/// step to an aware timestamp crosses DST transitions correctly.
pub trait TimePoint: Copy + Ord + fmt::Display {
    /// Returns this point shifted forward by `delta`.
    fn plus(self, delta: TimeDelta) -> Self;

    /// Returns the signed duration from `earlier` to `self`.
    fn since(self, earlier: Self) -> TimeDelta;
}

impl TimePoint for NaiveDateTime {
    fn plus(self, delta: TimeDelta) -> Self {
        self + delta
    }

    fn since(self, earlier: Self) -> TimeDelta {
        self - earlier
    }
}

impl<Tz> TimePoint for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Copy + fmt::Display,
{
    fn plus(self, delta: TimeDelta) -> Self {
        self + delta
    }

    fn since(self, earlier: Self) -> TimeDelta {
        self.signed_duration_since(earlier)
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<f64>,
}

/// An ordered, strictly-increasing time-indexed table of named `f64` columns.
///
/// Column order is the insertion order and is preserved by every operation
/// that derives one frame from another.
///
/// # Examples
///
/// ```
/// use building_profiles::frame::TimeFrame;
/// use chrono::{NaiveDate, TimeDelta};
///
/// let start = NaiveDate::from_ymd_opt(2023, 1, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .expect("valid literal date");
/// let index: Vec<_> = (0..3).map(|h| start + TimeDelta::hours(h)).collect();
/// let mut frame = TimeFrame::new(index).expect("increasing index");
/// frame.insert("flow_rate", vec![1.0, 2.0, 3.0]).expect("matching length");
/// assert_eq!(frame.sum("flow_rate"), Some(6.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrame<T> {
    index: Vec<T>,
    columns: Vec<Column>,
}

impl<T: TimePoint> TimeFrame<T> {
    /// Creates a frame over the given index with no columns yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the index is not strictly
    /// increasing.
    pub fn new(index: Vec<T>) -> Result<Self> {
        if index.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidInput(
                "time index must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    /// Adds a column, replacing any existing column of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the value count does not match the
    /// index length.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.index.len() {
            return Err(Error::InvalidInput(format!(
                "column length {} does not match index length {}",
                values.len(),
                self.index.len()
            )));
        }
        let name = name.into();
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name == name) {
            existing.values = values;
        } else {
            self.columns.push(Column { name, values });
        }
        Ok(())
    }

    /// The time index.
    pub fn index(&self) -> &[T] {
        &self.index
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Values of the named column, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Iterates over `(name, values)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.values.as_slice()))
    }

    /// Column names in column order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Sum of the named column, if present.
    pub fn sum(&self, name: &str) -> Option<f64> {
        self.column(name).map(|v| v.iter().sum())
    }

    /// Value of `name` at the exact timestamp `at`, if both exist.
    pub fn at(&self, at: T, name: &str) -> Option<f64> {
        let row = self.index.binary_search(&at).ok()?;
        self.column(name).map(|v| v[row])
    }

    /// The regular step of the index, or `None` for frames with fewer than
    /// two rows or an irregular index.
    pub fn infer_freq(&self) -> Option<TimeDelta> {
        let first = self.index.get(1)?.since(self.index[0]);
        for w in self.index.windows(2) {
            if w[1].since(w[0]) != first {
                return None;
            }
        }
        Some(first)
    }
}
