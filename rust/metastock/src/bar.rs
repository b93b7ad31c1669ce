//! The price and volume of an equity over one trading period.

use time::Date;

/// One record of a time series file. Fields that aren't active in the file's
/// [`ActiveFieldSet`](crate::ActiveFieldSet) are zero.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bar {
    /// The trading date.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_date"))]
    pub date: Date,
    /// The time of day for intraday series, as stored in the file.
    pub time: f32,
    /// The opening price.
    pub open: f32,
    /// The highest price.
    pub high: f32,
    /// The lowest price.
    pub low: f32,
    /// The closing price.
    pub close: f32,
    /// The traded volume, truncated from the stored float.
    pub volume: u64,
    /// The open interest.
    pub open_interest: f32,
}

impl Bar {
    /// Creates a bar on `date` with every other field zero.
    pub const fn new(date: Date) -> Self {
        Self {
            date,
            time: 0.0,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0,
            open_interest: 0.0,
        }
    }
}

#[cfg(feature = "serde")]
pub(crate) fn serialize_date<S: serde::Serializer>(
    date: &Date,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}
