//! The chronologically ordered bars of one equity.

use std::collections::{vec_deque, VecDeque};

use streaming_iterator::StreamingIterator;
use time::Date;

use crate::Bar;

/// The bars of one equity in strictly ascending date order with no two bars on
/// the same date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeries {
    bars: VecDeque<Bar>,
    first_date: Option<Date>,
    last_date: Option<Date>,
    is_loaded: bool,
}

impl TimeSeries {
    /// Creates a new empty time series with unknown bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty time series whose bounds are already known from the
    /// catalog.
    pub fn with_bounds(first_date: Date, last_date: Date) -> Self {
        Self {
            first_date: Some(first_date),
            last_date: Some(last_date),
            ..Self::default()
        }
    }

    /// Inserts `bar` in date order. Returns `false` and leaves the series
    /// unchanged if a bar with the same date is already present.
    ///
    /// Bars are expected to arrive mostly in ascending order, so the insertion
    /// point is searched for from the most recent bar backward.
    pub fn insert(&mut self, bar: Bar) -> bool {
        if self.bars.is_empty() {
            self.bars.push_back(bar);
            self.first_date = Some(bar.date);
            self.last_date = Some(bar.date);
            return true;
        }
        match self.bars.iter().rposition(|b| b.date <= bar.date) {
            None => {
                self.bars.push_front(bar);
                self.first_date = Some(bar.date);
            }
            Some(i) if self.bars[i].date == bar.date => return false,
            Some(i) if i + 1 == self.bars.len() => {
                self.bars.push_back(bar);
                self.last_date = Some(bar.date);
            }
            Some(i) => self.bars.insert(i + 1, bar),
        }
        true
    }

    /// Returns the number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns `true` if the series contains no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns `true` if the series was populated from its time series file.
    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.is_loaded = true;
    }

    /// Returns the date of the earliest bar, or the first date recorded in the
    /// catalog if no bars have been inserted.
    pub fn first_date(&self) -> Option<Date> {
        self.first_date
    }

    /// Returns the date of the latest bar, or the last date recorded in the
    /// catalog if no bars have been inserted.
    pub fn last_date(&self) -> Option<Date> {
        self.last_date
    }

    /// Returns the bar on `date`, if any.
    pub fn get(&self, date: Date) -> Option<&Bar> {
        self.bars
            .binary_search_by_key(&date, |b| b.date)
            .ok()
            .and_then(|i| self.bars.get(i))
    }

    /// Returns an iterator over the bars in ascending date order.
    pub fn iter(&self) -> vec_deque::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Returns a cursor positioned before the earliest bar.
    pub fn cursor(&self) -> SeriesCursor<'_> {
        SeriesCursor {
            series: self,
            pos: None,
        }
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Bar;
    type IntoIter = vec_deque::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A restartable forward cursor over the bars of a [`TimeSeries`]. Each cursor
/// holds its own position, so any number may traverse the same series.
#[derive(Clone, Debug)]
pub struct SeriesCursor<'a> {
    series: &'a TimeSeries,
    // `None` before the first call to `advance`
    pos: Option<usize>,
}

impl<'a> SeriesCursor<'a> {
    /// Moves the cursor back before the earliest bar.
    pub fn rewind(&mut self) {
        self.pos = None;
    }

    /// Rewinds the cursor and returns the earliest bar.
    pub fn first(&mut self) -> Option<&Bar> {
        self.rewind();
        self.next()
    }
}

impl<'a> StreamingIterator for SeriesCursor<'a> {
    type Item = Bar;

    fn advance(&mut self) {
        self.pos = Some(match self.pos {
            None => 0,
            // saturate past the end so `get` keeps returning `None`
            Some(i) => (i + 1).min(self.series.len()),
        });
    }

    fn get(&self) -> Option<&Self::Item> {
        self.pos.and_then(|i| self.series.bars.get(i))
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use time::macros::date;

    use super::*;

    fn bar(date: Date) -> Bar {
        Bar {
            close: f32::from(date.day()),
            ..Bar::new(date)
        }
    }

    fn dates(series: &TimeSeries) -> Vec<Date> {
        series.iter().map(|b| b.date).collect()
    }

    #[fixture]
    fn series() -> TimeSeries {
        let mut series = TimeSeries::new();
        assert!(series.insert(bar(date!(2020 - 03 - 03))));
        assert!(series.insert(bar(date!(2020 - 01 - 01))));
        assert!(series.insert(bar(date!(2020 - 02 - 02))));
        series
    }

    #[rstest]
    fn test_insert_out_of_order(series: TimeSeries) {
        assert_eq!(
            dates(&series),
            [date!(2020 - 01 - 01), date!(2020 - 02 - 02), date!(2020 - 03 - 03)]
        );
        assert_eq!(series.first_date(), Some(date!(2020 - 01 - 01)));
        assert_eq!(series.last_date(), Some(date!(2020 - 03 - 03)));
    }

    #[rstest]
    fn test_insert_duplicate_rejected(mut series: TimeSeries) {
        let before = series.clone();
        assert!(!series.insert(Bar {
            open: 99.0,
            ..bar(date!(2020 - 02 - 02))
        }));
        assert_eq!(series, before);
        assert_eq!(series.len(), 3);
    }

    #[rstest]
    #[case::front(date!(2019 - 12 - 31), 0)]
    #[case::middle(date!(2020 - 02 - 15), 2)]
    #[case::back(date!(2020 - 04 - 04), 3)]
    fn test_insert_position(mut series: TimeSeries, #[case] date: Date, #[case] exp_pos: usize) {
        assert!(series.insert(bar(date)));
        assert_eq!(dates(&series)[exp_pos], date);
        assert!(dates(&series).windows(2).all(|w| w[0] < w[1]));
        assert_eq!(series.first_date(), series.iter().next().map(|b| b.date));
        assert_eq!(series.last_date(), series.iter().last().map(|b| b.date));
    }

    #[rstest]
    fn test_get(series: TimeSeries) {
        assert_eq!(series.get(date!(2020 - 02 - 02)).unwrap().close, 2.0);
        assert!(series.get(date!(2020 - 02 - 03)).is_none());
    }

    #[test]
    fn test_with_bounds() {
        let series = TimeSeries::with_bounds(date!(1999 - 01 - 04), date!(2018 - 01 - 15));
        assert!(series.is_empty());
        assert!(!series.is_loaded());
        assert_eq!(series.first_date(), Some(date!(1999 - 01 - 04)));
        assert_eq!(series.last_date(), Some(date!(2018 - 01 - 15)));
    }

    #[rstest]
    fn test_cursor(series: TimeSeries) {
        let mut cursor = series.cursor();
        assert!(cursor.get().is_none());
        let mut visited = Vec::new();
        while let Some(bar) = cursor.next() {
            visited.push(bar.date);
        }
        assert_eq!(visited, dates(&series));
        // stays exhausted
        assert!(cursor.next().is_none());
        assert_eq!(cursor.first().map(|b| b.date), Some(date!(2020 - 01 - 01)));
        assert_eq!(cursor.next().map(|b| b.date), Some(date!(2020 - 02 - 02)));
    }

    #[rstest]
    fn test_independent_cursors(series: TimeSeries) {
        let mut a = series.cursor();
        let mut b = series.cursor();
        a.advance();
        a.advance();
        b.advance();
        assert_eq!(a.get().unwrap().date, date!(2020 - 02 - 02));
        assert_eq!(b.get().unwrap().date, date!(2020 - 01 - 01));
    }

    #[test]
    fn test_empty_cursor() {
        let series = TimeSeries::new();
        let mut cursor = series.cursor();
        assert!(cursor.first().is_none());
        assert!(cursor.next().is_none());
    }
}
