//! Data Processor Module
//! Date-range filtering and the derived views the aggregations group on.

use super::model::{DayKind, Observation};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Which dataset feeds the row-level charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Daily,
    Hourly,
}

impl Granularity {
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Hourly => "Hourly",
        }
    }
}

/// Stateless filtering and grouping helpers.
pub struct DataProcessor;

impl DataProcessor {
    /// Rows whose plain date lies in the inclusive range `[start, end]`.
    pub fn filter_by_date_range<T: Observation>(
        rows: &[T],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&T> {
        rows.iter()
            .filter(|row| {
                let date = row.date();
                date >= start && date <= end
            })
            .collect()
    }

    /// Group rows by calendar year, ascending.
    pub fn group_by_year<'a, T: Observation>(rows: &[&'a T]) -> BTreeMap<i32, Vec<&'a T>> {
        let mut groups: BTreeMap<i32, Vec<&'a T>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.rental().year()).or_default().push(*row);
        }
        groups
    }

    /// Split rows into weekday and weekend partitions.
    pub fn group_by_day_kind<'a, T: Observation>(
        rows: &[&'a T],
    ) -> BTreeMap<DayKind, Vec<&'a T>> {
        let mut groups: BTreeMap<DayKind, Vec<&'a T>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.rental().day_kind()).or_default().push(*row);
        }
        groups
    }

    /// Group rows by an integer category code (season, weather, hour...).
    pub fn group_by_code<'a, T, F>(rows: &[&'a T], key: F) -> BTreeMap<u8, Vec<&'a T>>
    where
        F: Fn(&T) -> u8,
    {
        let mut groups: BTreeMap<u8, Vec<&'a T>> = BTreeMap::new();
        for row in rows {
            groups.entry(key(*row)).or_default().push(*row);
        }
        groups
    }
}
