//! Record types for the daily and hourly rental datasets.

use chrono::{Datelike, NaiveDate};

/// Meteorological season code (1..=4) as used by the dataset.
pub fn season_label(season: u8) -> &'static str {
    match season {
        1 => "Spring",
        2 => "Summer",
        3 => "Fall",
        4 => "Winter",
        _ => "Unknown",
    }
}

/// Weather situation code: 1 clear, 2 mist/cloudy, 3 light and 4 heavy precipitation.
pub fn weather_label(weather: u8) -> &'static str {
    match weather {
        1 => "Clear",
        2 => "Cloudy",
        3 => "Light Rain/Snow",
        4 => "Heavy Rain/Snow",
        _ => "Unknown",
    }
}

/// Weekday / weekend partition of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    /// Weekday index 0..=4 is a weekday, 5 and 6 are the weekend.
    pub fn from_weekday_index(weekday: u8) -> Self {
        if weekday < 5 {
            DayKind::Weekday
        } else {
            DayKind::Weekend
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayKind::Weekday => "Weekday",
            DayKind::Weekend => "Weekend",
        }
    }
}

/// One row of either dataset minus the hour column.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalRecord {
    pub date: NaiveDate,
    pub season: u8,
    /// 0 for the first year of the dataset, 1 for the second.
    pub year_flag: u8,
    pub month: u8,
    pub holiday: bool,
    pub weekday: u8,
    pub working_day: bool,
    pub weather: u8,
    /// Normalized temperature.
    pub temp: f64,
    /// Normalized feeling temperature.
    pub atemp: f64,
    /// Normalized humidity.
    pub humidity: f64,
    /// Normalized wind speed.
    pub windspeed: f64,
    pub casual: u32,
    pub registered: u32,
    pub count: u32,
}

impl RentalRecord {
    /// Calendar year of the record date.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn day_kind(&self) -> DayKind {
        DayKind::from_weekday_index(self.weekday)
    }
}

/// A row of the daily dataset.
pub type DailyRecord = RentalRecord;

/// A row of the hourly dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct HourRecord {
    pub hour: u8,
    pub rental: RentalRecord,
}

/// Common access to the rental fields of daily and hourly rows.
pub trait Observation {
    fn rental(&self) -> &RentalRecord;

    /// Plain calendar date used for range filtering.
    fn date(&self) -> NaiveDate {
        self.rental().date
    }
}

impl Observation for RentalRecord {
    fn rental(&self) -> &RentalRecord {
        self
    }
}

impl Observation for HourRecord {
    fn rental(&self) -> &RentalRecord {
        &self.rental
    }
}

/// Both loaded datasets. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub daily: Vec<DailyRecord>,
    pub hourly: Vec<HourRecord>,
}

impl Dataset {
    pub fn new(daily: Vec<DailyRecord>, hourly: Vec<HourRecord>) -> Self {
        Self { daily, hourly }
    }

    /// Earliest and latest date of the daily dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.daily.iter().map(|r| r.date).min()?;
        let max = self.daily.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
impl RentalRecord {
    /// Minimal record for aggregation tests; casual/registered split 30/70.
    pub fn sample(date: NaiveDate, count: u32) -> Self {
        let casual = count * 3 / 10;
        Self {
            date,
            season: 1,
            year_flag: u8::from(date.year() > 2011),
            month: date.month() as u8,
            holiday: false,
            weekday: date.weekday().num_days_from_sunday() as u8,
            working_day: true,
            weather: 1,
            temp: 0.5,
            atemp: 0.5,
            humidity: 0.5,
            windspeed: 0.2,
            casual,
            registered: count - casual,
            count,
        }
    }
}
