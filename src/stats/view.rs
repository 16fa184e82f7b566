//! View computation: one full recomputation of every aggregate for a
//! user-chosen date range.

use super::calculator::{
    CorrelationMatrix, DayKindMean, HourMean, SeasonTotal, StatsCalculator, Summary,
    WeatherDistribution, YearTotal,
};
use crate::data::{DataProcessor, Dataset, Granularity, Observation};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("No data for the selected date range {start} to {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
}

/// Explicit inputs of a single recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

impl ViewRequest {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            granularity: Granularity::default(),
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }
}

/// (x, count) pairs of each weather variable against rentals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherScatter {
    pub temp: Vec<[f64; 2]>,
    pub humidity: Vec<[f64; 2]>,
    pub windspeed: Vec<[f64; 2]>,
}

impl WeatherScatter {
    fn from_rows<T: Observation>(rows: &[&T]) -> Self {
        let mut scatter = Self::default();
        for row in rows {
            let r = row.rental();
            let count = f64::from(r.count);
            scatter.temp.push([r.temp, count]);
            scatter.humidity.push([r.humidity, count]);
            scatter.windspeed.push([r.windspeed, count]);
        }
        scatter
    }
}

/// Every aggregate the dashboard renders for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub request: ViewRequest,
    pub daily_rows: usize,
    pub hourly_rows: usize,
    pub summary: Summary,
    pub yearly: Vec<YearTotal>,
    pub year_delta: Option<i64>,
    pub hourly: Vec<HourMean>,
    pub peak_hour: Option<u8>,
    pub correlation: CorrelationMatrix,
    pub day_kinds: Vec<DayKindMean>,
    pub seasons: Vec<SeasonTotal>,
    pub weather: Vec<WeatherDistribution>,
    pub scatter: WeatherScatter,
}

impl ViewModel {
    pub fn total_for_year(&self, year: i32) -> u64 {
        StatsCalculator::total_for_year(&self.yearly, year)
    }
}

/// Filter both datasets to `request`'s range and compute all aggregates.
///
/// Fails with [`ViewError::EmptyRange`] when either filtered subset is empty.
pub fn compute_view(dataset: &Dataset, request: ViewRequest) -> Result<ViewModel, ViewError> {
    let empty = || ViewError::EmptyRange {
        start: request.start,
        end: request.end,
    };

    let days = DataProcessor::filter_by_date_range(&dataset.daily, request.start, request.end);
    let hours = DataProcessor::filter_by_date_range(&dataset.hourly, request.start, request.end);

    log::debug!(
        "Recomputing view for {}..={}: {} days, {} hours",
        request.start,
        request.end,
        days.len(),
        hours.len()
    );

    if days.is_empty() || hours.is_empty() {
        log::warn!("{}", empty());
        return Err(empty());
    }

    let summary = StatsCalculator::summary(&days).ok_or_else(empty)?;
    let yearly = StatsCalculator::yearly_totals(&days);
    let hourly = StatsCalculator::hourly_means(&hours);

    let scatter = match request.granularity {
        Granularity::Daily => WeatherScatter::from_rows(&days),
        Granularity::Hourly => WeatherScatter::from_rows(&hours),
    };

    Ok(ViewModel {
        request,
        daily_rows: days.len(),
        hourly_rows: hours.len(),
        summary,
        year_delta: StatsCalculator::year_over_year_delta(&yearly),
        yearly,
        peak_hour: StatsCalculator::peak_hour(&hourly),
        hourly,
        correlation: StatsCalculator::correlation_matrix(&days),
        day_kinds: StatsCalculator::day_kind_means(&days),
        seasons: StatsCalculator::season_totals(&days),
        weather: StatsCalculator::weather_distributions(&days),
        scatter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HourRecord, RentalRecord};
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Three days in 2011 totaling 300 and three in 2012 totaling 450,
    /// each with two hourly rows.
    fn two_year_dataset() -> Dataset {
        let days = vec![
            (date(2011, 1, 1), 100),
            (date(2011, 1, 2), 120),
            (date(2011, 1, 3), 80),
            (date(2012, 1, 1), 150),
            (date(2012, 1, 2), 200),
            (date(2012, 1, 3), 100),
        ];

        let daily: Vec<RentalRecord> = days
            .iter()
            .map(|(d, count)| RentalRecord::sample(*d, *count))
            .collect();
        let hourly: Vec<HourRecord> = days
            .iter()
            .flat_map(|(d, count)| {
                [
                    HourRecord {
                        hour: 8,
                        rental: RentalRecord::sample(*d, count / 4),
                    },
                    HourRecord {
                        hour: 17,
                        rental: RentalRecord::sample(*d, count - count / 4),
                    },
                ]
            })
            .collect();

        Dataset::new(daily, hourly)
    }

    #[test]
    fn two_year_fixture_yields_literal_delta() {
        let dataset = two_year_dataset();
        let view = compute_view(&dataset, ViewRequest::new(date(2011, 1, 1), date(2012, 12, 31)))
            .unwrap();

        assert_eq!(view.total_for_year(2011), 300);
        assert_eq!(view.total_for_year(2012), 450);
        assert_eq!(view.year_delta, Some(150));
        assert_eq!(view.summary.total, 750);
        assert_eq!(view.summary.max, 200);
        assert_eq!(view.peak_hour, Some(17));
    }

    #[test]
    fn full_range_keeps_row_counts() {
        let dataset = two_year_dataset();
        let (min, max) = dataset.date_bounds().unwrap();
        let view = compute_view(&dataset, ViewRequest::new(min, max)).unwrap();
        assert_eq!(view.daily_rows, dataset.daily.len());
        assert_eq!(view.hourly_rows, dataset.hourly.len());

        let yearly_sum: u64 = view.yearly.iter().map(|y| y.total).sum();
        let unfiltered: u64 = dataset.daily.iter().map(|r| u64::from(r.count)).sum();
        assert_eq!(yearly_sum, unfiltered);
    }

    #[test]
    fn range_outside_data_is_empty_range() {
        let dataset = two_year_dataset();
        let request = ViewRequest::new(date(2015, 1, 1), date(2015, 12, 31));
        assert_eq!(
            compute_view(&dataset, request),
            Err(ViewError::EmptyRange {
                start: request.start,
                end: request.end,
            })
        );
    }

    #[test]
    fn inverted_range_is_empty_range() {
        let dataset = two_year_dataset();
        let request = ViewRequest::new(date(2012, 1, 3), date(2011, 1, 1));
        assert!(matches!(
            compute_view(&dataset, request),
            Err(ViewError::EmptyRange { .. })
        ));
    }

    #[test]
    fn missing_hourly_rows_is_empty_range() {
        let mut dataset = two_year_dataset();
        dataset.hourly.retain(|h| h.rental.date.year() == 2011);
        let request = ViewRequest::new(date(2012, 1, 1), date(2012, 1, 3));
        assert!(compute_view(&dataset, request).is_err());
    }

    #[test]
    fn single_year_has_no_delta() {
        let dataset = two_year_dataset();
        let view =
            compute_view(&dataset, ViewRequest::new(date(2012, 1, 1), date(2012, 1, 3))).unwrap();
        assert_eq!(view.yearly.len(), 1);
        assert_eq!(view.year_delta, None);
        assert_eq!(view.total_for_year(2011), 0);
    }

    #[test]
    fn granularity_selects_scatter_source() {
        let dataset = two_year_dataset();
        let request = ViewRequest::new(date(2011, 1, 1), date(2011, 1, 3));

        let daily = compute_view(&dataset, request).unwrap();
        assert_eq!(daily.scatter.temp.len(), 3);

        let hourly = compute_view(&dataset, request.with_granularity(Granularity::Hourly)).unwrap();
        assert_eq!(hourly.scatter.humidity.len(), 6);
        assert_eq!(hourly.scatter.windspeed[0][1], 25.0);
    }
}
