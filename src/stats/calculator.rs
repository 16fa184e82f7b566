//! Statistics Calculator Module
//! Aggregations over the filtered rental rows: totals, group-bys,
//! descriptive statistics and Pearson correlation.

use crate::data::{
    season_label, weather_label, DailyRecord, DataProcessor, DayKind, HourRecord,
};
use chrono::NaiveDate;
use statrs::statistics::Statistics;

/// Columns of the correlation matrix, in display order.
pub const CORRELATION_COLUMNS: [&str; 5] = ["cnt", "temp", "hum", "windspeed", "weathersit"];

/// Descriptive statistics for one group of values.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

/// Headline numbers over the filtered daily rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub days: usize,
    pub total: u64,
    pub mean: f64,
    pub max: u32,
    /// First day reaching `max`.
    pub max_date: NaiveDate,
    pub casual_total: u64,
    pub registered_total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTotal {
    pub year: i32,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourMean {
    pub hour: u8,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayKindMean {
    pub kind: DayKind,
    pub days: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonTotal {
    pub season: u8,
    pub label: &'static str,
    pub total: u64,
}

/// Daily counts observed under one weather situation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherDistribution {
    pub weather: u8,
    pub label: &'static str,
    pub counts: Vec<f64>,
    pub stats: GroupStats,
}

/// Square Pearson correlation matrix over [`CORRELATION_COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<&'static str>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }
}

/// Stateless aggregation functions. Every function is pure over its input.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> GroupStats {
        let n = values.len();
        if n == 0 {
            return GroupStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.mean();
        let median = Self::percentile(&sorted, 50.0);

        let variance = if n > 1 { values.variance() } else { 0.0 };

        GroupStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            variance,
            min: sorted[0],
            max: sorted[n - 1],
            q1: Self::percentile(&sorted, 25.0),
            q3: Self::percentile(&sorted, 75.0),
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Total, mean and maximum count. `None` for an empty slice.
    pub fn summary(days: &[&DailyRecord]) -> Option<Summary> {
        let first = days.first()?;

        let mut total = 0u64;
        let mut casual_total = 0u64;
        let mut registered_total = 0u64;
        let mut max = first.count;
        let mut max_date = first.date;

        for day in days {
            total += u64::from(day.count);
            casual_total += u64::from(day.casual);
            registered_total += u64::from(day.registered);
            if day.count > max {
                max = day.count;
                max_date = day.date;
            }
        }

        Some(Summary {
            days: days.len(),
            total,
            mean: total as f64 / days.len() as f64,
            max,
            max_date,
            casual_total,
            registered_total,
        })
    }

    /// Sum of count per calendar year, ascending by year.
    pub fn yearly_totals(days: &[&DailyRecord]) -> Vec<YearTotal> {
        DataProcessor::group_by_year(days)
            .into_iter()
            .map(|(year, rows)| YearTotal {
                year,
                total: rows.iter().map(|r| u64::from(r.count)).sum(),
            })
            .collect()
    }

    /// Total of a single year; 0 when the year is absent.
    pub fn total_for_year(totals: &[YearTotal], year: i32) -> u64 {
        totals
            .iter()
            .find(|t| t.year == year)
            .map(|t| t.total)
            .unwrap_or(0)
    }

    /// Latest year's total minus the earliest year's. Needs two years.
    pub fn year_over_year_delta(totals: &[YearTotal]) -> Option<i64> {
        if totals.len() < 2 {
            return None;
        }
        let first = totals.first()?;
        let last = totals.last()?;
        Some(last.total as i64 - first.total as i64)
    }

    /// Mean count per hour of day, ascending by hour.
    pub fn hourly_means(hours: &[&HourRecord]) -> Vec<HourMean> {
        DataProcessor::group_by_code(hours, |r| r.hour)
            .into_iter()
            .map(|(hour, rows)| HourMean {
                hour,
                mean: rows.iter().map(|r| f64::from(r.rental.count)).mean(),
            })
            .collect()
    }

    /// Hour with the highest mean; ties resolve to the earliest hour.
    pub fn peak_hour(means: &[HourMean]) -> Option<u8> {
        let mut best: Option<HourMean> = None;
        for m in means {
            match best {
                Some(b) if m.mean > b.mean || (m.mean == b.mean && m.hour < b.hour) => {
                    best = Some(*m)
                }
                None => best = Some(*m),
                _ => {}
            }
        }
        best.map(|b| b.hour)
    }

    /// Pearson correlation of two equally long series.
    ///
    /// NaN when there are fewer than two points or either series is constant.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        if x.len() != y.len() || x.len() < 2 {
            return f64::NAN;
        }

        let sx = x.std_dev();
        let sy = y.std_dev();
        if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
            return f64::NAN;
        }

        let cov = x.covariance(y);
        (cov / (sx * sy)).clamp(-1.0, 1.0)
    }

    /// Correlation among count, temperature, humidity, wind speed and weather.
    pub fn correlation_matrix(days: &[&DailyRecord]) -> CorrelationMatrix {
        let columns: [Vec<f64>; 5] = [
            days.iter().map(|r| f64::from(r.count)).collect(),
            days.iter().map(|r| r.temp).collect(),
            days.iter().map(|r| r.humidity).collect(),
            days.iter().map(|r| r.windspeed).collect(),
            days.iter().map(|r| f64::from(r.weather)).collect(),
        ];

        let k = columns.len();
        let mut values = vec![vec![1.0; k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                let r = Self::pearson(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix {
            labels: CORRELATION_COLUMNS.to_vec(),
            values,
        }
    }

    /// Mean count on weekdays and on weekends. Empty partitions are omitted.
    pub fn day_kind_means(days: &[&DailyRecord]) -> Vec<DayKindMean> {
        DataProcessor::group_by_day_kind(days)
            .into_iter()
            .map(|(kind, rows)| DayKindMean {
                kind,
                days: rows.len(),
                mean: rows.iter().map(|r| f64::from(r.count)).mean(),
            })
            .collect()
    }

    /// Total count per season code, ascending.
    pub fn season_totals(days: &[&DailyRecord]) -> Vec<SeasonTotal> {
        DataProcessor::group_by_code(days, |r| r.season)
            .into_iter()
            .map(|(season, rows)| SeasonTotal {
                season,
                label: season_label(season),
                total: rows.iter().map(|r| u64::from(r.count)).sum(),
            })
            .collect()
    }

    /// Distribution of daily counts per weather situation, ascending by code.
    pub fn weather_distributions(days: &[&DailyRecord]) -> Vec<WeatherDistribution> {
        DataProcessor::group_by_code(days, |r| r.weather)
            .into_iter()
            .map(|(weather, rows)| {
                let counts: Vec<f64> = rows.iter().map(|r| f64::from(r.count)).collect();
                WeatherDistribution {
                    weather,
                    label: weather_label(weather),
                    stats: Self::compute_descriptive_stats(&counts),
                    counts,
                }
            })
            .collect()
    }
}
