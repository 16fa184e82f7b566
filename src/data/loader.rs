//! CSV Data Loader Module
//! Reads the daily and hourly rental files with Polars and validates them
//! into typed records.

use super::model::{DailyRecord, Dataset, HourRecord, RentalRecord};
use crate::config::{ConfigError, DashboardConfig};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns of the daily file. The hourly file adds `hr`.
pub const DAILY_COLUMNS: [&str; 16] = [
    "instant",
    "dteday",
    "season",
    "yr",
    "mnth",
    "holiday",
    "weekday",
    "workingday",
    "weathersit",
    "temp",
    "atemp",
    "hum",
    "windspeed",
    "casual",
    "registered",
    "cnt",
];

pub const HOUR_COLUMN: &str = "hr";

/// Accepted when the configured format does not match.
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Source not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },
    #[error("Malformed row at line {line} of '{}': {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to load CSV '{}': {source}", .path.display())]
    Csv { path: PathBuf, source: PolarsError },
    #[error("No data rows in '{}'", .path.display())]
    EmptySource { path: PathBuf },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Loads both rental datasets according to a [`DashboardConfig`].
pub struct DataLoader {
    config: DashboardConfig,
}

impl DataLoader {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    /// Load the daily and hourly files. Any malformed row aborts the load.
    pub fn load(&self) -> Result<Dataset, LoaderError> {
        let daily = self.load_daily(&self.config.day_path)?;
        let hourly = self.load_hourly(&self.config.hour_path)?;
        Ok(Dataset::new(daily, hourly))
    }

    /// Load and validate a daily file.
    pub fn load_daily(&self, path: &Path) -> Result<Vec<DailyRecord>, LoaderError> {
        let df = self.read_frame(path, &DAILY_COLUMNS)?;
        let columns = RentalColumns::extract(&df, path)?;

        let records = (0..df.height())
            .map(|i| columns.record(i, &self.config.date_format))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!("Loaded {} daily rows from {}", records.len(), path.display());
        Ok(records)
    }

    /// Load and validate an hourly file. At most one row per (day, hour).
    pub fn load_hourly(&self, path: &Path) -> Result<Vec<HourRecord>, LoaderError> {
        let mut expected = DAILY_COLUMNS.to_vec();
        expected.push(HOUR_COLUMN);

        let df = self.read_frame(path, &expected)?;
        let columns = RentalColumns::extract(&df, path)?;
        let hours = columns.frame.ints(HOUR_COLUMN)?;

        let mut seen: HashSet<(NaiveDate, u8)> = HashSet::with_capacity(df.height());
        let mut records = Vec::with_capacity(df.height());

        for i in 0..df.height() {
            let rental = columns.record(i, &self.config.date_format)?;
            let hour = hours[i]
                .and_then(|h| u8::try_from(h).ok())
                .filter(|h| *h < 24)
                .ok_or_else(|| columns.frame.malformed(i, "'hr' must be an hour between 0 and 23"))?;

            if !seen.insert((rental.date, hour)) {
                return Err(columns.frame.malformed(
                    i,
                    format!("duplicate row for {} hour {}", rental.date, hour),
                ));
            }

            records.push(HourRecord { hour, rental });
        }

        log::info!("Loaded {} hourly rows from {}", records.len(), path.display());
        Ok(records)
    }

    /// Read a delimited file and check its header against `expected`.
    fn read_frame(&self, path: &Path, expected: &[&str]) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let separator = self.config.delimiter_byte()?;
        check_field_counts(path, separator)?;

        // Full-file schema inference so a stray text value turns the column
        // into strings and is reported with its line below.
        let df = LazyCsvReader::new(path)
            .with_separator(separator)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| LoaderError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for name in expected {
            if !columns.iter().any(|c| c == name) {
                return Err(LoaderError::MalformedRow {
                    path: path.to_path_buf(),
                    line: 1,
                    reason: format!("missing column '{name}'"),
                });
            }
        }
        if let Some(extra) = columns.iter().find(|c| !expected.contains(&c.as_str())) {
            return Err(LoaderError::MalformedRow {
                path: path.to_path_buf(),
                line: 1,
                reason: format!("unexpected column '{extra}'"),
            });
        }

        if df.height() == 0 {
            return Err(LoaderError::EmptySource {
                path: path.to_path_buf(),
            });
        }

        Ok(df)
    }
}

/// Typed column access with errors tied to the source file.
struct Frame<'a> {
    df: &'a DataFrame,
    path: &'a Path,
}

impl Frame<'_> {
    fn csv_error(&self, source: PolarsError) -> LoaderError {
        LoaderError::Csv {
            path: self.path.to_path_buf(),
            source,
        }
    }

    /// Row index 0 is the first data line, i.e. line 2 of the file.
    fn malformed(&self, row: usize, reason: impl Into<String>) -> LoaderError {
        LoaderError::MalformedRow {
            path: self.path.to_path_buf(),
            line: row + 2,
            reason: reason.into(),
        }
    }

    fn cast(&self, name: &str, dtype: &DataType) -> Result<Series, LoaderError> {
        self.df
            .column(name)
            .and_then(|col| col.as_materialized_series().cast(dtype))
            .map_err(|e| self.csv_error(e))
    }

    fn ints(&self, name: &str) -> Result<Vec<Option<i64>>, LoaderError> {
        // A float column would be truncated by the cast.
        let source = self.df.column(name).map_err(|e| self.csv_error(e))?;
        if source.dtype().is_float() {
            let values = self.floats(name)?;
            if let Some(row) = values
                .iter()
                .position(|v| v.is_some_and(|v| v.fract() != 0.0))
            {
                return Err(self.malformed(row, format!("'{name}' must be a whole number")));
            }
        }

        let series = self.cast(name, &DataType::Int64)?;
        let ca = series.i64().map_err(|e| self.csv_error(e))?;
        Ok(ca.into_iter().collect())
    }

    fn floats(&self, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
        let series = self.cast(name, &DataType::Float64)?;
        let ca = series.f64().map_err(|e| self.csv_error(e))?;
        Ok(ca.into_iter().collect())
    }

    fn strings(&self, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
        let series = self.cast(name, &DataType::String)?;
        let ca = series.str().map_err(|e| self.csv_error(e))?;
        Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
    }
}

/// The columns shared by both files, materialized once per load.
struct RentalColumns<'a> {
    frame: Frame<'a>,
    dteday: Vec<Option<String>>,
    season: Vec<Option<i64>>,
    yr: Vec<Option<i64>>,
    mnth: Vec<Option<i64>>,
    holiday: Vec<Option<i64>>,
    weekday: Vec<Option<i64>>,
    workingday: Vec<Option<i64>>,
    weathersit: Vec<Option<i64>>,
    temp: Vec<Option<f64>>,
    atemp: Vec<Option<f64>>,
    hum: Vec<Option<f64>>,
    windspeed: Vec<Option<f64>>,
    casual: Vec<Option<i64>>,
    registered: Vec<Option<i64>>,
    cnt: Vec<Option<i64>>,
}

impl<'a> RentalColumns<'a> {
    fn extract(df: &'a DataFrame, path: &'a Path) -> Result<Self, LoaderError> {
        let frame = Frame { df, path };
        Ok(Self {
            dteday: frame.strings("dteday")?,
            season: frame.ints("season")?,
            yr: frame.ints("yr")?,
            mnth: frame.ints("mnth")?,
            holiday: frame.ints("holiday")?,
            weekday: frame.ints("weekday")?,
            workingday: frame.ints("workingday")?,
            weathersit: frame.ints("weathersit")?,
            temp: frame.floats("temp")?,
            atemp: frame.floats("atemp")?,
            hum: frame.floats("hum")?,
            windspeed: frame.floats("windspeed")?,
            casual: frame.ints("casual")?,
            registered: frame.ints("registered")?,
            cnt: frame.ints("cnt")?,
            frame,
        })
    }

    fn record(&self, i: usize, date_format: &str) -> Result<RentalRecord, LoaderError> {
        let raw_date = self.dteday[i]
            .as_deref()
            .ok_or_else(|| self.frame.malformed(i, "missing value in 'dteday'"))?;
        let date = parse_date(raw_date, date_format).ok_or_else(|| {
            self.frame
                .malformed(i, format!("'{raw_date}' does not match date format {date_format}"))
        })?;

        let record = RentalRecord {
            date,
            season: self.small(i, &self.season, "season")?,
            year_flag: self.small(i, &self.yr, "yr")?,
            month: self.small(i, &self.mnth, "mnth")?,
            holiday: self.flag(i, &self.holiday, "holiday")?,
            weekday: self.small(i, &self.weekday, "weekday")?,
            working_day: self.flag(i, &self.workingday, "workingday")?,
            weather: self.small(i, &self.weathersit, "weathersit")?,
            temp: self.real(i, &self.temp, "temp")?,
            atemp: self.real(i, &self.atemp, "atemp")?,
            humidity: self.real(i, &self.hum, "hum")?,
            windspeed: self.real(i, &self.windspeed, "windspeed")?,
            casual: self.count(i, &self.casual, "casual")?,
            registered: self.count(i, &self.registered, "registered")?,
            count: self.count(i, &self.cnt, "cnt")?,
        };

        if u64::from(record.casual) + u64::from(record.registered) != u64::from(record.count) {
            return Err(self.frame.malformed(
                i,
                format!(
                    "cnt {} is not casual {} + registered {}",
                    record.count, record.casual, record.registered
                ),
            ));
        }

        Ok(record)
    }

    fn int(&self, i: usize, values: &[Option<i64>], name: &str) -> Result<i64, LoaderError> {
        values[i].ok_or_else(|| {
            self.frame
                .malformed(i, format!("missing or non-integer value in '{name}'"))
        })
    }

    fn small(&self, i: usize, values: &[Option<i64>], name: &str) -> Result<u8, LoaderError> {
        let v = self.int(i, values, name)?;
        u8::try_from(v).map_err(|_| self.frame.malformed(i, format!("'{name}' out of range: {v}")))
    }

    fn flag(&self, i: usize, values: &[Option<i64>], name: &str) -> Result<bool, LoaderError> {
        match self.int(i, values, name)? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(self.frame.malformed(i, format!("'{name}' must be 0 or 1, got {v}"))),
        }
    }

    fn count(&self, i: usize, values: &[Option<i64>], name: &str) -> Result<u32, LoaderError> {
        let v = self.int(i, values, name)?;
        u32::try_from(v).map_err(|_| self.frame.malformed(i, format!("'{name}' out of range: {v}")))
    }

    fn real(&self, i: usize, values: &[Option<f64>], name: &str) -> Result<f64, LoaderError> {
        values[i]
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.frame.malformed(i, format!("missing or non-numeric value in '{name}'")))
    }
}

/// Every non-blank line must have as many fields as the header.
fn check_field_counts(path: &Path, separator: u8) -> Result<(), LoaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let delimiter = char::from(separator);

    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());
    let Some((_, header)) = lines.next() else {
        return Ok(());
    };
    let expected = header.split(delimiter).count();

    for (index, line) in lines {
        let found = line.split(delimiter).count();
        if found != expected {
            return Err(LoaderError::MalformedRow {
                path: path.to_path_buf(),
                line: index + 1,
                reason: format!("expected {expected} fields, found {found}"),
            });
        }
    }
    Ok(())
}

fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, format)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const DAY_HEADER: &str = "instant;dteday;season;yr;mnth;holiday;weekday;workingday;weathersit;temp;atemp;hum;windspeed;casual;registered;cnt";
    const HOUR_HEADER: &str = "instant;dteday;season;yr;mnth;hr;holiday;weekday;workingday;weathersit;temp;atemp;hum;windspeed;casual;registered;cnt";

    fn write_file(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    fn loader() -> DataLoader {
        DataLoader::new(DashboardConfig::default())
    }

    #[test]
    fn loads_semicolon_file_with_day_first_dates() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;0.344167;0.363625;0.805833;0.160446;331;654;985",
                "2;02/01/2011;1;0;1;0;0;0;2;0.363478;0.353739;0.696087;0.248539;131;670;801",
                "3;13/02/2012;1;1;2;0;1;1;1;0.2;0.21;0.5;0.1;100;900;1000",
            ],
        );

        let rows = loader().load_daily(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2012, 2, 13).unwrap());
        assert_eq!(rows[1].weekday, 0);
        assert_eq!(rows[0].weather, 2);
        assert!((rows[0].humidity - 0.805833).abs() < 1e-9);
        assert!(rows
            .iter()
            .all(|r| r.count == r.casual + r.registered));
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let err = loader()
            .load_daily(&dir.path().join("absent.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::SourceNotFound { .. }));
    }

    #[test]
    fn non_numeric_field_is_malformed_with_line() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;985",
                "2;02/01/2011;1;0;1;0;0;0;2;0.3;0.3;0.6;0.2;131;670;lots",
            ],
        );

        match loader().load_daily(&path).unwrap_err() {
            LoaderError::MalformedRow { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("cnt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_and_extra_columns_are_malformed() {
        let dir = TempDir::new().unwrap();
        let missing = write_file(
            &dir,
            "missing.csv",
            &["instant;dteday;cnt", "1;01/01/2011;985"],
        );
        assert!(matches!(
            loader().load_daily(&missing).unwrap_err(),
            LoaderError::MalformedRow { line: 1, .. }
        ));

        let extra_header = format!("{DAY_HEADER};comment");
        let extra = write_file(
            &dir,
            "extra.csv",
            &[
                extra_header.as_str(),
                "1;01/01/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;985;x",
            ],
        );
        match loader().load_daily(&extra).unwrap_err() {
            LoaderError::MalformedRow { reason, .. } => assert!(reason.contains("comment")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extra_field_on_data_row_is_malformed_with_line() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;985",
                "2;02/01/2011;1;0;1;0;0;0;2;0.3;0.3;0.6;0.2;131;670;801;999",
            ],
        );
        match loader().load_daily(&path).unwrap_err() {
            LoaderError::MalformedRow { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("found 17"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_data_row_is_malformed_with_line() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;985",
                "2;02/01/2011;1;0;1;0;0;0;2;0.3;0.3;0.6;0.2;131;670",
            ],
        );
        assert!(matches!(
            loader().load_daily(&path).unwrap_err(),
            LoaderError::MalformedRow { line: 3, .. }
        ));
    }

    #[test]
    fn fractional_integer_field_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;985",
                "2;02/01/2011;1;0;1;0;6.9;0;2;0.3;0.3;0.6;0.2;131;670;801",
            ],
        );
        match loader().load_daily(&path).unwrap_err() {
            LoaderError::MalformedRow { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("weekday"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_numeric_field_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;;0.3;0.8;0.1;331;654;985",
            ],
        );
        assert!(matches!(
            loader().load_daily(&path).unwrap_err(),
            LoaderError::MalformedRow { line: 2, .. }
        ));
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;900",
            ],
        );
        assert!(matches!(
            loader().load_daily(&path).unwrap_err(),
            LoaderError::MalformedRow { .. }
        ));
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;31/02/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;985",
            ],
        );
        match loader().load_daily(&path).unwrap_err() {
            LoaderError::MalformedRow { reason, .. } => assert!(reason.contains("31/02/2011")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hourly_rows_carry_hour_and_reject_duplicates() {
        let dir = TempDir::new().unwrap();
        let ok = write_file(
            &dir,
            "hour.csv",
            &[
                HOUR_HEADER,
                "1;01/01/2011;1;0;1;0;0;6;0;1;0.24;0.2879;0.81;0.0;3;13;16",
                "2;01/01/2011;1;0;1;1;0;6;0;1;0.22;0.2727;0.8;0.0;8;32;40",
            ],
        );
        let rows = loader().load_hourly(&ok).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].hour, 1);
        assert_eq!(rows[1].rental.count, 40);

        let duplicate = write_file(
            &dir,
            "dup.csv",
            &[
                HOUR_HEADER,
                "1;01/01/2011;1;0;1;0;0;6;0;1;0.24;0.2879;0.81;0.0;3;13;16",
                "2;01/01/2011;1;0;1;0;0;6;0;1;0.22;0.2727;0.8;0.0;8;32;40",
            ],
        );
        match loader().load_hourly(&duplicate).unwrap_err() {
            LoaderError::MalformedRow { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_reads_both_configured_files() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "day.csv",
            &[
                DAY_HEADER,
                "1;01/01/2011;1;0;1;0;6;0;2;0.3;0.3;0.8;0.1;331;654;985",
            ],
        );
        write_file(
            &dir,
            "hour.csv",
            &[
                HOUR_HEADER,
                "1;01/01/2011;1;0;1;0;0;6;0;1;0.24;0.2879;0.81;0.0;3;13;16",
            ],
        );

        let config = DashboardConfig::default().with_data_dir(dir.path());
        let dataset = DataLoader::new(config).load().unwrap();
        assert_eq!(dataset.daily.len(), 1);
        assert_eq!(dataset.hourly.len(), 1);
    }

    #[test]
    fn header_only_file_is_empty_source() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "day.csv", &[DAY_HEADER]);
        assert!(matches!(
            loader().load_daily(&path).unwrap_err(),
            LoaderError::EmptySource { .. }
        ));
    }
}
