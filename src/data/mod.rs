//! Data module - CSV loading, record types and date filtering

mod loader;
mod model;
mod processor;

pub use loader::DataLoader;
pub use model::{
    season_label, weather_label, DailyRecord, Dataset, DayKind, HourRecord, Observation,
    RentalRecord,
};
pub use processor::{DataProcessor, Granularity};
