//! Stats module - Aggregations and the per-request view model

mod calculator;
mod view;

pub use calculator::{
    CorrelationMatrix, DayKindMean, HourMean, SeasonTotal, WeatherDistribution, YearTotal,
};
pub use view::{compute_view, ViewError, ViewModel, ViewRequest};
