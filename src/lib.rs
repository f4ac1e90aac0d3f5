// src/lib.rs
pub mod callbacks;
pub mod charts;
pub mod config;
pub mod csv_handler;
pub mod data_types;
pub mod error;
pub mod figure;
pub mod summary;
pub mod ui;

pub use callbacks::VisualizationCallback;
pub use config::Config;
pub use csv_handler::{load_data, CSVHandler};
pub use data_types::{Datasets, Metric, Record, TimeSeriesTable};
pub use error::{DashboardError, DashboardResult, RenderError};
pub use figure::Figure;
pub use summary::{get_country_summary, CountrySummary};
