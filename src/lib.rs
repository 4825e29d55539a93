//! Missing-value imputation and feature preparation for baseball game
//! records headed for a win/loss classifier.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod impute;

pub use config::{FillConfig, MalformedSeasonPolicy};
pub use data::model::{Column, ColumnData, ColumnKind, Table};
pub use error::{Error, Result};
pub use impute::{fill_table, load_and_fill, FillReport};
