pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ui;
pub mod utils;

pub use error::{AcquisitionError, AppError, Result};
