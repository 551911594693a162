// Library interface for map_reviews
// The binary and the integration tests both drive the pipeline through here

pub mod browser;
pub mod chart;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod reviews;
pub mod scroll;
pub mod sentiment;
pub mod text;
pub mod workbook;

pub use error::{Error, Result};
