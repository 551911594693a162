use crate::browser::BrowserError;
use crate::chart::ChartError;
use crate::config::ConfigError;
use crate::reviews::SelectorError;
use crate::sentiment::SentimentError;
use crate::workbook::WorkbookError;

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure that ends a pipeline stage
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}
