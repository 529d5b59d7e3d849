use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Invalid amount literal '{0}': expected '<number> <currency>'")]
    InvalidAmount(String),

    #[error("Invalid date range: end {end} precedes begin {begin}")]
    InvalidDateRange {
        begin: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BudgetError>;
