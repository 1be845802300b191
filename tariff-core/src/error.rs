use time::OffsetDateTime;

/// Validation failures surfaced by the billing engine.
///
/// None of these are retryable: the caller either fixes its input or gives up.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TariffError {
    #[error("insufficient data: {found} readings, at least {required} (one full day) are required")]
    InsufficientData { found: usize, required: usize },
    #[error("invalid reading at {ts}: {reason}")]
    InvalidReading { ts: OffsetDateTime, reason: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("no readings found between {start} and {end}")]
    EmptyRange {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
}

pub type Result<T> = std::result::Result<T, TariffError>;
