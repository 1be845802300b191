pub mod interval_csv_file;
pub mod interval_ndjson_file;

pub use interval_csv_file::IntervalCsvFileSource;
pub use interval_ndjson_file::IntervalNdjsonFileSource;

use std::{path::PathBuf, pin::Pin};

use futures::Stream;
use tariff_core::IntervalReading;

use crate::config::InputFormat;
use crate::pipeline::{Envelope, PipelineError, Source};

/// File source picked at runtime from the configured input format.
pub enum ReadingFileSource {
    Csv(IntervalCsvFileSource),
    Ndjson(IntervalNdjsonFileSource),
}

impl ReadingFileSource {
    pub fn new<P: Into<PathBuf>>(format: InputFormat, path: P) -> Self {
        match format {
            InputFormat::Csv => Self::Csv(IntervalCsvFileSource::new(path)),
            InputFormat::Ndjson => Self::Ndjson(IntervalNdjsonFileSource::new(path)),
        }
    }
}

#[async_trait::async_trait]
impl Source<IntervalReading> for ReadingFileSource {
    async fn stream(
        &self,
    ) -> Pin<Box<dyn Stream<Item = Result<Envelope<IntervalReading>, PipelineError>> + Send>> {
        match self {
            Self::Csv(s) => s.stream().await,
            Self::Ndjson(s) => s.stream().await,
        }
    }
}
