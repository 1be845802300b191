use std::{path::Path, sync::Arc};

use tariff_core::IntervalReading;

use crate::config::InputConfig;
use crate::pipeline::{Pipeline, PipelineError};
use crate::sinks::ReadingCollector;
use crate::sources::ReadingFileSource;
use crate::transform::IntervalReadingValidation;

/// Reads, validates and collects every interval reading in `path`.
pub async fn load_readings(
    path: impl AsRef<Path>,
    input: &InputConfig,
) -> Result<Vec<IntervalReading>, PipelineError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), format = ?input.format, strict = input.strict, "loading interval readings");

    let pipeline: Pipeline<_, IntervalReading, _> = Pipeline {
        source: ReadingFileSource::new(input.format, path),
        transforms: vec![Arc::new(IntervalReadingValidation)],
        sink: ReadingCollector::new(input.strict),
    };
    pipeline.run().await
}
