use std::{fs::File, path::PathBuf};

use csv::StringRecord;
use futures::Stream;
use tariff_core::IntervalReading;
use time::OffsetDateTime;

use crate::pipeline::{Envelope, PipelineError, Source};

/// CSV source of interval readings.
///
/// Expected header columns (by name, any order, extra columns ignored):
/// - ts (RFC3339 timestamp carrying the utility's local offset)
/// - kwh
pub struct IntervalCsvFileSource {
    path: PathBuf,
}

impl IntervalCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn record_to_reading(record: &StringRecord, headers: &StringRecord) -> Result<IntervalReading, PipelineError> {
    let get = |name: &str| -> Result<&str, PipelineError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| PipelineError::Source(format!("missing column '{name}' in CSV record")))
    };

    let ts_str = get("ts")?;
    let ts = OffsetDateTime::parse(ts_str.trim(), &time::format_description::well_known::Rfc3339)
        .map_err(|e| PipelineError::Source(format!("invalid ts '{ts_str}': {e}")))?;

    let kwh_str = get("kwh")?;
    let kwh: f64 = kwh_str
        .trim()
        .parse()
        .map_err(|e| PipelineError::Source(format!("invalid kwh '{kwh_str}': {e}")))?;

    Ok(IntervalReading::new(ts, kwh))
}

#[async_trait::async_trait]
impl Source<IntervalReading> for IntervalCsvFileSource {
    async fn stream(
        &self,
    ) -> std::pin::Pin<Box<dyn Stream<Item = Result<Envelope<IntervalReading>, PipelineError>> + Send>> {
        // Blocking CSV reader inside a single async task; interval exports are small.
        // Bad records are yielded as errors and reading continues; open, header
        // and I/O failures end the stream.
        let path = self.path.clone();
        let s = async_stream::stream! {
            let file = match File::open(&path) {
                Ok(f) => f,
                Err(e) => {
                    yield Err(PipelineError::Source(format!("failed to open CSV file {}: {e}", path.display())));
                    return;
                }
            };
            let mut rdr = csv::Reader::from_reader(file);
            let headers = match rdr.headers() {
                Ok(h) => h.clone(),
                Err(e) => {
                    yield Err(PipelineError::Source(format!("failed to read CSV headers: {e}")));
                    return;
                }
            };

            for (idx, result) in rdr.records().enumerate() {
                let record = match result {
                    Ok(record) => record,
                    Err(e) if e.is_io_error() => {
                        yield Err(PipelineError::Source(format!("failed to read CSV file: {e}")));
                        return;
                    }
                    Err(e) => {
                        metrics::counter!("interval_csv_parse_errors_total").increment(1);
                        yield Err(PipelineError::Source(format!("malformed CSV record {}: {e}", idx + 1)));
                        continue;
                    }
                };

                match record_to_reading(&record, &headers) {
                    Ok(reading) => {
                        yield Ok(Envelope::new(reading));
                    }
                    Err(e) => {
                        metrics::counter!("interval_csv_parse_errors_total").increment(1);
                        yield Err(e);
                    }
                }
            }
        };

        Box::pin(s)
    }
}
