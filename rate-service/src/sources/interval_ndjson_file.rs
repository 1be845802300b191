use std::path::PathBuf;

use async_stream::stream;
use futures::Stream;
use tariff_core::IntervalReading;
use tokio::{fs::File, io::{AsyncBufReadExt, BufReader}};

use crate::pipeline::{Envelope, PipelineError, Source};

/// NDJSON source of interval readings.
///
/// Each non-blank line is a JSON object `{"ts": "<RFC3339>", "kwh": <number>}`.
pub struct IntervalNdjsonFileSource {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
struct NdjsonReading {
    #[serde(with = "time::serde::rfc3339")]
    ts: time::OffsetDateTime,
    kwh: f64,
}

impl From<NdjsonReading> for IntervalReading {
    fn from(i: NdjsonReading) -> Self {
        IntervalReading::new(i.ts, i.kwh)
    }
}

impl IntervalNdjsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Source<IntervalReading> for IntervalNdjsonFileSource {
    async fn stream(
        &self,
    ) -> std::pin::Pin<Box<dyn Stream<Item = Result<Envelope<IntervalReading>, PipelineError>> + Send>> {
        let path = self.path.clone();
        let s = stream! {
            let file = match File::open(&path).await {
                Ok(f) => f,
                Err(e) => {
                    yield Err(PipelineError::Source(format!(
                        "failed to open NDJSON file {}: {e}",
                        path.display()
                    )));
                    return;
                }
            };
            let mut lines = BufReader::new(file).lines();
            let mut line_no: usize = 0;

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(PipelineError::Source(format!("failed to read NDJSON line: {e}")));
                        return;
                    }
                };
                line_no += 1;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<NdjsonReading>(&line) {
                    Ok(parsed) => {
                        yield Ok(Envelope::new(IntervalReading::from(parsed)));
                    }
                    Err(e) => {
                        metrics::counter!("interval_ndjson_parse_errors_total").increment(1);
                        yield Err(PipelineError::Source(format!(
                            "failed to parse NDJSON line {line_no}: {e}"
                        )));
                    }
                }
            }
        };

        Box::pin(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;
    use time::macros::datetime;

    #[test]
    fn ndjson_line_parses_into_reading() {
        let parsed: NdjsonReading =
            serde_json::from_str(r#"{"ts": "2024-01-03T06:30:00-05:00", "kwh": 0.42}"#).unwrap();
        let reading: IntervalReading = parsed.into();
        assert_eq!(reading.ts, datetime!(2024-01-03 06:30 -5));
        assert_eq!(reading.kwh, 0.42);
    }

    #[test]
    fn ndjson_line_without_offset_is_rejected() {
        let res: Result<NdjsonReading, _> =
            serde_json::from_str(r#"{"ts": "2024-01-03T06:30:00", "kwh": 0.42}"#);
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn bad_line_mid_file_does_not_end_stream() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"ts": "2024-01-03T00:00:00-05:00", "kwh": 1.0}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file, r#"{{"ts": "2024-01-03T00:30:00-05:00", "kwh": 2.0}}"#).unwrap();
        file.flush().unwrap();

        let items: Vec<_> = IntervalNdjsonFileSource::new(file.path())
            .stream()
            .await
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(PipelineError::Source(_))));
        assert_eq!(items[2].as_ref().unwrap().payload.kwh, 2.0);
    }

    #[tokio::test]
    async fn missing_file_yields_single_error() {
        let items: Vec<_> = IntervalNdjsonFileSource::new("/nonexistent/readings.ndjson")
            .stream()
            .await
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
