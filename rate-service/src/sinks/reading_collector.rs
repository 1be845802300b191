use futures::StreamExt;
use tariff_core::IntervalReading;

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Gathers the validated readings into memory for billing.
///
/// In strict mode the first upstream error aborts the run. Otherwise bad
/// records are logged, counted and skipped. The output is sorted by
/// timestamp.
pub struct ReadingCollector {
    strict: bool,
}

impl ReadingCollector {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

#[async_trait::async_trait]
impl Sink<IntervalReading> for ReadingCollector {
    type Output = Vec<IntervalReading>;

    async fn run<S>(&self, mut input: S) -> Result<Vec<IntervalReading>, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<IntervalReading>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut readings = Vec::new();
        let mut skipped: u64 = 0;

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => readings.push(env.payload),
                Err(e) if self.strict => {
                    tracing::error!(error = %e, collected = readings.len(), "rejecting input");
                    return Err(e);
                }
                Err(e) => {
                    skipped += 1;
                    metrics::counter!("interval_readings_skipped_total").increment(1);
                    tracing::warn!(error = %e, "skipping interval reading");
                }
            }
        }

        readings.sort_by_key(|r| r.ts);
        metrics::counter!("interval_readings_collected_total").increment(readings.len() as u64);
        tracing::info!(collected = readings.len(), skipped, "interval readings collected");

        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn items() -> Vec<Result<Envelope<IntervalReading>, PipelineError>> {
        vec![
            Ok(Envelope::new(IntervalReading::new(datetime!(2024-07-06 01:00 -4), 2.0))),
            Err(PipelineError::Source("bad line".to_string())),
            Ok(Envelope::new(IntervalReading::new(datetime!(2024-07-06 00:30 -4), 1.0))),
        ]
    }

    #[tokio::test]
    async fn lenient_collector_skips_errors_and_sorts() {
        let out = ReadingCollector::new(false)
            .run(futures::stream::iter(items()))
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kwh, 1.0);
        assert_eq!(out[1].kwh, 2.0);
    }

    #[tokio::test]
    async fn strict_collector_fails_on_first_error() {
        let res = ReadingCollector::new(true)
            .run(futures::stream::iter(items()))
            .await;
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }
}
