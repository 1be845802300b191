use crate::pipeline::{Envelope, PipelineError, Transform};
use tariff_core::IntervalReading;
use time::macros::datetime;

/// Pure validation of an `IntervalReading`.
///
/// Rules:
/// - kWh must be finite and non-negative.
/// - ts must be within a broad sanity window [2000-01-01, 2100-01-01].
pub fn validate_interval_reading(
    env: Envelope<IntervalReading>,
) -> Result<Envelope<IntervalReading>, PipelineError> {
    let r = &env.payload;

    r.validate()?;

    let min_ts = datetime!(2000-01-01 00:00:00 UTC);
    let max_ts = datetime!(2100-01-01 00:00:00 UTC);

    if r.ts < min_ts || r.ts > max_ts {
        return Err(PipelineError::Transform(format!(
            "timestamp {} out of allowed range",
            r.ts
        )));
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct IntervalReadingValidation;

#[async_trait::async_trait]
impl Transform<IntervalReading, IntervalReading> for IntervalReadingValidation {
    async fn apply(
        &self,
        input: Envelope<IntervalReading>,
    ) -> Result<Envelope<IntervalReading>, PipelineError> {
        match validate_interval_reading(input) {
            Ok(env) => Ok(env),
            Err(e) => {
                metrics::counter!("interval_readings_rejected_total").increment(1);
                Err(e)
            }
        }
    }
}
