use std::fs;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

use crate::config::MetricsConfig;

pub fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("rate_service=info".parse().unwrap_or_else(|_| "info".parse().unwrap()))
        .add_directive("tariff_core=info".parse().unwrap_or_else(|_| "info".parse().unwrap()));

    // Reports go to stdout; keep diagnostics on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Holds the Prometheus recorder's handle until the run finishes.
pub struct MetricsReporter {
    handle: PrometheusHandle,
    cfg: MetricsConfig,
}

impl MetricsReporter {
    /// Installs the global recorder when `[metrics]` is configured.
    pub fn install(cfg: Option<&MetricsConfig>) -> anyhow::Result<Option<Self>> {
        let Some(cfg) = cfg else {
            return Ok(None);
        };
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus metrics recorder")?;
        Ok(Some(Self::new(handle, cfg.clone())))
    }

    fn new(handle: PrometheusHandle, cfg: MetricsConfig) -> Self {
        Self { handle, cfg }
    }

    /// Writes the counters recorded so far to the configured outputs.
    pub fn flush(&self) -> anyhow::Result<()> {
        let rendered = self.handle.render();

        if let Some(path) = &self.cfg.textfile {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write metrics to {}", path.display()))?;
            tracing::info!(path = %path.display(), "metrics written");
        }
        if self.cfg.print {
            eprint!("{rendered}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Envelope, Transform};
    use crate::transform::IntervalReadingValidation;
    use tariff_core::IntervalReading;
    use time::macros::datetime;

    #[test]
    fn rejected_readings_reach_the_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let bad = Envelope::new(IntervalReading::new(datetime!(2024-07-06 00:00 -4), -1.0));

        let res = metrics::with_local_recorder(&recorder, || {
            futures::executor::block_on(IntervalReadingValidation.apply(bad))
        });
        assert!(res.is_err());

        let rendered = recorder.handle().render();
        assert!(rendered.contains("interval_readings_rejected_total 1"), "{rendered}");
    }

    #[test]
    fn flush_writes_textfile() {
        let recorder = PrometheusBuilder::new().build_recorder();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("interval_readings_collected_total").increment(48);
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate_service.prom");
        let reporter = MetricsReporter::new(
            recorder.handle(),
            MetricsConfig {
                textfile: Some(path.clone()),
                print: false,
            },
        );
        reporter.flush().unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("interval_readings_collected_total 48"));
    }
}
