//! Prometheus counters for the config endpoint
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use simple_submit_core::SubmitRulesError;

/// Outcome label of `simple_submit_config_writes_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Ok,
    BadRequest,
    Forbidden,
    Error,
}

impl WriteOutcome {
    pub fn of<T>(result: &Result<T, SubmitRulesError>) -> Self {
        match result {
            Ok(_) => WriteOutcome::Ok,
            Err(SubmitRulesError::BadRequest(_)) => WriteOutcome::BadRequest,
            Err(SubmitRulesError::Auth(_)) => WriteOutcome::Forbidden,
            Err(_) => WriteOutcome::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOutcome::Ok => "ok",
            WriteOutcome::BadRequest => "bad_request",
            WriteOutcome::Forbidden => "forbidden",
            WriteOutcome::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    config_reads: IntCounter,
    config_writes: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let config_reads = IntCounter::new(
            "simple_submit_config_reads_total",
            "Submit rule configuration reads",
        )?;
        let config_writes = IntCounterVec::new(
            Opts::new(
                "simple_submit_config_writes_total",
                "Submit rule configuration writes by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(config_reads.clone()))?;
        registry.register(Box::new(config_writes.clone()))?;

        Ok(Self {
            registry,
            config_reads,
            config_writes,
        })
    }

    pub fn record_read(&self) {
        self.config_reads.inc();
    }

    pub fn record_write(&self, outcome: WriteOutcome) {
        self.config_writes
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_exported() {
        let metrics = Metrics::new().unwrap();
        metrics.record_read();
        metrics.record_write(WriteOutcome::of::<()>(&Err(SubmitRulesError::bad_request("x"))));

        let text = metrics.encode().unwrap();
        assert!(text.contains("simple_submit_config_reads_total 1"));
        assert!(text.contains("simple_submit_config_writes_total{outcome=\"bad_request\"} 1"));
    }
}
