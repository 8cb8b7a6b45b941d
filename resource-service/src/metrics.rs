use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct VerificationMetrics {
    registry: Registry,
    verifications: IntCounterVec,
}

impl VerificationMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let verifications = IntCounterVec::new(
            Opts::new(
                "token_verifications_total",
                "Count of access token verifications grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(verifications.clone()))?;

        Ok(Self {
            registry,
            verifications,
        })
    }

    /// `outcome` is `ok` or a verification error code.
    pub fn verification(&self, outcome: &str) {
        self.verifications.with_label_values(&[outcome]).inc();
    }

    /// Current count for `outcome`. Reading never creates a series.
    pub fn verification_count(&self, outcome: &str) -> u64 {
        self.verifications
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                metric
                    .get_label()
                    .iter()
                    .any(|label| label.get_name() == "outcome" && label.get_value() == outcome)
            })
            .map_or(0, |metric| metric.get_counter().get_value() as u64)
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
