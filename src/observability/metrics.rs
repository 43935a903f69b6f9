use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub telemetry_ingested_total: IntCounterVec,
    pub telemetry_rejected_total: IntCounterVec,
    pub roster_changes_total: IntCounterVec,
    pub report_latency_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let telemetry_ingested_total = IntCounterVec::new(
            Opts::new(
                "telemetry_ingested_total",
                "Observations appended to assignments by kind",
            ),
            &["kind"],
        )
        .expect("valid telemetry_ingested_total metric");

        let telemetry_rejected_total = IntCounterVec::new(
            Opts::new(
                "telemetry_rejected_total",
                "Telemetry pushes refused by reason",
            ),
            &["reason"],
        )
        .expect("valid telemetry_rejected_total metric");

        let roster_changes_total = IntCounterVec::new(
            Opts::new(
                "roster_changes_total",
                "Roster add/remove results by kind and outcome",
            ),
            &["kind", "outcome"],
        )
        .expect("valid roster_changes_total metric");

        let report_latency_seconds = Histogram::with_opts(HistogramOpts::new(
            "report_latency_seconds",
            "Latency of attendance report generation in seconds",
        ))
        .expect("valid report_latency_seconds metric");

        registry
            .register(Box::new(telemetry_ingested_total.clone()))
            .expect("register telemetry_ingested_total");
        registry
            .register(Box::new(telemetry_rejected_total.clone()))
            .expect("register telemetry_rejected_total");
        registry
            .register(Box::new(roster_changes_total.clone()))
            .expect("register roster_changes_total");
        registry
            .register(Box::new(report_latency_seconds.clone()))
            .expect("register report_latency_seconds");

        Self {
            registry,
            telemetry_ingested_total,
            telemetry_rejected_total,
            roster_changes_total,
            report_latency_seconds,
        }
    }

    pub fn record_roster(&self, kind: &str, outcome: &str, count: usize) {
        if count > 0 {
            self.roster_changes_total
                .with_label_values(&[kind, outcome])
                .inc_by(count as u64);
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
