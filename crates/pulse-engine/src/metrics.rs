use lazy_static::lazy_static;
use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref RUN_ACTIVE: Gauge = Gauge::new(
        "pulse_run_active",
        "Whether a dispatch loop is currently live (1) or idle (0)"
    )
    .expect("metric can be created");
    pub static ref REQUESTS_TOTAL: IntCounter = IntCounter::new(
        "pulse_requests_total",
        "Total number of outbound view requests settled"
    )
    .expect("metric can be created");
    pub static ref SUCCESS_TOTAL: IntCounter = IntCounter::new(
        "pulse_success_total",
        "Total number of requests whose response carried the success marker"
    )
    .expect("metric can be created");
    /// Responses received but unparseable or missing the success marker
    pub static ref PARSE_FAILURES: IntCounter = IntCounter::new(
        "pulse_parse_failures_total",
        "Total number of responses that did not parse or lacked the success marker"
    )
    .expect("metric can be created");
    pub static ref NETWORK_FAILURES: IntCounter = IntCounter::new(
        "pulse_network_failures_total",
        "Total number of requests dropped by connect or transport errors"
    )
    .expect("metric can be created");
    pub static ref TIMEOUT_FAILURES: IntCounter = IntCounter::new(
        "pulse_timeout_failures_total",
        "Total number of requests aborted by the per-call timeout"
    )
    .expect("metric can be created");
}

pub fn register_metrics() {
    let _ = REGISTRY.register(Box::new(RUN_ACTIVE.clone()));
    let _ = REGISTRY.register(Box::new(REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SUCCESS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PARSE_FAILURES.clone()));
    let _ = REGISTRY.register(Box::new(NETWORK_FAILURES.clone()));
    let _ = REGISTRY.register(Box::new(TIMEOUT_FAILURES.clone()));
}

pub fn render_metrics() -> String {
    let metric_families = REGISTRY.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| "# Error: Invalid UTF8".to_string())
}
