use once_cell::sync::{Lazy, OnceCell};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTERED: OnceCell<()> = OnceCell::new();

pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("metric can be created")
});

pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )
    .expect("metric can be created")
});

pub static SIGNUP_TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "signup_transitions_total",
            "Sign-up wizard steps by outcome",
        ),
        &["step", "outcome"],
    )
    .expect("metric can be created")
});

pub static SEARCH_STALE_RESPONSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "search_stale_responses_total",
        "Admin search responses discarded because a newer search was dispatched",
    )
    .expect("metric can be created")
});

/// Registers all collectors. Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    REGISTERED
        .get_or_try_init(|| {
            REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
            REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
            REGISTRY.register(Box::new(SIGNUP_TRANSITIONS_TOTAL.clone()))?;
            REGISTRY.register(Box::new(SEARCH_STALE_RESPONSES_TOTAL.clone()))?;
            Ok(())
        })
        .map(|_| ())
}

pub fn record_http_request(method: &str, path: &str, status: u16, seconds: f64) {
    let status = status.to_string();
    let labels = [method, path, status.as_str()];
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&labels)
        .observe(seconds);
}

pub fn record_signup_transition(step: &str, outcome: &str) {
    SIGNUP_TRANSITIONS_TOTAL
        .with_label_values(&[step, outcome])
        .inc();
}

pub fn record_stale_search() {
    SEARCH_STALE_RESPONSES_TOTAL.inc();
}

pub fn get_metrics() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
