use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================

/// Central metrics registry for the service, scraped via /metrics.
pub struct Metrics {
    registry: Registry,

    pub http_requests_total: IntCounterVec,
    pub events_recorded_total: IntCounterVec,
    pub store_errors_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by endpoint and status"),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let events_recorded_total = IntCounterVec::new(
            Opts::new("events_recorded_total", "Mail events recorded by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(events_recorded_total.clone()))?;

        let store_errors_total = IntCounterVec::new(
            Opts::new("store_errors_total", "Counter store failures by operation"),
            &["operation"],
        )?;
        registry.register(Box::new(store_errors_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            events_recorded_total,
            store_errors_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_request(&self, endpoint: &str, status: u16) {
        self.http_requests_total
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    pub fn record_event(&self, kind: &str) {
        self.events_recorded_total.with_label_values(&[kind]).inc();
    }

    pub fn record_store_error(&self, operation: &str) {
        self.store_errors_total.with_label_values(&[operation]).inc();
    }
}

pub async fn metrics_handler(state: web::Data<crate::handlers::AppState>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "catchall-tracker"
    }))
}
