use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::classifier::{classify, DomainType};
use crate::metrics::{health_handler, metrics_handler, Metrics};
use crate::models::{DomainEvent, GetResponse, Response};
use crate::store::{normalize_domain, CounterStore, StoreError};

// ============================================================================
// Request Handlers
// ============================================================================
//
// Three operations: record-delivered, record-bounced, get-classification.
// The recording endpoints are deliberately not idempotent; repeated reports
// legitimately increment further. Store failures are logged with operation
// context and mapped to a neutral 500 body; they never take down the
// process or leak backend error text to the caller.
//
// ============================================================================

/// Shared per-process state, constructed once in main and injected into
/// every handler. The store handle is the only shared mutable resource.
pub struct AppState {
    pub store: Arc<dyn CounterStore>,
    pub metrics: Arc<Metrics>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/delivered/{domain}")
            .route(web::post().to(record_delivered))
            .route(web::get().to(record_delivered)),
    )
    .service(
        web::resource("/bounced/{domain}")
            .route(web::post().to(record_bounced))
            .route(web::get().to(record_bounced)),
    )
    .route("/domain/{domain}", web::get().to(get_classification))
    .route("/metrics", web::get().to(metrics_handler))
    .route("/health", web::get().to(health_handler));
}

#[derive(Clone, Copy)]
enum EventKind {
    Delivered,
    Bounced,
}

impl EventKind {
    fn label(self) -> &'static str {
        match self {
            EventKind::Delivered => "delivered",
            EventKind::Bounced => "bounced",
        }
    }

    fn deltas(self) -> (u32, u32) {
        match self {
            EventKind::Delivered => (1, 0),
            EventKind::Bounced => (0, 1),
        }
    }
}

pub async fn record_delivered(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    record_event(&state, &path.into_inner(), EventKind::Delivered).await
}

pub async fn record_bounced(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    record_event(&state, &path.into_inner(), EventKind::Bounced).await
}

async fn record_event(state: &AppState, raw_domain: &str, kind: EventKind) -> HttpResponse {
    let endpoint = kind.label();

    let domain = match normalize_domain(raw_domain) {
        Ok(domain) => domain,
        Err(_) => return reject_blank_domain(state, endpoint),
    };

    let (delivered_delta, bounced_delta) = kind.deltas();
    match state
        .store
        .increment_or_create(&domain, delivered_delta, bounced_delta)
        .await
    {
        Ok(()) => {
            state.metrics.record_event(endpoint);
            state.metrics.record_request(endpoint, 200);
            HttpResponse::Ok().json(Response {
                message: format!("Recorded {} event for domain", endpoint),
                response_code: 200,
                error: false,
            })
        }
        Err(e) => {
            tracing::error!(
                operation = "increment_or_create",
                domain = %domain,
                kind = endpoint,
                error = %e,
                "Counter store write failed"
            );
            state.metrics.record_store_error("increment_or_create");
            state.metrics.record_request(endpoint, 500);
            HttpResponse::InternalServerError().json(Response {
                message: "Failed to record event".to_string(),
                response_code: 500,
                error: true,
            })
        }
    }
}

pub async fn get_classification(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let endpoint = "domain";

    let domain = match normalize_domain(&path.into_inner()) {
        Ok(domain) => domain,
        Err(_) => return reject_blank_domain(&state, endpoint),
    };

    match state.store.get(&domain).await {
        Ok(event) => {
            state.metrics.record_request(endpoint, 200);
            classification_response(event)
        }
        // A domain with no record yet is a valid, classifiable zero state.
        Err(StoreError::NotFound) => {
            state.metrics.record_request(endpoint, 200);
            classification_response(DomainEvent::empty(domain))
        }
        Err(e) => {
            tracing::error!(
                operation = "get",
                domain = %domain,
                error = %e,
                "Counter store read failed"
            );
            state.metrics.record_store_error("get");
            state.metrics.record_request(endpoint, 500);
            // A failed read short-circuits: no counts or label are reported
            // from state we could not observe.
            HttpResponse::InternalServerError().json(GetResponse {
                response: Response {
                    message: "Failed to read domain record".to_string(),
                    response_code: 500,
                    error: true,
                },
                event: None,
                domain_type: None,
            })
        }
    }
}

fn classification_response(event: DomainEvent) -> HttpResponse {
    let domain_type: DomainType = classify(event.delivered, event.bounced);
    HttpResponse::Ok().json(GetResponse {
        response: Response {
            message: "Domain classification retrieved".to_string(),
            response_code: 200,
            error: false,
        },
        event: Some(event),
        domain_type: Some(domain_type),
    })
}

fn reject_blank_domain(state: &AppState, endpoint: &str) -> HttpResponse {
    state.metrics.record_request(endpoint, 400);
    HttpResponse::BadRequest().json(Response {
        message: "Domain name must not be empty".to_string(),
        response_code: 400,
        error: true,
    })
}
