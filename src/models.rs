use serde::{Deserialize, Serialize};

use crate::classifier::DomainType;

// ============================================================================
// Domain Models & Wire Types
// ============================================================================

/// Per-domain event counters. One record exists per domain; both counters
/// start at zero and only ever increase.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DomainEvent {
    pub domain: String,
    pub delivered: i64,
    pub bounced: i64,
}

impl DomainEvent {
    /// Zero-valued record for a domain with no observed events yet.
    pub fn empty(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            delivered: 0,
            bounced: 0,
        }
    }
}

/// Envelope returned by the event-recording endpoints.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Response {
    pub message: String,
    pub response_code: u16,
    pub error: bool,
}

/// Envelope returned by the classification endpoint. `event` and
/// `domain_type` are omitted when the underlying read failed.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GetResponse {
    #[serde(flatten)]
    pub response: Response,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<DomainEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<DomainType>,
}
