use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Classification
// ============================================================================
//
// A domain is empirically "catch-all" only if it absorbs very high delivered
// volume with zero bounces. A single bounce is definitive counter-evidence
// of active mailbox validation, so it overrides any delivered volume.
//
// ============================================================================

/// A domain counts as catch-all once it has strictly more delivered events
/// than this. 1000 delivered exactly is still `Unknown`.
pub const DELIVERED_THRESHOLD: i64 = 1000;

/// At least this many bounces marks a domain not-catch-all.
pub const BOUNCED_THRESHOLD: i64 = 1;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainType {
    #[serde(rename = "catch-all")]
    CatchAll,
    #[serde(rename = "not-catch-all")]
    NotCatchAll,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Derive a domain's classification from its cumulative counters.
///
/// Pure function; the bounce rule is evaluated last so bounce evidence
/// always wins over delivered volume.
pub fn classify(delivered: i64, bounced: i64) -> DomainType {
    let mut domain_type = DomainType::Unknown;
    if delivered > DELIVERED_THRESHOLD {
        domain_type = DomainType::CatchAll;
    }
    if bounced >= BOUNCED_THRESHOLD {
        domain_type = DomainType::NotCatchAll;
    }
    domain_type
}
