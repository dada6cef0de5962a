//! Shared User-Agent string for all outgoing requests.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/tubemeta";

/// Default User-Agent (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("tubemeta/{version} (+{PROJECT_UA_URL})")
}
