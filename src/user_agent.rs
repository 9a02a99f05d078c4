//! User-Agent string sent with every service request.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/dropwatch";

/// Default User-Agent for service requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("dropwatch/{version} (folder-uploader; +{PROJECT_UA_URL})")
}
