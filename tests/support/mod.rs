#![allow(dead_code)]

pub mod socket_guard;

use std::path::{Path, PathBuf};
use std::time::Duration;

use dropwatch_core::{ApiClient, ApiCredential, ServiceSettings};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";

/// Minimal bencoded torrent body.
pub const TORRENT_BYTES: &[u8] = b"d8:announce20:http://tracker/ann4:infod4:name4:testee";

pub const NZB_BYTES: &[u8] =
    b"<?xml version=\"1.0\"?><nzb xmlns=\"http://www.newzbin.com/DTD/2003/nzb\"></nzb>";

/// Settings pointing at the mock server with the given call deadline.
pub fn settings_for(server: &MockServer, call_timeout: Duration) -> ServiceSettings {
    let mut settings = ServiceSettings::new(&server.uri(), ApiCredential::new(TEST_API_KEY))
        .expect("mock server uri is a valid base");
    settings.call_timeout = call_timeout;
    settings
}

pub fn client_for(server: &MockServer, call_timeout: Duration) -> ApiClient {
    ApiClient::new(settings_for(server, call_timeout)).expect("client builds")
}

pub fn drop_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write test file");
    path
}

pub fn accepted_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "detail": "Found cached torrent. Using cached torrent.",
        "data": { "created_at": "2024-05-01T12:30:00Z" }
    })
}
