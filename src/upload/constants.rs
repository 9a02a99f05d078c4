//! Constants for the upload module (timeouts, endpoint paths).

/// HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Per-call deadline covering request upload and response (60 seconds).
///
/// Sized for the binary upload paths, which are the slowest.
pub const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Endpoint that accepts a `.torrent` payload.
pub const TORRENT_ENDPOINT: &str = "torrents/createtorrent";

/// Endpoint that accepts a magnet descriptor.
pub const MAGNET_ENDPOINT: &str = "transfers/create";

/// Endpoint that accepts an NZB payload.
pub const USENET_ENDPOINT: &str = "usenet/createusenetdownload";
