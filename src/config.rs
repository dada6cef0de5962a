//! Fetch configuration shared by the playlist and video pipelines.

use std::time::Duration;

use url::Url;

/// Site origin requests are issued against.
pub const DEFAULT_ORIGIN: &str = "https://www.youtube.com";
/// Bytes read from the response body per parser feed.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Options for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Origin that request paths and uploader links are resolved against.
    pub origin: Url,
    /// Size of the body chunks handed to the markup parser.
    pub chunk_size: usize,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

impl FetchOptions {
    /// Replaces the site origin (used by tests against a mock server).
    #[must_use]
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the body chunk size; zero is raised to one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }
}

fn default_origin() -> Url {
    Url::parse(DEFAULT_ORIGIN)
        .unwrap_or_else(|error| panic!("invalid built-in origin {DEFAULT_ORIGIN}: {error}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FetchOptions::default();
        assert_eq!(options.origin.as_str(), "https://www.youtube.com/");
        assert_eq!(options.chunk_size, 1024);
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.read_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_chunk_size_is_raised() {
        let options = FetchOptions::default().with_chunk_size(0);
        assert_eq!(options.chunk_size, 1);
    }

    #[test]
    fn test_with_origin() {
        let origin = Url::parse("http://127.0.0.1:8080").unwrap();
        let options = FetchOptions::default().with_origin(origin.clone());
        assert_eq!(options.origin, origin);
    }
}
