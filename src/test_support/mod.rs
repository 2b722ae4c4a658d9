//! Test utilities and mocks for Depot unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use depot::test_support::{named_source, IndexFixture, MockTransport};
//!
//! #[test]
//! fn test_example() {
//!     let mut transport = MockTransport::new();
//!     transport.respond("https://internal.example.com/user/acme/widget/1.0.0.zip",
//!         HttpResponse::ok(b"PK..."));
//!     transport.unreachable("https://public.example.com");
//!
//!     // Use mocks in tests...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::sources::AuthHeaders;
use crate::store::{HttpResponse, Transport, TransportError};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock transport that serves canned responses and records requests.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: HashMap<String, HttpResponse>,
    unreachable: Vec<String>,
    requests: Mutex<Vec<(String, AuthHeaders)>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// Serve a response for an exact URL.
    pub fn respond(&mut self, url: &str, response: HttpResponse) -> &mut Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Fail every request whose URL starts with the prefix.
    pub fn unreachable(&mut self, prefix: &str) -> &mut Self {
        self.unreachable.push(prefix.to_string());
        self
    }

    /// All requested URLs, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Headers sent with the most recent request.
    pub fn last_headers(&self) -> Option<AuthHeaders> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|(_, headers)| headers.clone())
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, headers: &AuthHeaders) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), headers.clone()));

        if let Some(response) = self.responses.get(url) {
            return Ok(response.clone());
        }

        let message = if self.unreachable.iter().any(|p| url.starts_with(p)) {
            "connection refused"
        } else {
            "no mock response for URL"
        };
        Err(TransportError {
            url: url.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_records_requests() {
        let mut transport = MockTransport::new();
        transport.respond("https://a.example.com/x", HttpResponse::ok("body"));
        transport.unreachable("https://b.example.com");

        let headers = AuthHeaders::new();
        assert_eq!(
            transport.get("https://a.example.com/x", &headers).unwrap().body,
            b"body"
        );
        assert!(transport.get("https://b.example.com/y", &headers).is_err());
        assert!(transport.get("https://c.example.com/z", &headers).is_err());

        assert_eq!(transport.requests().len(), 3);
    }
}
