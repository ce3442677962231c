//! HTTP Request types

use crate::{Error, Result};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::time::Instant;

/// HTTP Methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
}

impl Method {
    /// Parse from string
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            "CONNECT" => Ok(Method::Connect),
            "TRACE" => Ok(Method::Trace),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Connect => "CONNECT",
            Method::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP Request
///
/// Only the request head is kept. None of the routes accept a body.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Request path (without query string)
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// Request headers (stack-allocated for small header counts)
    pub headers: SmallVec<[(String, String); 16]>,
    /// Correlation id, set by the tracing middleware
    pub request_id: Option<String>,
    /// When the request was accepted
    pub received_at: Instant,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: SmallVec::new(),
            request_id: None,
            received_at: Instant::now(),
        }
    }

    /// Get a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse query string into key-value pairs
    ///
    /// Repeated keys keep the last value.
    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(query) = &self.query {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                params.insert(url_decode(key), url_decode(value));
            }
        }
        params
    }

    /// Get a single query parameter
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_params().remove(name)
    }
}

/// Builder for constructing requests
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Create a new builder
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request: Request::new(method, path),
        }
    }

    /// Set query string
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.request.query = Some(query.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.push((name.into(), value.into()));
        self
    }

    /// Build the request
    pub fn build(self) -> Request {
        self.request
    }
}

/// Decode `application/x-www-form-urlencoded` text
///
/// Escapes are collected as raw bytes so multi-byte UTF-8 sequences such as
/// `%C3%A1` survive. Invalid UTF-8 is replaced, malformed escapes are kept
/// verbatim.
fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!(Method::parse("GET").unwrap(), Method::Get);
        assert_eq!(Method::parse("options").unwrap(), Method::Options);
        assert!(Method::parse("INVALID").is_err());
    }

    #[test]
    fn test_request_header() {
        let req = RequestBuilder::new(Method::Get, "/")
            .header("Origin", "https://magneto.example")
            .build();

        assert_eq!(req.header("origin"), Some("https://magneto.example"));
        assert_eq!(req.header("ORIGIN"), Some("https://magneto.example"));
        assert_eq!(req.header("referer"), None);
    }

    #[test]
    fn test_query_params() {
        let req = RequestBuilder::new(Method::Get, "/jobs/search")
            .query("q=ui%2Fux+senior&page")
            .build();

        let params = req.query_params();
        assert_eq!(params.get("q"), Some(&"ui/ux senior".to_string()));
        assert_eq!(params.get("page"), Some(&String::new()));
    }

    #[test]
    fn test_query_utf8_and_repeats() {
        let req = RequestBuilder::new(Method::Get, "/jobs/search")
            .query("q=Medell%C3%ADn&q=Bogot%C3%A1")
            .build();

        assert_eq!(req.query_param("q").as_deref(), Some("Bogotá"));
    }

    #[test]
    fn test_malformed_escape_is_kept() {
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
        assert_eq!(url_decode("%4"), "%4");
    }
}
