//! Request tracing middleware
//!
//! Assigns request IDs and logs each request through `tracing`.

use super::Middleware;
use crate::{Request, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Header name for request ID
    pub header_name: String,
    /// Generate request ID if not present
    pub generate_id: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            header_name: "X-Request-ID".to_string(),
            generate_id: true,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_id(mut self, generate: bool) -> Self {
        self.generate_id = generate;
        self
    }
}

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique request ID: `<boot stamp>-<sequence>`
pub fn generate_request_id() -> String {
    static BOOT: OnceLock<u32> = OnceLock::new();
    let boot = *BOOT.get_or_init(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32 ^ d.subsec_nanos())
            .unwrap_or_default()
    });
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:08x}-{:012x}", boot, seq)
}

/// Tracing middleware
pub struct Tracing {
    config: TracingConfig,
}

impl Tracing {
    pub fn new(config: TracingConfig) -> Self {
        Self { config }
    }
}

impl Default for Tracing {
    fn default() -> Self {
        Self::new(TracingConfig::default())
    }
}

impl Middleware for Tracing {
    fn before(&self, req: &mut Request) -> Option<Response> {
        let incoming = req
            .header(&self.config.header_name)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        req.request_id = incoming.or_else(|| self.config.generate_id.then(generate_request_id));

        ::tracing::debug!(
            request_id = req.request_id.as_deref().unwrap_or("-"),
            method = %req.method,
            path = %req.path,
            query = req.query.as_deref().unwrap_or(""),
            "request received"
        );

        None
    }

    fn after(&self, req: &Request, res: &mut Response) {
        if let Some(id) = &req.request_id {
            res.headers.push((self.config.header_name.clone(), id.clone()));
        }

        let elapsed_ms = req.received_at.elapsed().as_secs_f64() * 1000.0;
        let request_id = req.request_id.as_deref().unwrap_or("-");

        if res.status.is_server_error() {
            ::tracing::warn!(
                request_id,
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                elapsed_ms,
                "request failed"
            );
        } else {
            ::tracing::info!(
                request_id,
                method = %req.method,
                path = %req.path,
                status = res.status.as_u16(),
                elapsed_ms,
                "request completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, RequestBuilder};

    #[test]
    fn test_request_ids_are_unique() {
        let a = generate_request_id();
        let b = generate_request_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 21);
    }

    #[test]
    fn test_incoming_id_is_echoed() {
        let tracing = Tracing::default();
        let mut req = RequestBuilder::new(Method::Get, "/")
            .header("x-request-id", "abc-123")
            .build();

        assert!(tracing.before(&mut req).is_none());
        assert_eq!(req.request_id.as_deref(), Some("abc-123"));

        let mut res = Response::ok();
        tracing.after(&req, &mut res);
        assert_eq!(res.header("X-Request-ID"), Some("abc-123"));
    }

    #[test]
    fn test_generated_id() {
        let tracing = Tracing::default();
        let mut req = RequestBuilder::new(Method::Get, "/").build();
        tracing.before(&mut req);

        let mut res = Response::ok();
        tracing.after(&req, &mut res);
        assert_eq!(res.header("x-request-id"), req.request_id.as_deref());
        assert!(req.request_id.is_some());
    }

    #[test]
    fn test_generation_disabled() {
        let tracing = Tracing::new(TracingConfig::new().generate_id(false));
        let mut req = RequestBuilder::new(Method::Get, "/").build();
        tracing.before(&mut req);

        let mut res = Response::ok();
        tracing.after(&req, &mut res);
        assert!(req.request_id.is_none());
        assert!(res.header("x-request-id").is_none());
    }
}
