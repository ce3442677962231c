//! Middleware implementations
//!
//! Middleware sees every request before routing and every response after
//! the handler, including 404/405 responses.

pub mod cors;
pub mod tracing;

// Re-exports for convenience
pub use cors::{AllowHeaders, Cors, CorsConfig};
pub use self::tracing::{Tracing, TracingConfig};

use crate::{Request, Response};

/// Middleware trait - process request/response
pub trait Middleware: Send + Sync {
    /// Process request before handler
    fn before(&self, req: &mut Request) -> Option<Response>;

    /// Process response after handler
    fn after(&self, req: &Request, res: &mut Response);
}

/// Middleware chain
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run before middlewares, return early response if any
    ///
    /// The early response comes with the index of the middleware that
    /// produced it. Only the middlewares before it get their `after` hook.
    pub fn run_before(&self, req: &mut Request) -> Option<(usize, Response)> {
        for (i, m) in self.middlewares.iter().enumerate() {
            if let Some(res) = m.before(req) {
                return Some((i, res));
            }
        }
        None
    }

    /// Run after middlewares in reverse order
    pub fn run_after(&self, req: &Request, res: &mut Response) {
        self.run_after_from(self.middlewares.len(), req, res);
    }

    /// Run `after` for the first `ran` middlewares, in reverse order
    pub fn run_after_from(&self, ran: usize, req: &Request, res: &mut Response) {
        for m in self.middlewares[..ran.min(self.middlewares.len())].iter().rev() {
            m.after(req, res);
        }
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Method, RequestBuilder, StatusCode};

    struct Tag(&'static str);

    impl Middleware for Tag {
        fn before(&self, _req: &mut Request) -> Option<Response> {
            None
        }

        fn after(&self, _req: &Request, res: &mut Response) {
            res.headers.push(("x-order".to_string(), self.0.to_string()));
        }
    }

    struct Reject;

    impl Middleware for Reject {
        fn before(&self, _req: &mut Request) -> Option<Response> {
            Some(Response::not_found())
        }

        fn after(&self, _req: &Request, res: &mut Response) {
            res.headers.push(("x-order".to_string(), "reject".to_string()));
        }
    }

    fn order(res: &Response) -> Vec<&str> {
        res.headers
            .iter()
            .filter(|(k, _)| k == "x-order")
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn test_after_runs_in_reverse() {
        let mut chain = MiddlewareChain::new();
        chain.add(Tag("outer"));
        chain.add(Tag("inner"));

        let mut req = RequestBuilder::new(Method::Get, "/").build();
        assert!(chain.run_before(&mut req).is_none());

        let mut res = Response::ok();
        chain.run_after(&req, &mut res);
        assert_eq!(order(&res), vec!["inner", "outer"]);
    }

    #[test]
    fn test_short_circuit_skips_later_middlewares() {
        let mut chain = MiddlewareChain::new();
        chain.add(Tag("outer"));
        chain.add(Reject);
        chain.add(Tag("never"));

        let mut req = RequestBuilder::new(Method::Get, "/").build();
        let (ran, mut res) = chain.run_before(&mut req).unwrap();
        assert_eq!(ran, 1);
        assert_eq!(res.status, StatusCode::NOT_FOUND);

        chain.run_after_from(ran, &req, &mut res);
        assert_eq!(order(&res), vec!["outer"]);
    }
}
