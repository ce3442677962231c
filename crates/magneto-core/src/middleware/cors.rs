//! CORS (Cross-Origin Resource Sharing) middleware
//!
//! Answers preflight requests and decorates cross-origin responses.

use super::Middleware;
use crate::{Method, Request, Response, ResponseBuilder, StatusCode};
use smallvec::SmallVec;

/// Allowed request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowHeaders {
    /// Mirror whatever the preflight asks for
    Any,
    /// Fixed list
    List(SmallVec<[String; 8]>),
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (empty = all)
    pub origins: SmallVec<[String; 4]>,
    /// Allowed methods
    pub methods: SmallVec<[Method; 8]>,
    /// Allowed headers
    pub headers: AllowHeaders,
    /// Allow credentials
    pub credentials: bool,
    /// Preflight max age (seconds)
    pub max_age: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: SmallVec::new(),
            methods: smallvec::smallvec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Patch,
                Method::Head,
                Method::Options,
            ],
            headers: AllowHeaders::Any,
            credentials: false,
            max_age: 600,
        }
    }
}

impl CorsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.origins.push(origin.into());
        self
    }

    pub fn allow_headers(mut self, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.headers = AllowHeaders::List(headers.into_iter().map(Into::into).collect());
        self
    }

    pub fn allow_credentials(mut self) -> Self {
        self.credentials = true;
        self
    }
}

/// CORS middleware
pub struct Cors {
    config: CorsConfig,
}

impl Cors {
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }

    /// Any origin, method and header, with credentials
    pub fn permissive() -> Self {
        Self::new(CorsConfig::default().allow_credentials())
    }

    fn is_origin_allowed(&self, origin: &str) -> bool {
        self.config.origins.is_empty() || self.config.origins.iter().any(|o| o == origin || o == "*")
    }

    // `*` is invalid alongside credentials, so the origin is echoed then
    fn origin_value(&self, origin: &str) -> String {
        if self.config.origins.is_empty() && !self.config.credentials {
            "*".to_string()
        } else {
            origin.to_string()
        }
    }

    fn methods_string(&self) -> String {
        self.config
            .methods
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn preflight(&self, req: &Request, origin: &str) -> Response {
        if !self.is_origin_allowed(origin) {
            return ResponseBuilder::new(StatusCode::BAD_REQUEST)
                .header("content-type", "text/plain; charset=utf-8")
                .body("Disallowed CORS origin")
                .build();
        }

        let mut res = Response::text("OK");
        self.add_origin_headers(&mut res, origin);
        res.headers.push((
            "Access-Control-Allow-Methods".to_string(),
            self.methods_string(),
        ));

        let allow_headers = match &self.config.headers {
            AllowHeaders::Any => req
                .header("access-control-request-headers")
                .map(str::to_string),
            AllowHeaders::List(list) if !list.is_empty() => Some(list.join(", ")),
            AllowHeaders::List(_) => None,
        };
        if let Some(headers) = allow_headers {
            res.headers.push(("Access-Control-Allow-Headers".to_string(), headers));
        }

        res.headers.push((
            "Access-Control-Max-Age".to_string(),
            self.config.max_age.to_string(),
        ));
        res
    }

    fn add_origin_headers(&self, res: &mut Response, origin: &str) {
        res.headers.push((
            "Access-Control-Allow-Origin".to_string(),
            self.origin_value(origin),
        ));

        if self.config.credentials {
            res.headers.push((
                "Access-Control-Allow-Credentials".to_string(),
                "true".to_string(),
            ));
        }

        res.headers.push(("Vary".to_string(), "Origin".to_string()));
    }
}

impl Middleware for Cors {
    fn before(&self, req: &mut Request) -> Option<Response> {
        let origin = req.header("origin")?;

        let is_preflight = req.method == Method::Options
            && req.header("access-control-request-method").is_some();

        if is_preflight {
            Some(self.preflight(req, origin))
        } else {
            None
        }
    }

    fn after(&self, req: &Request, res: &mut Response) {
        if let Some(origin) = req.header("origin") {
            if self.is_origin_allowed(origin) {
                self.add_origin_headers(res, origin);
            }
        }
    }
}
