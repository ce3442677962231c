//! magneto-core: Magneto jobs backend
//!
//! Everything the service does lives here so it can be exercised without a
//! socket:
//! - `listing` - the static job catalog and its substring search
//! - `probe` - the best-effort database diagnostic
//! - `app` - routing, middleware and handlers over an in-memory `Request`
//! - `server` - the hyper/tokio accept loop that feeds `app`

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod middleware;
pub mod probe;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

// Re-exports
pub use app::App;
pub use crate::config::{ServerConfig, Settings};
pub use error::{Error, Result};
pub use listing::{Catalog, JobListing, SearchResults, SAMPLE_JOBS};
pub use probe::{
    Database, DatabaseError, DatabaseHandle, DatabaseResolver, DatabaseStatus, DiagnosticReport,
    EnvSource, NoDatabase, Probe, ProbeLimits, ProcessEnv, ResolveError,
};
pub use request::{Method, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use router::{RouteMatch, Router};
pub use server::{ConnectionTracker, Server};

// Middleware re-exports
pub use middleware::{Cors, CorsConfig, Middleware, MiddlewareChain, Tracing, TracingConfig};
