//! Native HTTP server implementation
//!
//! hyper HTTP/1.1 on a multi-threaded tokio runtime:
//! - one task per connection, all sharing one `Arc<App>`
//! - SO_REUSEADDR and TCP_NODELAY on the listening socket
//! - graceful shutdown: stop accepting, ask open connections to finish,
//!   wait up to `shutdown_timeout` for them to drain

use crate::{App, Method, Request, Response, Result, ServerConfig, StatusCode};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Listen backlog
const BACKLOG: i32 = 1024;

/// Poll interval while draining connections
const DRAIN_POLL: Duration = Duration::from_millis(25);

/// Pause after a failed accept; errors like EMFILE persist until a
/// connection closes
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Create a listening TCP socket with optimizations
pub fn create_optimized_socket(addr: &SocketAddr) -> std::io::Result<Socket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // SO_REUSEADDR - allow binding to address in TIME_WAIT
    socket.set_reuse_address(true)?;

    // TCP_NODELAY - disable Nagle's algorithm for lower latency
    socket.set_nodelay(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&(*addr).into())?;
    socket.listen(BACKLOG)?;

    Ok(socket)
}

/// Convert a hyper request head to our Request type
///
/// Returns `None` for methods the app does not know.
pub fn from_hyper_request(req: &hyper::Request<Incoming>) -> Option<Request> {
    let method = Method::parse(req.method().as_str()).ok()?;
    let uri = req.uri();

    let mut request = Request::new(method, uri.path());
    request.query = uri.query().map(str::to_string);

    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            request.headers.push((name.to_string(), v.to_string()));
        }
    }

    Some(request)
}

/// Convert our Response to a hyper Response
///
/// Headers that are not valid HTTP are dropped and logged.
pub fn to_hyper_response(res: Response) -> hyper::Response<Full<Bytes>> {
    let mut out = hyper::Response::new(Full::new(res.body));
    *out.status_mut() = hyper::StatusCode::from_u16(res.status.as_u16())
        .unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);

    for (name, value) in &res.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().append(name, value);
            }
            _ => tracing::warn!(header = %name, "dropping invalid response header"),
        }
    }

    out
}

fn handle(app: &App, req: hyper::Request<Incoming>) -> hyper::Response<Full<Bytes>> {
    let response = match from_hyper_request(&req) {
        Some(request) => app.handle(request),
        None => Response::detail(StatusCode::BAD_REQUEST, "Bad Request"),
    };
    to_hyper_response(response)
}

/// Tracks active connections for graceful shutdown
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    /// Active connection count
    active: AtomicU64,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; it is released when the guard drops
    pub fn track(self: &Arc<Self>) -> ConnectionGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Get current active connection count
    #[inline]
    pub fn count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait until no connection is active or `timeout` passes
    ///
    /// Returns `true` when every connection closed in time.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.count() > 0 {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(DRAIN_POLL).await;
        }
        true
    }
}

/// Live connection handle from [`ConnectionTracker::track`]
#[derive(Debug)]
pub struct ConnectionGuard {
    tracker: Arc<ConnectionTracker>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bound HTTP server
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    tracker: Arc<ConnectionTracker>,
}

impl Server {
    /// Bind the listening socket
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: ServerConfig) -> Result<Self> {
        let addr = config.socket_addr()?;
        let socket = create_optimized_socket(&addr)?;
        let listener = TcpListener::from_std(socket.into())?;

        Ok(Self {
            listener,
            config,
            tracker: Arc::new(ConnectionTracker::new()),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn tracker(&self) -> Arc<ConnectionTracker> {
        Arc::clone(&self.tracker)
    }

    /// Serve until `shutdown` completes, then drain open connections
    pub async fn serve(self, app: Arc<App>, shutdown: impl Future<Output = ()>) -> Result<()> {
        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::pin!(shutdown);

        tracing::info!(addr = %self.local_addr()?, "listening");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::warn!(error = %err, "accept failed");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                            continue;
                        }
                    };

                    if let Err(err) = stream.set_nodelay(true) {
                        tracing::debug!(error = %err, %peer, "set_nodelay failed");
                    }

                    let guard = self.tracker.track();
                    let app = Arc::clone(&app);
                    let mut stop_rx = stop_rx.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let service = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { Ok::<_, Infallible>(handle(&app, req)) }
                        });

                        let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                        tokio::pin!(conn);

                        let result = tokio::select! {
                            res = conn.as_mut() => res,
                            _ = stop_rx.changed() => {
                                conn.as_mut().graceful_shutdown();
                                conn.as_mut().await
                            }
                        };

                        if let Err(err) = result {
                            if !err.is_incomplete_message() {
                                tracing::debug!(error = %err, %peer, "connection error");
                            }
                        }
                    });
                }
                _ = &mut shutdown => {
                    tracing::info!("shutdown signal received, draining connections");
                    break;
                }
            }
        }

        drop(self.listener);
        let _ = stop_tx.send(true);

        if self.tracker.drain(self.config.shutdown_timeout).await {
            tracing::info!("server stopped");
        } else {
            tracing::warn!(
                open = self.tracker.count(),
                "shutdown timeout reached with connections still open"
            );
        }

        Ok(())
    }
}
