//! # HTTP Server
//!
//! HTTP/1 server built on Hyper and Tokio.
//!
//! ## Key Features
//!
//! - One task per connection; requests never wait on each other
//! - Fallback route for anything the router does not match
//! - Graceful shutdown on Ctrl+C or a caller-supplied signal: idle
//!   keep-alive connections are closed, in-flight requests finish
//! - In-process dispatch via [`Server::test_request`]

use crate::api_error::ApiError;
use crate::error::{Error, Result};
use crate::middleware::{Middleware, MiddlewareChain};
use crate::request::ApiRequest;
use crate::response::{plain, ApiResponse};
use crate::router::{Match, Method, Router};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tracing::{debug, error, info, warn};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub address: SocketAddr,
    /// Enable keep-alive connections
    pub keep_alive: bool,
    /// Shutdown timeout for graceful shutdown (default: 30 seconds)
    pub shutdown_timeout: Duration,
    /// Max request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([127, 0, 0, 1], 9090).into(),
            keep_alive: true,
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
        }
    }
}

/// Boxed future returned by a handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = ApiResponse> + Send>>;

/// Route handler
///
/// Handlers copy what they need out of the request and match, then return
/// a `'static` future.
pub type Handler = Arc<dyn Fn(&ApiRequest, &Match) -> HandlerFuture + Send + Sync>;

/// Wrap a closure as a [`Handler`]
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&ApiRequest, &Match) -> HandlerFuture + Send + Sync + 'static,
{
    Arc::new(f)
}

/// HTTP server: router, handlers and middleware
#[derive(Clone, Default)]
pub struct Server {
    config: ServerConfig,
    router: Router,
    handlers: Vec<Handler>,
    middleware: MiddlewareChain,
}

impl Server {
    /// Create a server with the given configuration and no routes
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add a middleware to the chain
    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middleware.add(middleware);
    }

    /// Add a route and its handler
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if the router rejects the path.
    pub fn add_route(&mut self, method: Method, path: &str, handler: Handler) -> Result<()> {
        let handler_id = self.router.add_route(method, path)?;
        debug_assert_eq!(handler_id, self.handlers.len());
        self.handlers.push(handler);
        debug!(%method, path, "Route registered");
        Ok(())
    }

    /// Bind a listener on the configured address
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` if the socket cannot be bound.
    pub fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.address;
        let bind_error = |source| Error::BindError {
            address: addr.to_string(),
            source,
        };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_error)?;
        socket.set_reuseaddr(true).map_err(bind_error)?;
        socket.bind(addr).map_err(bind_error)?;
        socket.listen(1024).map_err(bind_error)
    }

    /// Serve on the configured address until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` if the address cannot be bound.
    pub async fn serve(&self) -> Result<()> {
        let listener = self.bind()?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` completes, then drain
    ///
    /// Once `shutdown` fires no new connections are accepted, idle
    /// keep-alive connections are closed and in-flight requests get up to
    /// `shutdown_timeout` to finish.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the listener address cannot be read.
    pub async fn serve_on<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        info!("Server listening on http://{}", listener.local_addr()?);

        let router = Arc::new(self.router.clone());
        let handlers: Arc<[Handler]> = self.handlers.clone().into();
        let middleware = Arc::new(self.middleware.clone());
        let max_body_size = self.config.max_body_size;
        let keep_alive = self.config.keep_alive;
        let graceful = GracefulShutdown::new();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, remote_addr) = match accept_result {
                        Ok(conn) => conn,
                        Err(err) => {
                            warn!(error = %err, "Failed to accept connection");
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);

                    let router = router.clone();
                    let handlers = handlers.clone();
                    let middleware = middleware.clone();
                    let service = service_fn(move |req| {
                        let router = router.clone();
                        let handlers = handlers.clone();
                        let middleware = middleware.clone();
                        async move {
                            handle_request(req, &router, &handlers, &middleware, remote_addr, max_body_size).await
                        }
                    });

                    let conn = http1::Builder::new()
                        .keep_alive(keep_alive)
                        .serve_connection(io, service);
                    let conn = graceful.watch(conn);

                    tokio::task::spawn(async move {
                        if let Err(err) = conn.await {
                            error!("Error serving connection: {:?}", err);
                        }
                    });
                }
                () = &mut shutdown => {
                    info!("Shutdown signal received, stopping server...");
                    break;
                }
            }
        }

        drop(listener);
        tokio::select! {
            () = graceful.shutdown() => {
                info!("All connections closed");
            }
            () = tokio::time::sleep(self.config.shutdown_timeout) => {
                warn!(
                    timeout_secs = self.config.shutdown_timeout.as_secs(),
                    "Shutdown timeout elapsed with connections still open"
                );
            }
        }
        Ok(())
    }

    /// Execute a request directly without the network stack
    pub async fn test_request(
        &self,
        method: Method,
        path: &str,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> ApiResponse {
        if let Some(b) = body.as_ref() {
            if b.len() > self.config.max_body_size {
                return ApiResponse::text("Payload Too Large")
                    .with_status(StatusCode::PAYLOAD_TOO_LARGE);
            }
        }
        let mut req = ApiRequest::new(method, path, headers, body);

        process_request(&mut req, &self.router, &self.handlers, &self.middleware).await
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for Ctrl+C; shutting down");
    }
}

/// Route, run middleware and handler (network agnostic)
async fn process_request(
    req: &mut ApiRequest,
    router: &Router,
    handlers: &[Handler],
    middleware: &MiddlewareChain,
) -> ApiResponse {
    if req.header(REQUEST_ID_HEADER).is_none() {
        req.set_header(REQUEST_ID_HEADER, &generate_request_id());
    }

    middleware.run_before(req);
    let mut response = match router.match_route(req.method, &req.path) {
        Ok(matched) => {
            req.typed_params.clone_from(&matched.typed_params);
            match handlers.get(matched.handler_id) {
                Some(handler) => handler(&*req, &matched).await,
                None => ApiError::Internal(format!(
                    "no handler registered for id {}",
                    matched.handler_id
                ))
                .into_response(),
            }
        }
        Err(_) => ApiError::PathNotFound.into_response(),
    };

    if let Some(request_id) = req.header(REQUEST_ID_HEADER) {
        response.set_header(REQUEST_ID_HEADER, request_id);
    }
    middleware.run_after(req, &mut response);
    response
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    router: &Router,
    handlers: &[Handler],
    middleware: &MiddlewareChain,
    remote_addr: SocketAddr,
    max_body_size: usize,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let mut api_request = match ApiRequest::from_hyper_with_limit(req, max_body_size).await {
        Ok(r) => r,
        Err(Error::PayloadTooLarge { limit }) => {
            warn!(%remote_addr, limit, "Request body too large");
            return Ok(plain(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large"));
        }
        Err(e) => {
            error!(%remote_addr, "Failed to read request: {}", e);
            return Ok(plain(StatusCode::BAD_REQUEST, "Bad Request"));
        }
    };

    let response = process_request(&mut api_request, router, handlers, middleware).await;
    Ok(response.into_hyper())
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", now.as_nanos(), counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    fn echo_server() -> Server {
        let mut server = Server::new(ServerConfig {
            max_body_size: 8,
            ..ServerConfig::default()
        });
        server
            .add_route(
                Method::Get,
                "/echo/{id:int}",
                handler(|_req, m| {
                    let id = m.get_int("id");
                    Box::pin(async move { ApiResponse::text(format!("{id:?}")) })
                }),
            )
            .unwrap();
        server
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 9090);
        assert!(config.keep_alive);
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_request_ids_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }

    #[tokio::test]
    async fn test_dispatch_to_handler() {
        let resp = echo_server()
            .test_request(Method::Get, "/echo/5", HashMap::new(), None)
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, "Some(5)");
        assert!(resp.header(REQUEST_ID_HEADER).is_some());
    }

    #[tokio::test]
    async fn test_request_id_preserved() {
        let mut headers = HashMap::new();
        headers.insert(REQUEST_ID_HEADER.to_string(), "client-1".to_string());

        let resp = echo_server()
            .test_request(Method::Get, "/echo/5", headers, None)
            .await;
        assert_eq!(resp.header(REQUEST_ID_HEADER), Some("client-1"));
    }

    #[tokio::test]
    async fn test_fallback_route() {
        let server = echo_server();
        for (method, path) in [(Method::Get, "/nope"), (Method::Patch, "/echo/5")] {
            let resp = server.test_request(method, path, HashMap::new(), None).await;
            assert_eq!(resp.status, StatusCode::NOT_FOUND);
            assert_eq!(resp.body, "Path not found");
        }
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let resp = echo_server()
            .test_request(
                Method::Get,
                "/echo/5",
                HashMap::new(),
                Some(Bytes::from_static(b"0123456789")),
            )
            .await;
        assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    async fn spawn(server: Server) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<Result<()>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let serving = tokio::spawn(async move {
            server
                .serve_on(listener, async {
                    let _ = stop_rx.await;
                })
                .await
        });
        (addr, stop_tx, serving)
    }

    /// Read from `stream` until the received text contains `needle`
    async fn read_until(stream: &mut TcpStream, needle: &str) -> String {
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received).into_owned();
            if n == 0 || text.contains(needle) {
                return text;
            }
        }
    }

    #[tokio::test]
    async fn test_chunked_body_over_limit_rejected() {
        let (addr, stop_tx, serving) = spawn(echo_server()).await;

        let chunk = "x".repeat(64);
        let request = format!(
            "GET /echo/5 HTTP/1.1\r\nhost: localhost\r\ntransfer-encoding: chunked\r\n\r\n{:x}\r\n{chunk}\r\n0\r\n\r\n",
            chunk.len()
        );
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        let response = read_until(&mut stream, "\r\n").await;
        assert!(response.starts_with("HTTP/1.1 413"), "{response}");
        drop(stream);

        stop_tx.send(()).unwrap();
        serving.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_keep_alive_connections() {
        let (addr, stop_tx, serving) = spawn(echo_server()).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /echo/5 HTTP/1.1\r\nhost: localhost\r\n\r\n")
            .await
            .unwrap();
        let response = read_until(&mut stream, "Some(5)").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");

        // the connection is now idle but still open
        stop_tx.send(()).unwrap();
        let finished = tokio::time::timeout(Duration::from_secs(5), serving).await;
        tokio_test::assert_ok!(finished).unwrap().unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut server = echo_server();
        let result = server.add_route(
            Method::Get,
            "/echo/{id:int}",
            handler(|_req, _m| Box::pin(async { ApiResponse::json("{}") })),
        );
        assert!(result.is_err());
    }
}
