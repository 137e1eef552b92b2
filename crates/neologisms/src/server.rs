//! `NeologismsServer` builder and server loop.
//!
//! This is the entry point for running a Neologisms server. It ties
//! together all the layers: transport → protocol → room. The HTTP routes
//! share the same room registry and are served alongside.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use neologisms_protocol::{Codec, JsonCodec};
use neologisms_room::{RoomConfig, RoomRegistry};
use neologisms_transport::{Incoming, Transport, WebSocketTransport};
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::http::build_router;
use crate::{NeologismsError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry does its own locking.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Arc<RoomRegistry>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Option<Duration>,
    pub(crate) handshake_timeout: Duration,
    pub(crate) send_timeout: Duration,
}

/// Builder for configuring and starting a Neologisms server.
///
/// # Example
///
/// ```rust,no_run
/// use neologisms::prelude::*;
///
/// # async fn start() -> Result<(), NeologismsError> {
/// let server = NeologismsServer::builder()
///     .bind("0.0.0.0:5021")
///     .http_bind(Some("0.0.0.0:5020"))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct NeologismsServerBuilder {
    config: ServerConfig,
}

impl NeologismsServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces every setting at once, e.g. with [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_owned();
        self
    }

    /// Sets the address of the HTTP routes. `None` serves WebSocket only.
    pub fn http_bind(mut self, addr: Option<&str>) -> Self {
        self.config.http_bind_addr = addr.map(str::to_owned);
        self
    }

    /// Closes connections that stay silent this long. `None` disables it.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Drops peers that take longer than this to finish the handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Drops clients that take longer than this to accept one frame.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.config.send_timeout = timeout;
        self
    }

    /// Sets the settings every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Binds the listeners.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what browser
    /// clients speak.
    pub async fn build(self) -> Result<NeologismsServer<JsonCodec>, NeologismsError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let http = match &self.config.http_bind_addr {
            Some(addr) => Some(TcpListener::bind(addr).await?),
            None => None,
        };

        let state = Arc::new(ServerState {
            registry: Arc::new(RoomRegistry::new(self.config.room)),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
            handshake_timeout: self.config.handshake_timeout,
            send_timeout: self.config.send_timeout,
        });

        Ok(NeologismsServer {
            transport,
            http,
            state,
        })
    }
}

impl Default for NeologismsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Neologisms server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct NeologismsServer<C: Codec> {
    transport: WebSocketTransport,
    http: Option<TcpListener>,
    state: Arc<ServerState<C>>,
}

impl NeologismsServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> NeologismsServerBuilder {
        NeologismsServerBuilder::new()
    }
}

impl<C: Codec> NeologismsServer<C> {
    /// Returns the local address the WebSocket listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the local address of the HTTP routes, if they are served.
    pub fn http_local_addr(&self) -> Option<std::io::Result<SocketAddr>> {
        self.http.as_ref().map(TcpListener::local_addr)
    }

    /// The registry every connection shares.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(&self.state.registry)
    }

    /// Runs the server.
    ///
    /// Spawns a handler task for each accepted connection and serves the
    /// HTTP routes, if bound. Runs until the process is terminated, the
    /// HTTP server fails, or the future is dropped.
    pub async fn run(self) -> Result<(), NeologismsError> {
        let Self {
            transport,
            http,
            state,
        } = self;

        match http {
            Some(listener) => {
                tracing::info!(addr = ?listener.local_addr().ok(), "HTTP routes running");
                let router = build_router(Arc::clone(&state.registry));
                tokio::select! {
                    () = accept_loop(transport, state) => Ok(()),
                    served = axum::serve(listener, router).into_future() => Ok(served?),
                }
            }
            None => {
                accept_loop(transport, state).await;
                Ok(())
            }
        }
    }
}

/// Accepts peers forever. Each handshake runs on the peer's own task under
/// the handshake timeout, so a stalled peer holds up nobody else.
async fn accept_loop<C: Codec>(
    mut transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
) {
    tracing::info!(addr = ?transport.local_addr().ok(), "Neologisms server running");

    loop {
        match transport.accept().await {
            Ok(incoming) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let conn_id = incoming.id();
                    let upgrade = tokio::time::timeout(state.handshake_timeout, incoming.upgrade());
                    let conn = match upgrade.await {
                        Ok(Ok(conn)) => conn,
                        Ok(Err(e)) => {
                            tracing::debug!(%conn_id, error = %e, "handshake failed");
                            return;
                        }
                        Err(_) => {
                            tracing::debug!(%conn_id, "handshake timed out");
                            return;
                        }
                    };
                    if let Err(e) = handle_connection(conn, state).await {
                        tracing::debug!(%conn_id, error = %e, "connection ended with error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}
