//! Per-connection handler: request routing and update delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The task multiplexes three event sources:
//!   1. room updates pushed to this session
//!   2. request frames from the client
//!   3. the idle timer, reset by every client frame
//!
//! Every write is bounded by the send timeout, so a client that stops
//! reading is dropped instead of stalling its task forever.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;

use neologisms_protocol::{ClientFrame, Codec, Response, ServerFrame, SessionId};
use neologisms_room::RoomRegistry;
use neologisms_transport::{Connection, TransportError};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, Sleep};

use crate::NeologismsError;
use crate::api::{self, Session};
use crate::server::ServerState;

/// Drop guard that unsubscribes the session from every room it joined.
///
/// Runs even if the handler panics. Since `Drop` is synchronous, the
/// unsubscribes go out on a fire-and-forget task.
struct SessionGuard {
    session: Session,
    registry: Arc<RoomRegistry>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let rooms = self.session.take_joined();
        if rooms.is_empty() {
            return;
        }
        let session = self.session.id();
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            for room in rooms {
                if let Err(e) = registry.unsubscribe(&room, session).await {
                    tracing::debug!(
                        %session,
                        room_id = %room,
                        error = %e,
                        "unsubscribe on disconnect failed"
                    );
                }
            }
        });
    }
}

/// Just enough of a frame to echo `seq` when the rest fails to decode.
#[derive(Deserialize)]
struct SeqOnly {
    #[serde(default)]
    seq: u64,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C, K>(
    conn: C,
    state: Arc<ServerState<K>>,
) -> Result<(), NeologismsError>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    let conn_id = conn.id();
    let session_id = SessionId(conn_id.into_inner());
    tracing::debug!(%conn_id, %session_id, "handling new connection");

    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
    let mut guard = SessionGuard {
        session: Session::new(session_id, updates_tx),
        registry: Arc::clone(&state.registry),
    };

    let idle_timeout = state.idle_timeout;
    let mut idle = idle_timeout.map(|d| Box::pin(tokio::time::sleep(d)));

    loop {
        tokio::select! {
            biased;

            Some(update) = updates_rx.recv() => {
                send_frame(&conn, &state, &ServerFrame::Update(update)).await?;
            }

            received = conn.recv() => {
                let data = match received {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%session_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%session_id, error = %e, "recv error");
                        break;
                    }
                };
                if let (Some(sleep), Some(timeout)) = (idle.as_mut(), idle_timeout) {
                    sleep.as_mut().reset(Instant::now() + timeout);
                }

                let response = handle_frame(&state, &mut guard.session, &data).await;
                send_frame(&conn, &state, &ServerFrame::Response(response)).await?;
            }

            () = idle_expired(&mut idle) => {
                tracing::info!(%session_id, "connection idle, closing");
                if let Err(e) = conn.close().await {
                    tracing::debug!(%session_id, error = %e, "close failed");
                }
                break;
            }
        }
    }

    // guard drops here → unsubscribes fire.
    Ok(())
}

/// Decodes one client frame and executes it.
///
/// A frame that fails to decode still gets a response, echoing `seq` when
/// it can be recovered.
async fn handle_frame<K: Codec>(
    state: &ServerState<K>,
    session: &mut Session,
    data: &[u8],
) -> Response {
    match state.codec.decode::<ClientFrame>(data) {
        Ok(frame) => {
            tracing::debug!(
                session = %session.id(),
                seq = frame.seq,
                action = frame.request.action(),
                "request"
            );
            api::execute(&state.registry, session, frame.seq, frame.request).await
        }
        Err(e) => {
            let seq = state
                .codec
                .decode::<SeqOnly>(data)
                .map(|s| s.seq)
                .unwrap_or_default();
            tracing::debug!(session = %session.id(), error = %e, "failed to decode frame");
            Response::failure(seq, 400, format!("invalid frame: {e}"))
        }
    }
}

async fn send_frame<C, K>(
    conn: &C,
    state: &ServerState<K>,
    frame: &ServerFrame,
) -> Result<(), NeologismsError>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    let bytes = state.codec.encode(frame)?;
    match tokio::time::timeout(state.send_timeout, conn.send(&bytes)).await {
        Ok(sent) => Ok(sent?),
        Err(_) => {
            tracing::warn!(conn_id = %conn.id(), "client stopped reading, dropping connection");
            Err(NeologismsError::SendTimeout(state.send_timeout))
        }
    }
}

/// Completes when the idle timer fires; never, when there is none.
async fn idle_expired(idle: &mut Option<Pin<Box<Sleep>>>) {
    match idle {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}
