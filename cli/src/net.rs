//! Native transports for a drawing session.
//!
//! `HttpShapeApi` talks to the event-log REST endpoints with reqwest.
//! `WsRelay` is the outbound half of the relay websocket; the inbound half is
//! returned separately as a `RelayStream` so the caller can pump it while
//! the session keeps sending.

use async_trait::async_trait;
use canvas::doc::ShapeId;
use canvas::session::{RelaySink, ShapeApi};
use canvas::sync::SyncError;
use frames::{DeleteResponse, EventLog, RelayMessage, RoomId};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn unavailable(error: impl std::fmt::Display) -> SyncError {
    SyncError::NetworkUnavailable(error.to_string())
}

/// Relay websocket URL for an `http(s)://` base URL.
#[must_use]
pub fn ws_url(base_url: &str, token: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let (scheme, rest) = if let Some(rest) = base.strip_prefix("http://") {
        ("ws", rest)
    } else if let Some(rest) = base.strip_prefix("https://") {
        ("wss", rest)
    } else {
        return None;
    };
    Some(format!("{scheme}://{rest}{}", frames::ws_path(token)))
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpShapeApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpShapeApi {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_owned() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait(?Send)]
impl ShapeApi for HttpShapeApi {
    async fn fetch_events(&self, room_id: &RoomId) -> Result<EventLog, SyncError> {
        let response = self
            .client
            .get(self.url(&frames::events_path(room_id)))
            .send()
            .await
            .map_err(unavailable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::NetworkUnavailable(format!("HTTP {status}")));
        }
        response.json::<EventLog>().await.map_err(unavailable)
    }

    async fn delete_shape(&self, room_id: &RoomId, shape_id: &ShapeId) -> Result<(), SyncError> {
        let response = self
            .client
            .delete(self.url(&frames::shape_path(room_id, shape_id.as_str())))
            .send()
            .await
            .map_err(unavailable)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = response
            .json::<DeleteResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_default();
        Err(SyncError::NetworkUnavailable(format!("HTTP {status}: {detail}")))
    }
}

// =============================================================================
// WEBSOCKET
// =============================================================================

pub struct WsRelay {
    sink: Mutex<SplitSink<WsStream, Message>>,
}

pub struct RelayStream {
    stream: SplitStream<WsStream>,
}

impl WsRelay {
    /// Open the relay websocket.
    ///
    /// # Errors
    ///
    /// [`SyncError::Unauthorized`] when the server rejects the credential with
    /// 401, [`SyncError::NetworkUnavailable`] for any other failure.
    pub async fn connect(url: &str) -> Result<(Self, RelayStream), SyncError> {
        match connect_async(url).await {
            Ok((ws, _response)) => {
                let (sink, stream) = ws.split();
                Ok((Self { sink: Mutex::new(sink) }, RelayStream { stream }))
            }
            Err(tungstenite::Error::Http(response)) if response.status().as_u16() == 401 => Err(SyncError::Unauthorized),
            Err(e) => Err(unavailable(e)),
        }
    }

    /// Send a close frame. Failures are logged.
    pub async fn close(&self) {
        if let Err(e) = self.sink.lock().await.close().await {
            debug!(error = %e, "relay close failed");
        }
    }
}

#[async_trait(?Send)]
impl RelaySink for WsRelay {
    async fn send(&self, message: &RelayMessage) -> Result<(), SyncError> {
        let text = frames::encode_message(message).map_err(unavailable)?;
        self.sink.lock().await.send(Message::text(text)).await.map_err(unavailable)
    }
}

impl RelayStream {
    /// Next relay message from the server. `None` once the connection has
    /// closed. Undecodable messages are logged and skipped.
    ///
    /// # Errors
    ///
    /// [`SyncError::NetworkUnavailable`] when the transport fails.
    pub async fn next(&mut self) -> Option<Result<RelayMessage, SyncError>> {
        loop {
            let frame = match self.stream.next().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(unavailable(e))),
            };
            match frame {
                Message::Text(text) => match frames::decode_message(text.as_str()) {
                    Ok(message) => return Some(Ok(message)),
                    Err(e) => warn!(error = %e, "relay: skipping undecodable message"),
                },
                Message::Close(_) => return None,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "net_test.rs"]
mod net_test;
