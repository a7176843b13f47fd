//! Websocket transport loop over `tokio-tungstenite`.

use std::future::Future;

use futures::{SinkExt, StreamExt};
use gyro_servo::ServoDriver;
use gyro_settings::SessionPersistence;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

use crate::errors::ClientError;
use crate::manager::ConnectionManager;

/// Connect to `url` and run `manager` until the connection ends.
///
/// Returns `Ok(())` when the peer closes, the stream ends, or `shutdown`
/// resolves (a close frame is sent first). Transport failures are reported
/// to the manager and returned as errors. Frames are handled one at a time.
pub async fn run<P, D, F>(
    url: &str,
    manager: &mut ConnectionManager<P, D>,
    shutdown: F,
) -> Result<(), ClientError>
where
    P: SessionPersistence,
    D: ServoDriver,
    F: Future<Output = ()>,
{
    manager.begin_connect()?;
    install_tls_provider();
    info!(endpoint = url, "connecting to relay");

    let (ws, _) = match connect_async(url).await {
        Ok(conn) => conn,
        Err(e) => {
            manager.on_error(&e);
            return Err(ClientError::Connect(e.to_string()));
        }
    };
    let (mut ws_tx, mut ws_rx) = ws.split();

    let identify = manager.on_open()?;
    let frame = identify.to_json().map_err(|e| ClientError::Send(e.to_string()))?;
    if let Err(e) = ws_tx.send(Message::Text(frame.clone().into())).await {
        manager.on_error(&e);
        return Err(ClientError::Send(e.to_string()));
    }
    debug!(frame = %frame, "sent");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => {
                let _ = ws_tx.send(Message::Close(None)).await;
                manager.on_close(Some("shutdown requested"));
                return Ok(());
            }
            msg = ws_rx.next() => {
                match msg {
                    None => {
                        manager.on_close(Some("stream ended"));
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        manager.on_error(&e);
                        return Err(ClientError::Transport(e.to_string()));
                    }
                    Some(Ok(Message::Text(text))) => {
                        let _ = manager.on_message(text.as_str());
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            let _ = manager.on_message(text);
                        }
                        Err(e) => debug!(error = %e, len = bytes.len(), "ignoring non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        manager.on_close(frame.as_ref().map(|f| f.reason.as_str()));
                        return Ok(());
                    }
                    // Ping/pong are answered by tungstenite itself.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Make `ring` the process-wide rustls provider for `wss://` relays.
///
/// Does nothing if a provider is already installed.
fn install_tls_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
