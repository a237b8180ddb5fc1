//! Background Socket.IO connection loop with auto-reconnect.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use super::frame::{self, Frame};
use super::types::TransportEvent;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings resolved from config for one subscription.
#[derive(Debug, Clone)]
pub(crate) struct ConnectionSettings {
    pub url: String,
    /// Expected server heartbeat period; twice this without traffic drops
    /// the connection.
    pub heartbeat: Duration,
    pub reconnect_delay_secs: u64,
    pub max_reconnect_delay_secs: u64,
}

#[derive(Debug)]
pub(crate) enum ConnectionCommand {
    Disconnect,
}

/// What the read side decided after handling one frame.
enum Flow {
    Continue,
    Reconnect,
    /// The subscriber went away.
    Stop,
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Background task owning the socket. Exits on `Disconnect`, when the
/// command sender is dropped, or when nobody is listening for events.
pub(crate) async fn connection_loop(
    settings: ConnectionSettings,
    event_tx: mpsc::Sender<TransportEvent>,
    mut command_rx: mpsc::Receiver<ConnectionCommand>,
) {
    let mut reconnect_delay = settings.reconnect_delay_secs;

    loop {
        info!(url = %settings.url.split('?').next().unwrap_or(""), "Connecting to presence server");

        match tokio::time::timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(&settings.url))
            .await
        {
            Ok(Ok((ws_stream, _))) => {
                reconnect_delay = settings.reconnect_delay_secs;
                let (mut ws_write, mut ws_read) = ws_stream.split();
                let idle_limit = settings.heartbeat * 2;
                let mut deadline = Instant::now() + idle_limit;

                let flow = loop {
                    tokio::select! {
                        msg = ws_read.next() => {
                            deadline = Instant::now() + idle_limit;
                            match msg {
                                Some(Ok(WsMessage::Text(text))) => {
                                    let flow = handle_frame(
                                        frame::decode(text.as_str()),
                                        &mut ws_write,
                                        &event_tx,
                                    )
                                    .await;
                                    if !matches!(flow, Flow::Continue) {
                                        break flow;
                                    }
                                }
                                Some(Ok(WsMessage::Close(_))) | None => {
                                    info!("Presence server closed connection");
                                    break Flow::Reconnect;
                                }
                                Some(Err(e)) => {
                                    warn!(error = %e, "WebSocket error");
                                    break Flow::Reconnect;
                                }
                                Some(Ok(_)) => {}
                            }
                        }
                        // Both an explicit disconnect and a dropped handle end the task.
                        _ = command_rx.recv() => {
                            let _ = ws_write.send(WsMessage::Text(frame::DISCONNECT.into())).await;
                            let _ = ws_write.send(WsMessage::Close(None)).await;
                            let _ = event_tx.send(TransportEvent::Disconnected).await;
                            info!("Presence connection closed by client");
                            return;
                        }
                        _ = tokio::time::sleep_until(deadline) => {
                            warn!(idle_secs = idle_limit.as_secs(), "No traffic from presence server");
                            break Flow::Reconnect;
                        }
                    }
                };

                if event_tx.send(TransportEvent::Disconnected).await.is_err()
                    || matches!(flow, Flow::Stop)
                {
                    return;
                }
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed to connect to presence server");
                if event_tx
                    .send(TransportEvent::Error(format!("Connection failed: {e}")))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Err(_elapsed) => {
                error!("Presence connection timed out after 15s");
                if event_tx
                    .send(TransportEvent::Error(
                        "Connection timed out after 15s".to_string(),
                    ))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }

        // Exponential backoff, still honoring disconnect while waiting.
        info!(delay = reconnect_delay, "Reconnecting in {} seconds", reconnect_delay);
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(reconnect_delay)) => {}
            _ = command_rx.recv() => {
                let _ = event_tx.send(TransportEvent::Disconnected).await;
                return;
            }
        }
        reconnect_delay = (reconnect_delay * 2).min(settings.max_reconnect_delay_secs);
    }
}

// ---------------------------------------------------------------------------
// Frame Handling
// ---------------------------------------------------------------------------

async fn handle_frame<S>(
    frame: Frame,
    ws_write: &mut S,
    event_tx: &mpsc::Sender<TransportEvent>,
) -> Flow
where
    S: futures_util::Sink<WsMessage> + Unpin,
{
    let delivered = match frame {
        Frame::Open(info) => {
            debug!(sid = %info.sid, ping_interval = info.ping_interval, "Engine.IO open");
            if ws_write
                .send(WsMessage::Text(frame::CONNECT.into()))
                .await
                .is_err()
            {
                return Flow::Reconnect;
            }
            true
        }
        Frame::Ping(data) => {
            if ws_write
                .send(WsMessage::Text(frame::pong(&data).into()))
                .await
                .is_err()
            {
                return Flow::Reconnect;
            }
            true
        }
        Frame::Connected => {
            info!("Presence namespace connected");
            event_tx.send(TransportEvent::Connected).await.is_ok()
        }
        Frame::Event { name, args } => match frame::presence_from_event(&name, &args) {
            Some(event) => {
                debug!(?event, "Presence event");
                event_tx.send(TransportEvent::Presence(event)).await.is_ok()
            }
            None => {
                debug!(event = %name, "Ignoring socket event");
                true
            }
        },
        Frame::ConnectError(message) => {
            warn!(message = %message, "Presence namespace refused connection");
            if event_tx.send(TransportEvent::Error(message)).await.is_err() {
                return Flow::Stop;
            }
            return Flow::Reconnect;
        }
        Frame::Disconnected | Frame::Close => return Flow::Reconnect,
        Frame::Pong(_) | Frame::Noop => true,
        Frame::Unknown(text) => {
            debug!(text = %text, "Unrecognized frame from presence server");
            true
        }
    };

    if delivered {
        Flow::Continue
    } else {
        Flow::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::PresenceEvent;
    use tokio::net::TcpListener;

    fn settings(url: String) -> ConnectionSettings {
        ConnectionSettings {
            url,
            heartbeat: Duration::from_secs(5),
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 1,
        }
    }

    async fn next_text<S>(read: &mut S) -> String
    where
        S: futures_util::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
            + Unpin,
    {
        loop {
            match read.next().await {
                Some(Ok(WsMessage::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn handshake_heartbeat_and_presence_events() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            let (mut write, mut read) = ws.split();

            write
                .send(WsMessage::Text(
                    r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#.into(),
                ))
                .await
                .unwrap();
            assert_eq!(next_text(&mut read).await, "40");

            write
                .send(WsMessage::Text(r#"40{"sid":"n1"}"#.into()))
                .await
                .unwrap();
            write.send(WsMessage::Text("2".into())).await.unwrap();
            assert_eq!(next_text(&mut read).await, "3");

            write
                .send(WsMessage::Text(r#"42["user-join","u2"]"#.into()))
                .await
                .unwrap();
            write
                .send(WsMessage::Text(r#"42["user-leave","u2"]"#.into()))
                .await
                .unwrap();

            // Client disconnect arrives as a namespace disconnect.
            assert_eq!(next_text(&mut read).await, "41");
        });

        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (command_tx, command_rx) = mpsc::channel(4);
        let task = tokio::spawn(connection_loop(
            settings(format!("ws://{addr}/socket.io/?EIO=4&transport=websocket&userId=me")),
            event_tx,
            command_rx,
        ));

        assert_eq!(event_rx.recv().await, Some(TransportEvent::Connected));
        assert_eq!(
            event_rx.recv().await,
            Some(TransportEvent::Presence(PresenceEvent::Joined {
                peer_id: "u2".into()
            }))
        );
        assert_eq!(
            event_rx.recv().await,
            Some(TransportEvent::Presence(PresenceEvent::Left {
                peer_id: "u2".into()
            }))
        );

        command_tx.send(ConnectionCommand::Disconnect).await.unwrap();
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Disconnected));

        server.await.unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_server_reports_error_then_stops_on_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (event_tx, mut event_rx) = mpsc::channel(16);
        let (command_tx, command_rx) = mpsc::channel(4);
        let task = tokio::spawn(connection_loop(
            settings(format!("ws://{addr}/socket.io/")),
            event_tx,
            command_rx,
        ));

        assert!(matches!(event_rx.recv().await, Some(TransportEvent::Error(_))));

        command_tx.send(ConnectionCommand::Disconnect).await.unwrap();
        assert_eq!(event_rx.recv().await, Some(TransportEvent::Disconnected));
        task.await.unwrap();
    }
}
