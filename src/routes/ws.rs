// WebSocket metrics stream: one hub registration per client, drained here.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::hub::{Hub, Viewer};
use crate::models::SystemInfo;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_metrics(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    let system_info = state.system_info.clone();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_metrics(socket, hub, system_info).await {
            tracing::info!("metrics stream error: {}", e);
        }
    })
}

/// Drain loop for one viewer: welcome message, then queued snapshots in
/// broadcast order. A send error or timeout unregisters the viewer; a closed
/// queue means the hub already dropped it (overflow) and we just close the
/// transport.
async fn stream_metrics(
    mut socket: WebSocket,
    hub: Arc<Hub>,
    system_info: Arc<SystemInfo>,
) -> anyhow::Result<()> {
    let Viewer { id, mut rx } = hub.register();
    tracing::info!(viewer_id = id, "client connected to metrics stream");

    let welcome = serde_json::json!({ "type": "info", "systemInfo": system_info.as_ref() });
    let welcome_json = serde_json::to_string(&welcome)?;
    let r = timeout(
        WS_SEND_TIMEOUT,
        socket.send(Message::Text(welcome_json.into())),
    )
    .await;
    if r.is_err() || r.unwrap_or(Ok(())).is_err() {
        hub.unregister(id);
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Some(snapshot) => {
                        let json = serde_json::to_string(snapshot.as_ref())?;
                        let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                        if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    hub.unregister(id);
    let _ = socket.send(Message::Close(None)).await;
    tracing::info!(viewer_id = id, "client disconnected from metrics stream");
    Ok(())
}
