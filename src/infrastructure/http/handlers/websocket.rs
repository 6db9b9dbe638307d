//! WebSocket Handler - 翻译任务实时日志与进度

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 任务 WebSocket 连接处理
pub async fn run_websocket_handler(
    ws: WebSocketUpgrade,
    Path(run_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_run_socket(socket, run_id, state))
}

fn to_message(event: &WsEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

async fn handle_run_socket(socket: WebSocket, run_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    if state.run_manager.get(&run_id).is_none() {
        tracing::warn!(run_id = %run_id, "WebSocket connection rejected: unknown run");
        let _ = sender.close().await;
        return;
    }

    // 先订阅再检查状态，避免错过结束事件
    let mut event_rx = state.event_publisher.subscribe(&run_id);

    if let Some(run) = state.run_manager.get(&run_id).filter(|r| r.state.is_finished()) {
        state.event_publisher.close(&run_id);
        let event = WsEvent::RunFinished {
            run_id: run.run_id,
            state: run.state,
            succeeded: run.succeeded,
            failed: run.failed,
        };
        if let Some(msg) = to_message(&event) {
            let _ = sender.send(msg).await;
        }
        let _ = sender.close().await;
        return;
    }

    tracing::info!(run_id = %run_id, "WebSocket connected");

    let run_id_for_forward = run_id.clone();
    let run_id_for_receive = run_id.clone();

    // 事件转发任务，任务结束时通道关闭
    let forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(run_id = %run_id_for_forward, skipped, "WebSocket subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let Some(msg) = to_message(&event) else {
                continue;
            };
            if let Err(e) = sender.send(msg).await {
                tracing::debug!(
                    run_id = %run_id_for_forward,
                    error = %e,
                    "Failed to send WebSocket message"
                );
                return;
            }
        }
        let _ = sender.close().await;
    });

    // 接收客户端消息（心跳 / 关闭）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(run_id = %run_id_for_receive, "WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(run_id = %run_id_for_receive, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!(run_id = %run_id, "WebSocket disconnected");
}
