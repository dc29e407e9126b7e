// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::Extension,
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::events::EventBus;

/// WebSocket升级端点
///
/// 客户端连接后只接收：服务端把每个进度事件JSON编码后推送给
/// 所有当前连接的客户端，尽力而为，无送达保证也无回放。
pub async fn ws_handler(ws: WebSocketUpgrade, Extension(bus): Extension<EventBus>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, bus))
}

async fn handle_socket(mut socket: WebSocket, bus: EventBus) {
    debug!("client connected");
    let mut events = bus.subscribe();

    // Inbound frames must keep being drained so control frames are answered;
    // client payloads themselves are ignored.
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        debug!("client disconnected");
                        break;
                    }
                }
                // A slow client just misses events; it is not an error.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "client lagged behind event stream");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    debug!("client disconnected");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}
