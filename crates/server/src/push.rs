use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::{SinkExt, Stream, StreamExt};
use shared::{error::ApiError, protocol::ServerEvent};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, warn};

use crate::{api::reject, app_state::AppState};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

fn subscribe(
    state: &AppState,
) -> Result<broadcast::Receiver<ServerEvent>, (StatusCode, Json<ApiError>)> {
    state.api.notifier.subscribe().ok_or_else(|| {
        reject(ApiError::not_found(
            "push notifications are disabled; poll instead",
        ))
    })
}

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let events = subscribe(&state)?;
    Ok(ws.on_upgrade(move |socket| ws_connection(socket, events)))
}

async fn ws_connection(socket: WebSocket, mut events: broadcast::Receiver<ServerEvent>) {
    let (mut sender, mut receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket subscriber lagged; events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    debug!("websocket subscriber disconnected");
    send_task.abort();
}

pub(crate) async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<ApiError>)> {
    let events = subscribe(&state)?;

    let stream = BroadcastStream::new(events).filter_map(|item| async move {
        match item {
            Ok(event) => sse_event(&event).map(Ok),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "sse subscriber lagged; events dropped");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    ))
}

fn sse_event(event: &ServerEvent) -> Option<Event> {
    let data = serde_json::to_string(event).ok()?;
    Some(Event::default().event(event.kind()).data(data))
}
