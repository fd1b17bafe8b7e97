//! Admin live channel
//!
//! WebSocket endpoint for the dashboard. The token is verified before
//! the upgrade; only admin sessions may join. On join the current stats
//! snapshot is pushed immediately, then every hub event as it happens.

use axum::{
    Router,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::{AppError, ErrorCode};
use tokio::sync::broadcast::error::RecvError;

use crate::auth::CurrentUser;
use crate::services::{LiveEvent, compute_stats};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LiveQuery {
    pub token: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/live", get(live))
}

/// GET /api/live?token=... - upgrade an admin session onto the hub
async fn live(
    State(state): State<AppState>,
    Query(query): Query<LiveQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let claims = state
        .jwt
        .validate_token(&query.token)
        .map_err(|_| AppError::invalid_token("Invalid or expired token"))?;
    let user = CurrentUser::from(claims);

    if !user.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(ws.on_upgrade(move |socket| handle_live_socket(socket, state, user)))
}

async fn handle_live_socket(socket: WebSocket, state: AppState, user: CurrentUser) {
    tracing::info!(admin = %user.id, "Admin joined live channel");

    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut rx = state.hub.subscribe();

    // Push the current snapshot immediately on join
    match compute_stats(&state.db).await {
        Ok(snapshot) => {
            let event = LiveEvent::StatsUpdated(snapshot);
            if let Ok(json) = serde_json::to_string(&event)
                && ws_sink.send(Message::Text(json.into())).await.is_err()
            {
                tracing::warn!(admin = %user.id, "Failed to send initial snapshot, disconnecting");
                return;
            }
        }
        Err(e) => {
            // Non-fatal: the session still receives subsequent events
            tracing::warn!(error = %e, "Initial stats compute failed");
        }
    }

    loop {
        tokio::select! {
            // Hub event to push
            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        if let Ok(json) = serde_json::to_string(&event)
                            && ws_sink.send(Message::Text(json.into())).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Slow consumer: drop the backlog, keep the session
                        tracing::warn!(admin = %user.id, skipped, "Live session lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Incoming frames from the admin session
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(admin = %user.id, "Live channel error: {e}");
                        break;
                    }
                    _ => {} // Text, Binary, Pong - ignore
                }
            }
        }
    }

    let _ = ws_sink.close().await;
    tracing::info!(admin = %user.id, "Admin left live channel");
}
