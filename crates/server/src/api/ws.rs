//! WebSocket search sessions.
//!
//! Each connection gets its own [`SearchSession`]. The client sends raw
//! keystrokes; the server answers with a full [`SearchView`] on every state
//! change.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use marquee_core::{SearchSession, SearchView, SessionHandle};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Message received from clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The search input changed.
    SetSearchTerm { term: String },
}

/// Message sent to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Current page state.
    View(SearchView),
    /// The last client message could not be understood.
    Error { message: String },
}

impl ServerMessage {
    fn kind(&self) -> &'static str {
        match self {
            Self::View(_) => "view",
            Self::Error { .. } => "error",
        }
    }
}

/// Parse a text frame from the client.
pub fn parse_client_message(text: &str) -> Result<ClientMessage, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid message: {}", e))
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    let session = SearchSession::spawn(
        state.catalog(),
        state.trending_store(),
        state.reporter(),
        state.search_config(),
    );

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("WebSocket client connected");

    run_connection(sender, receiver, session, state.image_base_url()).await;

    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

/// Pump messages between a client and its session until either side ends.
///
/// The session is shut down before returning.
pub async fn run_connection<S, R, E>(
    mut sender: S,
    mut receiver: R,
    session: SessionHandle,
    image_base_url: &str,
) where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut views = session.subscribe();

    // Current state first, then every change
    let initial = {
        let snapshot = views.borrow_and_update();
        ServerMessage::View(SearchView::from_snapshot(&snapshot, image_base_url))
    };

    if send_message(&mut sender, &initial).await {
        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        debug!("Search session ended");
                        break;
                    }
                    let view = {
                        let snapshot = views.borrow_and_update();
                        SearchView::from_snapshot(&snapshot, image_base_url)
                    };
                    if !send_message(&mut sender, &ServerMessage::View(view)).await {
                        break;
                    }
                }
                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Text(text))) => match parse_client_message(text.as_str()) {
                        Ok(ClientMessage::SetSearchTerm { term }) => {
                            if session.set_search_term(term).is_err() {
                                break;
                            }
                        }
                        Err(message) => {
                            debug!("Rejected client message: {}", message);
                            if !send_message(&mut sender, &ServerMessage::Error { message }).await {
                                break;
                            }
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client requested close");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Ping/pong is handled by axum, binary frames are ignored
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket receive error: {}", e);
                        break;
                    }
                },
            }
        }
    }

    session.shutdown().await;
}

/// Serialize and send one message. Returns false once the client is gone.
async fn send_message<S>(sender: &mut S, msg: &ServerMessage) -> bool
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize ServerMessage: {}", e);
            return true;
        }
    };

    if sender.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket send failed, client disconnected");
        return false;
    }

    WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use marquee_core::testing::{fixtures, MockMovieCatalog, MockTrendingStore};
    use marquee_core::SearchConfig;
    use serde_json::Value;

    #[test]
    fn test_parse_set_search_term() {
        let msg = parse_client_message(r#"{"type":"set_search_term","term":"batman"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SetSearchTerm {
                term: "batman".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_or_malformed() {
        assert!(parse_client_message(r#"{"type":"subscribe"}"#).is_err());
        assert!(parse_client_message(r#"{"type":"set_search_term"}"#).is_err());
        assert!(parse_client_message("not json").is_err());
    }

    #[test]
    fn test_server_message_serialization() {
        let error = ServerMessage::Error {
            message: "nope".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({"type": "error", "message": "nope"})
        );

        let view = ServerMessage::View(SearchView {
            search_term: "bat".to_string(),
            is_loading: true,
            error_message: None,
            movies: vec![],
            trending: vec![],
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "view");
        assert_eq!(json["search_term"], "bat");
        assert_eq!(json["is_loading"], true);
    }

    fn text(msg: Message) -> Value {
        match msg {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("Expected text frame, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_streams_views_for_typed_terms() {
        let catalog = Arc::new(MockMovieCatalog::new());
        catalog.set_results("batman", vec![fixtures::movie(268, "Batman")]);
        let store = Arc::new(MockTrendingStore::new());
        let config = SearchConfig {
            debounce_ms: 500,
            trending_limit: 5,
            report_buffer: 16,
        };

        let session = SearchSession::spawn(catalog.clone(), store, None, &config);
        let (client_tx, server_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();
        let (server_tx, mut client_rx) = mpsc::unbounded::<Message>();

        let connection = tokio::spawn(async move {
            run_connection(server_tx, server_rx, session, "https://images.test").await;
        });

        let first = text(client_rx.next().await.unwrap());
        assert_eq!(first["type"], "view");

        client_tx
            .unbounded_send(Ok(Message::Text(
                r#"{"type":"set_search_term","term":"batman"}"#.into(),
            )))
            .unwrap();

        // Views keep coming until the search result lands
        let mut found = None;
        while let Some(msg) = client_rx.next().await {
            let json = text(msg);
            if json["movies"].as_array().is_some_and(|m| !m.is_empty()) {
                found = Some(json);
                break;
            }
        }
        let view = found.expect("Expected a view with movies");
        assert_eq!(view["search_term"], "batman");
        assert_eq!(view["movies"][0]["title"], "Batman");
        assert_eq!(
            view["movies"][0]["poster_url"],
            "https://images.test/268.jpg"
        );

        client_tx
            .unbounded_send(Ok(Message::Text("garbage".into())))
            .unwrap();
        let error = loop {
            let json = text(client_rx.next().await.unwrap());
            if json["type"] == "error" {
                break json;
            }
        };
        assert!(error["message"].as_str().unwrap().starts_with("Invalid message"));

        drop(client_tx);
        connection.await.unwrap();
    }
}
