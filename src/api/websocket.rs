//! WebSocket client for SICK streams

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::HEADER_API_KEY;
use crate::error::ConnectorError;

/// Callback executed for every text frame received from the stream
pub type OnMessage = Arc<dyn Fn(String) + Send + Sync>;

/// A single-connection client that subscribes to one feed's updates.
///
/// `open` establishes the connection and spawns one reader task; `subscribe`
/// sends the vendor's subscription message for the configured feed. There is
/// no reconnect policy: a dropped connection clears the connected flag and
/// the reader task exits.
pub struct WebSocketClient {
    url: String,
    api_key: String,
    feed_id: String,
    on_message: OnMessage,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    connected: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl WebSocketClient {
    /// Create a client for one feed. No connection is made until `open`.
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        feed_id: impl Into<String>,
        on_message: OnMessage,
    ) -> Self {
        WebSocketClient {
            url: url.into(),
            api_key: api_key.into(),
            feed_id: feed_id.into(),
            on_message,
            outbound: None,
            connected: Arc::new(AtomicBool::new(false)),
            reader: None,
        }
    }

    /// Whether the connection is currently open
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// The feed this client subscribes to
    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Establish the WebSocket connection and start listening for messages
    pub async fn open(&mut self) -> Result<(), ConnectorError> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        info!("Connection opened for {}", self.url);

        let (mut write, mut read) = stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        self.outbound = Some(tx);
        self.connected.store(true, Ordering::SeqCst);

        let connected = Arc::clone(&self.connected);
        let on_message = Arc::clone(&self.on_message);
        let url = self.url.clone();
        self.reader = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    incoming = read.next() => match incoming {
                        Some(Ok(Message::Text(text))) => (on_message)(text),
                        Some(Ok(Message::Ping(payload))) => {
                            if write.send(Message::Pong(payload)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!("Connection closed for {url} -> {frame:?}");
                            break;
                        }
                        Some(Ok(other)) => debug!("Ignoring non-text frame: {other:?}"),
                        Some(Err(e)) => {
                            error!("error: {e}");
                            break;
                        }
                        None => break,
                    },
                    outgoing = rx.recv() => match outgoing {
                        Some(message) => {
                            if write.send(message).await.is_err() {
                                break;
                            }
                        }
                        // Sender dropped: the client is closing.
                        None => {
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                    },
                }
            }
            connected.store(false, Ordering::SeqCst);
        }));

        Ok(())
    }

    /// Send a message through the WebSocket connection
    pub fn send(&self, data: impl Into<String>) {
        match &self.outbound {
            Some(tx) if self.connected() => {
                if tx.send(Message::Text(data.into())).is_err() {
                    warn!("WebSocket reader task gone - data not sent");
                }
            }
            _ => warn!("WebSocket not connected - data not sent"),
        }
    }

    /// The subscription message for this client's feed
    pub fn subscription_message(&self) -> String {
        json!({
            "headers": { HEADER_API_KEY: self.api_key },
            "method": "subscribe",
            "resource": format!("/feeds/{}", self.feed_id),
        })
        .to_string()
    }

    /// Subscribe to updates for the feed associated with this client,
    /// opening the connection first if needed
    pub async fn subscribe(&mut self) -> Result<(), ConnectorError> {
        if !self.connected() {
            self.open().await?;
        }
        self.send(self.subscription_message());
        Ok(())
    }

    /// Close the WebSocket connection and stop the listening task
    pub async fn close(&mut self) {
        // Dropping the sender makes the reader task send a close frame
        // and exit.
        self.outbound = None;
        if let Some(reader) = self.reader.take() {
            let _ = reader.await;
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[test]
    fn subscription_message_format() {
        let client = WebSocketClient::new(
            "ws://test-url",
            "key",
            "my_feed_id",
            Arc::new(|_| {}),
        );
        let message: serde_json::Value =
            serde_json::from_str(&client.subscription_message()).unwrap();
        assert_eq!(message["headers"]["X-ApiKey"], "key");
        assert_eq!(message["method"], "subscribe");
        assert_eq!(message["resource"], "/feeds/my_feed_id");
    }

    #[test]
    fn starts_disconnected() {
        let client = WebSocketClient::new("ws://test-url", "key", "42", Arc::new(|_| {}));
        assert!(!client.connected());
        assert_eq!(client.feed_id(), "42");
        // Nothing to send to; must not panic.
        client.send("test_data");
    }

    #[tokio::test]
    async fn subscribes_and_receives_updates() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            let subscription = ws.next().await.unwrap().unwrap();
            let value: serde_json::Value =
                serde_json::from_str(subscription.to_text().unwrap()).unwrap();
            assert_eq!(value["method"], "subscribe");
            assert_eq!(value["resource"], "/feeds/42");
            assert_eq!(value["headers"]["X-ApiKey"], "key");

            ws.send(Message::Text(
                r#"{"body":{"datastreams":[{"id":"posX","current_value":" 1.0 "}]}}"#.to_string(),
            ))
            .await
            .unwrap();

            // Keep the connection up until the client closes it.
            while let Some(Ok(message)) = ws.next().await {
                if matches!(message, Message::Close(_)) {
                    break;
                }
            }
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let on_message: OnMessage = Arc::new(move |text| {
            let _ = tx.send(text);
        });
        let mut client = WebSocketClient::new(format!("ws://{addr}"), "key", "42", on_message);

        client.subscribe().await.unwrap();
        assert!(client.connected());

        let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for update")
            .expect("channel closed");
        assert!(received.contains("datastreams"));

        client.close().await;
        assert!(!client.connected());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        // Bind and drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut client =
            WebSocketClient::new(format!("ws://{addr}"), "key", "42", Arc::new(|_| {}));
        let err = client.subscribe().await.unwrap_err();
        assert!(matches!(err, ConnectorError::WebSocket(_)));
        assert!(!client.connected());
    }
}
