//! A single open websocket carrying text frames.

use crate::error::BotError;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

/// Client websocket over plain TCP or TLS.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open text-oriented websocket connection.
///
/// Transport pings are answered by the websocket layer while reading; only
/// text (or UTF-8 binary) payloads are surfaced.
pub struct Link {
    stream: WsStream,
    target: String,
}

impl Link {
    /// Open a websocket to `url` (`ws://` or `wss://`).
    pub async fn connect(url: &str) -> Result<Self, BotError> {
        let (stream, _response) = connect_async(url).await.map_err(|source| BotError::Connect {
            target: url.to_string(),
            source,
        })?;
        Ok(Self {
            stream,
            target: url.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Send one text frame.
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<(), BotError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| match e {
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                    BotError::Closed
                }
                other => BotError::Send(other),
            })
    }

    /// Wait for the next text payload.
    ///
    /// Cancel-safe: dropping the future between frames loses nothing.
    pub async fn recv_text(&mut self) -> Result<String, BotError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(String::from_utf8_lossy(&bytes).into_owned());
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    debug!(url = %self.target, ?frame, "Close frame received");
                    return Err(BotError::Closed);
                }
                Some(Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed))
                | None => return Err(BotError::Closed),
                Some(Err(e)) => return Err(BotError::Receive(e)),
            }
        }
    }

    /// Close the connection, ignoring errors.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(url = %self.target, error = %e, "Error while closing link");
        }
    }
}
