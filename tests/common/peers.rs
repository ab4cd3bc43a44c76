//! Mock websocket peers.
//!
//! Each mock binds `127.0.0.1:0`, accepts any number of connections and
//! reports what the bot sent over an unbounded channel.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(10);

type Ws = WebSocketStream<TcpStream>;

async fn listen<F, Fut>(handler: F) -> anyhow::Result<String>
where
    F: Fn(Ws) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("ws://{}", listener.local_addr()?);
    let handler = std::sync::Arc::new(handler);
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let handler = std::sync::Arc::clone(&handler);
            tokio::spawn(async move {
                if let Ok(ws) = tokio_tungstenite::accept_async(tcp).await {
                    handler(ws).await;
                }
            });
        }
    });
    Ok(url)
}

async fn recv<T>(rx: &mut UnboundedReceiver<T>) -> anyhow::Result<T> {
    timeout(WAIT, rx.recv())
        .await?
        .ok_or_else(|| anyhow::anyhow!("mock peer stopped"))
}

/// Chat server. Answers `JOIN` with a scripted burst of lines.
pub struct MockChat {
    pub url: String,
    received: UnboundedReceiver<String>,
}

impl MockChat {
    pub async fn start(script: Vec<String>) -> anyhow::Result<Self> {
        let (tx, received) = unbounded_channel();
        let url = listen(move |ws| serve_chat(ws, tx.clone(), script.clone())).await?;
        Ok(Self { url, received })
    }

    /// Next line the bot sent.
    pub async fn next_line(&mut self) -> anyhow::Result<String> {
        recv(&mut self.received).await
    }

    /// Skip lines until `expected` arrives.
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        loop {
            if self.next_line().await? == expected {
                return Ok(());
            }
        }
    }
}

async fn serve_chat(mut ws: Ws, tx: UnboundedSender<String>, script: Vec<String>) {
    while let Some(Ok(Message::Text(text))) = ws.next().await {
        for line in text.lines() {
            let _ = tx.send(line.to_owned());
        }
        if text.starts_with("JOIN") {
            for line in &script {
                if ws.send(Message::Text(line.clone())).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Control-plane server requiring `password`; reports hotkey requests.
pub struct MockControl {
    pub url: String,
    requests: UnboundedReceiver<Value>,
}

impl MockControl {
    pub const CHALLENGE: &'static str = "+IxH4CnCiqpX1rM9scsNynZzbOe4KhDeYcTNS3PDaeY=";
    pub const SALT: &'static str = "lM1GncleQOaCu9lT1yeUZhFYnqhsLLP1G5lAGo3ixaI=";

    pub async fn start(password: &str) -> anyhow::Result<Self> {
        let (tx, requests) = unbounded_channel();
        let expected = nuit_proto::authenticate(password, Self::CHALLENGE, Self::SALT);
        let url = listen(move |ws| serve_control(ws, tx.clone(), expected.clone())).await?;
        Ok(Self { url, requests })
    }

    /// Next opcode 6 request the bot sent.
    pub async fn next_request(&mut self) -> anyhow::Result<Value> {
        recv(&mut self.requests).await
    }
}

async fn serve_control(mut ws: Ws, tx: UnboundedSender<Value>, expected: String) {
    let hello = json!({
        "op": 0,
        "d": {
            "rpcVersion": 1,
            "authentication": { "challenge": MockControl::CHALLENGE, "salt": MockControl::SALT }
        }
    });
    if ws.send(Message::Text(hello.to_string())).await.is_err() {
        return;
    }

    let Some(Ok(Message::Text(identify))) = ws.next().await else {
        return;
    };
    let identify: Value = serde_json::from_str(&identify).unwrap_or_default();
    if identify["d"]["authentication"] != expected.as_str() {
        let _ = ws.close(None).await;
        return;
    }
    let ack = json!({ "op": 2, "d": { "negotiatedRpcVersion": 1 } });
    let _ = ws.send(Message::Text(ack.to_string())).await;

    while let Some(Ok(Message::Text(text))) = ws.next().await {
        let request: Value = serde_json::from_str(&text).unwrap_or_default();
        let response = json!({
            "op": 7,
            "d": {
                "requestType": request["d"]["requestType"],
                "requestId": request["d"]["requestId"],
                "requestStatus": { "result": true, "code": 100 }
            }
        });
        let _ = tx.send(request);
        let _ = ws.send(Message::Text(response.to_string())).await;
    }
}

/// Local plugin socket; reports every text frame.
pub struct MockLocal {
    pub url: String,
    received: UnboundedReceiver<String>,
}

impl MockLocal {
    pub async fn start() -> anyhow::Result<Self> {
        let (tx, received) = unbounded_channel();
        let url = listen(move |mut ws: Ws| {
            let tx = tx.clone();
            async move {
                while let Some(Ok(Message::Text(text))) = ws.next().await {
                    let _ = tx.send(text);
                }
            }
        })
        .await?;
        Ok(Self { url, received })
    }

    pub async fn next_message(&mut self) -> anyhow::Result<String> {
        recv(&mut self.received).await
    }
}
