//! In-process websocket servers for unit tests.

use std::future::Future;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;

pub(crate) type ServerStream = WebSocketStream<TcpStream>;

/// A localhost port with nothing listening on it.
pub(crate) async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Serve every accepted websocket with `handler`; returns the `ws://` URL.
pub(crate) async fn spawn_ws_server<F, Fut>(handler: F) -> String
where
    F: Fn(ServerStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve(listener, handler)
}

/// Like [`spawn_ws_server`] but on a fixed port.
pub(crate) async fn spawn_ws_server_on<F, Fut>(port: u16, handler: F) -> String
where
    F: Fn(ServerStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    serve(listener, handler)
}

fn serve<F, Fut>(listener: TcpListener, handler: F) -> String
where
    F: Fn(ServerStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                if let Ok(ws) = tokio_tungstenite::accept_async(tcp).await {
                    handler(ws).await;
                }
            });
        }
    });
    format!("ws://{addr}")
}
