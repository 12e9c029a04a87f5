//! End-to-end tests over real WebSocket connections

use fanhub::api::{build_router, ApiConfig, AppState};
use fanhub::diagnostics::RecordingSink;
use fanhub::hub::{Hub, HubConfig};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(hub: Hub) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(AppState::new(hub, ApiConfig::default()));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let url = format!("ws://{}/room", addr);
    let (client, _) = connect_async(url.as_str()).await.unwrap();
    client
}

async fn wait_for_connections(hub: &Hub, expected: usize) {
    for _ in 0..400 {
        if hub.stats().await.unwrap().connections == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("hub never reached {} connections", expected);
}

async fn next_text(client: &mut Client) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for a message")
        .expect("stream ended")
        .expect("websocket error");

    match frame {
        Message::Text(text) => text,
        other => panic!("expected text frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_message_reaches_every_client() {
    let (hub, _task) = Hub::with_defaults();
    let addr = start_server(hub.clone()).await;

    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    wait_for_connections(&hub, 2).await;

    alice.send(Message::Text("hello".to_string())).await.unwrap();

    assert_eq!(next_text(&mut alice).await, "hello");
    assert_eq!(next_text(&mut bob).await, "hello");
}

#[tokio::test]
async fn test_order_preserved_per_client() {
    let (hub, _task) = Hub::with_defaults();
    let addr = start_server(hub.clone()).await;

    let mut sender = connect(addr).await;
    let mut listener = connect(addr).await;
    wait_for_connections(&hub, 2).await;

    for i in 0..20 {
        sender.send(Message::Text(format!("m{}", i))).await.unwrap();
    }

    for i in 0..20 {
        assert_eq!(next_text(&mut listener).await, format!("m{}", i));
    }
}

#[tokio::test]
async fn test_departure_unregisters_client() {
    let sink = Arc::new(RecordingSink::new());
    let (hub, _task) = Hub::spawn(HubConfig::default(), sink.clone());
    let addr = start_server(hub.clone()).await;

    let mut staying = connect(addr).await;
    let mut leaving = connect(addr).await;
    wait_for_connections(&hub, 2).await;

    leaving.close(None).await.unwrap();
    wait_for_connections(&hub, 1).await;

    staying.send(Message::Text("still here".to_string())).await.unwrap();
    assert_eq!(next_text(&mut staying).await, "still here");

    let stats = hub.stats().await.unwrap();
    assert_eq!(stats.registered, 2);
    assert_eq!(stats.unregistered, 1);
    assert_eq!(sink.count_containing("Client left"), 1);
}

#[tokio::test]
async fn test_binary_payload_passes_through() {
    let (hub, _task) = Hub::with_defaults();
    let addr = start_server(hub.clone()).await;

    let mut client = connect(addr).await;
    wait_for_connections(&hub, 1).await;

    client.send(Message::Binary(vec![0xde, 0xad, 0xbe, 0xef])).await.unwrap();

    let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(frame, Message::Binary(vec![0xde, 0xad, 0xbe, 0xef]));
}
