//! Shared helpers for integration tests

use bytepipe::types::Port;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Bind a collector socket that accepts a single connection and gathers
/// everything written to it until EOF.
pub async fn spawn_collector() -> (Port, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
    let handle = tokio::spawn(async move {
        let (mut conn, _) = listener.accept().await.unwrap();
        let mut collected = Vec::new();
        conn.read_to_end(&mut collected).await.unwrap();
        collected
    });
    (port, handle)
}

/// Find a free port by binding to an ephemeral one and dropping it
pub async fn find_available_port() -> Port {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    Port::new(listener.local_addr().unwrap().port()).unwrap()
}
