// Shared test helpers

use tokio::net::TcpListener;

/// Start a server that accepts connections but never answers
///
/// Requests against it only end through the client timeout or by dropping
/// the future.
pub(crate) async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}", addr)
}
