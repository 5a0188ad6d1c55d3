//! Network readiness probes

use std::net::SocketAddr;
use std::time::Duration;

use backoff::ExponentialBackoff;
use tokio::net::{TcpListener, TcpStream};

/// Check that nothing is bound to `addr` yet
pub async fn ensure_port_free(addr: SocketAddr) -> std::io::Result<()> {
    TcpListener::bind(addr).await.map(drop)
}

/// Wait until something accepts TCP connections on `addr`
///
/// Retries with exponential backoff until `timeout` has elapsed. Returns
/// the last connection error when the deadline passes.
pub async fn wait_for_listener(addr: SocketAddr, timeout: Duration) -> std::io::Result<()> {
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(100),
        max_interval: Duration::from_secs(2),
        max_elapsed_time: Some(timeout),
        ..ExponentialBackoff::default()
    };

    backoff::future::retry(policy, || async move {
        TcpStream::connect(addr)
            .await
            .map(|_| ())
            .map_err(backoff::Error::transient)
    })
    .await
}
