//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use media_relay::config::{ProducerConfig, RelayConfig};
use media_relay::lifecycle::Shutdown;
use media_relay::producer::{MediaSource, ProducerServer};
use media_relay::HttpServer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch};

/// One action a scripted backend performs on a connection.
#[derive(Debug, Clone)]
pub enum Step {
    Write(Vec<u8>),
    Sleep(Duration),
}

/// A raw-socket backend that records the request heads it receives.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request heads received so far, lowercased.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a backend that answers each connection with the steps returned
/// by `script` for that request head, then closes the connection.
pub async fn start_scripted_backend<F>(script: F) -> MockBackend
where
    F: Fn(&str) -> Vec<Step> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let script = Arc::new(script);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let script = script.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let head = read_request_head(&mut socket).await;
                        recorded.lock().unwrap().push(head.to_lowercase());
                        for step in script(&head) {
                            match step {
                                Step::Write(bytes) => {
                                    if socket.write_all(&bytes).await.is_err() {
                                        return;
                                    }
                                    let _ = socket.flush().await;
                                }
                                Step::Sleep(duration) => tokio::time::sleep(duration).await,
                            }
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// Start a backend that answers every request with the same response.
pub async fn start_mock_backend(
    status_line: &'static str,
    headers: &'static [(&'static str, &'static str)],
    body: Vec<u8>,
) -> MockBackend {
    start_scripted_backend(move |_| {
        vec![Step::Write(http_response(status_line, headers, &body))]
    })
    .await
}

/// Start a backend that streams until the peer goes away.
///
/// The receiver yields the number of bytes written before the write failed.
pub async fn start_endless_backend() -> (SocketAddr, oneshot::Receiver<u64>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_request_head(&mut socket).await;
        let head = "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nConnection: close\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }

        let chunk = vec![0x5a_u8; 16 * 1024];
        let mut written: u64 = 0;
        loop {
            if socket.write_all(&chunk).await.is_err() {
                break;
            }
            written += chunk.len() as u64;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let _ = done_tx.send(written);
    });

    (addr, done_rx)
}

/// Start a backend that streams 64 KiB chunks for as long as the peer
/// accepts them.
///
/// The receiver tracks the running total of bytes written to the socket.
pub async fn start_firehose_backend() -> (SocketAddr, watch::Receiver<u64>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (total_tx, total_rx) = watch::channel(0u64);

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_request_head(&mut socket).await;
        let head = "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nConnection: close\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }

        let chunk = vec![0xa5_u8; 64 * 1024];
        let mut written: u64 = 0;
        while socket.write_all(&chunk).await.is_ok() {
            written += chunk.len() as u64;
            total_tx.send_replace(written);
        }
    });

    (addr, total_rx)
}

/// Serialize a complete response with a correct Content-Length.
pub fn http_response(status_line: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {}\r\n", status_line);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n", body.len()));
    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

/// Serialize a response head only.
pub fn http_head(status_line: &str, headers: &[(&str, &str)]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {}\r\n", status_line);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str("\r\n");
    out.into_bytes()
}

/// Encode one chunk of a chunked body.
pub fn chunk(data: &[u8]) -> Vec<u8> {
    let mut out = format!("{:x}\r\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    out
}

/// Bytes `0x00..=0xFF` in order.
pub fn byte_ramp() -> Vec<u8> {
    (0..=255u8).collect()
}

async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&tmp[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing listens on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running component and its shutdown handle.
pub struct Running {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl Running {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a relay in front of `base_url`.
pub async fn spawn_relay(base_url: &str) -> Running {
    let mut config = RelayConfig::default();
    config.upstream.base_url = Some(base_url.to_string());
    spawn_relay_with(config).await
}

pub async fn spawn_relay_with(mut config: RelayConfig) -> Running {
    config.listener.bind_address = "127.0.0.1:0".into();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Running { addr, shutdown }
}

/// Start a producer backed by `source`.
pub async fn spawn_producer(config: ProducerConfig, source: Arc<dyn MediaSource>) -> Running {
    let server = ProducerServer::with_source(config, source);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Running { addr, shutdown }
}

/// A client that never reuses connections or consults proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Read a body chunk by chunk until it ends or fails.
///
/// Returns the bytes received and whether the body ended with an error.
pub async fn read_until_end(mut response: reqwest::Response) -> (Vec<u8>, bool) {
    let mut received = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => received.extend_from_slice(&chunk),
            Ok(None) => return (received, false),
            Err(_) => return (received, true),
        }
    }
}

/// Fail the test if `fut` takes longer than `secs` seconds.
pub async fn within<F: Future>(secs: u64, fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(secs), fut)
        .await
        .expect("operation did not finish in time")
}
