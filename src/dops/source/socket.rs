//! Docker Engine API over the daemon's unix socket.
//!
//! One listing is one `GET /containers/json` on a fresh HTTP/1.1 connection,
//! driven by hyper. The body is collected as bytes and decoded once it is
//! complete. No retries.

use super::{ListOptions, RecordSource};
use crate::error::{DopsError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SOCKET: &str = "/var/run/docker.sock";
const UNIX_SCHEME: &str = "unix://";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DockerSocketSource {
    socket: PathBuf,
}

impl DockerSocketSource {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// Uses `explicit` if given, else `$DOCKER_HOST`, else the default socket.
    pub fn from_env(explicit: Option<&str>) -> Result<Self> {
        let docker_host = std::env::var("DOCKER_HOST").ok();
        resolve_socket(explicit, docker_host.as_deref()).map(Self::new)
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    #[cfg(unix)]
    async fn exchange(&self, path: &str) -> Result<String> {
        use http_body_util::{BodyExt, Empty};
        use hyper::body::Bytes;
        use hyper::header::{ACCEPT, HOST, USER_AGENT};
        use hyper_util::rt::TokioIo;
        use tokio::net::UnixStream;

        let stream = UnixStream::connect(&self.socket).await.map_err(|e| {
            DopsError::Source(format!(
                "Cannot connect to the Docker daemon at {}{}: {}",
                UNIX_SCHEME,
                self.socket.display(),
                e
            ))
        })?;

        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(http_error)?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "docker connection closed with error");
            }
        });

        let request = hyper::Request::get(path)
            .header(HOST, "docker")
            .header(USER_AGENT, concat!("dops/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| DopsError::Source(format!("Invalid request to Docker daemon: {}", e)))?;

        let response = sender.send_request(request).await.map_err(http_error)?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(http_error)?
            .to_bytes();
        let body = String::from_utf8(body.to_vec())
            .map_err(|_| DopsError::Source("Docker daemon sent a body that is not UTF-8".into()))?;

        if !status.is_success() {
            return Err(DopsError::Source(format!("{} ({})", status, body.trim())));
        }
        Ok(body)
    }

    #[cfg(not(unix))]
    async fn exchange(&self, _path: &str) -> Result<String> {
        Err(DopsError::Source(format!(
            "Cannot connect to {}: unix sockets are not supported on this platform",
            self.socket.display()
        )))
    }
}

#[cfg(unix)]
fn http_error(err: hyper::Error) -> DopsError {
    DopsError::Source(format!("HTTP exchange with Docker daemon failed: {}", err))
}

#[async_trait(?Send)]
impl RecordSource for DockerSocketSource {
    async fn fetch_raw(&self, options: &ListOptions) -> Result<String> {
        let query = options.to_query();
        let path = if query.is_empty() {
            "/containers/json".to_string()
        } else {
            format!("/containers/json?{}", query)
        };
        tracing::debug!(socket = %self.socket.display(), %path, "listing containers");
        tokio::time::timeout(REQUEST_TIMEOUT, self.exchange(&path))
            .await
            .map_err(|_| {
                DopsError::Source(format!(
                    "Docker daemon did not answer within {}s",
                    REQUEST_TIMEOUT.as_secs()
                ))
            })?
    }
}

/// Picks the socket path. `DOCKER_HOST` must use the `unix://` scheme.
pub fn resolve_socket(explicit: Option<&str>, docker_host: Option<&str>) -> Result<PathBuf> {
    if let Some(socket) = explicit.filter(|s| !s.is_empty()) {
        return Ok(PathBuf::from(socket.strip_prefix(UNIX_SCHEME).unwrap_or(socket)));
    }

    match docker_host.filter(|h| !h.is_empty()) {
        Some(host) => host
            .strip_prefix(UNIX_SCHEME)
            .map(PathBuf::from)
            .ok_or_else(|| {
                DopsError::Config(format!(
                    "Unsupported DOCKER_HOST '{}': only {} sockets can be used",
                    host, UNIX_SCHEME
                ))
            }),
        None => Ok(PathBuf::from(DEFAULT_SOCKET)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_socket_wins() {
        let path = resolve_socket(Some("/tmp/docker.sock"), Some("unix:///other.sock")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/docker.sock"));
        let path = resolve_socket(Some("unix:///tmp/d.sock"), None).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/d.sock"));
    }

    #[test]
    fn docker_host_and_default() {
        assert_eq!(
            resolve_socket(None, Some("unix:///run/user/1000/docker.sock")).unwrap(),
            PathBuf::from("/run/user/1000/docker.sock")
        );
        assert_eq!(resolve_socket(None, None).unwrap(), PathBuf::from(DEFAULT_SOCKET));
        assert_eq!(resolve_socket(None, Some("")).unwrap(), PathBuf::from(DEFAULT_SOCKET));
        assert!(matches!(
            resolve_socket(None, Some("tcp://10.0.0.1:2375")),
            Err(DopsError::Config(_))
        ));
    }

    #[cfg(unix)]
    async fn serve_once(listener: tokio::net::UnixListener, response: &'static [u8]) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (mut stream, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        // the client may hang up first on a response it rejects
        let _ = stream.write_all(response).await;
        let _ = stream.shutdown().await;
        String::from_utf8(head).unwrap()
    }

    #[cfg(unix)]
    fn listen() -> (tempfile::TempDir, PathBuf, tokio::net::UnixListener) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docker.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();
        (dir, path, listener)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn talks_to_a_unix_socket() {
        let (_dir, path, listener) = listen();
        let server = tokio::spawn(serve_once(
            listener,
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 31\r\n\r\n[{\"Id\":\"abc\",\"Names\":[\"/web\"]}]",
        ));

        let source = DockerSocketSource::new(&path);
        let options = ListOptions {
            all: true,
            size: true,
            ..ListOptions::default()
        };
        let records = source.list(&options).await.unwrap();
        assert_eq!(records[0].id, "abc");
        assert_eq!(records[0].names, vec!["/web"]);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /containers/json?all=1&size=1 HTTP/1.1\r\n"));
        assert!(head.to_ascii_lowercase().contains("host: docker\r\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn chunk_boundary_inside_a_character() {
        let (_dir, path, listener) = listen();
        let server = tokio::spawn(serve_once(
            listener,
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\n[\"\xc3\r\n3\r\n\xa9\"]\r\n0\r\n\r\n",
        ));

        let source = DockerSocketSource::new(&path);
        let raw = source.fetch_raw(&ListOptions::default()).await.unwrap();
        assert_eq!(raw, "[\"é\"]");

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /containers/json HTTP/1.1\r\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn error_status_is_a_source_error() {
        let (_dir, path, listener) = listen();
        let server = tokio::spawn(serve_once(
            listener,
            b"HTTP/1.1 400 Bad Request\r\nContent-Length: 28\r\n\r\n{\"message\":\"invalid filter\"}",
        ));

        let source = DockerSocketSource::new(&path);
        match source.fetch_raw(&ListOptions::default()).await {
            Err(DopsError::Source(msg)) => {
                assert!(msg.contains("400 Bad Request"));
                assert!(msg.contains("invalid filter"));
            }
            other => panic!("expected source error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn garbage_response_is_a_source_error() {
        let (_dir, path, listener) = listen();
        let server = tokio::spawn(serve_once(listener, b"garbage\r\n\r\n"));

        let source = DockerSocketSource::new(&path);
        assert!(matches!(
            source.fetch_raw(&ListOptions::default()).await,
            Err(DopsError::Source(_))
        ));
        server.await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_socket_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DockerSocketSource::new(dir.path().join("nope.sock"));
        assert!(matches!(
            source.fetch_raw(&ListOptions::default()).await,
            Err(DopsError::Source(_))
        ));
    }
}
