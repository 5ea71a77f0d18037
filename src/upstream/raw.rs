//! Connection-level upstream client.
//!
//! Each call opens its own TCP connection, wraps it in TLS for `https`
//! targets, runs an HTTP/1.1 handshake and sends exactly one request with
//! an explicit `Content-Length`. Nothing is pooled.

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST};
use axum::http::{Method, Request};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::ext::ReasonPhrase;
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use url::Url;

use crate::upstream::{canonical_reason, tls, TransportError, UpstreamClient, UpstreamResponse};

/// Raw socket client: one connection per request.
#[derive(Clone)]
pub struct RawClient {
    tls: TlsConnector,
}

impl RawClient {
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            tls: tls::connector()?,
        })
    }
}

impl std::fmt::Debug for RawClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawClient").finish_non_exhaustive()
    }
}

impl UpstreamClient for RawClient {
    async fn post_json(&self, url: &Url, body: String) -> Result<UpstreamResponse, TransportError> {
        let https = match url.scheme() {
            "https" => true,
            "http" => false,
            other => return Err(TransportError::UnsupportedScheme(other.to_string())),
        };
        let host = url
            .host_str()
            .ok_or(TransportError::MissingHost)?;
        let port = url
            .port_or_known_default()
            .unwrap_or(if https { 443 } else { 80 });

        let request = build_request(url, host, body)?;

        let addr = format!("{host}:{port}");
        let stream = match TcpStream::connect(&addr).await {
            Ok(stream) => stream,
            Err(source) => return Err(TransportError::Connect { addr, source }),
        };

        if https {
            // IPv6 literals come back bracketed from `host_str`.
            let name = host.trim_start_matches('[').trim_end_matches(']').to_string();
            let server_name = ServerName::try_from(name)
                .map_err(|_| TransportError::ServerName(host.to_string()))?;
            let stream = self
                .tls
                .connect(server_name, stream)
                .await
                .map_err(TransportError::Tls)?;
            send(stream, request).await
        } else {
            send(stream, request).await
        }
    }
}

fn build_request(url: &Url, host: &str, body: String) -> Result<Request<Full<Bytes>>, TransportError> {
    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    // `port()` is None for the scheme default, which must not appear in Host.
    let host_header = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(HOST, host_header)
        .header(CONTENT_TYPE, "application/json")
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))?;
    Ok(request)
}

async fn send<S>(stream: S, request: Request<Full<Bytes>>) -> Result<UpstreamResponse, TransportError>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "Upstream connection closed with error");
        }
    });

    let response = sender.send_request(request).await?;
    let status = response.status().as_u16();
    let status_text = response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .unwrap_or_else(|| canonical_reason(status));

    let bytes = response.into_body().collect().await?.to_bytes();

    Ok(UpstreamResponse {
        status,
        status_text,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_request_shape() {
        let url = Url::parse("http://api.example.com:8080/api/ai_agent?code=abc").unwrap();
        let request = build_request(&url, "api.example.com", r#"{"a":"é"}"#.into()).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri(), "/api/ai_agent?code=abc");
        assert_eq!(request.headers()[HOST], "api.example.com:8080");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        // Byte length, not char count.
        assert_eq!(request.headers()[CONTENT_LENGTH], "10");
    }

    #[test]
    fn test_default_port_omitted_from_host() {
        let url = Url::parse("https://api.example.com/run").unwrap();
        let request = build_request(&url, "api.example.com", "null".into()).unwrap();
        assert_eq!(request.headers()[HOST], "api.example.com");
        assert_eq!(request.uri(), "/run");
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let client = RawClient::new().unwrap();
        let url = Url::parse("ftp://example.com/x").unwrap();
        let err = client.post_json(&url, "{}".into()).await.unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[tokio::test]
    async fn test_reads_reason_phrase_and_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let body = "nope";
            let response = format!(
                "HTTP/1.1 418 Custom Teapot\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        let client = RawClient::new().unwrap();
        let url = Url::parse(&format!("http://{addr}/api")).unwrap();
        let resp = client.post_json(&url, "{}".into()).await.unwrap();
        assert_eq!(resp.status, 418);
        assert_eq!(resp.status_text, "Custom Teapot");
        assert_eq!(resp.body, "nope");
    }
}
