use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{config::ClientSettings, error::ToolError, router::UpstreamRequest};

/// Something that can answer an [`UpstreamRequest`] with a JSON document.
///
/// The registry only talks to this trait, so dispatch can be exercised with
/// fixture documents instead of the network.
#[async_trait]
pub trait Upstream: Send + Sync + Debug {
    async fn send(&self, request: &UpstreamRequest) -> Result<Value, ToolError>;
}

/// WeatherAPI.com over HTTPS. One GET per [`Upstream::send`], no retries.
#[derive(Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl WeatherApiClient {
    pub fn new(settings: ClientSettings) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { api_key: settings.api_key, base_url: settings.base_url, http })
    }

    fn url(&self, request: &UpstreamRequest) -> String {
        format!("{}/{}", self.base_url, request.endpoint.path())
    }
}

#[async_trait]
impl Upstream for WeatherApiClient {
    async fn send(&self, request: &UpstreamRequest) -> Result<Value, ToolError> {
        let endpoint = request.endpoint.as_str();
        // reqwest errors embed the request URL, which carries the key.
        let transport = |e: reqwest::Error| ToolError::Transport { endpoint, source: e.without_url() };

        debug!(endpoint, params = ?request.params, "sending WeatherAPI request");

        let res = self
            .http
            .get(self.url(request))
            .query(&request.params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        let body = res.text().await.map_err(transport)?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "WeatherAPI returned an error status");
            return Err(ToolError::UpstreamStatus { endpoint, status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|e| {
            ToolError::shape(request.endpoint.path(), format!("body is not valid JSON: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Endpoint;
    use std::time::Duration;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    const KEY: &str = "SECRET-KEY";

    /// Accept one connection, answer it with `status_line` and `body`, and hand
    /// back the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let n = socket.read(&mut buf).await.unwrap();
            let head = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            head
        });

        (format!("http://{addr}/v1"), handle)
    }

    fn client(base_url: String, timeout: Duration) -> WeatherApiClient {
        WeatherApiClient::new(ClientSettings { api_key: KEY.to_string(), base_url, timeout })
            .unwrap()
    }

    fn forecast_request() -> UpstreamRequest {
        UpstreamRequest {
            endpoint: Endpoint::Forecast,
            params: vec![("q", "London".to_string()), ("days", "3".to_string())],
        }
    }

    #[tokio::test]
    async fn success_returns_parsed_document_and_sends_key() {
        let (base, server) = serve_once("200 OK", r#"{"forecast":{"forecastday":[]}}"#).await;

        let doc = client(base, Duration::from_secs(5)).send(&forecast_request()).await.unwrap();
        assert_eq!(doc["forecast"]["forecastday"], serde_json::json!([]));

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert!(request_line.starts_with("GET /v1/forecast.json?"), "{request_line}");
        assert!(request_line.contains("q=London"));
        assert!(request_line.contains("days=3"));
        assert!(request_line.contains(&format!("key={KEY}")));
    }

    #[tokio::test]
    async fn non_2xx_is_upstream_status_with_raw_body() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        let (base, server) = serve_once("400 Bad Request", body).await;

        let err = client(base, Duration::from_secs(5)).send(&forecast_request()).await.unwrap_err();
        server.await.unwrap();

        match err {
            ToolError::UpstreamStatus { endpoint, status, body: raw } => {
                assert_eq!(endpoint, "forecast");
                assert_eq!(status, 400);
                assert_eq!(raw, body);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_body_is_shape_error() {
        let (base, server) = serve_once("200 OK", "<html>maintenance</html>").await;

        let err = client(base, Duration::from_secs(5)).send(&forecast_request()).await.unwrap_err();
        server.await.unwrap();

        assert_eq!(err.kind(), "shape");
        assert!(err.to_string().contains("forecast.json"));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error_without_key() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}/v1"), Duration::from_secs(5))
            .send(&forecast_request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "transport");
        assert!(!err.to_string().contains(KEY));
        assert!(!format!("{err:?}").contains(KEY));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(socket);
        });

        let err = client(format!("http://{addr}/v1"), Duration::from_millis(200))
            .send(&forecast_request())
            .await
            .unwrap_err();
        server.abort();

        match err {
            ToolError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_does_not_print_key() {
        let c = client("http://localhost/v1".into(), Duration::from_secs(1));
        assert!(!format!("{c:?}").contains(KEY));
    }
}
