//! HTTP collector sink.
//!
//! Sends each batch as a JSON array: POST {url} with `Authorization: {api_key}`.

use reqwest::{Client, Url};
use std::time::Duration;

use super::SinkError;
use crate::config::SinkConfig;
use crate::record::TransactionRecord;

pub struct HttpSink {
    http: Client,
    url: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpSink {
    pub fn new(config: &SinkConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("tracegen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let url = Url::parse(&config.url)?;

        Ok(Self {
            http,
            url,
            api_key: config.api_key.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn send(&self, batch: &[TransactionRecord]) -> Result<(), SinkError> {
        let mut request = self
            .http
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(batch);
        if let Some(key) = &self.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SinkError::Timeout
            } else {
                SinkError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, status = status.as_u16(), "collector rejected batch");
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(url = %self.url, records = batch.len(), "batch delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one request on a local port, answer with `status` and hand back
    /// the raw request text.
    async fn collector(status: u16) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }

            let reply = format!(
                "HTTP/1.1 {} Status\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8(buf).unwrap()
        });

        (format!("http://{}/api/v1/log-request/batch", addr), handle)
    }

    fn sink(url: String, api_key: Option<&str>) -> HttpSink {
        HttpSink::new(&SinkConfig {
            url,
            api_key: api_key.map(String::from),
            timeout_ms: 5000,
        })
        .unwrap()
    }

    fn record(path: &str) -> TransactionRecord {
        serde_json::from_value(serde_json::json!({
            "request": {"url": {"host": "h", "path": path}, "method": "POST"},
            "response": {"status": 200}
        }))
        .unwrap()
    }

    #[test]
    fn test_new_keeps_config() {
        let sink = HttpSink::new(&SinkConfig {
            url: "http://localhost:8081/api/v1/log-request/batch".to_string(),
            api_key: Some("key".to_string()),
            timeout_ms: 250,
        })
        .unwrap();

        assert_eq!(sink.url().path(), "/api/v1/log-request/batch");
        assert_eq!(sink.timeout, Duration::from_millis(250));
        assert_eq!(sink.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_new_rejects_bad_url() {
        let result = HttpSink::new(&SinkConfig {
            url: "not a url".to_string(),
            api_key: None,
            timeout_ms: 250,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_collector_is_an_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let sink = HttpSink::new(&SinkConfig {
            url: "http://127.0.0.1:9/batch".to_string(),
            api_key: None,
            timeout_ms: 500,
        })
        .unwrap();
        let record: TransactionRecord = serde_json::from_str(
            r#"{"request":{"url":{"host":"h","path":"/"},"method":"GET"},"response":{"status":200}}"#,
        )
        .unwrap();

        let err = sink.send(&[record]).await.unwrap_err();
        assert!(matches!(err, SinkError::Network(_) | SinkError::Timeout));
    }

    #[tokio::test]
    async fn test_batch_is_posted_as_json_array() {
        let (url, server) = collector(200).await;
        let batch = vec![record("/a"), record("/b")];

        sink(url, Some("secret")).send(&batch).await.unwrap();

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let head = head.to_ascii_lowercase();
        assert!(head.starts_with("post /api/v1/log-request/batch "), "{}", head);
        assert!(head.contains("authorization: secret"), "{}", head);
        assert!(head.contains("content-type: application/json"), "{}", head);

        let sent: Vec<TransactionRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(sent, batch);
    }

    #[tokio::test]
    async fn test_no_authorization_without_key() {
        let (url, server) = collector(200).await;

        sink(url, None).send(&[record("/")]).await.unwrap();

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let (url, server) = collector(500).await;

        let err = sink(url, Some("secret")).send(&[record("/")]).await.unwrap_err();

        assert!(matches!(err, SinkError::Rejected { status: 500 }), "{:?}", err);
        server.await.unwrap();
    }
}
