//! HTTP client for posting submissions
//!
//! JSON payloads go out as `application/json`, payloads with file inputs as
//! `multipart/form-data`. The anti-forgery token rides along as a header.

use super::traits::SubmitTransport;
use super::types::{SubmitRequest, SubmitResponse, CSRF_HEADER};
use crate::error::SubmitError;
use crate::payload::{FormEntry, SubmissionPayload};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

/// Client for posting submissions over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SubmitError::InvalidRequest(format!("Failed to build client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubmitTransport for HttpTransport {
    async fn send(&self, request: &SubmitRequest) -> Result<SubmitResponse, SubmitError> {
        let mut builder = self
            .client
            .post(&request.endpoint)
            .timeout(request.timeout);

        if let Some(token) = &request.csrf_token {
            builder = builder.header(CSRF_HEADER, token);
        }

        builder = match &request.payload {
            SubmissionPayload::Json(data) => builder.json(data),
            SubmissionPayload::Multipart(entries) => builder.multipart(multipart_form(entries)?),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                SubmitError::Timeout(request.timeout)
            } else {
                SubmitError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.json::<SubmitResponse>().await?;
        Ok(body)
    }
}

fn multipart_form(entries: &[FormEntry]) -> Result<Form, SubmitError> {
    let mut form = Form::new();
    for entry in entries {
        form = match entry {
            FormEntry::Text { name, value } => form.text(name.clone(), value.clone()),
            FormEntry::File { name, file } => {
                let mut part = Part::bytes(file.content.clone()).file_name(file.name.clone());
                if let Some(mime) = &file.mime {
                    part = part.mime_str(mime)?;
                }
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SelectedFile;
    use serde_json::{json, Map};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{addr}/api/contact"), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let headers = text[..header_end].to_lowercase();
                if headers.contains("transfer-encoding: chunked") {
                    if text.ends_with("0\r\n\r\n") {
                        break;
                    }
                    continue;
                }
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn json_request(endpoint: String) -> SubmitRequest {
        let mut data = Map::new();
        data.insert("name".to_string(), json!("Jane"));
        data.insert("services".to_string(), json!(["web", "seo"]));
        SubmitRequest {
            endpoint,
            payload: SubmissionPayload::Json(data),
            csrf_token: Some("csrf-abc".to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_json_post_with_csrf_header() {
        let (endpoint, server) = serve_once("200 OK", r#"{"success": true, "message": "Thanks"}"#).await;
        let transport = HttpTransport::new().unwrap();

        let response = transport.send(&json_request(endpoint)).await.unwrap();
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("Thanks"));

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("post /api/contact"));
        assert!(raw.contains("x-csrf-token: csrf-abc"));
        assert!(raw.contains("content-type: application/json"));
        assert!(raw.contains(r#""services":["web","seo"]"#));
    }

    #[tokio::test]
    async fn test_multipart_post() {
        let (endpoint, server) = serve_once("200 OK", r#"{"success": true}"#).await;
        let transport = HttpTransport::new().unwrap();
        let request = SubmitRequest {
            endpoint,
            payload: SubmissionPayload::Multipart(vec![
                FormEntry::Text {
                    name: "name".to_string(),
                    value: "Jane".to_string(),
                },
                FormEntry::File {
                    name: "attachment".to_string(),
                    file: SelectedFile::new("cv.pdf", b"%PDF-1.4".to_vec()),
                },
            ]),
            csrf_token: None,
            timeout: Duration::from_secs(5),
        };

        transport.send(&request).await.unwrap();

        let raw = server.await.unwrap();
        assert!(raw.to_lowercase().contains("content-type: multipart/form-data"));
        assert!(!raw.to_lowercase().contains("x-csrf-token"));
        assert!(raw.contains("filename=\"cv.pdf\""));
        assert!(raw.contains("%PDF-1.4"));
    }

    #[tokio::test]
    async fn test_server_rejection_is_ok() {
        let (endpoint, _server) =
            serve_once("200 OK", r#"{"success": false, "message": "Spam"}"#).await;
        let transport = HttpTransport::new().unwrap();
        let response = transport.send(&json_request(endpoint)).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Spam"));
    }

    #[tokio::test]
    async fn test_non_2xx_is_http_error() {
        let (endpoint, _server) = serve_once("503 Service Unavailable", "{}").await;
        let transport = HttpTransport::new().unwrap();
        let err = transport.send(&json_request(endpoint)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Http { status: 503 }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (endpoint, _server) = serve_once("200 OK", "<html>ok</html>").await;
        let transport = HttpTransport::new().unwrap();
        let err = transport.send(&json_request(endpoint)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Decode(_)));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_not_retryable() {
        let transport = HttpTransport::new().unwrap();
        let err = transport
            .send(&json_request("not a url".to_string()))
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new().unwrap();
        let err = transport
            .send(&json_request(format!("http://{addr}/api/contact")))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)));
    }
}
