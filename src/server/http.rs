//! Minimal HTTP/1.1 request parsing and response encoding.
//!
//! One request per connection; every response closes the connection.

use crate::utils::error::{Result, TradingError};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

pub const JSON_MIME: &str = "application/json";

const MAX_LINE_BYTES: usize = 8 * 1024;
const MAX_HEADERS: usize = 100;
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

impl HttpRequest {
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_BYTES as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;

    if read == 0 {
        return Ok(None);
    }
    if buf.len() > MAX_LINE_BYTES {
        return Err(protocol("header line too long"));
    }

    let line = String::from_utf8(buf).map_err(|_| protocol("request is not valid UTF-8"))?;
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn protocol(message: &str) -> TradingError {
    TradingError::ProtocolError {
        message: message.to_string(),
    }
}

/// Reads one request. `Ok(None)` means the peer closed before sending anything.
pub async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<HttpRequest>> {
    let Some(request_line) = read_line(reader).await? else {
        return Ok(None);
    };

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(protocol("malformed request line"));
    };
    let method = method.to_ascii_uppercase();
    let (path, query) = split_target(target);

    let mut headers = HashMap::new();
    loop {
        let Some(line) = read_line(reader).await? else {
            break;
        };
        if line.is_empty() {
            break;
        }
        if headers.len() >= MAX_HEADERS {
            return Err(protocol("too many headers"));
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    // 端點都不需要 body，讀掉以免客戶端收到 RST
    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    if content_length > MAX_BODY_BYTES {
        return Err(protocol("request body too large"));
    }
    if content_length > 0 {
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;
    }

    Ok(Some(HttpRequest {
        method,
        path,
        query,
        headers,
    }))
}

fn split_target(target: &str) -> (String, HashMap<String, String>) {
    let (raw_path, raw_query) = match target.split_once('?') {
        Some((p, q)) => (p, q),
        None => (target, ""),
    };

    // 重複參數以第一個為準
    let mut query = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        query.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    let path = percent_decode_str(raw_path).decode_utf8_lossy().into_owned();
    (path, query)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    /// HEAD 回應：標頭照常（含 Content-Length），不寫出 body
    pub head_only: bool,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body,
            head_only: false,
        }
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status, JSON_MIME, body),
            Err(e) => {
                tracing::error!("Failed to serialize response: {}", e);
                Self::error(500, "internal_error", "Failed to serialize response")
            }
        }
    }

    pub fn error(status: u16, error_type: &str, message: &str) -> Self {
        let body = serde_json::json!({ "error": error_type, "message": message });
        Self::new(status, JSON_MIME, body.to_string().into_bytes())
    }

    pub fn into_head(mut self) -> Self {
        self.head_only = true;
        self
    }

    pub fn no_content() -> Self {
        Self::new(204, "text/plain", Vec::new())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nAccess-Control-Allow-Origin: *\r\nAccess-Control-Allow-Methods: GET, HEAD, OPTIONS\r\nAccess-Control-Allow-Headers: Content-Type, Accept, Authorization\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            status_text(self.status),
            self.content_type,
            self.body.len()
        );

        let mut bytes = head.into_bytes();
        if !self.head_only {
            bytes.extend_from_slice(&self.body);
        }
        bytes
    }
}

pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &str) -> Result<Option<HttpRequest>> {
        let mut reader = BufReader::new(raw.as_bytes());
        read_request(&mut reader).await
    }

    #[tokio::test]
    async fn test_parse_get_with_query() {
        let request = parse(
            "GET /api/recommendations?timeframe=3d&assets=AAPL%2CGC%3DF HTTP/1.1\r\nHost: localhost\r\nAccept: application/json\r\n\r\n",
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/api/recommendations");
        assert_eq!(request.query_param("timeframe"), Some("3d"));
        assert_eq!(request.query_param("assets"), Some("AAPL,GC=F"));
        assert_eq!(request.header("Accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_parse_decodes_path() {
        let request = parse("GET /assets/app%20bundle.js HTTP/1.1\r\n\r\n")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.path, "/assets/app bundle.js");

        // 不合法的跳脫序列原樣保留，多位元組 UTF-8 正確解碼
        let request = parse("GET /a%zz/%E5%9C%96.png HTTP/1.1\r\n\r\n")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.path, "/a%zz/圖.png");
    }

    #[tokio::test]
    async fn test_parse_drains_body() {
        let request = parse("POST /health HTTP/1.1\r\nContent-Length: 4\r\n\r\nping")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.method, "POST");
        assert!(request.query.is_empty());
    }

    #[tokio::test]
    async fn test_empty_connection() {
        assert!(parse("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_request_line() {
        let err = parse("GARBAGE\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, TradingError::ProtocolError { .. }));
    }

    #[tokio::test]
    async fn test_oversized_header_line() {
        let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_LINE_BYTES + 10));
        assert!(parse(&raw).await.is_err());
    }

    #[test]
    fn test_response_carries_cors_headers() {
        let response = HttpResponse::json(200, &serde_json::json!({"status": "healthy"}));
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 20\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"status\":\"healthy\"}"));
    }

    #[test]
    fn test_head_response_keeps_length_without_body() {
        let response =
            HttpResponse::json(200, &serde_json::json!({"status": "healthy"})).into_head();
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.contains("Content-Length: 20\r\n"));
        assert!(text.ends_with("Connection: close\r\n\r\n"));
    }

    #[test]
    fn test_error_body() {
        let response = HttpResponse::error(404, "not_found", "Unknown endpoint");
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "Unknown endpoint");
    }
}
