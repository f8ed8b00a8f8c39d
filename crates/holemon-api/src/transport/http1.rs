// Plain HTTP/1.1 transport
//
// One request per TCP connection (`Connection: close`), read to EOF. The
// body is returned with its transfer framing intact; `RawResponse::chunked`
// tells the decoder whether to strip chunk framing.

use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::trace;
use url::{Host, Url};

use super::{HttpTransport, RawResponse, USER_AGENT};
use crate::error::Error;

const HEAD_END: &[u8] = b"\r\n\r\n";

/// Minimal HTTP/1.1 client over `tokio::net::TcpStream`. `http://` only.
#[derive(Debug, Clone)]
pub struct Http1Transport {
    timeout: Duration,
}

impl Http1Transport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn send(
        &self,
        method: &str,
        url: &Url,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, Error> {
        if url.scheme() != "http" {
            return Err(Error::Config {
                message: format!("http1 transport cannot reach {}:// URLs", url.scheme()),
            });
        }
        let (Some(host), Some(dial)) = (url.host_str(), dial_host(url)) else {
            return Err(Error::Config {
                message: format!("URL has no host: {url}"),
            });
        };
        let port = url.port_or_known_default().unwrap_or(80);
        let request = encode_request(method, url, host, port, body.as_deref());

        let exchange = async {
            let mut stream = TcpStream::connect((dial.as_str(), port))
                .await
                .map_err(|e| Error::connect(origin(url), e))?;
            stream
                .write_all(&request)
                .await
                .map_err(|e| Error::connect(origin(url), e))?;

            let mut raw = Vec::new();
            stream
                .read_to_end(&mut raw)
                .await
                .map_err(|e| Error::connect(origin(url), e))?;
            trace!(bytes = raw.len(), "http1 response read");
            parse_response(&raw).map_err(|reason| Error::connect(origin(url), reason))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                Error::connect(
                    origin(url),
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            })?
    }
}

impl HttpTransport for Http1Transport {
    async fn get(&self, url: &Url) -> Result<RawResponse, Error> {
        self.send("GET", url, None).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<RawResponse, Error> {
        self.send("POST", url, Some(body.to_string().into_bytes()))
            .await
    }

    async fn delete(&self, url: &Url) -> Result<RawResponse, Error> {
        self.send("DELETE", url, None).await
    }
}

/// Host as a resolvable address: IPv6 literals without brackets.
fn dial_host(url: &Url) -> Option<String> {
    Some(match url.host()? {
        Host::Domain(name) => name.to_owned(),
        Host::Ipv4(ip) => ip.to_string(),
        Host::Ipv6(ip) => ip.to_string(),
    })
}

/// Scheme, host and port only, so session ids in the query never reach
/// error messages.
fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

fn encode_request(method: &str, url: &Url, host: &str, port: u16, body: Option<&[u8]>) -> Vec<u8> {
    let target = match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_owned(),
    };

    let mut head = format!(
        "{method} {target} HTTP/1.1\r\n\
         Host: {host}:{port}\r\n\
         User-Agent: {USER_AGENT}\r\n\
         Accept: application/json\r\n\
         Connection: close\r\n"
    );
    if let Some(body) = body {
        head.push_str("Content-Type: application/json\r\n");
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("\r\n");

    let mut request = head.into_bytes();
    if let Some(body) = body {
        request.extend_from_slice(body);
    }
    request
}

fn parse_response(raw: &[u8]) -> Result<RawResponse, String> {
    let split = raw
        .windows(HEAD_END.len())
        .position(|w| w == HEAD_END)
        .ok_or("connection closed before response headers were complete")?;
    let head = std::str::from_utf8(&raw[..split]).map_err(|_| "response head is not UTF-8")?;
    let mut body = &raw[split + HEAD_END.len()..];

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| format!("malformed status line {status_line:?}"))?;

    let mut chunked = false;
    let mut content_length = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("transfer-encoding") {
            chunked = value
                .split(',')
                .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"));
        } else if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().ok();
        }
    }

    if !chunked {
        if let Some(len) = content_length {
            body = &body[..len.min(body.len())];
        }
    }

    Ok(RawResponse {
        status,
        chunked,
        body: Bytes::copy_from_slice(body),
    })
}
