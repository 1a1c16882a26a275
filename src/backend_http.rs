use std::{
    io::{Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use url::Url;

use crate::http_response::{self, HttpResponse};

const USER_AGENT: &str = concat!("ruie-desktop/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
}

impl<'a> HttpRequest<'a> {
    pub fn get(url: &'a str) -> Self {
        Self {
            method: "GET",
            url,
            content_type: None,
            body: &[],
        }
    }
}

fn connect(url: &Url, timeout: Duration) -> Result<TcpStream, String> {
    let host = url
        .host_str()
        .ok_or_else(|| format!("URL has no host: {url}"))?;
    let port = url.port_or_known_default().unwrap_or(80);
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|error| format!("Failed to resolve {host}:{port}: {error}"))?;

    let mut last_error = None;
    for address in addrs {
        match TcpStream::connect_timeout(&address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(error) => last_error = Some(error),
        }
    }
    Err(match last_error {
        Some(error) => format!("Failed to connect to {host}:{port}: {error}"),
        None => format!("No addresses resolved for {host}:{port}"),
    })
}

fn build_request_head(request: &HttpRequest<'_>, url: &Url) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    let host = match url.port() {
        Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
        None => url.host_str().unwrap_or_default().to_string(),
    };

    let mut head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nAccept: application/json\r\nConnection: close\r\n",
        request.method, target, host, USER_AGENT
    );
    if let Some(content_type) = request.content_type {
        head.push_str(&format!("Content-Type: {content_type}\r\n"));
    }
    if !request.body.is_empty() || request.method != "GET" {
        head.push_str(&format!("Content-Length: {}\r\n", request.body.len()));
    }
    head.push_str("\r\n");
    head
}

/// Sends one request over a fresh connection and reads until the server closes it.
pub fn send_request(request: &HttpRequest<'_>, timeout: Duration) -> Result<HttpResponse, String> {
    let url = Url::parse(request.url).map_err(|error| format!("Invalid URL {}: {error}", request.url))?;
    if url.scheme() != "http" {
        return Err(format!("Unsupported URL scheme '{}'.", url.scheme()));
    }

    let timeout = timeout.max(Duration::from_millis(50));
    let mut stream = connect(&url, timeout)?;
    stream
        .set_read_timeout(Some(timeout))
        .and_then(|_| stream.set_write_timeout(Some(timeout)))
        .map_err(|error| format!("Failed to configure socket timeouts: {error}"))?;

    let mut payload = build_request_head(request, &url).into_bytes();
    payload.extend_from_slice(request.body);
    stream
        .write_all(&payload)
        .and_then(|_| stream.flush())
        .map_err(|error| format!("Failed to send {} {}: {error}", request.method, request.url))?;

    let mut raw = Vec::new();
    stream
        .read_to_end(&mut raw)
        .map_err(|error| format!("Failed to read response from {}: {error}", request.url))?;

    http_response::parse_http_response(&raw)
}

/// Returns true only when the backend answers the status URL with a 2xx response.
pub fn probe_backend_status(status_url: &str, timeout: Duration) -> bool {
    send_request(&HttpRequest::get(status_url), timeout)
        .map(|response| response.is_success())
        .unwrap_or(false)
}
