//! Typed client for the backend's REST surface.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde_json::Value;

use crate::{
    backend_config::join_backend_path,
    backend_http::{self, HttpRequest},
    http_response::HttpResponse,
    wizard_error::WizardError,
    API_REQUEST_TIMEOUT_MS,
};

const MULTIPART_BOUNDARY_PREFIX: &str = "----ruie-desktop-";

static BOUNDARY_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiEndpoint {
    Status,
    DetectLauncher,
    LauncherStatus,
    Init,
    Extract,
    ExtractedList,
    UseExtract,
    DeleteExtract,
    ListBackups,
    CreateBackup,
    RestoreBackup,
    DeleteBackup,
    ApplyColors,
    UploadMedia,
    DefaultMusic,
    ClearMusic,
    UpdateMusicCode,
    Repack,
    CompileChanges,
    TestLauncher,
    DeployTheme,
    ConfigSave,
    ConfigExport,
    ConfigLoad,
    ConfigList,
    BrowseForAsar,
    OpenBackupsFolder,
    OpenExtractionsFolder,
}

impl ApiEndpoint {
    pub const ALL: [ApiEndpoint; 28] = [
        Self::Status,
        Self::DetectLauncher,
        Self::LauncherStatus,
        Self::Init,
        Self::Extract,
        Self::ExtractedList,
        Self::UseExtract,
        Self::DeleteExtract,
        Self::ListBackups,
        Self::CreateBackup,
        Self::RestoreBackup,
        Self::DeleteBackup,
        Self::ApplyColors,
        Self::UploadMedia,
        Self::DefaultMusic,
        Self::ClearMusic,
        Self::UpdateMusicCode,
        Self::Repack,
        Self::CompileChanges,
        Self::TestLauncher,
        Self::DeployTheme,
        Self::ConfigSave,
        Self::ConfigExport,
        Self::ConfigLoad,
        Self::ConfigList,
        Self::BrowseForAsar,
        Self::OpenBackupsFolder,
        Self::OpenExtractionsFolder,
    ];

    pub fn method(self) -> HttpMethod {
        match self {
            Self::Status
            | Self::DetectLauncher
            | Self::LauncherStatus
            | Self::ExtractedList
            | Self::ListBackups
            | Self::DefaultMusic
            | Self::ConfigList => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Status => "/api/status",
            Self::DetectLauncher => "/api/detect-launcher",
            Self::LauncherStatus => "/api/launcher-status",
            Self::Init => "/api/init",
            Self::Extract => "/api/extract",
            Self::ExtractedList => "/api/extracted-list",
            Self::UseExtract => "/api/use-extract",
            Self::DeleteExtract => "/api/delete-extract",
            Self::ListBackups | Self::CreateBackup => "/api/backups",
            Self::RestoreBackup => "/api/restore-backup",
            Self::DeleteBackup => "/api/delete-backup",
            Self::ApplyColors => "/api/apply-colors",
            Self::UploadMedia => "/api/upload-media",
            Self::DefaultMusic => "/api/default-music",
            Self::ClearMusic => "/api/clear-music",
            Self::UpdateMusicCode => "/api/update-music-code",
            Self::Repack => "/api/repack",
            Self::CompileChanges => "/api/compile-changes",
            Self::TestLauncher => "/api/test-launcher",
            Self::DeployTheme => "/api/deploy-theme",
            Self::ConfigSave => "/api/config/save",
            Self::ConfigExport => "/api/config/export",
            Self::ConfigLoad => "/api/config/load",
            Self::ConfigList => "/api/config/list",
            Self::BrowseForAsar => "/api/browse-for-asar",
            Self::OpenBackupsFolder => "/api/open-backups-folder",
            Self::OpenExtractionsFolder => "/api/open-extractions-folder",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Empty,
    Json(Value),
    /// `multipart/form-data` with a `file` part and a `targetPath` field.
    Upload {
        file_name: String,
        bytes: Vec<u8>,
        target_path: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: ApiEndpoint,
    pub body: ApiBody,
}

impl ApiRequest {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self {
            endpoint,
            body: ApiBody::Empty,
        }
    }

    pub fn json(endpoint: ApiEndpoint, body: Value) -> Self {
        Self {
            endpoint,
            body: ApiBody::Json(body),
        }
    }

    pub fn upload(target_path: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            endpoint: ApiEndpoint::UploadMedia,
            body: ApiBody::Upload {
                file_name: file_name.to_string(),
                bytes,
                target_path: target_path.to_string(),
            },
        }
    }

    fn encode_body(&self) -> (Option<String>, Vec<u8>) {
        match &self.body {
            ApiBody::Empty if self.endpoint.method() == HttpMethod::Post => {
                (Some("application/json".to_string()), b"{}".to_vec())
            }
            ApiBody::Empty => (None, Vec::new()),
            ApiBody::Json(value) => (
                Some("application/json".to_string()),
                value.to_string().into_bytes(),
            ),
            ApiBody::Upload {
                file_name,
                bytes,
                target_path,
            } => {
                let safe_name = file_name.replace(['"', '\r', '\n'], "_");
                let boundary = multipart_boundary(&[
                    bytes.as_slice(),
                    safe_name.as_bytes(),
                    target_path.as_bytes(),
                ]);
                (
                    Some(format!("multipart/form-data; boundary={boundary}")),
                    encode_multipart(&boundary, &safe_name, bytes, target_path),
                )
            }
        }
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// First `<prefix><seed>-<n>` boundary that occurs in none of `parts`.
fn pick_boundary(parts: &[&[u8]], seed: u64) -> String {
    (0_u64..)
        .map(|attempt| format!("{MULTIPART_BOUNDARY_PREFIX}{seed:x}-{attempt:x}"))
        .find(|candidate| {
            !parts
                .iter()
                .any(|part| contains_bytes(part, candidate.as_bytes()))
        })
        .unwrap_or_else(|| format!("{MULTIPART_BOUNDARY_PREFIX}{seed:x}"))
}

fn multipart_boundary(parts: &[&[u8]]) -> String {
    let sequence = BOUNDARY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let nanos = u64::from(chrono::Utc::now().timestamp_subsec_nanos());
    pick_boundary(parts, (sequence << 32) ^ nanos)
}

fn encode_multipart(boundary: &str, file_name: &str, bytes: &[u8], target_path: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(
        format!(
            "\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"targetPath\"\r\n\r\n{target_path}\r\n--{boundary}--\r\n"
        )
        .as_bytes(),
    );
    body
}

/// Builds the user-facing message from `{error, details}`, falling back to the HTTP status.
pub fn backend_error_message(status: u16, payload: &Value) -> String {
    let error = payload
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {status}"));
    match payload.get("details").and_then(Value::as_str) {
        Some(details) if !details.is_empty() => format!("{error} ({details})"),
        _ => error,
    }
}

fn interpret_response(response: &HttpResponse) -> Result<Value, WizardError> {
    let payload = if response.body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&response.body).map_err(|error| WizardError::Backend {
            status: response.status,
            message: format!("Server returned invalid JSON ({error})"),
        })?
    };

    let reported_failure = payload.get("success").and_then(Value::as_bool) == Some(false);
    if !response.is_success() || reported_failure {
        return Err(WizardError::Backend {
            status: response.status,
            message: backend_error_message(response.status, &payload),
        });
    }
    Ok(payload)
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: Duration::from_millis(API_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint_url(&self, endpoint: ApiEndpoint) -> String {
        join_backend_path(&self.base_url, endpoint.path())
    }

    pub fn send(&self, request: &ApiRequest) -> Result<Value, WizardError> {
        let url = self.endpoint_url(request.endpoint);
        let (content_type, body) = request.encode_body();
        let response = backend_http::send_request(
            &HttpRequest {
                method: request.endpoint.method().as_str(),
                url: &url,
                content_type: content_type.as_deref(),
                body: &body,
            },
            self.timeout,
        )
        .map_err(WizardError::Network)?;
        interpret_response(&response)
    }

    /// GETs a static file served next to the API, such as `/presets/color-mapping-rsi.json`.
    pub fn fetch_text(&self, path: &str) -> Result<String, WizardError> {
        let url = join_backend_path(&self.base_url, path);
        let response = backend_http::send_request(&HttpRequest::get(&url), self.timeout)
            .map_err(WizardError::Network)?;
        if !response.is_success() {
            return Err(WizardError::Backend {
                status: response.status,
                message: format!("{path} returned status {}", response.status),
            });
        }
        Ok(response.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::{
        io::{Read, Write},
        net::{TcpListener, TcpStream},
        thread,
    };

    fn read_request(stream: &mut TcpStream) -> Vec<u8> {
        let mut raw = Vec::new();
        let mut buffer = [0_u8; 1024];
        loop {
            let read = stream.read(&mut buffer).expect("read request");
            if read == 0 {
                break;
            }
            raw.extend_from_slice(&buffer[..read]);
            let Some(head_end) = raw.windows(4).position(|window| window == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("Content-Length: "))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + content_length {
                break;
            }
        }
        raw
    }

    fn serve_once(status_line: &str, body: &str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base_url = format!("http://{}/", listener.local_addr().expect("addr"));
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).expect("write response");
            String::from_utf8_lossy(&request).into_owned()
        });
        (base_url, handle)
    }

    #[test]
    fn endpoint_table_matches_rest_surface() {
        assert_eq!(ApiEndpoint::Status.path(), "/api/status");
        assert_eq!(ApiEndpoint::Status.method(), HttpMethod::Get);
        assert_eq!(ApiEndpoint::ListBackups.path(), ApiEndpoint::CreateBackup.path());
        assert_eq!(ApiEndpoint::ListBackups.method(), HttpMethod::Get);
        assert_eq!(ApiEndpoint::CreateBackup.method(), HttpMethod::Post);
        assert_eq!(ApiEndpoint::ConfigList.method(), HttpMethod::Get);

        let get_count = ApiEndpoint::ALL
            .iter()
            .filter(|endpoint| endpoint.method() == HttpMethod::Get)
            .count();
        assert_eq!(get_count, 7);
        assert!(ApiEndpoint::ALL
            .iter()
            .all(|endpoint| endpoint.path().starts_with("/api/")));
    }

    #[test]
    fn backend_error_message_appends_details() {
        assert_eq!(
            backend_error_message(500, &json!({"error": "Failed to extract", "details": "disk full"})),
            "Failed to extract (disk full)"
        );
        assert_eq!(backend_error_message(404, &Value::Null), "Request failed with status 404");
        assert_eq!(
            backend_error_message(400, &json!({"message": "No ASAR selected"})),
            "No ASAR selected"
        );
    }

    #[test]
    fn send_posts_json_body() {
        let (base_url, handle) = serve_once("200 OK", r#"{"success":true,"async":true}"#);
        let client = BackendClient::new(&base_url).with_timeout(Duration::from_secs(2));
        let payload = client
            .send(&ApiRequest::json(
                ApiEndpoint::ApplyColors,
                json!({"colors": {"--primary": "#ff0000"}}),
            ))
            .expect("request should succeed");
        assert_eq!(payload["async"], json!(true));

        let request = handle.join().expect("server thread");
        assert!(request.starts_with("POST /api/apply-colors HTTP/1.1\r\n"));
        assert!(request.contains("Content-Type: application/json\r\n"));
        assert!(request.ends_with(r##"{"colors":{"--primary":"#ff0000"}}"##));
    }

    #[test]
    fn send_maps_error_payload_to_backend_error() {
        let (base_url, handle) = serve_once(
            "500 Internal Server Error",
            r#"{"success":false,"error":"Repack failed","details":"asar locked"}"#,
        );
        let client = BackendClient::new(&base_url).with_timeout(Duration::from_secs(2));
        let error = client
            .send(&ApiRequest::new(ApiEndpoint::Repack))
            .expect_err("request should fail");
        assert_eq!(
            error,
            WizardError::Backend {
                status: 500,
                message: "Repack failed (asar locked)".to_string()
            }
        );
        let request = handle.join().expect("server thread");
        assert!(request.ends_with("\r\n\r\n{}"));
    }

    #[test]
    fn send_treats_success_false_as_failure_even_with_ok_status() {
        let (base_url, handle) = serve_once("200 OK", r#"{"success":false,"error":"Launcher not found"}"#);
        let client = BackendClient::new(&base_url).with_timeout(Duration::from_secs(2));
        let error = client
            .send(&ApiRequest::new(ApiEndpoint::DetectLauncher))
            .expect_err("request should fail");
        assert_eq!(error.to_string(), "Launcher not found");
        let request = handle.join().expect("server thread");
        assert!(request.starts_with("GET /api/detect-launcher HTTP/1.1\r\n"));
    }

    #[test]
    fn send_uploads_multipart_form() {
        let (base_url, handle) = serve_once("200 OK", r#"{"success":true}"#);
        let client = BackendClient::new(&base_url).with_timeout(Duration::from_secs(2));
        client
            .send(&ApiRequest::upload(
                "assets/images/bg.jpg",
                "my bg.jpg",
                b"JPEGDATA".to_vec(),
            ))
            .expect("upload should succeed");

        let request = handle.join().expect("server thread");
        assert!(request.starts_with("POST /api/upload-media HTTP/1.1\r\n"));
        let boundary = request
            .lines()
            .find_map(|line| line.strip_prefix("Content-Type: multipart/form-data; boundary="))
            .expect("multipart content type")
            .to_string();
        assert!(boundary.starts_with(MULTIPART_BOUNDARY_PREFIX));
        assert!(request.contains("name=\"file\"; filename=\"my bg.jpg\""));
        assert!(request.contains("JPEGDATA"));
        assert!(request.contains("name=\"targetPath\"\r\n\r\nassets/images/bg.jpg\r\n"));
        assert!(request.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn boundary_skips_candidates_found_in_the_payload() {
        let payload = b"<svg>----ruie-desktop-7-0 and ----ruie-desktop-7-1</svg>".as_slice();
        assert_eq!(pick_boundary(&[payload], 7), "----ruie-desktop-7-2");
        assert_eq!(pick_boundary(&[b"plain".as_slice()], 7), "----ruie-desktop-7-0");
    }

    #[test]
    fn upload_containing_a_delimiter_line_keeps_three_delimiters() {
        let first_candidate = pick_boundary(&[], 0);
        let mut bytes = b"body text\r\n--".to_vec();
        bytes.extend_from_slice(first_candidate.as_bytes());
        bytes.extend_from_slice(b"--\r\ntrailer");

        let request = ApiRequest::upload("assets/style.css", "style.css", bytes.clone());
        let (content_type, body) = request.encode_body();
        let boundary = content_type
            .as_deref()
            .and_then(|value| value.strip_prefix("multipart/form-data; boundary="))
            .expect("multipart content type")
            .to_string();

        assert!(!contains_bytes(&bytes, boundary.as_bytes()));
        let delimiter = format!("--{boundary}");
        let occurrences = body
            .windows(delimiter.len())
            .filter(|window| *window == delimiter.as_bytes())
            .count();
        assert_eq!(occurrences, 3);
        assert!(contains_bytes(&body, &bytes));
    }

    #[test]
    fn fetch_text_reads_static_files_and_rejects_missing_ones() {
        let (base_url, handle) = serve_once("200 OK", r##"{"colors":{"--primary":"#54adf7"}}"##);
        let client = BackendClient::new(&base_url).with_timeout(Duration::from_secs(2));
        let text = client
            .fetch_text("/presets/color-mapping-rsi.json")
            .expect("preset should load");
        assert!(text.contains("#54adf7"));
        let request = handle.join().expect("server thread");
        assert!(request.starts_with("GET /presets/color-mapping-rsi.json HTTP/1.1\r\n"));

        let (base_url, handle) = serve_once("404 Not Found", "{}");
        let client = BackendClient::new(&base_url).with_timeout(Duration::from_secs(2));
        let error = client
            .fetch_text("/presets/color-mapping-banu.json")
            .expect_err("missing preset");
        assert!(matches!(error, WizardError::Backend { status: 404, .. }));
        handle.join().expect("server thread");
    }

    #[test]
    fn send_reports_network_error_when_backend_is_gone() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base_url = format!("http://{}/", listener.local_addr().expect("addr"));
        drop(listener);

        let client = BackendClient::new(&base_url).with_timeout(Duration::from_millis(200));
        let error = client
            .send(&ApiRequest::new(ApiEndpoint::Status))
            .expect_err("request should fail");
        assert!(matches!(error, WizardError::Network(_)));
    }
}
