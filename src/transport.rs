// Transport layer: a small trait between the API client and the wire so the
// request-building and error-mapping logic can be exercised against a mock.
// The real implementation owns a persistent reqwest blocking client.

use std::fs::File;
use std::path::{Path, PathBuf};

use reqwest::blocking::{multipart, Client};
use reqwest::Method;

use crate::error::Result;

/// One outgoing request, fully described before it touches the network.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// Multipart form described by value so it can be inspected in tests; the
/// file is only opened by the real transport.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub file_field: String,
    pub file_path: PathBuf,
}

/// Raw response: status plus body text. Non-2xx statuses are returned here
/// as-is; mapping them to errors is the API client's job.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(payload) => builder.json(payload),
            RequestBody::Multipart(body) => {
                // Open the file first: a missing file is a local IO error
                // and must surface before any network activity.
                let file = File::open(&body.file_path)?;
                let file_name = body
                    .file_path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("upload")
                    .to_string();
                let part = multipart::Part::reader(file)
                    .file_name(file_name)
                    .mime_str(mime_for(&body.file_path))?;

                let mut form = multipart::Form::new();
                for (name, value) in &body.fields {
                    form = form.text(name.clone(), value.clone());
                }
                builder.multipart(form.part(body.file_field.clone(), part))
            }
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
