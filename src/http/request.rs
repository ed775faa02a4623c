//! Request and response values exchanged with the transport

use crate::error::{LaunchpadError, LaunchpadResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// HTTP method subset used by the platform API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Create/update/delete calls run under the mutation deadline
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Multipart form payload: scalar fields plus files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Content type to declare; multipart bodies get theirs (with boundary)
    /// from the transport.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Multipart(_) => None,
            RequestBody::Empty | RequestBody::Json(_) => Some("application/json"),
        }
    }
}

/// A request against the platform API, relative to the configured base URL.
///
/// Requests are plain data so the client can re-issue them after a token
/// refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Short label for logs and timeout messages, e.g. `POST /services/`
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Raw response as returned by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body as `T`
    pub fn json<T: DeserializeOwned>(&self) -> LaunchpadResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| LaunchpadError::Decode(e.to_string()))
    }

    /// Decode the body as a JSON value; an empty body is `null`
    pub fn json_value(&self) -> LaunchpadResult<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        self.json()
    }

    /// Body as lossy UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-2xx response into the matching error kind
    pub fn into_error(self) -> LaunchpadError {
        match self.status {
            401 => LaunchpadError::AuthenticationRequired,
            400 | 422 => match serde_json::from_slice::<Value>(&self.body) {
                Ok(payload) => LaunchpadError::validation(&payload),
                Err(_) => LaunchpadError::ValidationFailed {
                    messages: vec![self.text().trim().to_string()],
                },
            },
            status => LaunchpadError::Unexpected {
                status,
                message: error_message(&self),
            },
        }
    }
}

fn error_message(response: &ApiResponse) -> String {
    if let Ok(payload) = serde_json::from_slice::<Value>(&response.body) {
        let lines = crate::error::flatten_messages(&payload);
        if !lines.is_empty() {
            return lines.join("; ");
        }
    }
    let text = response.text();
    let text = text.trim();
    if text.is_empty() {
        "no response body".to_string()
    } else {
        text.to_string()
    }
}
