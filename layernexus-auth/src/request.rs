//! Request descriptions.
//!
//! An [`ApiRequest`] is a plain description rather than a live
//! `reqwest::RequestBuilder` so the pipeline can rebuild it with a fresh
//! credential for the single retry.

use crate::credential::Credential;
use crate::error::{AuthError, AuthResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;

/// Body of an outbound request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No payload. Still negotiated as structured data.
    #[default]
    Empty,
    /// Structured data, sent as `application/json`.
    Json(serde_json::Value),
    /// Raw binary payload. No content type is imposed.
    Bytes(Vec<u8>),
    /// Multipart upload. The transport sets the boundary.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Returns true if the body is negotiated as JSON.
    pub fn is_structured(&self) -> bool {
        matches!(self, RequestBody::Empty | RequestBody::Json(_))
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        data: Vec<u8>,
        mime: Option<String>,
    },
}

/// A cloneable multipart form description.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        data: Vec<u8>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            data,
            mime: mime.map(str::to_string),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    fn to_form(&self) -> AuthResult<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    data,
                    mime,
                } => {
                    let mut file = Part::bytes(data.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        file = file.mime_str(mime).map_err(|e| {
                            AuthError::InvalidRequest(format!("invalid mime type {mime}: {e}"))
                        })?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// Description of one logical API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, or an absolute URL.
    pub path: String,
    /// Extra headers. `Authorization` is owned by the pipeline and ignored here.
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sets a JSON body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> AuthResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| AuthError::InvalidRequest(format!("unserializable body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn bytes(mut self, data: Vec<u8>) -> Self {
        self.body = RequestBody::Bytes(data);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds a transport request for one attempt.
    pub(crate) fn build(
        &self,
        client: &Client,
        url: &str,
        credential: Option<&Credential>,
    ) -> AuthResult<RequestBuilder> {
        let structured = self.body.is_structured();
        let mut builder = client.request(self.method.clone(), url);

        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                continue;
            }
            if structured && name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(credential) = credential {
            builder = builder.bearer_auth(credential.as_str());
        }

        builder = match &self.body {
            RequestBody::Empty => builder.header(CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| AuthError::InvalidRequest(format!("unserializable body: {e}")))?;
                builder.header(CONTENT_TYPE, "application/json").body(bytes)
            }
            RequestBody::Bytes(data) => builder.body(data.clone()),
            RequestBody::Multipart(form) => builder.multipart(form.to_form()?),
        };

        Ok(builder)
    }
}
