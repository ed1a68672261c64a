//! Response decoding shared by every caller.

use crate::error::{AuthError, AuthResult};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The response declared a JSON content type.
    Json(serde_json::Value),
    /// Anything else, as text.
    Text(String),
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    content_type: Option<String>,
    body: ResponseBody,
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Returns the JSON body, if the response was JSON.
    pub fn json_value(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Deserializes the JSON body into `T`.
    ///
    /// A text body is a decode failure: the caller expected JSON.
    pub fn into_json<T: DeserializeOwned>(self) -> AuthResult<T> {
        match self.body {
            ResponseBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| AuthError::Decode(format!("unexpected response shape: {e}"))),
            ResponseBody::Text(text) => Err(AuthError::Decode(format!(
                "expected JSON response, got {}: {}",
                self.content_type.as_deref().unwrap_or("no content type"),
                truncate(&text)
            ))),
        }
    }

    /// Returns the body as text (JSON bodies are re-serialized).
    pub fn text(&self) -> String {
        match &self.body {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text.clone(),
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(120).collect()
}

/// Applies the decoding contract to a transport response.
pub(crate) async fn decode(response: reqwest::Response) -> AuthResult<ApiResponse> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let text = response.text().await?;

    if !status.is_success() {
        return Err(AuthError::Server {
            status: status.as_u16(),
            body: text,
        });
    }

    let is_json = content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("application/json"));

    let body = if is_json {
        if text.trim().is_empty() {
            ResponseBody::Json(serde_json::Value::Null)
        } else {
            let value = serde_json::from_str(&text)
                .map_err(|e| AuthError::Decode(format!("malformed JSON body: {e}")))?;
            ResponseBody::Json(value)
        }
    } else {
        ResponseBody::Text(text)
    };

    Ok(ApiResponse {
        status: status.as_u16(),
        content_type,
        body,
    })
}
