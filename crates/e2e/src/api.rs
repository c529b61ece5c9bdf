//! Direct API access and response predicates
//!
//! The client constructs authenticated requests against the configured base
//! URL + API prefix and hands back the raw status and JSON body. All
//! interpretation lives in the predicates on [`ApiResponse`]; nothing here
//! retries.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::error::E2eResult;
use crate::fixtures::Endpoints;

/// HTTP client bound to the API under test.
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

/// Raw outcome of one API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> E2eResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, endpoints })
    }

    /// Issue one request. `token` becomes an `Authorization: Bearer` header
    /// when present; `body` is sent as JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> E2eResult<ApiResponse> {
        let url = self.endpoints.api_url(path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        // Error responses still carry a JSON error object; an empty body
        // becomes null rather than a transport error.
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> E2eResult<ApiResponse> {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> E2eResult<ApiResponse> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> E2eResult<ApiResponse> {
        self.request(Method::PUT, path, token, Some(body)).await
    }
}

impl ApiResponse {
    /// 200 or 201.
    pub fn is_success(&self) -> bool {
        matches!(self.status.as_u16(), 200 | 201)
    }

    /// 403 with a top-level `error` field.
    pub fn is_forbidden(&self) -> bool {
        self.status == StatusCode::FORBIDDEN && self.body.get("error").is_some()
    }

    /// 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Top-level `data` field of a success envelope.
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data")
    }

    /// `error.message` of a failure envelope.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error")?.get("message")?.as_str()
    }
}
