//! Gateway HTTP Client
//!
//! Thin wrapper over `reqwest` for the four gateway endpoints the probes hit.
//! No timeout is configured: a hung gateway hangs the probe, as a manual smoke
//! test would.

use serde::Serialize;
use serde_json::Value;

use super::error::ProbeError;
use crate::utils::config::Credentials;

pub const HEALTH_PATH: &str = "/health";
pub const LOGIN_PATH: &str = "/api/customers/login";
pub const LOAN_COUNT_PATH: &str = "/api/loans/count";
pub const TRANSACTION_COUNT_PATH: &str = "/api/transactions/count";

/// Characters of the token shown on the console
pub const TOKEN_PREVIEW_LEN: usize = 50;

/// Raw gateway response: status code and body text
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value, ProbeError> {
        serde_json::from_str(&self.body).map_err(|source| ProbeError::InvalidBody {
            status: self.status,
            source,
        })
    }

    /// Top-level field of a JSON object body. Bodies that are valid JSON but
    /// not an object are rejected.
    pub fn field(&self, name: &str) -> Result<Option<Value>, ProbeError> {
        match self.json()? {
            Value::Object(mut fields) => Ok(fields.remove(name)),
            other => Err(ProbeError::UnexpectedShape {
                status: self.status,
                message: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Bearer token returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Extract the `token` field from a login response.
    /// Missing, null or empty tokens yield `None`; a token that is not a
    /// string is an error.
    pub fn from_login_response(response: &GatewayResponse) -> Result<Option<Self>, ProbeError> {
        match response.field("token")? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) if token.is_empty() => Ok(None),
            Some(Value::String(token)) => Ok(Some(Self(token))),
            Some(other) => Err(ProbeError::UnexpectedShape {
                status: response.status,
                message: format!("token is {}, not a string", json_kind(&other)),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First characters of the token, safe for display
    pub fn preview(&self) -> String {
        self.0.chars().take(TOKEN_PREVIEW_LEN).collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    ssn_id: &'a str,
    password: &'a str,
}

/// HTTP client bound to one gateway
pub struct GatewayClient {
    /// Base URL (e.g., "http://localhost:8080")
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /health
    pub async fn health(&self) -> Result<GatewayResponse, ProbeError> {
        self.get(HEALTH_PATH, None).await
    }

    /// POST /api/customers/login with a JSON credentials body
    pub async fn login(&self, credentials: &Credentials) -> Result<GatewayResponse, ProbeError> {
        let url = self.url(LOGIN_PATH);
        log::debug!("POST {} (ssnId={})", url, credentials.ssn_id);

        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&LoginRequest {
                ssn_id: &credentials.ssn_id,
                password: &credentials.password,
            });

        Self::send(request).await
    }

    /// GET `path` with `Authorization: Bearer <token>`
    pub async fn get_authorized(
        &self,
        path: &str,
        token: &SessionToken,
    ) -> Result<GatewayResponse, ProbeError> {
        self.get(path, Some(token)).await
    }

    async fn get(
        &self,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<GatewayResponse, ProbeError> {
        let url = self.url(path);
        log::debug!("GET {} (authenticated={})", url, token.is_some());

        let mut request = self.client.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token.as_str());
        }

        Self::send(request).await
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<GatewayResponse, ProbeError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        log::debug!("<- {} ({} bytes)", status, body.len());

        Ok(GatewayResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_trims_base_url() {
        let client = GatewayClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url(HEALTH_PATH), "http://localhost:8080/health");
    }

    #[test]
    fn test_login_request_uses_camel_case() {
        let body = serde_json::to_value(LoginRequest {
            ssn_id: "1001001",
            password: "password123",
        })
        .unwrap();
        assert_eq!(body, json!({"ssnId": "1001001", "password": "password123"}));
    }

    fn login_response(body: &str) -> GatewayResponse {
        GatewayResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_token_extraction() {
        let token = SessionToken::from_login_response(&login_response(r#"{"token":"abc123"}"#))
            .unwrap();
        assert_eq!(token.as_ref().map(|t| t.as_str()), Some("abc123"));

        for body in [r#"{"message":"ok"}"#, r#"{"token":""}"#, r#"{"token":null}"#] {
            let token = SessionToken::from_login_response(&login_response(body)).unwrap();
            assert!(token.is_none(), "{} should carry no token", body);
        }
    }

    #[test]
    fn test_non_string_token_is_rejected() {
        let err = SessionToken::from_login_response(&login_response(r#"{"token":42}"#))
            .unwrap_err();
        assert!(matches!(err, ProbeError::UnexpectedShape { status: 200, .. }));
        assert_eq!(
            err.to_string(),
            "unexpected response shape: token is a number, not a string"
        );
    }

    #[test]
    fn test_field_requires_json_object() {
        let count = login_response(r#"{"count":5}"#).field("count").unwrap();
        assert_eq!(count, Some(json!(5)));
        assert_eq!(login_response(r#"{"total":5}"#).field("count").unwrap(), None);

        let err = login_response(r#"["token"]"#).field("token").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected response shape: expected a JSON object, got an array"
        );
    }

    #[test]
    fn test_token_preview_truncates_on_chars() {
        let long = SessionToken("é".repeat(80));
        assert_eq!(long.preview().chars().count(), TOKEN_PREVIEW_LEN);

        let short = SessionToken("abc123".to_string());
        assert_eq!(short.preview(), "abc123");
    }

    #[test]
    fn test_response_json() {
        let ok = GatewayResponse {
            status: 200,
            body: r#"{"count": 5}"#.to_string(),
        };
        assert!(ok.is_ok());
        assert_eq!(ok.json().unwrap()["count"], 5);

        let broken = GatewayResponse {
            status: 200,
            body: "not json".to_string(),
        };
        assert!(matches!(
            broken.json(),
            Err(ProbeError::InvalidBody { status: 200, .. })
        ));
    }
}
