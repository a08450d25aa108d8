//! HTTP request gateway shared by the Registrar API clients.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::debug;

use crate::error::{RegistrarError, Result};

/// Authentication scheme applied to every outgoing request.
#[derive(Debug, Clone)]
pub enum AuthScheme {
    /// No authentication header.
    None,
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// A literal header, e.g. `AuthToken: <token>`.
    Header { name: String, value: String },
    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

/// Per-request options.
///
/// Caller-supplied parameter and header collections are copied into the
/// request; the caller's values are never mutated.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Form-encoded request body, when present.
    pub form: Option<Vec<(String, String)>>,
    /// Per-request timeout on top of the client default.
    pub timeout: Option<Duration>,
    /// When false, non-2xx responses are handed back to the caller instead of
    /// failing with [`RegistrarError::HttpStatus`].
    pub exit_on_error: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            headers: Vec::new(),
            form: None,
            timeout: None,
            exit_on_error: true,
        }
    }
}

/// HTTP gateway wrapping one reqwest client, a base URL, and an auth scheme.
///
/// A pure boundary wrapper: it injects authentication, surfaces non-success
/// statuses as errors, and nothing else. Retries belong to callers.
pub struct RequestGateway {
    http: Client,
    base_url: String,
    auth: AuthScheme,
}

impl RequestGateway {
    /// Create a new gateway for the given base URL.
    pub fn new(base_url: &str, auth: AuthScheme) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Create a gateway with a custom reqwest client (useful for testing).
    pub fn with_http_client(base_url: &str, auth: AuthScheme, http: Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base URL and an endpoint path.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            AuthScheme::None => req,
            AuthScheme::Bearer(token) => req.bearer_auth(token),
            AuthScheme::Header { name, value } => req.header(name.as_str(), value.as_str()),
            AuthScheme::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }

    fn build(&self, method: Method, url: &str, opts: &RequestOptions) -> RequestBuilder {
        let mut req = self.http.request(method, url);
        if !opts.params.is_empty() {
            req = req.query(&opts.params);
        }
        for (name, value) in &opts.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(form) = &opts.form {
            req = req.form(form);
        }
        if let Some(timeout) = opts.timeout {
            req = req.timeout(timeout);
        }
        self.apply_auth(req)
    }

    async fn dispatch(&self, req: RequestBuilder, exit_on_error: bool) -> Result<Response> {
        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let url = response.url().to_string();
            debug!(url = %url, status = %status, "error status code for request");
            if exit_on_error {
                let body = response.text().await.unwrap_or_default();
                return Err(RegistrarError::HttpStatus { status, url, body });
            }
        }
        Ok(response)
    }

    /// Send a request, injecting the configured auth header.
    pub async fn send(&self, method: Method, url: &str, opts: RequestOptions) -> Result<Response> {
        let req = self.build(method, url, &opts);
        self.dispatch(req, opts.exit_on_error).await
    }

    /// Send a GET request with query parameters.
    pub async fn get(&self, url: &str, params: &[(String, String)]) -> Result<Response> {
        self.send(
            Method::GET,
            url,
            RequestOptions {
                params: params.to_vec(),
                ..Default::default()
            },
        )
        .await
    }

    /// Send a DELETE request with query parameters.
    pub async fn delete(&self, url: &str, params: &[(String, String)]) -> Result<Response> {
        self.send(
            Method::DELETE,
            url,
            RequestOptions {
                params: params.to_vec(),
                ..Default::default()
            },
        )
        .await
    }

    /// Send a multipart POST request (file uploads).
    pub async fn post_multipart(
        &self,
        url: &str,
        form: reqwest::multipart::Form,
        opts: RequestOptions,
    ) -> Result<Response> {
        let mut req = self.http.post(url).multipart(form);
        if !opts.params.is_empty() {
            req = req.query(&opts.params);
        }
        for (name, value) in &opts.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = opts.timeout {
            req = req.timeout(timeout);
        }
        req = self.apply_auth(req);
        self.dispatch(req, opts.exit_on_error).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn bearer_token_injected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/courses"))
            .and(header("authorization", "Bearer foo_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let gateway = RequestGateway::new(&mock_server.uri(), AuthScheme::Bearer("foo_token".into()));
        let response = gateway.get(&gateway.endpoint_url("courses"), &[]).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn custom_header_injected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects"))
            .and(header("AuthToken", "eval-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let gateway = RequestGateway::new(
            &mock_server.uri(),
            AuthScheme::Header {
                name: "AuthToken".into(),
                value: "eval-token".into(),
            },
        );
        let response = gateway.get(&gateway.endpoint_url("projects"), &[]).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn basic_auth_injected() {
        let mock_server = MockServer::start().await;

        // base64("user:pass")
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<book/>"))
            .mount(&mock_server)
            .await;

        let gateway = RequestGateway::new(
            &mock_server.uri(),
            AuthScheme::Basic {
                username: "user".into(),
                password: "pass".into(),
            },
        );
        let response = gateway.get(&gateway.endpoint_url("search"), &[]).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn params_sent_as_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/courses"))
            .and(query_param("per_page", "100"))
            .and(query_param("state", "available"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let gateway = RequestGateway::new(&mock_server.uri(), AuthScheme::None);
        let params = vec![
            ("per_page".to_string(), "100".to_string()),
            ("state".to_string(), "available".to_string()),
        ];
        let response = gateway.get(&gateway.endpoint_url("courses"), &params).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn error_status_raises_with_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&mock_server)
            .await;

        let gateway = RequestGateway::new(&mock_server.uri(), AuthScheme::None);
        let err = gateway
            .get(&gateway.endpoint_url("missing"), &[])
            .await
            .unwrap_err();
        match err {
            RegistrarError::HttpStatus { status, url, body } => {
                assert_eq!(status, 404);
                assert!(url.contains("/missing"));
                assert_eq!(body, "not found");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_suppressed_returns_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let gateway = RequestGateway::new(&mock_server.uri(), AuthScheme::None);
        let response = gateway
            .send(
                Method::GET,
                &gateway.endpoint_url("missing"),
                RequestOptions {
                    exit_on_error: false,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn form_body_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/pages/test"))
            .and(wiremock::matchers::body_string_contains("offer=true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let gateway = RequestGateway::new(&mock_server.uri(), AuthScheme::None);
        let response = gateway
            .send(
                Method::PUT,
                &gateway.endpoint_url("pages/test"),
                RequestOptions {
                    form: Some(vec![("offer".to_string(), "true".to_string())]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn endpoint_url_joins_with_single_slash() {
        let gateway = RequestGateway::new("https://lms.example.edu/api/v1/", AuthScheme::None);
        assert_eq!(
            gateway.endpoint_url("accounts/1/courses"),
            "https://lms.example.edu/api/v1/accounts/1/courses"
        );
        assert_eq!(
            gateway.endpoint_url("/accounts/1/courses"),
            "https://lms.example.edu/api/v1/accounts/1/courses"
        );
    }

    #[test]
    fn request_options_default_raises_on_error() {
        let opts = RequestOptions::default();
        assert!(opts.exit_on_error);
        assert!(opts.params.is_empty());
        assert!(opts.form.is_none());
    }
}
