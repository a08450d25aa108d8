//! HTTP client for the course-evaluation vendor API.

use futures::Stream;
use serde_json::Value;

use registrar_core::error::Result;
use registrar_core::gateway::{AuthScheme, RequestGateway};
use registrar_core::pagination;

/// Client for the course-evaluation v1 API.
///
/// The vendor authenticates with a literal `AuthToken` header (not a bearer
/// header); the token is optional and omitted entirely when absent.
pub struct EvalsClient {
    gateway: RequestGateway,
}

impl EvalsClient {
    /// Create a client for the given API base URL and optional token.
    pub fn new(api_url: &str, api_token: Option<&str>) -> Self {
        let auth = match api_token {
            Some(token) => AuthScheme::Header {
                name: "AuthToken".to_string(),
                value: token.to_string(),
            },
            None => AuthScheme::None,
        };
        Self {
            gateway: RequestGateway::new(api_url, auth),
        }
    }

    /// Stream the evaluation projects, one decoded page per item.
    pub fn get_projects<'a>(
        &'a self,
        params: &[(String, String)],
    ) -> impl Stream<Item = Result<Value>> + Send + 'a {
        let url = self.gateway.endpoint_url("projects");
        pagination::pages(&self.gateway, url, params.to_vec())
    }

    /// Stream the non-responders for a project, one decoded page per item.
    pub fn get_non_responders<'a>(
        &'a self,
        project_id: &str,
        params: &[(String, String)],
    ) -> impl Stream<Item = Result<Value>> + Send + 'a {
        let url = self
            .gateway
            .endpoint_url(&format!("projects/{project_id}/nonRespondents"));
        pagination::pages(&self.gateway, url, params.to_vec())
    }
}
