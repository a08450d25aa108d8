//! LMS v1 REST API client.

use std::path::Path;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::{multipart, Method};
use serde_json::Value;
use tracing::info;

use registrar_core::error::Result;
use registrar_core::gateway::{AuthScheme, RequestGateway, RequestOptions};
use registrar_core::pagination;

use crate::api::LmsApi;
use crate::models::WikiPage;

/// Default page size requested from the LMS API.
const DEFAULT_PER_PAGE: u32 = 100;

/// Client for the LMS v1 REST API.
///
/// Authenticates with a bearer token and injects a `per_page` parameter into
/// every request. Create separate clients for other API versions.
pub struct LmsClient {
    gateway: RequestGateway,
    per_page: u32,
}

impl LmsClient {
    /// Create a client for the given API base URL and token.
    pub fn new(api_url: &str, api_token: &str) -> Self {
        Self {
            gateway: RequestGateway::new(api_url, AuthScheme::Bearer(api_token.to_string())),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Override the default page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    fn merged_params(&self, params: &[(String, String)]) -> Vec<(String, String)> {
        let mut merged = vec![("per_page".to_string(), self.per_page.to_string())];
        merged.extend(params.iter().cloned());
        merged
    }

    /// Request string for querying by SIS course ID.
    fn course_ref(course_id: &str, is_sis_course_id: bool) -> String {
        if is_sis_course_id {
            format!("sis_course_id:{course_id}")
        } else {
            course_id.to_string()
        }
    }

    fn account_ref(account_id: &str, is_sis_account_id: bool) -> String {
        if is_sis_account_id {
            format!("sis_account_id:{account_id}")
        } else {
            account_id.to_string()
        }
    }

    async fn request_json(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(String, String)],
        form: Option<Vec<(String, String)>>,
    ) -> Result<Value> {
        let url = self.gateway.endpoint_url(endpoint);
        let response = self
            .gateway
            .send(
                method,
                &url,
                RequestOptions {
                    params: self.merged_params(params),
                    form,
                    ..Default::default()
                },
            )
            .await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl LmsApi for LmsClient {
    fn get_account_courses<'a>(
        &'a self,
        account_id: &str,
        params: &[(String, String)],
    ) -> BoxStream<'a, Result<Value>> {
        let url = self
            .gateway
            .endpoint_url(&format!("accounts/{account_id}/courses"));
        pagination::pages(&self.gateway, url, self.merged_params(params)).boxed()
    }

    fn get_course_users<'a>(
        &'a self,
        course_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> BoxStream<'a, Result<Value>> {
        let course_ref = Self::course_ref(course_id, is_sis_course_id);
        let url = self
            .gateway
            .endpoint_url(&format!("courses/{course_ref}/users"));
        pagination::pages(&self.gateway, url, self.merged_params(params)).boxed()
    }

    async fn get_course_info(
        &self,
        course_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> Result<Value> {
        let course_ref = Self::course_ref(course_id, is_sis_course_id);
        self.request_json(Method::GET, &format!("courses/{course_ref}"), params, None)
            .await
    }

    async fn delete_enrollment(
        &self,
        course_id: &str,
        enrollment_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> Result<Value> {
        let course_ref = Self::course_ref(course_id, is_sis_course_id);
        self.request_json(
            Method::DELETE,
            &format!("courses/{course_ref}/enrollments/{enrollment_id}"),
            params,
            None,
        )
        .await
    }

    async fn put_page(
        &self,
        course_id: &str,
        is_sis_course_id: bool,
        page: &WikiPage,
        params: &[(String, String)],
    ) -> Result<Value> {
        let course_ref = Self::course_ref(course_id, is_sis_course_id);
        let page_url = page.url.as_deref().unwrap_or_default();
        self.request_json(
            Method::PUT,
            &format!("courses/{course_ref}/pages/{page_url}"),
            params,
            Some(page.form_fields()),
        )
        .await
    }

    async fn import_sis_data(
        &self,
        account_id: &str,
        csv_path: &Path,
        params: &[(String, String)],
    ) -> Result<Value> {
        // Read the file up front so a missing path fails before any request.
        let bytes = tokio::fs::read(csv_path).await?;
        let file_name = csv_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("import.csv")
            .to_string();
        info!(path = %csv_path.display(), bytes = bytes.len(), "uploading SIS CSV");

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("attachment", part);

        let url = self
            .gateway
            .endpoint_url(&format!("accounts/{account_id}/sis_imports"));
        let response = self
            .gateway
            .post_multipart(
                &url,
                form,
                RequestOptions {
                    params: self.merged_params(params),
                    ..Default::default()
                },
            )
            .await?;
        Ok(response.json().await?)
    }

    async fn get_sis_import_status(&self, account_id: &str, import_id: &str) -> Result<Value> {
        self.request_json(
            Method::GET,
            &format!("accounts/{account_id}/sis_imports/{import_id}"),
            &[],
            None,
        )
        .await
    }

    async fn get_account_roles(
        &self,
        account_id: &str,
        is_sis_account_id: bool,
        params: &[(String, String)],
    ) -> Result<Value> {
        let account_ref = Self::account_ref(account_id, is_sis_account_id);
        self.request_json(
            Method::GET,
            &format!("accounts/{account_ref}/roles"),
            params,
            None,
        )
        .await
    }

    async fn update_course(
        &self,
        course_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> Result<Value> {
        let course_ref = Self::course_ref(course_id, is_sis_course_id);
        self.request_json(Method::PUT, &format!("courses/{course_ref}"), params, None)
            .await
    }

    async fn publish_course(&self, course_id: &str, is_sis_course_id: bool) -> Result<Value> {
        let params = vec![("offer".to_string(), "true".to_string())];
        self.update_course(course_id, is_sis_course_id, &params).await
    }

    async fn associate_courses_to_blueprint(
        &self,
        course_id: &str,
        course_ids: &[String],
    ) -> Result<Value> {
        let form: Vec<(String, String)> = course_ids
            .iter()
            .map(|id| ("course_ids_to_add[]".to_string(), id.clone()))
            .collect();
        self.request_json(
            Method::PUT,
            &format!("courses/{course_id}/blueprint_templates/default/update_associations"),
            &[],
            Some(form),
        )
        .await
    }

    async fn get_account_blueprint_courses(&self, account_id: &str) -> Result<Value> {
        let params = vec![
            ("blueprint".to_string(), "true".to_string()),
            ("include[]".to_string(), "subaccount".to_string()),
            ("include[]".to_string(), "term".to_string()),
        ];
        self.request_json(
            Method::GET,
            &format!("accounts/{account_id}/courses"),
            &params,
            None,
        )
        .await
    }
}
