//! The canonical LMS API capability set.

use std::path::Path;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use registrar_core::error::Result;

use crate::models::WikiPage;

/// The LMS API surface consumed by the rest of the workspace.
///
/// There is exactly one signature per operation; [`crate::import::SisImporter`]
/// drives imports through this trait so tests can substitute a scripted
/// client. Paginated operations return a lazy stream of decoded page bodies;
/// everything else returns one decoded body.
#[async_trait]
pub trait LmsApi: Send + Sync {
    /// Stream the courses for an account, one page per item.
    fn get_account_courses<'a>(
        &'a self,
        account_id: &str,
        params: &[(String, String)],
    ) -> BoxStream<'a, Result<Value>>;

    /// Stream the user enrollments for a course, one page per item.
    fn get_course_users<'a>(
        &'a self,
        course_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> BoxStream<'a, Result<Value>>;

    /// Fetch a single course.
    async fn get_course_info(
        &self,
        course_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> Result<Value>;

    /// Delete an enrollment from a course. Use with caution.
    async fn delete_enrollment(
        &self,
        course_id: &str,
        enrollment_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> Result<Value>;

    /// Create or update a wiki page for a course.
    async fn put_page(
        &self,
        course_id: &str,
        is_sis_course_id: bool,
        page: &WikiPage,
        params: &[(String, String)],
    ) -> Result<Value>;

    /// Upload a CSV of SIS changes. Must accept a file path and submit its
    /// contents as the import payload.
    async fn import_sis_data(
        &self,
        account_id: &str,
        csv_path: &Path,
        params: &[(String, String)],
    ) -> Result<Value>;

    /// Get the status of an already created SIS import. Idempotent; safe to
    /// call repeatedly.
    async fn get_sis_import_status(&self, account_id: &str, import_id: &str) -> Result<Value>;

    /// Get the roles for an account.
    async fn get_account_roles(
        &self,
        account_id: &str,
        is_sis_account_id: bool,
        params: &[(String, String)],
    ) -> Result<Value>;

    /// Update a course.
    async fn update_course(
        &self,
        course_id: &str,
        is_sis_course_id: bool,
        params: &[(String, String)],
    ) -> Result<Value>;

    /// Publish a course.
    async fn publish_course(&self, course_id: &str, is_sis_course_id: bool) -> Result<Value>;

    /// Associate courses to a blueprint course.
    async fn associate_courses_to_blueprint(
        &self,
        course_id: &str,
        course_ids: &[String],
    ) -> Result<Value>;

    /// Get the blueprint courses in an account.
    async fn get_account_blueprint_courses(&self, account_id: &str) -> Result<Value>;
}
