//! Typed records for LMS payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course as returned by the account-courses endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub course_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sis_course_id: Option<String>,
    pub workflow_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
}

/// A user enrollment in a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    #[serde(rename = "type")]
    pub enrollment_type: String,
    pub enrollment_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sis_user_id: Option<String>,
}

/// An account role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    pub id: i64,
    pub role: String,
    pub label: String,
    pub base_role_type: String,
}

/// Fields for creating or updating a course wiki page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub url: Option<String>,
    pub title: Option<String>,
    pub body: String,
    pub published: bool,
    pub notify_of_update: bool,
    pub front_page: bool,
}

impl WikiPage {
    /// A page with the given HTML body and the vendor's defaults: published,
    /// no update notification, not the front page.
    pub fn new(body: &str) -> Self {
        Self {
            url: None,
            title: None,
            body: body.to_string(),
            published: true,
            notify_of_update: false,
            front_page: false,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_front_page(mut self, front_page: bool) -> Self {
        self.front_page = front_page;
        self
    }

    /// The form fields in the vendor's `wiki_page[...]` encoding.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("wiki_page[body]".to_string(), self.body.clone()),
            ("wiki_page[published]".to_string(), self.published.to_string()),
            (
                "wiki_page[notify_of_update]".to_string(),
                self.notify_of_update.to_string(),
            ),
            (
                "wiki_page[front_page]".to_string(),
                self.front_page.to_string(),
            ),
        ];
        if let Some(url) = &self.url {
            fields.push(("wiki_page[url]".to_string(), url.clone()));
        }
        if let Some(title) = &self.title {
            fields.push(("wiki_page[title]".to_string(), title.clone()));
        }
        fields
    }
}
