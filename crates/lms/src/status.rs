//! Decode-and-query models over SIS import payloads.

use serde_json::Value;
use tracing::debug;

use registrar_core::error::{RegistrarError, Result};

/// Workflow states after which an import job makes no further progress.
///
/// `failed` is terminal but not necessarily an error at the session level:
/// completion and success are judged separately.
pub const COMPLETED_STATES: [&str; 4] = [
    "imported",
    "imported_with_messages",
    "failed",
    "failed_with_messages",
];

/// One (source file, message) pair from a processing warning or error list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMessage {
    pub filename: String,
    pub message: String,
}

fn missing_field(payload: &Value, field: &str) -> RegistrarError {
    debug!(response = %payload, "SIS import response missing field");
    RegistrarError::FieldNotFound {
        field: field.to_string(),
    }
}

fn normalize_id(value: &Value) -> Result<String> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(RegistrarError::Serialization(format!(
            "unexpected import id value: {other}"
        ))),
    }
}

/// The vendor reports progress as an integer or a numeric string.
fn normalize_progress(value: &Value) -> Result<u8> {
    let progress = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    progress
        .filter(|p| *p <= 100)
        .map(|p| p as u8)
        .ok_or_else(|| {
            RegistrarError::Serialization(format!("unexpected progress value: {value}"))
        })
}

fn string_list(value: Option<&Value>) -> Result<Vec<String>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let Value::Array(items) = value else {
        return Err(RegistrarError::Serialization(format!(
            "expected a list of messages, got: {value}"
        )));
    };
    Ok(items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}

fn pair_list(payload: &Value, key: &str) -> Result<Vec<FileMessage>> {
    let Some(value) = payload.get(key) else {
        return Ok(Vec::new());
    };
    let Value::Array(entries) = value else {
        return Err(RegistrarError::Serialization(format!(
            "expected a list of (file, message) pairs for {key}, got: {value}"
        )));
    };
    entries
        .iter()
        .map(|entry| {
            let Some(pair) = entry.as_array().filter(|p| p.len() == 2) else {
                return Err(RegistrarError::Serialization(format!(
                    "malformed {key} entry: {entry}"
                )));
            };
            Ok(FileMessage {
                filename: pair[0].as_str().unwrap_or_default().to_string(),
                message: pair[1].as_str().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// The job identity decoded from a submit response.
///
/// Submission responses are sparse: only `id` is guaranteed. A non-empty
/// `errors` list surfaces problems the vendor detected synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportJob {
    pub id: String,
    pub errors: Vec<String>,
}

impl ImportJob {
    pub fn from_value(payload: &Value) -> Result<Self> {
        let id = payload.get("id").ok_or_else(|| missing_field(payload, "id"))?;
        Ok(Self {
            id: normalize_id(id)?,
            errors: string_list(payload.get("errors"))?,
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A decoded job-status payload; one instance per poll.
#[derive(Debug, Clone)]
pub struct ImportStatus {
    id: Option<String>,
    progress: u8,
    workflow_state: String,
    errors: Vec<String>,
    processing_warnings: Vec<FileMessage>,
    processing_errors: Vec<FileMessage>,
    raw: Value,
}

impl ImportStatus {
    /// Decode a status payload.
    ///
    /// `workflow_state` and `progress` are required; their absence is a hard
    /// decode failure. Optional fields decode to empty defaults.
    pub fn from_value(payload: &Value) -> Result<Self> {
        let state_value = payload
            .get("workflow_state")
            .ok_or_else(|| missing_field(payload, "workflow_state"))?;
        let workflow_state = state_value
            .as_str()
            .ok_or_else(|| {
                RegistrarError::Serialization(format!(
                    "unexpected workflow_state value: {state_value}"
                ))
            })?
            .to_string();

        let progress_value = payload
            .get("progress")
            .ok_or_else(|| missing_field(payload, "progress"))?;
        let progress = normalize_progress(progress_value)?;

        let id = match payload.get("id") {
            Some(value) => Some(normalize_id(value)?),
            None => None,
        };

        Ok(Self {
            id,
            progress,
            workflow_state,
            errors: string_list(payload.get("errors"))?,
            processing_warnings: pair_list(payload, "processing_warnings")?,
            processing_errors: pair_list(payload, "processing_errors")?,
            raw: payload.clone(),
        })
    }

    /// The job id, when the payload carried one. Poll responses may omit it.
    pub fn id(&self) -> Result<&str> {
        self.id.as_deref().ok_or_else(|| missing_field(&self.raw, "id"))
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn workflow_state(&self) -> &str {
        &self.workflow_state
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_processing_warnings(&self) -> bool {
        !self.processing_warnings.is_empty()
    }

    pub fn processing_warnings(&self) -> &[FileMessage] {
        &self.processing_warnings
    }

    pub fn has_processing_errors(&self) -> bool {
        !self.processing_errors.is_empty()
    }

    pub fn processing_errors(&self) -> &[FileMessage] {
        &self.processing_errors
    }

    /// True once the job reached a terminal workflow state. Unknown states
    /// are not complete.
    pub fn is_complete(&self) -> bool {
        COMPLETED_STATES.contains(&self.workflow_state.as_str())
    }

    /// The raw payload this status was decoded from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(&self.raw) {
            Ok(pretty) => f.write_str(&pretty),
            Err(_) => write!(f, "{}", self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn import_job_requires_id() {
        let err = ImportJob::from_value(&json!({"progress": 0})).unwrap_err();
        assert!(matches!(err, RegistrarError::FieldNotFound { field } if field == "id"));
    }

    #[test]
    fn import_job_id_normalized_from_number() {
        let job = ImportJob::from_value(&json!({"id": 13012})).unwrap();
        assert_eq!(job.id, "13012");
        assert!(!job.has_errors());
    }

    #[test]
    fn import_job_id_from_string() {
        let job = ImportJob::from_value(&json!({"id": "10", "errors": ["foo"]})).unwrap();
        assert_eq!(job.id, "10");
        assert!(job.has_errors());
        assert_eq!(job.errors, vec!["foo"]);
    }

    #[test]
    fn status_requires_workflow_state() {
        let err = ImportStatus::from_value(&json!({"id": 1, "progress": 50})).unwrap_err();
        assert!(
            matches!(err, RegistrarError::FieldNotFound { field } if field == "workflow_state")
        );
    }

    #[test]
    fn status_requires_progress() {
        let err =
            ImportStatus::from_value(&json!({"id": 1, "workflow_state": "importing"})).unwrap_err();
        assert!(matches!(err, RegistrarError::FieldNotFound { field } if field == "progress"));
    }

    #[test]
    fn progress_normalized_from_string() {
        let status =
            ImportStatus::from_value(&json!({"progress": "100", "workflow_state": "imported"}))
                .unwrap();
        assert_eq!(status.progress(), 100);
    }

    #[test]
    fn progress_normalized_from_number() {
        let status =
            ImportStatus::from_value(&json!({"progress": 50, "workflow_state": "importing"}))
                .unwrap();
        assert_eq!(status.progress(), 50);
    }

    #[test]
    fn progress_rejects_garbage() {
        let err = ImportStatus::from_value(
            &json!({"progress": "almost there", "workflow_state": "importing"}),
        )
        .unwrap_err();
        assert!(matches!(err, RegistrarError::Serialization(_)));

        let err =
            ImportStatus::from_value(&json!({"progress": 250, "workflow_state": "importing"}))
                .unwrap_err();
        assert!(matches!(err, RegistrarError::Serialization(_)));
    }

    #[test]
    fn id_accessor_fails_when_absent() {
        let status =
            ImportStatus::from_value(&json!({"progress": 50, "workflow_state": "importing"}))
                .unwrap();
        let err = status.id().unwrap_err();
        assert!(matches!(err, RegistrarError::FieldNotFound { field } if field == "id"));
    }

    #[test]
    fn id_accessor_returns_normalized_id() {
        let status = ImportStatus::from_value(
            &json!({"id": 13012, "progress": 0, "workflow_state": "created"}),
        )
        .unwrap();
        assert_eq!(status.id().unwrap(), "13012");
    }

    #[test]
    fn optional_fields_default_empty() {
        let status =
            ImportStatus::from_value(&json!({"progress": 100, "workflow_state": "imported"}))
                .unwrap();
        assert!(!status.has_errors());
        assert!(!status.has_processing_warnings());
        assert!(!status.has_processing_errors());
        assert!(status.errors().is_empty());
    }

    #[test]
    fn processing_pairs_decode() {
        let status = ImportStatus::from_value(&json!({
            "progress": 100,
            "workflow_state": "imported_with_messages",
            "processing_warnings": [["students.csv", "user John Doe has already claimed john_doe's requested login information, skipping"]],
            "processing_errors": [["students.csv", "Error while importing CSV. Please contact support."]]
        }))
        .unwrap();
        assert!(status.has_processing_warnings());
        assert_eq!(status.processing_warnings().len(), 1);
        assert_eq!(status.processing_warnings()[0].filename, "students.csv");
        assert!(status.has_processing_errors());
        assert_eq!(
            status.processing_errors()[0].message,
            "Error while importing CSV. Please contact support."
        );
    }

    #[test]
    fn malformed_pair_is_a_decode_error() {
        let err = ImportStatus::from_value(&json!({
            "progress": 100,
            "workflow_state": "imported",
            "processing_warnings": [["only-a-filename"]]
        }))
        .unwrap_err();
        assert!(matches!(err, RegistrarError::Serialization(_)));
    }

    #[test]
    fn is_complete_for_all_terminal_states() {
        for state in COMPLETED_STATES {
            let status =
                ImportStatus::from_value(&json!({"progress": 100, "workflow_state": state}))
                    .unwrap();
            assert!(status.is_complete(), "{state} should be complete");
        }
    }

    #[test]
    fn is_not_complete_for_other_states() {
        for state in ["created", "importing", "initializing", "NOT COMPLETE"] {
            let status =
                ImportStatus::from_value(&json!({"progress": 50, "workflow_state": state}))
                    .unwrap();
            assert!(!status.is_complete(), "{state} should not be complete");
        }
    }

    #[test]
    fn display_pretty_prints_raw_payload() {
        let status = ImportStatus::from_value(
            &json!({"id": 1, "progress": 100, "workflow_state": "imported"}),
        )
        .unwrap();
        let text = status.to_string();
        assert!(text.contains("\"workflow_state\": \"imported\""));
    }
}
