use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::platform::{KvStore, StorageError};

/// One uploaded resume and the raw feedback it received.
///
/// Stored as JSON under `resume:{owner}:{id}`. `feedback` is kept exactly as
/// the AI service returned it; `None` means the analysis has not landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: Uuid,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub resume_path: String,
    pub image_path: Option<String>,
    #[serde(default)]
    pub feedback: Option<Value>,
    pub created_at: DateTime<Utc>,
}

pub fn record_key(owner: &str, id: Uuid) -> String {
    format!("resume:{owner}:{id}")
}

/// Matches every record key of one owner.
pub fn record_key_pattern(owner: &str) -> String {
    format!("resume:{owner}:*")
}

pub fn resume_blob_path(owner: &str, id: Uuid) -> String {
    format!("resumes/{owner}/{id}/resume.pdf")
}

pub fn preview_blob_path(owner: &str, id: Uuid, extension: &str) -> String {
    format!("resumes/{owner}/{id}/preview.{extension}")
}

pub async fn save_record(
    kv: &dyn KvStore,
    owner: &str,
    record: &ResumeRecord,
) -> Result<(), StorageError> {
    kv.set(&record_key(owner, record.id), &serde_json::to_string(record)?)
        .await
}

pub async fn load_record(
    kv: &dyn KvStore,
    owner: &str,
    id: Uuid,
) -> Result<Option<ResumeRecord>, StorageError> {
    match kv.get(&record_key(owner, id)).await? {
        Some(stored) => Ok(Some(serde_json::from_str(&stored)?)),
        None => Ok(None),
    }
}

/// All of an owner's records, newest first. Unreadable records are skipped.
pub async fn list_records(
    kv: &dyn KvStore,
    owner: &str,
) -> Result<Vec<ResumeRecord>, StorageError> {
    let mut records = Vec::new();
    for key in kv.list(&record_key_pattern(owner)).await? {
        let Some(stored) = kv.get(&key).await? else {
            continue;
        };
        match serde_json::from_str::<ResumeRecord>(&stored) {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping unreadable record {key}: {e}"),
        }
    }
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(records)
}
