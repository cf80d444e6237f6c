//! Job bookkeeping for `/start_job` and `/status`.
//!
//! `/start_job` waits for its job to finish, but the run itself lives on a
//! spawned task so it always reaches a terminal status. The store remembers the
//! outcome so callers can poll it afterwards.

pub mod handlers;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::outreach::models::{OutreachRequest, OutreachResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Status id reported back to the purchaser.
    pub id: Uuid,
    pub job_id: Uuid,
    pub identifier_from_purchaser: String,
    pub input_hash: String,
    pub status: JobStatus,
    /// Serialized `OutreachResult` on success, `{"error": ..}` on failure.
    pub result: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn running(identifier_from_purchaser: String, input_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            identifier_from_purchaser,
            input_hash,
            status: JobStatus::Running,
            result: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    /// Moves the job to its terminal status. Anything that keeps the result
    /// from being stored counts as a failure.
    pub fn settle(&mut self, outcome: Result<OutreachResult, AppError>) {
        let stored = outcome.and_then(|result| {
            serde_json::to_string(&result).map_err(|e| AppError::Internal(e.into()))
        });
        match stored {
            Ok(text) => {
                info!("Job {} completed", self.job_id);
                self.finish(JobStatus::Completed, text);
            }
            Err(e) => {
                warn!("Job {} failed: {e}", self.job_id);
                self.finish(JobStatus::Failed, json!({ "error": e.to_string() }).to_string());
            }
        }
    }

    fn finish(&mut self, status: JobStatus, result: String) {
        self.status = status;
        self.result = Some(result);
        self.updated_at = Utc::now();
    }
}

/// Storage seam for job records. Swap the in-memory store for a durable one
/// without touching the handlers.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn put(&self, record: JobRecord);
    async fn get(&self, job_id: Uuid) -> Option<JobRecord>;
}

/// Process-local store. Records are lost on restart.
#[derive(Default)]
pub struct InMemoryJobStore {
    records: RwLock<HashMap<Uuid, JobRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, record: JobRecord) {
        self.records.write().await.insert(record.job_id, record);
    }

    async fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.records.read().await.get(&job_id).cloned()
    }
}

/// blake3 hex digest of the validated input as key-sorted JSON.
pub fn input_hash(request: &OutreachRequest) -> String {
    // serde_json's default map is ordered by key
    let canonical = json!({
        "company_name": request.company_name,
        "company_website": request.company_website.as_str(),
        "target_role": request.target_role,
        "product_description": request.product_description,
        "outreach_goal": request.outreach_goal,
        "tone": request.tone.as_str(),
    });
    blake3::hash(canonical.to_string().as_bytes())
        .to_hex()
        .to_string()
}
