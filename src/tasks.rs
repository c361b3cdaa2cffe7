//! Asynchronous task execution: PENDING -> STARTED -> {SUCCESS, FAILURE}.
//!
//! Each submission is an independent unit of work run on the tokio worker
//! pool. A record never stays in a non-terminal state once its unit of
//! work has finished; retention of terminal records is an external concern.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::error;
use uuid::Uuid;

use crate::pipeline::Pipeline;
use crate::types::{PipelinePayload, PipelineResult, TaskRecord, TaskStatus};

#[derive(Clone)]
pub struct TaskManager {
    pipeline: Arc<Pipeline>,
    records: Arc<RwLock<HashMap<String, TaskRecord>>>,
}

impl TaskManager {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline, records: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Create a PENDING record and spawn the unit of work.
    pub async fn submit(&self, payload: PipelinePayload) -> String {
        let task_id = Uuid::new_v4().to_string();
        self.records.write().await.insert(
            task_id.clone(),
            TaskRecord {
                task_id: task_id.clone(),
                status: TaskStatus::Pending,
                result: None,
                error: None,
            },
        );

        let pipeline = self.pipeline.clone();
        let records = self.records.clone();
        let id = task_id.clone();
        tokio::spawn(async move {
            set_status(&records, &id, TaskStatus::Started, None, None).await;
            match pipeline.process(payload).await {
                Ok(result) => {
                    set_status(&records, &id, TaskStatus::Success, Some(result), None).await;
                }
                Err(err) => {
                    error!(task_id = %id, %err, "verification unit of work failed");
                    set_status(&records, &id, TaskStatus::Failure, None, Some(err.to_string()))
                        .await;
                }
            }
        });

        task_id
    }

    /// Snapshot of the task record; `None` for unknown ids.
    pub async fn poll(&self, task_id: &str) -> Option<TaskRecord> {
        self.records.read().await.get(task_id).cloned()
    }
}

async fn set_status(
    records: &RwLock<HashMap<String, TaskRecord>>,
    task_id: &str,
    status: TaskStatus,
    result: Option<PipelineResult>,
    error: Option<String>,
) {
    if let Some(record) = records.write().await.get_mut(task_id) {
        record.status = status;
        record.result = result;
        record.error = error;
    }
}
