//! File-based flow store.
//!
//! Flows live in memory behind one async mutex. With a path configured,
//! every change is written to a JSON file (via a temporary file and rename)
//! before the lock is released; without one the store is purely in-memory.

use super::{StorageError, traits::FlowStore};
use crate::models::Flow;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub struct FileFlowStore {
    path: Option<PathBuf>,
    limit: usize,
    flows: Mutex<Vec<Flow>>,
}

impl FileFlowStore {
    /// A store that forgets everything on restart.
    pub fn in_memory(limit: usize) -> Self {
        Self {
            path: None,
            limit,
            flows: Mutex::new(Vec::new()),
        }
    }

    /// Open (or start) the store backed by the JSON file at `path`.
    pub async fn open(path: impl AsRef<Path>, limit: usize) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let flows = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StorageError::Other(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Flow file {} not found, starting empty", path.display());
                Vec::new()
            }
            Err(e) => {
                return Err(StorageError::ConnectionError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        info!("Loaded {} flow(s) from {}", flows.len(), path.display());
        Ok(Self {
            path: Some(path),
            limit,
            flows: Mutex::new(flows),
        })
    }

    async fn persist(&self, flows: &[Flow]) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(flows)
            .map_err(|e| StorageError::Other(format!("Failed to serialize flows: {}", e)))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::ConnectionError(format!("Failed to write flows: {}", e)))?;
        tokio::fs::rename(&tmp, path).await.map_err(|e| {
            StorageError::ConnectionError(format!("Failed to replace flow file: {}", e))
        })
    }
}

#[async_trait]
impl FlowStore for FileFlowStore {
    fn flow_limit(&self) -> usize {
        self.limit
    }

    async fn list_flows(&self, user_id: Uuid) -> Result<Vec<Flow>, StorageError> {
        let flows = self.flows.lock().await;
        // Later insertions come first among equal timestamps.
        let mut mine: Vec<Flow> = flows
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn count_flows(&self, user_id: Uuid) -> Result<usize, StorageError> {
        let flows = self.flows.lock().await;
        Ok(flows.iter().filter(|f| f.user_id == user_id).count())
    }

    async fn create_flow(
        &self,
        user_id: Uuid,
        name: String,
        data: String,
    ) -> Result<Flow, StorageError> {
        let mut flows = self.flows.lock().await;
        let count = flows.iter().filter(|f| f.user_id == user_id).count();
        if count >= self.limit {
            warn!("User {} is at the flow limit ({})", user_id, self.limit);
            return Err(StorageError::QuotaExceeded { limit: self.limit });
        }

        let flow = Flow::new(user_id, name, data);
        flows.push(flow.clone());
        if let Err(e) = self.persist(&flows).await {
            flows.pop();
            return Err(e);
        }
        info!("Saved flow {} for user {}", flow.id, user_id);
        Ok(flow)
    }

    async fn get_flow(&self, user_id: Uuid, flow_id: Uuid) -> Result<Flow, StorageError> {
        let flows = self.flows.lock().await;
        flows
            .iter()
            .find(|f| f.id == flow_id && f.user_id == user_id)
            .cloned()
            .ok_or_else(|| StorageError::flow_not_found(flow_id))
    }

    async fn update_flow(
        &self,
        user_id: Uuid,
        flow_id: Uuid,
        data: String,
    ) -> Result<Flow, StorageError> {
        let mut flows = self.flows.lock().await;
        let index = flows
            .iter()
            .position(|f| f.id == flow_id && f.user_id == user_id)
            .ok_or_else(|| StorageError::flow_not_found(flow_id))?;

        let previous = std::mem::replace(&mut flows[index].data, data);
        if let Err(e) = self.persist(&flows).await {
            flows[index].data = previous;
            return Err(e);
        }
        info!("Updated flow {}", flow_id);
        Ok(flows[index].clone())
    }

    async fn delete_flow(&self, user_id: Uuid, flow_id: Uuid) -> Result<(), StorageError> {
        let mut flows = self.flows.lock().await;
        let index = flows
            .iter()
            .position(|f| f.id == flow_id && f.user_id == user_id)
            .ok_or_else(|| StorageError::flow_not_found(flow_id))?;

        let removed = flows.remove(index);
        if let Err(e) = self.persist(&flows).await {
            flows.insert(index, removed);
            return Err(e);
        }
        info!("Deleted flow {}", flow_id);
        Ok(())
    }
}
