//! Storage trait definitions for the flow store backends.

use super::StorageError;
use crate::models::Flow;
use uuid::Uuid;

/// Per-user store of saved flows.
///
/// Every operation is scoped to `user_id`; a flow owned by another user is
/// reported as not found.
#[async_trait::async_trait]
pub trait FlowStore: Send + Sync {
    /// Maximum number of flows a user may keep.
    fn flow_limit(&self) -> usize;

    /// The user's flows, newest first.
    async fn list_flows(&self, user_id: Uuid) -> Result<Vec<Flow>, StorageError>;

    async fn count_flows(&self, user_id: Uuid) -> Result<usize, StorageError>;

    /// Insert a new flow unless the user is at the limit.
    ///
    /// The count check and the insert happen atomically, so concurrent
    /// saves cannot push a user past the limit.
    async fn create_flow(
        &self,
        user_id: Uuid,
        name: String,
        data: String,
    ) -> Result<Flow, StorageError>;

    async fn get_flow(&self, user_id: Uuid, flow_id: Uuid) -> Result<Flow, StorageError>;

    /// Overwrite the payload of an existing flow; the name is kept.
    async fn update_flow(
        &self,
        user_id: Uuid,
        flow_id: Uuid,
        data: String,
    ) -> Result<Flow, StorageError>;

    async fn delete_flow(&self, user_id: Uuid, flow_id: Uuid) -> Result<(), StorageError>;
}
