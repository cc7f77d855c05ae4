use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of flows a single user may keep.
pub const DEFAULT_FLOW_LIMIT: usize = 5;

/// A named, saved snapshot of a diagram owned by one user.
///
/// `data` is the serialized diagram document, kept as text so the stored
/// payload is exactly what the user saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Flow {
    pub id: Uuid,
    pub name: String,
    pub data: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Flow {
    pub fn new(user_id: Uuid, name: String, data: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            data,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Flow listing without the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FlowSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Flow> for FlowSummary {
    fn from(flow: &Flow) -> Self {
        Self {
            id: flow.id,
            name: flow.name.clone(),
            created_at: flow.created_at,
        }
    }
}
