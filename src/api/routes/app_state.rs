//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state: the
//! diagram controller, the flow store, the JWT service and the optional
//! database pool.

use crate::config::ApiConfig;
use crate::services::jwt_service::{JwtService, SharedJwtService};
use crate::services::mapper_service::MapperService;
use crate::services::session_service::SessionContext;
use crate::storage::{FileFlowStore, FlowStore, PostgresFlowStore, StorageError};
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Controller of the shared canvas
    pub mapper: Arc<Mutex<MapperService>>,
    /// Saved flows (PostgreSQL, JSON file or in-memory)
    pub flow_store: Arc<dyn FlowStore>,
    /// Validates bearer tokens
    pub jwt: SharedJwtService,
    /// Identity last reported through `/auth/status`
    pub session: Arc<SessionContext>,
    /// PostgreSQL database connection pool (optional)
    pub database: Option<PgPool>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Create a state with an in-memory flow store.
    pub fn new(config: ApiConfig, jwt: JwtService) -> Self {
        let flow_store: Arc<dyn FlowStore> = Arc::new(FileFlowStore::in_memory(config.flow_limit));
        Self {
            mapper: Arc::new(Mutex::new(MapperService::new())),
            flow_store,
            jwt: Arc::new(jwt),
            session: Arc::new(SessionContext::new()),
            database: None,
            config: Arc::new(config),
        }
    }

    /// Replace the flow store.
    pub fn with_flow_store(mut self, flow_store: Arc<dyn FlowStore>) -> Self {
        self.flow_store = flow_store;
        self
    }

    /// Initialize the flow store from configuration.
    ///
    /// Connects to PostgreSQL and runs migrations if a database URL is set,
    /// otherwise opens the JSON flow file if one is set. With neither the
    /// in-memory store stays in place.
    pub async fn init_storage(&mut self) -> Result<(), StorageError> {
        let limit = self.config.flow_limit;

        if let Some(database_url) = self.config.database_url.clone() {
            let pool = sqlx::PgPool::connect(&database_url).await.map_err(|e| {
                StorageError::ConnectionError(format!("Failed to connect to database: {}", e))
            })?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| StorageError::ConnectionError(format!("Migration failed: {}", e)))?;

            info!("Using PostgreSQL flow store (limit {})", limit);
            self.database = Some(pool.clone());
            self.flow_store = Arc::new(PostgresFlowStore::new(pool, limit));
        } else if let Some(path) = self.config.flows_file.clone() {
            info!("Using file flow store at {} (limit {})", path.display(), limit);
            self.flow_store = Arc::new(FileFlowStore::open(&path, limit).await?);
        } else {
            info!("Using in-memory flow store (limit {})", limit);
        }
        Ok(())
    }

    /// Get a reference to the database pool if available.
    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    /// Check if PostgreSQL storage is enabled
    pub fn is_postgres(&self) -> bool {
        self.database.is_some()
    }
}

impl FromRef<AppState> for Arc<Mutex<MapperService>> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.mapper.clone()
    }
}

impl FromRef<AppState> for Arc<dyn FlowStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.flow_store.clone()
    }
}

impl FromRef<AppState> for SharedJwtService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt.clone()
    }
}
