//! Saved flows dialog.
//!
//! Lists, saves, updates, deletes and loads the signed-in user's flows.
//! Every operation needs an identity; without one it fails before touching
//! the store.
//!
//! Refreshes are tagged with a generation number. Closing or re-opening the
//! dialog bumps the generation, so a listing that arrives late is dropped
//! instead of overwriting newer state.
//!
//! A dialog built with [`FlowsDialog::with_session`] holds a subscription to
//! the canvas session for as long as it lives. A sign-in or sign-out closes
//! it, and while someone holds the session only that user may manage flows.

use super::import_service::ImportService;
use super::mapper_service::MapperService;
use super::session_service::{SessionSubscription, UserIdentity};
use crate::models::{Flow, FlowSummary, Notification};
use crate::storage::{FlowStore, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FlowsError {
    #[error("You must be logged in to manage flows.")]
    NotSignedIn,
    #[error("Another user is signed in to this canvas.")]
    SessionHeldByOther,
    #[error("Please enter a name for your flow.")]
    EmptyName,
    #[error("You can only save up to {0} flows. Delete one to save a new flow.")]
    LimitReached(usize),
    #[error("Saved flow is not a valid diagram: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for FlowsError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::QuotaExceeded { limit } => FlowsError::LimitReached(limit),
            other => FlowsError::Storage(other),
        }
    }
}

/// Identifies one refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    user_id: Uuid,
}

/// Outcome of a listing fetched for a [`RefreshTicket`].
#[derive(Debug)]
pub struct RefreshResult {
    ticket: RefreshTicket,
    listing: Result<(Vec<Flow>, usize), StorageError>,
}

pub struct FlowsDialog {
    store: Arc<dyn FlowStore>,
    is_open: bool,
    generation: u64,
    flows: Vec<Flow>,
    count: usize,
    new_flow_name: String,
    session: Option<SessionSubscription>,
}

impl FlowsDialog {
    pub fn new(store: Arc<dyn FlowStore>) -> Self {
        Self {
            store,
            is_open: false,
            generation: 0,
            flows: Vec::new(),
            count: 0,
            new_flow_name: String::new(),
            session: None,
        }
    }

    /// A dialog tied to the canvas session; dropping it unsubscribes.
    pub fn with_session(store: Arc<dyn FlowStore>, session: SessionSubscription) -> Self {
        Self {
            session: Some(session),
            ..Self::new(store)
        }
    }

    /// Who holds the canvas session, if anyone.
    pub fn session_user(&self) -> Option<UserIdentity> {
        self.session.as_ref().and_then(SessionSubscription::current)
    }

    /// Pick up a sign-in or sign-out since the last check. A change closes
    /// the dialog and clears the listing; returns whether one happened.
    pub fn sync_session(&mut self) -> bool {
        let Some(change) = self.session.as_mut().and_then(SessionSubscription::poll_change)
        else {
            return false;
        };
        match &change {
            Some(user) => info!("Session now held by {}; closing flows dialog", user.user_id),
            None => info!("Session signed out; closing flows dialog"),
        }
        self.flows.clear();
        self.count = 0;
        self.close();
        true
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Flows from the last applied refresh, newest first.
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn summaries(&self) -> Vec<FlowSummary> {
        self.flows.iter().map(FlowSummary::from).collect()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn limit(&self) -> usize {
        self.store.flow_limit()
    }

    pub fn new_flow_name(&self) -> &str {
        &self.new_flow_name
    }

    pub fn set_new_flow_name(&mut self, name: impl Into<String>) {
        self.new_flow_name = name.into();
    }

    pub fn store(&self) -> Arc<dyn FlowStore> {
        Arc::clone(&self.store)
    }

    /// Show the dialog; returns a ticket for the initial listing when
    /// someone is signed in.
    pub fn open(&mut self, identity: Option<&UserIdentity>) -> Option<RefreshTicket> {
        self.sync_session();
        self.is_open = true;
        self.generation += 1;
        self.begin_refresh(identity)
    }

    /// Hide the dialog. Refreshes still in flight are discarded on arrival.
    pub fn close(&mut self) {
        self.is_open = false;
        self.generation += 1;
    }

    /// Start a refresh of the listing for the current generation.
    pub fn begin_refresh(&self, identity: Option<&UserIdentity>) -> Option<RefreshTicket> {
        let identity = identity?;
        self.is_open.then_some(RefreshTicket {
            generation: self.generation,
            user_id: identity.user_id,
        })
    }

    /// Fetch the listing for `ticket`. Needs no access to the dialog, so it
    /// can run without holding the dialog's lock.
    pub async fn fetch(store: Arc<dyn FlowStore>, ticket: RefreshTicket) -> RefreshResult {
        let listing: Result<(Vec<Flow>, usize), StorageError> = async {
            let flows = store.list_flows(ticket.user_id).await?;
            let count = store.count_flows(ticket.user_id).await?;
            Ok((flows, count))
        }
        .await;
        RefreshResult { ticket, listing }
    }

    /// Apply a fetched listing. Returns `false` when it was stale and
    /// dropped.
    pub fn apply_refresh(&mut self, result: RefreshResult, mapper: &mut MapperService) -> bool {
        self.sync_session();
        if !self.is_open || result.ticket.generation != self.generation {
            info!(
                "Discarding stale flow listing (generation {}, current {})",
                result.ticket.generation, self.generation
            );
            return false;
        }
        match result.listing {
            Ok((flows, count)) => {
                self.flows = flows;
                self.count = count;
            }
            Err(e) => {
                error!("Error fetching flows: {}", e);
                mapper.notify(Notification::error("Error", "Failed to fetch flows."));
            }
        }
        true
    }

    /// Fetch and apply the listing in one go.
    pub async fn refresh(
        &mut self,
        identity: Option<&UserIdentity>,
        mapper: &mut MapperService,
    ) -> bool {
        let Some(ticket) = self.begin_refresh(identity) else {
            return false;
        };
        let result = Self::fetch(self.store(), ticket).await;
        self.apply_refresh(result, mapper)
    }

    /// Save the current diagram under the entered name.
    ///
    /// The name is trimmed and must not be empty. At the limit the save is
    /// refused without calling the store.
    pub async fn save_new(
        &mut self,
        identity: Option<&UserIdentity>,
        mapper: &mut MapperService,
    ) -> Result<Flow, FlowsError> {
        let user = self.authorize(identity, mapper)?;

        let name = self.new_flow_name.trim().to_string();
        if name.is_empty() {
            return Err(notify_failure(mapper, FlowsError::EmptyName));
        }
        if self.count >= self.limit() {
            warn!("User {} tried to save beyond the flow limit", user.user_id);
            return Err(notify_failure(mapper, FlowsError::LimitReached(self.limit())));
        }

        let data = current_document_json(mapper)?;
        let flow = match self.store.create_flow(user.user_id, name, data).await {
            Ok(flow) => flow,
            Err(e) => {
                error!("Error saving flow: {}", e);
                return Err(notify_failure(mapper, e.into()));
            }
        };

        mapper.notify(Notification::info("Success", "Flow saved successfully."));
        self.new_flow_name.clear();
        self.refresh(identity, mapper).await;
        Ok(flow)
    }

    /// Overwrite a saved flow with the current diagram; its name stays.
    pub async fn update(
        &mut self,
        identity: Option<&UserIdentity>,
        flow_id: Uuid,
        mapper: &mut MapperService,
    ) -> Result<Flow, FlowsError> {
        let user = self.authorize(identity, mapper)?;
        let data = current_document_json(mapper)?;

        let flow = match self.store.update_flow(user.user_id, flow_id, data).await {
            Ok(flow) => flow,
            Err(e) => {
                error!("Error updating flow {}: {}", flow_id, e);
                return Err(notify_failure(mapper, e.into()));
            }
        };

        mapper.notify(Notification::info("Success", "Flow updated successfully."));
        self.refresh(identity, mapper).await;
        Ok(flow)
    }

    pub async fn delete(
        &mut self,
        identity: Option<&UserIdentity>,
        flow_id: Uuid,
        mapper: &mut MapperService,
    ) -> Result<(), FlowsError> {
        let user = self.authorize(identity, mapper)?;

        if let Err(e) = self.store.delete_flow(user.user_id, flow_id).await {
            error!("Error deleting flow {}: {}", flow_id, e);
            return Err(notify_failure(mapper, e.into()));
        }

        mapper.notify(Notification::info("Success", "Flow deleted successfully."));
        self.refresh(identity, mapper).await;
        Ok(())
    }

    /// Replace the diagram with a saved flow and close the dialog.
    pub async fn load(
        &mut self,
        identity: Option<&UserIdentity>,
        flow_id: Uuid,
        mapper: &mut MapperService,
    ) -> Result<Flow, FlowsError> {
        let user = self.authorize(identity, mapper)?;

        let flow = match self.store.get_flow(user.user_id, flow_id).await {
            Ok(flow) => flow,
            Err(e) => {
                error!("Error loading flow {}: {}", flow_id, e);
                return Err(notify_failure(mapper, e.into()));
            }
        };
        let document = ImportService::parse_json(&flow.data).map_err(|e| {
            notify_failure(mapper, FlowsError::InvalidData(e.to_string()))
        })?;

        mapper.replace_diagram(document);
        self.close();
        info!("Loaded flow {} ({})", flow.name, flow.id);
        Ok(flow)
    }
}

impl FlowsDialog {
    fn authorize<'a>(
        &self,
        identity: Option<&'a UserIdentity>,
        mapper: &mut MapperService,
    ) -> Result<&'a UserIdentity, FlowsError> {
        let user = identity.ok_or_else(|| notify_failure(mapper, FlowsError::NotSignedIn))?;
        if let Some(holder) = self.session_user()
            && holder.user_id != user.user_id
        {
            warn!(
                "User {} refused: canvas session held by {}",
                user.user_id, holder.user_id
            );
            return Err(notify_failure(mapper, FlowsError::SessionHeldByOther));
        }
        Ok(user)
    }
}

fn current_document_json(mapper: &mut MapperService) -> Result<String, FlowsError> {
    serde_json::to_string(&mapper.document()).map_err(|e| {
        notify_failure(
            mapper,
            FlowsError::Storage(StorageError::Other(format!(
                "Failed to serialize diagram: {}",
                e
            ))),
        )
    })
}

fn notify_failure(mapper: &mut MapperService, e: FlowsError) -> FlowsError {
    let description = match &e {
        FlowsError::Storage(_) => "The operation could not be completed.".to_string(),
        other => other.to_string(),
    };
    mapper.notify(Notification::error("Error", description));
    e
}
