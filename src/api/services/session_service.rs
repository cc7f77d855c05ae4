//! Signed-in user context.
//!
//! The current identity lives in a `tokio::sync::watch` channel. Consumers
//! call [`SessionContext::subscribe`] and get notified on sign-in and
//! sign-out; dropping the [`SessionSubscription`] unsubscribes.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// The authenticated user as seen by the flow store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserIdentity {
    pub user_id: Uuid,
    pub email: String,
}

impl UserIdentity {
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}

#[derive(Debug)]
pub struct SessionContext {
    tx: watch::Sender<Option<UserIdentity>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    /// A context with nobody signed in.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn current(&self) -> Option<UserIdentity> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn sign_in(&self, identity: UserIdentity) {
        info!("User {} signed in", identity.user_id);
        self.tx.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            info!("User {} signed out", previous.user_id);
        }
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Live view of the session; drop it to unsubscribe.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<UserIdentity>>,
}

impl SessionSubscription {
    pub fn current(&self) -> Option<UserIdentity> {
        self.rx.borrow().clone()
    }

    /// The identity after a sign-in or sign-out not yet observed, without
    /// waiting. Each change is reported once.
    pub fn poll_change(&mut self) -> Option<Option<UserIdentity>> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Wait for the next sign-in or sign-out.
    ///
    /// Returns `None` once the context itself has been dropped.
    pub async fn changed(&mut self) -> Option<Option<UserIdentity>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
