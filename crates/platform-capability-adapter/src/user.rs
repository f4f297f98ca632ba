//! Process-wide signed-in user.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Shared holder for the current user.
///
/// The whole user is swapped in one step, so readers see either no user or
/// a complete one. Cloning the context shares the same slot.
#[derive(Clone)]
pub struct CurrentUserContext {
    slot: Arc<watch::Sender<Option<Arc<CurrentUser>>>>,
}

impl CurrentUserContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { slot: Arc::new(tx) }
    }

    pub fn get(&self) -> Option<Arc<CurrentUser>> {
        self.slot.borrow().clone()
    }

    pub fn set(&self, user: CurrentUser) -> Arc<CurrentUser> {
        let user = Arc::new(user);
        self.slot.send_replace(Some(user.clone()));
        user
    }

    pub fn clear(&self) {
        self.slot.send_replace(None);
    }

    pub fn is_signed_in(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Receive every change to the current user.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<CurrentUser>>> {
        self.slot.subscribe()
    }
}

impl Default for CurrentUserContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CurrentUserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUserContext")
            .field("user", &self.get())
            .finish()
    }
}
