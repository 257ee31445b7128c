use std::sync::Arc;

use chrono::{DateTime, Local};
use model::{
    fleet::Driver,
    user::{Role, User},
    WithId,
};
use tokio::sync::RwLock;
use utility::id::Id;

use crate::{ApiError, ApiResult};

/// The logged in user. Drivers additionally carry the id of their driver
/// record, which is what shipments refer to.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: WithId<User>,
    pub driver: Option<Id<Driver>>,
    pub logged_in_at: DateTime<Local>,
}

impl Session {
    pub fn new(user: WithId<User>) -> Self {
        Self {
            user,
            driver: None,
            logged_in_at: Local::now(),
        }
    }

    pub fn user_id(&self) -> &Id<User> {
        &self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.content.role
    }
}

/// Owner of the current session. Readers get a snapshot, writes go through
/// `set` and `clear`.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    state: Arc<RwLock<Option<Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    pub async fn require(&self) -> ApiResult<Session> {
        self.current().await.ok_or(ApiError::NotLoggedIn)
    }

    pub async fn set(&self, session: Session) {
        log::info!(
            "Logged in as '{}' ({:?}).",
            session.user.content.name,
            session.role()
        );
        *self.state.write().await = Some(session);
    }

    /// Changes the role of the logged in user, e.g. after the backend made
    /// them a seller.
    pub async fn set_role(&self, role: Role) -> ApiResult<()> {
        let mut state = self.state.write().await;
        let session = state.as_mut().ok_or(ApiError::NotLoggedIn)?;
        session.user.content.role = role;
        Ok(())
    }

    pub async fn clear(&self) {
        if self.state.write().await.take().is_some() {
            log::info!("Logged out.");
        }
    }
}
