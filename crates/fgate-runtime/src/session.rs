//! Ambient session identity attached to the current task or thread.

use std::future::Future;

use uuid::Uuid;

tokio::task_local! {
    static CURRENT_SESSION: SessionInfo;
}

/// Authenticated principal of the current call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    session_id: Uuid,
    user_name: Option<String>,
}

impl SessionInfo {
    pub fn new(user_name: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_name,
        }
    }

    pub fn authenticated(user_name: impl Into<String>) -> Self {
        Self::new(Some(user_name.into()))
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// User name, treating an empty name as absent
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Run `future` with this session attached
    pub async fn scope<F: Future>(self, future: F) -> F::Output {
        CURRENT_SESSION.scope(self, future).await
    }

    /// Run `f` with this session attached to the current thread
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT_SESSION.sync_scope(self, f)
    }

    /// Session attached to the current task, if any
    pub fn current() -> Option<SessionInfo> {
        CURRENT_SESSION.try_with(|session| session.clone()).ok()
    }
}

/// Source of the current caller's identity
pub trait SessionIdentitySource: Send + Sync {
    /// Identifier of the caller, `None` when unauthenticated
    fn current_user(&self) -> Option<String>;
}

/// Reads the session attached with [`SessionInfo::scope`] or [`SessionInfo::sync_scope`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskSession;

impl SessionIdentitySource for TaskSession {
    fn current_user(&self) -> Option<String> {
        SessionInfo::current().and_then(|session| session.user_name().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_session_outside_scope() {
        assert!(SessionInfo::current().is_none());
        assert_eq!(TaskSession.current_user(), None);
    }

    #[test]
    fn test_sync_scope() {
        let user = SessionInfo::authenticated("alice").sync_scope(|| TaskSession.current_user());
        assert_eq!(user.as_deref(), Some("alice"));
        assert!(SessionInfo::current().is_none());
    }

    #[test]
    fn test_empty_name_is_unauthenticated() {
        let user = SessionInfo::authenticated("").sync_scope(|| TaskSession.current_user());
        assert_eq!(user, None);
    }

    #[tokio::test]
    async fn test_async_scopes_are_isolated() {
        let alice = tokio::spawn(SessionInfo::authenticated("alice").scope(async {
            tokio::task::yield_now().await;
            TaskSession.current_user()
        }));
        let bob = tokio::spawn(SessionInfo::authenticated("bob").scope(async {
            tokio::task::yield_now().await;
            TaskSession.current_user()
        }));

        assert_eq!(alice.await.unwrap().as_deref(), Some("alice"));
        assert_eq!(bob.await.unwrap().as_deref(), Some("bob"));
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(
            SessionInfo::anonymous().session_id(),
            SessionInfo::anonymous().session_id()
        );
    }
}
