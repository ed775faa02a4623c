//! Session state: the stored token pair and login/logout notifications

use crate::error::LaunchpadResult;
use crate::storage::{Change, Storage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Whether the client currently holds credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    SignedIn,
    SignedOut,
}

/// Access/refresh token pair as stored on the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl TokenPair {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Token payload returned by the login and refresh endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct IssuedTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Shared handle to the session credentials.
///
/// Cloning is cheap; all clones observe the same storage and notify the same
/// subscribers.
#[derive(Clone)]
pub struct SessionState {
    storage: Arc<dyn Storage>,
    status: Arc<watch::Sender<AuthStatus>>,
}

impl SessionState {
    /// Build session state over `storage`, reading the initial status from it
    pub async fn load(storage: Arc<dyn Storage>) -> LaunchpadResult<Self> {
        let tokens = read_tokens(storage.as_ref()).await?;
        let initial = if tokens.is_empty() {
            AuthStatus::SignedOut
        } else {
            AuthStatus::SignedIn
        };
        let (status, _) = watch::channel(initial);
        Ok(Self {
            storage,
            status: Arc::new(status),
        })
    }

    /// Current token pair
    pub async fn tokens(&self) -> LaunchpadResult<TokenPair> {
        read_tokens(self.storage.as_ref()).await
    }

    /// Current access token, if any
    pub async fn access_token(&self) -> LaunchpadResult<Option<String>> {
        self.storage.get(ACCESS_TOKEN_KEY).await
    }

    /// Persist newly issued tokens.
    ///
    /// A response without a refresh token keeps the stored one.
    pub async fn store(&self, issued: IssuedTokens) -> LaunchpadResult<()> {
        let mut changes = vec![Change::Set(ACCESS_TOKEN_KEY, issued.access)];
        if let Some(refresh) = issued.refresh {
            changes.push(Change::Set(REFRESH_TOKEN_KEY, refresh));
        }
        self.storage.update(changes).await?;
        debug!("Stored session tokens");
        self.publish(AuthStatus::SignedIn);
        Ok(())
    }

    /// Forget both tokens
    pub async fn clear(&self) -> LaunchpadResult<()> {
        self.storage
            .update(vec![
                Change::Remove(ACCESS_TOKEN_KEY),
                Change::Remove(REFRESH_TOKEN_KEY),
            ])
            .await?;
        info!("Cleared session tokens");
        self.publish(AuthStatus::SignedOut);
        Ok(())
    }

    /// Current status without touching storage
    pub fn status(&self) -> AuthStatus {
        *self.status.borrow()
    }

    /// Receive login/logout transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    fn publish(&self, next: AuthStatus) {
        self.status.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn read_tokens(storage: &dyn Storage) -> LaunchpadResult<TokenPair> {
    Ok(TokenPair {
        access: storage.get(ACCESS_TOKEN_KEY).await?,
        refresh: storage.get(REFRESH_TOKEN_KEY).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    async fn session() -> SessionState {
        SessionState::load(Arc::new(MemoryStorage::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn starts_signed_out() {
        let state = session().await;
        assert_eq!(state.status(), AuthStatus::SignedOut);
        assert!(state.tokens().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_keeps_refresh_when_absent() {
        let state = session().await;
        state
            .store(IssuedTokens {
                access: "a1".into(),
                refresh: Some("r1".into()),
            })
            .await
            .unwrap();
        state
            .store(IssuedTokens {
                access: "a2".into(),
                refresh: None,
            })
            .await
            .unwrap();

        let tokens = state.tokens().await.unwrap();
        assert_eq!(tokens.access.as_deref(), Some("a2"));
        assert_eq!(tokens.refresh.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn subscribers_see_login_and_logout() {
        let state = session().await;
        let mut rx = state.subscribe();

        state
            .store(IssuedTokens {
                access: "a".into(),
                refresh: Some("r".into()),
            })
            .await
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AuthStatus::SignedIn);

        state.clear().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), AuthStatus::SignedOut);
        assert!(state.tokens().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let state = session().await;
        let other = state.clone();
        other
            .store(IssuedTokens {
                access: "shared".into(),
                refresh: None,
            })
            .await
            .unwrap();
        assert_eq!(state.access_token().await.unwrap().as_deref(), Some("shared"));
        assert_eq!(state.status(), AuthStatus::SignedIn);
    }
}
