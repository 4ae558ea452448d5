// WHY: Explicit authentication state handed to the API client
// Created on login, cleared on logout or on any 401 from the server.

use std::sync::RwLock;
use tracing::info;

use crate::protocol::UserProfile;

#[derive(Debug, Clone)]
struct Credentials {
    token: String,
    user: UserProfile,
}

/// Bearer token plus the user it belongs to
#[derive(Debug, Default)]
pub struct AuthSession {
    inner: RwLock<Option<Credentials>>,
}

impl AuthSession {
    /// Session with nobody logged in
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session restored from an already issued token
    pub fn with_token(token: impl Into<String>, user: UserProfile) -> Self {
        let session = Self::default();
        session.establish(token, user);
        session
    }

    pub fn establish(&self, token: impl Into<String>, user: UserProfile) {
        info!(email = %user.email, "Session established");
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(Credentials {
            token: token.into(),
            user,
        });
    }

    pub fn clear(&self) {
        let previous = self.inner.write().unwrap_or_else(|e| e.into_inner()).take();
        if previous.is_some() {
            info!("Session cleared");
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}
