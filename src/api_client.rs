// WHY: HTTP client for the verification endpoint and the note/auth collaborators
// Every request carries the session's bearer token; any 401 clears the session.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::corrections::Correction;
use crate::dispatcher::SentenceVerifier;
use crate::editor::NotesApi;
use crate::error::{AuthError, PersistenceError, VerificationError};
use crate::protocol::{
    BatchCheckRequest, BatchCheckResponse, BatchCheckResult, FactCheckRequest, FactCheckResponse,
    LoginRequest, LoginResponse, Note, NoteDraft, UserProfile,
};
use crate::session::AuthSession;

/// Per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<AuthSession>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<AuthSession>) -> Result<Self> {
        Self::with_timeout(base_url, session, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, session: Arc<AuthSession>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Clears the session on 401 and reports whether that happened
    fn invalidate_on_unauthorized(&self, response: &Response) -> bool {
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Server rejected credentials, clearing session");
            self.session.clear();
            true
        } else {
            false
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client
            .post(format!("{}/auth/login", self.base_url))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let LoginResponse { token, user } = response.json().await?;
                self.session.establish(token, user.clone());
                Ok(user)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            status => Err(AuthError::Status(status.as_u16())),
        }
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub async fn check_sentence(&self, sentence: &str) -> Result<Vec<Correction>, VerificationError> {
        let body = FactCheckRequest {
            sentence: Some(sentence.to_string()),
        };
        let response = self.request(Method::POST, "/factcheck").json(&body).send().await?;

        if self.invalidate_on_unauthorized(&response) {
            return Err(VerificationError::Unauthorized);
        }
        if response.status() != StatusCode::OK {
            return Err(VerificationError::Transport(format!(
                "verification endpoint returned {}",
                response.status()
            )));
        }

        let payload: FactCheckResponse = response.json().await?;
        debug!(corrections = payload.corrections.len(), "Verification response received");
        Ok(payload.corrections)
    }

    pub async fn batch_check(&self, sentences: &[String]) -> Result<Vec<BatchCheckResult>, VerificationError> {
        let body = BatchCheckRequest {
            sentences: sentences.to_vec(),
        };
        let response = self.request(Method::POST, "/factcheck/batch").json(&body).send().await?;

        if self.invalidate_on_unauthorized(&response) {
            return Err(VerificationError::Unauthorized);
        }
        if response.status() != StatusCode::OK {
            return Err(VerificationError::Transport(format!(
                "batch endpoint returned {}",
                response.status()
            )));
        }

        let payload: BatchCheckResponse = response.json().await?;
        Ok(payload.results)
    }

    async fn note_response(&self, response: Response, id: Option<&str>) -> Result<Note, PersistenceError> {
        if self.invalidate_on_unauthorized(&response) {
            return Err(PersistenceError::Unauthorized);
        }
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(PersistenceError::NotFound(id.unwrap_or_default().to_string())),
            status => Err(PersistenceError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl SentenceVerifier for ApiClient {
    async fn verify(&self, sentence: &str) -> Result<Vec<Correction>, VerificationError> {
        self.check_sentence(sentence).await
    }
}

#[async_trait]
impl NotesApi for ApiClient {
    async fn get_note(&self, id: &str) -> Result<Note, PersistenceError> {
        let response = self.request(Method::GET, &format!("/notes/{id}")).send().await?;
        self.note_response(response, Some(id)).await
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<Note, PersistenceError> {
        let response = self.request(Method::POST, "/notes").json(draft).send().await?;
        self.note_response(response, None).await
    }

    async fn update_note(&self, id: &str, draft: &NoteDraft) -> Result<Note, PersistenceError> {
        let response = self
            .request(Method::PUT, &format!("/notes/{id}"))
            .json(draft)
            .send()
            .await?;
        self.note_response(response, Some(id)).await
    }
}
