// WHY: Typed failures for the places callers branch on them
// Verification failures are absorbed by the dispatcher; persistence failures reach the user.

use thiserror::Error;

/// Why a sentence could not be verified
/// Every variant means "leave the sentence unchecked so the next edit can retry"
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("verification transport failure: {0}")]
    Transport(String),

    #[error("verification timed out")]
    Timeout,

    #[error("malformed verification payload: {0}")]
    MalformedPayload(String),

    #[error("no fact source could reach a verdict")]
    Inconclusive,

    #[error("not authorized to verify")]
    Unauthorized,
}

impl From<reqwest::Error> for VerificationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedPayload(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Failure of the generative model backend
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,
}

/// Failure of the note persistence collaborator
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("note {0} not found")]
    NotFound(String),

    #[error("not authorized")]
    Unauthorized,

    #[error("nothing to save")]
    NothingToSave,

    #[error("persistence request failed with status {0}")]
    Status(u16),

    #[error("persistence transport failure: {0}")]
    Transport(String),

    #[error("malformed persistence payload: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedPayload(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Failure to establish an authenticated session
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("login request failed with status {0}")]
    Status(u16),

    #[error("auth transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}
