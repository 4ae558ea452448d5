// WHY: Wire shapes shared by the verification server and the API client

use serde::{Deserialize, Serialize};

use crate::corrections::Correction;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FactCheckRequest {
    #[serde(default)]
    pub sentence: Option<String>,
}

/// Empty `corrections` means no issues found, or that the check could not complete
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FactCheckResponse {
    pub corrections: Vec<Correction>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BatchCheckRequest {
    #[serde(default)]
    pub sentences: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchCheckResult {
    pub sentence: String,
    pub corrections: Vec<Correction>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct BatchCheckResponse {
    pub results: Vec<BatchCheckResult>,
}

/// Note body as exchanged with the persistence collaborator
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

/// Stored note; the server assigns `_id` and timestamps
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}
