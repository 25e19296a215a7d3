//! Row types for users, prompts, and generated images

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user with a credit balance
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Client-facing view with the password hash stripped
    pub fn safe(&self) -> SafeUser {
        SafeUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.image.clone(),
            credits: self.credits,
            created_at: self.created_at,
        }
    }
}

/// User view safe to serialize in API responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a generation request.
///
/// Rows are created as `Processing` and move exactly once to `Completed`
/// or `Failed`; there is no transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStatus {
    Processing,
    Completed,
    Failed,
}

impl PromptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStatus::Processing => "processing",
            PromptStatus::Completed => "completed",
            PromptStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for PromptStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(PromptStatus::Processing),
            "completed" => Ok(PromptStatus::Completed),
            "failed" => Ok(PromptStatus::Failed),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PromptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored generation request
#[derive(Debug, Clone, FromRow)]
pub struct Prompt {
    pub id: i32,
    pub user_id: i32,
    pub prompt_text: String,
    pub model_settings: Option<serde_json::Value>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A durably stored generation result
#[derive(Debug, Clone, FromRow)]
pub struct GeneratedImage {
    pub id: i32,
    pub prompt_id: i32,
    pub user_id: i32,
    pub image_url: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Metadata blob persisted alongside every generated image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub prompt: String,
    pub model: String,
    pub settings: GenerationSettings,
    /// Original provider URL, retained in case the durable copy is lost
    pub fallback_url: String,
}

/// Generation parameters recorded for provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub guidance_scale: f32,
}

/// A gallery row: image joined with its originating prompt text
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: i32,
    pub user_id: i32,
    pub image_url: String,
    pub metadata: Option<serde_json::Value>,
    pub prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}
