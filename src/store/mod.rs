//! Durable state: credential store (users) and work ledger (prompts,
//! generated images, credit accounting).
//!
//! Both concerns are expressed as object-safe traits so the generation
//! workflow and the HTTP layer can be exercised against in-memory fakes;
//! [`PgStore`] implements the two traits over a single Postgres pool.

pub mod models;
mod pg;

pub use pg::PgStore;

use async_trait::async_trait;

use crate::error::Result;
use models::{GalleryImage, GeneratedImage, Prompt, User};

/// Persistence of user identity, password hashes, and credit balances
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a user. Fails with `DuplicateEmail` if the email is taken.
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        credits: i32,
    ) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>>;
}

/// Persistence of generation requests, their outcomes, and credit debits
#[async_trait]
pub trait WorkLedger: Send + Sync {
    /// Create a prompt row in the `processing` state.
    async fn create_prompt(
        &self,
        user_id: i32,
        text: &str,
        settings: serde_json::Value,
    ) -> Result<Prompt>;

    /// Terminal transition to `completed`. Only rows still in `processing`
    /// are updated; returns `false` when the row was already terminal.
    async fn mark_completed(&self, prompt_id: i32) -> Result<bool>;

    /// Terminal transition to `failed`; same guard as [`mark_completed`].
    ///
    /// [`mark_completed`]: WorkLedger::mark_completed
    async fn mark_failed(&self, prompt_id: i32) -> Result<bool>;

    /// Record a durably stored image for a prompt.
    async fn record_image(
        &self,
        user_id: i32,
        prompt_id: i32,
        image_url: &str,
        metadata: serde_json::Value,
    ) -> Result<GeneratedImage>;

    /// Atomically debit `amount` credits. The update is conditional on the
    /// balance covering the amount, so concurrent debits cannot drive a
    /// balance negative. Returns the new balance, or `None` if the balance
    /// was insufficient.
    async fn debit_credits(&self, user_id: i32, amount: i32) -> Result<Option<i32>>;

    /// List a user's images joined with the originating prompt text,
    /// newest first, capped at `limit` rows.
    async fn list_images(&self, user_id: i32, limit: i64) -> Result<Vec<GalleryImage>>;
}
