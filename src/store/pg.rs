//! Postgres implementation of the credential store and work ledger

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::config::DatabaseSettings;
use crate::error::{AppError, Result};
use crate::store::models::{GalleryImage, GeneratedImage, Prompt, PromptStatus, User};
use crate::store::{CredentialStore, WorkLedger};

/// Column list for users queries.
const USER_COLUMNS: &str = "id, name, email, password_hash, image, credits, created_at";

/// Column list for prompts queries.
const PROMPT_COLUMNS: &str = "id, user_id, prompt_text, model_settings, status, created_at";

/// Column list for generated_images queries.
const IMAGE_COLUMNS: &str = "id, prompt_id, user_id, image_url, metadata, created_at";

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed store for users, prompts, and generated images
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database and run pending migrations
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("run migrations: {e}")))?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by binaries that manage their own pool)
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        credits: i32,
    ) -> Result<User> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, credits)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(credits)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                    AppError::DuplicateEmail
                }
                _ => AppError::Database(e),
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl WorkLedger for PgStore {
    async fn create_prompt(
        &self,
        user_id: i32,
        text: &str,
        settings: serde_json::Value,
    ) -> Result<Prompt> {
        let query = format!(
            "INSERT INTO prompts (user_id, prompt_text, model_settings, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {PROMPT_COLUMNS}"
        );
        let prompt = sqlx::query_as::<_, Prompt>(&query)
            .bind(user_id)
            .bind(text)
            .bind(settings)
            .bind(PromptStatus::Processing.as_str())
            .fetch_one(&self.pool)
            .await?;

        debug!(prompt_id = prompt.id, user_id, "Created prompt record");
        Ok(prompt)
    }

    async fn mark_completed(&self, prompt_id: i32) -> Result<bool> {
        self.transition(prompt_id, PromptStatus::Completed).await
    }

    async fn mark_failed(&self, prompt_id: i32) -> Result<bool> {
        self.transition(prompt_id, PromptStatus::Failed).await
    }

    async fn record_image(
        &self,
        user_id: i32,
        prompt_id: i32,
        image_url: &str,
        metadata: serde_json::Value,
    ) -> Result<GeneratedImage> {
        let query = format!(
            "INSERT INTO generated_images (prompt_id, user_id, image_url, metadata)
             VALUES ($1, $2, $3, $4)
             RETURNING {IMAGE_COLUMNS}"
        );
        let image = sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(prompt_id)
            .bind(user_id)
            .bind(image_url)
            .bind(metadata)
            .fetch_one(&self.pool)
            .await?;

        debug!(image_id = image.id, prompt_id, "Recorded generated image");
        Ok(image)
    }

    async fn debit_credits(&self, user_id: i32, amount: i32) -> Result<Option<i32>> {
        // Conditional on the balance in the same statement, so two
        // concurrent debits cannot both pass a stale balance check.
        let new_balance: Option<i32> = sqlx::query_scalar(
            "UPDATE users SET credits = credits - $2
             WHERE id = $1 AND credits >= $2
             RETURNING credits",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(new_balance)
    }

    async fn list_images(&self, user_id: i32, limit: i64) -> Result<Vec<GalleryImage>> {
        let images = sqlx::query_as::<_, GalleryImage>(
            "SELECT gi.id, gi.user_id, gi.image_url, gi.metadata,
                    p.prompt_text AS prompt, gi.created_at
             FROM generated_images gi
             LEFT JOIN prompts p ON p.id = gi.prompt_id
             WHERE gi.user_id = $1 AND gi.image_url <> ''
             ORDER BY gi.created_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }
}

impl PgStore {
    /// Guarded terminal transition; rows already terminal are left alone.
    async fn transition(&self, prompt_id: i32, to: PromptStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE prompts SET status = $2 WHERE id = $1 AND status = $3")
            .bind(prompt_id)
            .bind(to.as_str())
            .bind(PromptStatus::Processing.as_str())
            .execute(&self.pool)
            .await?;

        let changed = result.rows_affected() > 0;
        if !changed {
            debug!(prompt_id, to = %to, "Skipped transition on terminal prompt");
        }
        Ok(changed)
    }
}
