//! Shared test doubles: an in-memory store and a scriptable gateway.
//!
//! The mock store keeps the same contracts as the Postgres implementation:
//! unique emails, atomic conditional debits, and guarded terminal prompt
//! transitions.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;

use imageforge::config::{
    AuthSettings, DatabaseSettings, LoggingSettings, ProviderSettings, RateLimitSettings,
    ServerSettings, Settings, StorageSettings,
};
use imageforge::error::{AppError, Result};
use imageforge::gateway::{GenerationGateway, ProviderResult};
use imageforge::store::models::{GalleryImage, GeneratedImage, Prompt, PromptStatus, User};
use imageforge::store::{CredentialStore, WorkLedger};
use imageforge::AppState;

#[derive(Default)]
struct StoreInner {
    users: Vec<User>,
    prompts: Vec<Prompt>,
    images: Vec<GeneratedImage>,
    seq: i64,
}

/// In-memory stand-in for the Postgres store
#[derive(Default)]
pub struct MockStore {
    inner: Mutex<StoreInner>,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a user directly, bypassing registration
    pub fn seed_user(&self, name: &str, email: &str, password_hash: &str, credits: i32) -> User {
        let mut inner = self.inner.lock();
        let user = User {
            id: inner.users.len() as i32 + 1,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            image: None,
            credits,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        user
    }

    pub fn credits_of(&self, user_id: i32) -> i32 {
        self.inner
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.credits)
            .expect("user exists")
    }

    pub fn prompt_count(&self) -> usize {
        self.inner.lock().prompts.len()
    }

    pub fn image_count(&self) -> usize {
        self.inner.lock().images.len()
    }

    pub fn prompt_statuses(&self) -> Vec<String> {
        self.inner.lock().prompts.iter().map(|p| p.status.clone()).collect()
    }

    pub fn prompt_status(&self, prompt_id: i32) -> Option<String> {
        self.inner
            .lock()
            .prompts
            .iter()
            .find(|p| p.id == prompt_id)
            .map(|p| p.status.clone())
    }

    pub fn images(&self) -> Vec<GeneratedImage> {
        self.inner.lock().images.clone()
    }
}

#[async_trait]
impl CredentialStore for MockStore {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        credits: i32,
    ) -> Result<User> {
        let mut inner = self.inner.lock();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(AppError::DuplicateEmail);
        }
        let user = User {
            id: inner.users.len() as i32 + 1,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            image: None,
            credits,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.inner.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>> {
        Ok(self.inner.lock().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl WorkLedger for MockStore {
    async fn create_prompt(
        &self,
        user_id: i32,
        text: &str,
        settings: serde_json::Value,
    ) -> Result<Prompt> {
        let mut inner = self.inner.lock();
        inner.seq += 1;
        let seq = inner.seq;
        let prompt = Prompt {
            id: inner.prompts.len() as i32 + 1,
            user_id,
            prompt_text: text.to_string(),
            model_settings: Some(settings),
            status: PromptStatus::Processing.as_str().to_string(),
            created_at: Utc::now() + Duration::seconds(seq),
        };
        inner.prompts.push(prompt.clone());
        Ok(prompt)
    }

    async fn mark_completed(&self, prompt_id: i32) -> Result<bool> {
        self.transition(prompt_id, PromptStatus::Completed)
    }

    async fn mark_failed(&self, prompt_id: i32) -> Result<bool> {
        self.transition(prompt_id, PromptStatus::Failed)
    }

    async fn record_image(
        &self,
        user_id: i32,
        prompt_id: i32,
        image_url: &str,
        metadata: serde_json::Value,
    ) -> Result<GeneratedImage> {
        let mut inner = self.inner.lock();
        inner.seq += 1;
        let seq = inner.seq;
        let image = GeneratedImage {
            id: inner.images.len() as i32 + 1,
            prompt_id,
            user_id,
            image_url: image_url.to_string(),
            metadata: Some(metadata),
            created_at: Utc::now() + Duration::seconds(seq),
        };
        inner.images.push(image.clone());
        Ok(image)
    }

    async fn debit_credits(&self, user_id: i32, amount: i32) -> Result<Option<i32>> {
        // Single critical section, same effect as the conditional UPDATE.
        let mut inner = self.inner.lock();
        let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };
        if user.credits < amount {
            return Ok(None);
        }
        user.credits -= amount;
        Ok(Some(user.credits))
    }

    async fn list_images(&self, user_id: i32, limit: i64) -> Result<Vec<GalleryImage>> {
        let inner = self.inner.lock();
        let mut rows: Vec<GalleryImage> = inner
            .images
            .iter()
            .filter(|img| img.user_id == user_id && !img.image_url.is_empty())
            .map(|img| GalleryImage {
                id: img.id,
                user_id: img.user_id,
                image_url: img.image_url.clone(),
                metadata: img.metadata.clone(),
                prompt: inner
                    .prompts
                    .iter()
                    .find(|p| p.id == img.prompt_id)
                    .map(|p| p.prompt_text.clone()),
                created_at: img.created_at,
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

impl MockStore {
    fn transition(&self, prompt_id: i32, to: PromptStatus) -> Result<bool> {
        let mut inner = self.inner.lock();
        let Some(prompt) = inner.prompts.iter_mut().find(|p| p.id == prompt_id) else {
            return Ok(false);
        };
        if prompt.status != PromptStatus::Processing.as_str() {
            return Ok(false);
        }
        prompt.status = to.as_str().to_string();
        Ok(true)
    }
}

/// Scriptable gateway double
#[derive(Default)]
pub struct MockGateway {
    pub fail_generate: AtomicBool,
    pub fail_persist: AtomicBool,
    pub generate_calls: AtomicUsize,
    pub persist_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_generate() -> Arc<Self> {
        let gateway = Self::default();
        gateway.fail_generate.store(true, Ordering::SeqCst);
        Arc::new(gateway)
    }

    pub fn failing_persist() -> Arc<Self> {
        let gateway = Self::default();
        gateway.fail_persist.store(true, Ordering::SeqCst);
        Arc::new(gateway)
    }

    pub fn temporary_url(n: usize) -> String {
        format!("https://provider.test/tmp/{n}.png")
    }
}

#[async_trait]
impl GenerationGateway for MockGateway {
    async fn generate(&self, _prompt_text: &str) -> Result<ProviderResult> {
        let n = self.generate_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_generate.load(Ordering::SeqCst) {
            return Err(AppError::Provider("mock provider outage".to_string()));
        }
        Ok(ProviderResult {
            image_url: Self::temporary_url(n),
            request_id: format!("req-{n}"),
        })
    }

    async fn persist(&self, _temporary_url: &str, object_key: &str) -> Result<String> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(AppError::Upload("mock bucket outage".to_string()));
        }
        Ok(format!("https://bucket.test/{object_key}?signed=1"))
    }
}

/// Settings suitable for in-process tests
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings::default(),
        database: DatabaseSettings {
            url: "postgres://unused-in-tests".to_string(),
            max_connections: 1,
        },
        auth: AuthSettings {
            jwt_secret: "integration-test-secret".to_string(),
            cookie_name: "auth_token".to_string(),
            session_ttl_hours: 24,
            cookie_secure: false,
            starting_credits: 10,
        },
        provider: ProviderSettings {
            base_url: "https://provider.test".to_string(),
            api_key: "test-key".to_string(),
            model: "fal-ai/flux-pro".to_string(),
            model_version: "v1.1-ultra".to_string(),
            timeout_ms: 5000,
        },
        storage: StorageSettings {
            bucket: "test-bucket".to_string(),
            region: "auto".to_string(),
            endpoint: None,
            url_ttl_hours: 24,
        },
        rate_limit: RateLimitSettings {
            enabled: false,
            requests_per_second: 5,
            burst_size: 10,
        },
        logging: LoggingSettings::default(),
    }
}

/// Application state wired to the mocks
pub fn test_state(store: Arc<MockStore>, gateway: Arc<MockGateway>) -> AppState {
    AppState::new(test_settings(), store.clone(), store, gateway)
}
