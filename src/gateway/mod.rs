//! Integration boundary to the external generation and storage providers.
//!
//! Two external calls hide behind one seam: model inference (producing a
//! time-limited asset URL) and the durable re-upload of that asset. The
//! [`GenerationGateway`] trait keeps the workflow testable without either
//! service.

pub mod provider;
pub mod storage;

pub use provider::ProviderClient;
pub use storage::ObjectStorage;

use async_trait::async_trait;

use crate::config::{ProviderSettings, StorageSettings};
use crate::error::Result;

/// Successful provider inference, as a tagged result
#[derive(Debug, Clone)]
pub struct ProviderResult {
    /// Time-limited URL of the generated asset on the provider's side
    pub image_url: String,
    /// Provider-assigned request id, surfaced to the client
    pub request_id: String,
}

/// Turns a prompt into a durably hosted image URL
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Run model inference for a prompt. The returned URL is temporary.
    async fn generate(&self, prompt_text: &str) -> Result<ProviderResult>;

    /// Copy a temporary provider asset into long-lived storage under
    /// `object_key` and return a time-limited signed retrieval URL.
    async fn persist(&self, temporary_url: &str, object_key: &str) -> Result<String>;
}

/// Production gateway: Flux inference plus S3-compatible storage
pub struct FluxGateway {
    provider: ProviderClient,
    storage: ObjectStorage,
}

impl FluxGateway {
    pub async fn new(
        provider_settings: &ProviderSettings,
        storage_settings: &StorageSettings,
    ) -> Result<Self> {
        Ok(Self {
            provider: ProviderClient::new(provider_settings)?,
            storage: ObjectStorage::new(storage_settings).await,
        })
    }
}

#[async_trait]
impl GenerationGateway for FluxGateway {
    async fn generate(&self, prompt_text: &str) -> Result<ProviderResult> {
        self.provider.generate(prompt_text).await
    }

    async fn persist(&self, temporary_url: &str, object_key: &str) -> Result<String> {
        let bytes = self.provider.fetch_asset(temporary_url).await?;
        self.storage.store(bytes, object_key).await
    }
}
