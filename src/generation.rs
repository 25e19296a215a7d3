//! The credit-gated generation workflow.
//!
//! One call runs a full transaction: entitlement check, pending ledger
//! record, provider inference, durable persistence, credit debit. The debit
//! happens strictly after the durable copy exists, so a user is never
//! charged for a lost image; the debit is atomic at the store, so
//! concurrent requests cannot jointly overdraw a balance.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ProviderSettings;
use crate::error::{AppError, Result};
use crate::gateway::provider::{GUIDANCE_SCALE, IMAGE_HEIGHT, IMAGE_WIDTH, INFERENCE_STEPS};
use crate::gateway::GenerationGateway;
use crate::store::models::{GenerationSettings, ImageMetadata, User};
use crate::store::WorkLedger;

/// Result of a successful generation transaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedGeneration {
    pub prompt_id: i32,
    pub image_url: String,
    pub status: String,
    pub request_id: String,
}

/// Coordinates the ledger and the gateway for one generation at a time
pub struct GenerationService {
    ledger: Arc<dyn WorkLedger>,
    gateway: Arc<dyn GenerationGateway>,
    model: String,
    model_version: String,
}

impl GenerationService {
    pub fn new(
        ledger: Arc<dyn WorkLedger>,
        gateway: Arc<dyn GenerationGateway>,
        provider: &ProviderSettings,
    ) -> Self {
        Self {
            ledger,
            gateway,
            model: provider.model.clone(),
            model_version: provider.model_version.clone(),
        }
    }

    /// Run one end-to-end generation for an already-authenticated user.
    ///
    /// Validation failures return before any ledger write. Once a prompt
    /// row exists, every failure path marks it `failed` before surfacing.
    pub async fn run(&self, user: &User, prompt_text: &str) -> Result<CompletedGeneration> {
        if user.credits < 1 {
            warn!(user_id = user.id, credits = user.credits, "Generation rejected: no credits");
            return Err(AppError::InsufficientCredits);
        }

        let text = prompt_text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidPrompt);
        }

        let model_settings = serde_json::json!({
            "model": self.model,
            "version": self.model_version,
        });
        let prompt = self.ledger.create_prompt(user.id, text, model_settings).await?;
        info!(user_id = user.id, prompt_id = prompt.id, "Generation started");

        let provider_result = match self.gateway.generate(text).await {
            Ok(result) => result,
            Err(e) => return self.fail(prompt.id, e).await,
        };

        let key = object_key(user.id, prompt.id);
        let durable_url = match self.gateway.persist(&provider_result.image_url, &key).await {
            Ok(url) => url,
            Err(e) => return self.fail(prompt.id, e).await,
        };

        // The asset is durable; debit before recording it so a lost debit
        // race leaves no image row behind.
        match self.ledger.debit_credits(user.id, 1).await {
            Ok(Some(balance)) => {
                info!(user_id = user.id, balance, "Debited one credit");
            }
            Ok(None) => {
                warn!(user_id = user.id, prompt_id = prompt.id, "Lost debit race");
                return self.fail(prompt.id, AppError::InsufficientCredits).await;
            }
            Err(e) => return self.fail(prompt.id, e).await,
        }

        let metadata = ImageMetadata {
            prompt: text.to_string(),
            model: self.model.clone(),
            settings: GenerationSettings {
                width: IMAGE_WIDTH,
                height: IMAGE_HEIGHT,
                steps: INFERENCE_STEPS,
                guidance_scale: GUIDANCE_SCALE,
            },
            fallback_url: provider_result.image_url.clone(),
        };

        let outcome = async {
            let image = self
                .ledger
                .record_image(user.id, prompt.id, &durable_url, serde_json::to_value(&metadata)?)
                .await?;
            self.ledger.mark_completed(prompt.id).await?;
            Ok::<_, AppError>(image)
        }
        .await;

        let image = match outcome {
            Ok(image) => image,
            Err(e) => return self.fail(prompt.id, e).await,
        };

        info!(
            user_id = user.id,
            prompt_id = prompt.id,
            image_id = image.id,
            request_id = %provider_result.request_id,
            "Generation completed"
        );

        Ok(CompletedGeneration {
            prompt_id: prompt.id,
            image_url: image.image_url,
            status: "completed".to_string(),
            request_id: provider_result.request_id,
        })
    }

    /// Mark the prompt failed, then surface the original error
    async fn fail<T>(&self, prompt_id: i32, cause: AppError) -> Result<T> {
        if let Err(e) = self.ledger.mark_failed(prompt_id).await {
            error!(prompt_id, error = %e, "Could not mark prompt as failed");
        }
        Err(cause)
    }
}

/// Storage key for a generated asset, namespaced by user and prompt.
///
/// The timestamp suffix keeps retried prompts from colliding.
pub fn object_key(user_id: i32, prompt_id: i32) -> String {
    format!("{}/{}_{}.png", user_id, prompt_id, Utc::now().timestamp_millis())
}
