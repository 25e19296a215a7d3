//! HTTP client for the image generation provider

use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::ProviderSettings;
use crate::error::{AppError, Result};
use crate::gateway::ProviderResult;

/// Fixed generation parameters applied to every call
pub const IMAGE_WIDTH: u32 = 1024;
pub const IMAGE_HEIGHT: u32 = 1024;
pub const INFERENCE_STEPS: u32 = 50;
pub const GUIDANCE_SCALE: f32 = 7.5;
const SCHEDULER: &str = "dpm++2m";
const NEGATIVE_PROMPT: &str = "ugly, blurry, low quality, distorted, deformed";

/// Inference request sent to the provider
#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f32,
    negative_prompt: &'a str,
    scheduler: &'a str,
    seed: u32,
}

/// Inference response returned by the provider
#[derive(Debug, Deserialize)]
struct InferenceResponse {
    images: Vec<InferenceImage>,
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct InferenceImage {
    url: String,
}

/// Client for the provider's synchronous inference endpoint
pub struct ProviderClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ProviderClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}/{}",
                settings.base_url.trim_end_matches('/'),
                settings.model,
                settings.model_version
            ),
            api_key: settings.api_key.clone(),
        })
    }

    /// Run inference for a prompt.
    ///
    /// A fresh pseudo-random seed is chosen per call, so identical prompts
    /// are not required to produce identical images.
    pub async fn generate(&self, prompt_text: &str) -> Result<ProviderResult> {
        let seed = rand::thread_rng().gen_range(0..1_000_000);
        let request = InferenceRequest {
            prompt: prompt_text,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            num_inference_steps: INFERENCE_STEPS,
            guidance_scale: GUIDANCE_SCALE,
            negative_prompt: NEGATIVE_PROMPT,
            scheduler: SCHEDULER,
            seed,
        };

        debug!(endpoint = %self.endpoint, seed, "Sending inference request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("inference call failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "provider returned {status}: {body}"
            )));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("unexpected provider response: {e}")))?;

        let image = parsed
            .images
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider("provider returned no images".to_string()))?;

        info!(request_id = %parsed.request_id, "Inference completed");

        Ok(ProviderResult {
            image_url: image.url,
            request_id: parsed.request_id,
        })
    }

    /// Download the provider's temporary asset
    pub async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("download asset: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!(
                "asset download returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Upload(format!("read asset body: {e}")))?;

        debug!(size = bytes.len(), "Downloaded provider asset");
        Ok(bytes.to_vec())
    }
}
