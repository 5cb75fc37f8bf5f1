//! Diagnosis generation through a local Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Generator;
use crate::config::GenerationConfig;
use crate::error::{MechanicError, Result};

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Pick the first preferred model that is installed (as `name` or
/// `name:latest`), else `default`.
pub fn select_model(installed: &[String], preferred: &[String], default: &str) -> String {
    preferred
        .iter()
        .find(|want| {
            let tagged = format!("{}:latest", want);
            installed.iter().any(|have| have == *want || *have == tagged)
        })
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

pub struct OllamaGenerator {
    client: Client,
    endpoint: String,
    default_model: String,
    preferred_models: Vec<String>,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MechanicError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            default_model: config.default_model.clone(),
            preferred_models: config.preferred_models.clone(),
        })
    }

    /// Names of locally installed models.
    async fn installed_models(&self) -> std::result::Result<Vec<String>, String> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.endpoint))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }
        let tags: TagsResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn choose_model(&self) -> String {
        match self.installed_models().await {
            Ok(installed) => select_model(&installed, &self.preferred_models, &self.default_model),
            Err(e) => {
                log::warn!("Could not list Ollama models: {}", e);
                self.default_model.clone()
            }
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> String {
        let model = self.choose_model().await;
        log::info!("Generating with model: {}", model);

        let request = GenerateRequest {
            model: &model,
            prompt,
            stream: false,
        };

        let response = match self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return format!("[Exception calling Ollama API]: {}", e),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return format!("[Error calling Ollama API]: {} - {}", status.as_u16(), body);
        }

        match response.json::<GenerateResponse>().await {
            Ok(parsed) => parsed.response,
            Err(e) => format!("[Exception calling Ollama API]: {}", e),
        }
    }

    fn backend(&self) -> &str {
        "ollama"
    }
}
