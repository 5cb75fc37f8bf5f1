use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Locations of build inputs and persisted indices
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// SQLite database holding manual chunks and their embeddings.
    pub db_path: PathBuf,
    /// Persisted relationship graph (versioned JSON).
    pub graph_path: PathBuf,
    /// Owner's manual as page-separated text (form feed between pages).
    pub manual_path: PathBuf,
    /// Build-time relationship list (`{"relationships": [...]}`).
    pub relationships_path: PathBuf,
    pub log_level: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("index/manual.db"),
            graph_path: PathBuf::from("index/knowledge_graph.json"),
            manual_path: PathBuf::from("data/owners_manual.txt"),
            relationships_path: PathBuf::from("data/knowledge_graph.json"),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Ollama,
    OpenAi,
}

/// Embeddings configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    /// Overrides the provider's default base URL.
    pub endpoint: Option<String>,
    pub api_key_env: String,
    pub batch_size: usize,
    /// LRU capacity for query embeddings; 0 disables the cache.
    pub cache_capacity: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            endpoint: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            batch_size: 50,
            cache_capacity: 256,
        }
    }
}

impl EmbeddingsConfig {
    /// Base URL for the configured provider.
    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint,
            (None, EmbeddingProvider::OpenAi) => "https://api.openai.com/v1",
            (None, EmbeddingProvider::Ollama) => "http://localhost:11434",
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of manual chunks fetched per query.
    pub top_k: usize,
    /// Outgoing hops followed from matched graph nodes.
    pub graph_depth: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            graph_depth: crate::graph::DEFAULT_DEPTH,
        }
    }
}

/// Manual chunking configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub chunk_size_tokens: usize,
    pub chunk_overlap_tokens: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: 300,
            chunk_overlap_tokens: 50,
        }
    }
}

/// How the diagnosis text is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Ollama when the `ollama` executable is on PATH, mock otherwise.
    Auto,
    Ollama,
    Mock,
}

/// Generation backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub mode: GenerationMode,
    pub endpoint: String,
    pub default_model: String,
    /// Tried in order against the locally installed models.
    pub preferred_models: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Auto,
            endpoint: "http://localhost:11434".to_string(),
            default_model: "llama3".to_string(),
            preferred_models: vec![
                "tinyllama".to_string(),
                "phi3".to_string(),
                "llama3".to_string(),
            ],
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in MECHANIC_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("MECHANIC_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be greater than 0");
        }

        if !(1..=2).contains(&self.retrieval.graph_depth) {
            anyhow::bail!(
                "retrieval.graph_depth must be 1 or 2, got {}",
                self.retrieval.graph_depth
            );
        }

        if self.embeddings.batch_size == 0 {
            anyhow::bail!("embeddings.batch_size must be greater than 0");
        }

        if self.ingest.chunk_size_tokens == 0 {
            anyhow::bail!("ingest.chunk_size_tokens must be greater than 0");
        }

        if self.ingest.chunk_overlap_tokens >= self.ingest.chunk_size_tokens {
            anyhow::bail!("ingest.chunk_overlap_tokens must be less than chunk_size_tokens");
        }

        if self.embeddings.provider == EmbeddingProvider::OpenAi {
            std::env::var(&self.embeddings.api_key_env).with_context(|| {
                format!(
                    "Environment variable {} not set. Set it in your .env file or as an environment variable with your OpenAI API key.",
                    self.embeddings.api_key_env
                )
            })?;
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.index.db_path
    }

    /// Get persisted graph path
    pub fn graph_path(&self) -> &Path {
        &self.index.graph_path
    }

    /// True when both persisted indices exist on disk
    pub fn indices_exist(&self) -> bool {
        self.index.db_path.exists() && self.index.graph_path.exists()
    }
}
