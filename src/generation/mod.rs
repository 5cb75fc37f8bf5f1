//! Diagnosis text generation from the assembled prompt.
//!
//! Generation never fails from the caller's point of view: backend problems
//! come back as in-band text so the user always gets a response.

mod mock;
mod ollama;
mod prompt;

pub use mock::{MockGenerator, MOCK_RESPONSE};
pub use ollama::{select_model, OllamaGenerator};
pub use prompt::{build_diagnosis_prompt, SYSTEM_PROMPT};

use async_trait::async_trait;

use crate::config::{GenerationConfig, GenerationMode};
use crate::error::Result;

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> String;

    /// Short backend label for logs.
    fn backend(&self) -> &str;
}

/// Build the generator selected by `[generation]`.
///
/// `auto` uses Ollama when an `ollama` executable is found on `PATH`.
pub fn build_generator(config: &GenerationConfig) -> Result<Box<dyn Generator>> {
    let mode = match config.mode {
        GenerationMode::Auto => {
            let path = std::env::var_os("PATH").unwrap_or_default();
            resolve_auto(&path)
        }
        mode => mode,
    };

    match mode {
        GenerationMode::Ollama => Ok(Box::new(OllamaGenerator::new(config)?)),
        _ => Ok(Box::new(MockGenerator)),
    }
}

fn resolve_auto(path: &std::ffi::OsStr) -> GenerationMode {
    if executable_on_path("ollama", path) {
        log::info!("Ollama detected; using local LLM");
        GenerationMode::Ollama
    } else {
        log::warn!(
            "Ollama not found in PATH; falling back to mock generation \
             (install from https://ollama.com/ to enable a real LLM)"
        );
        GenerationMode::Mock
    }
}

/// Whether `name` exists as a file in any directory of a PATH-style list.
fn executable_on_path(name: &str, path: &std::ffi::OsStr) -> bool {
    std::env::split_paths(path).any(|dir| {
        let candidate = dir.join(name);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}
