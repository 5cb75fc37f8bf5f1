use async_trait::async_trait;

use super::Generator;

/// Fixed reply used when no real model is available.
pub const MOCK_RESPONSE: &str = "\n[MOCK LLM RESPONSE]\n\
Based on the context provided, here is the diagnosis:\n\
1. Check the specific fuse mentioned in the retrieved context.\n\
2. Inspect the related components in the graph path.\n\
This is a simulated response because no real LLM is connected.";

/// Deterministic offline generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockGenerator;

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, _prompt: &str) -> String {
        MOCK_RESPONSE.to_string()
    }

    fn backend(&self) -> &str {
        "mock"
    }
}
