//! Synthesis use case
//!
//! Merges the specialists' answers into one combined response.

use crate::ports::generation::{GenerationError, GenerationService};
use panel_domain::PromptTemplate;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Synthesis could not produce a final answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("all specialists failed to respond")]
    NoResponses,

    #[error("Synthesis failed: {0}")]
    Generation(#[from] GenerationError),
}

pub struct SynthesisEngine {
    generation: Arc<dyn GenerationService>,
}

impl SynthesisEngine {
    pub fn new(generation: Arc<dyn GenerationService>) -> Self {
        Self { generation }
    }

    /// Combine `(role name, response)` pairs, in delegate order.
    ///
    /// Never calls the model when `responses` is empty.
    pub async fn synthesize(
        &self,
        original_prompt: &str,
        responses: &[(String, String)],
        failed_count: usize,
    ) -> Result<String, SynthesisError> {
        if responses.is_empty() {
            return Err(SynthesisError::NoResponses);
        }

        info!(
            contributors = responses.len(),
            failed = failed_count,
            "Synthesizing responses"
        );
        let prompt = PromptTemplate::synthesis_prompt(original_prompt, responses, failed_count);
        let text = self
            .generation
            .generate(&prompt, Some(PromptTemplate::synthesis_system()), &[])
            .await?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGeneration;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_responses_never_call_model() {
        let generation = Arc::new(ScriptedGeneration::new());
        let engine = SynthesisEngine::new(generation.clone());

        let err = engine.synthesize("q", &[], 3).await.unwrap_err();

        assert_eq!(err, SynthesisError::NoResponses);
        assert_eq!(err.to_string(), "all specialists failed to respond");
        assert!(generation.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_has_sections_in_delegate_order() {
        let generation = Arc::new(ScriptedGeneration::new().reply("Original question", "Combined."));
        let engine = SynthesisEngine::new(generation.clone());

        let text = engine
            .synthesize(
                "Should we migrate?",
                &pairs(&[("Architect", "Yes, in phases."), ("Finance", "Only if cheap.")]),
                1,
            )
            .await
            .unwrap();

        assert_eq!(text, "Combined.");
        let calls = generation.calls();
        let prompt = &calls[0].prompt;
        let architect = prompt.find("### Architect").unwrap();
        let finance = prompt.find("### Finance").unwrap();
        assert!(architect < finance);
        assert!(prompt.contains("1 other specialist(s) did not respond"));
        assert_eq!(
            calls[0].system_prompt.as_deref(),
            Some(PromptTemplate::synthesis_system())
        );
    }

    #[tokio::test]
    async fn test_generation_failure_is_synthesis_error() {
        let generation = Arc::new(ScriptedGeneration::new().fail("Original question"));
        let engine = SynthesisEngine::new(generation);

        let err = engine
            .synthesize("q", &pairs(&[("A", "a")]), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, SynthesisError::Generation(_)));
    }
}
