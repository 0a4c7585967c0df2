//! Completion client: persona prompt in, sanitized advice text out.
//!
//! The upstream model is reached through the [`TextGenerator`] trait so the
//! prompt prefix, decoding settings, and markup stripping stay in one place
//! regardless of which backend answers.

pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::CompletionError;

/// Prefix sent ahead of every user message.
pub const PERSONA_PREFIX: &str = "Act as a lawyer and provide advice on ";

pub const TEMPERATURE: f32 = 1.0;
pub const TOP_P: f32 = 0.95;
pub const TOP_K: u32 = 40;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Fixed decoding parameters for every completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// An opaque text-completion service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, CompletionError>;
}

pub struct CompletionClient {
    generator: Arc<dyn TextGenerator>,
    generation: GenerationConfig,
}

impl CompletionClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            generation: GenerationConfig::default(),
        }
    }

    /// Ask the model for advice on `user_text`.
    pub async fn complete(&self, user_text: &str) -> Result<String, CompletionError> {
        let prompt = build_prompt(user_text);
        debug!("Sending prompt ({} chars)", prompt.len());

        let t_start = std::time::Instant::now();
        let raw = self.generator.generate(&prompt, &self.generation).await?;
        let reply = strip_emphasis(&raw);

        info!(
            "Completion: {} chars in {:.0}ms",
            reply.len(),
            t_start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(reply)
    }
}

pub fn build_prompt(user_text: &str) -> String {
    format!("{PERSONA_PREFIX}{user_text}")
}

/// Remove bold (`**`) and italic (`*`) markers from model output.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace('*', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Canned {
        reply: Result<String, ()>,
        seen: Mutex<Vec<(String, GenerationConfig)>>,
    }

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push((prompt.to_string(), *config));
            self.reply
                .clone()
                .map_err(|_| CompletionError::Blocked("SAFETY".into()))
        }
    }

    fn canned(reply: Result<&str, ()>) -> Arc<Canned> {
        Arc::new(Canned {
            reply: reply.map(str::to_string),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn strips_bold_and_italic_markers() {
        assert_eq!(
            strip_emphasis("**Contract**: an *agreement* between parties"),
            "Contract: an agreement between parties"
        );
        assert_eq!(strip_emphasis("***"), "");
        assert_eq!(strip_emphasis("no markup"), "no markup");
    }

    #[test]
    fn prompt_carries_persona_prefix() {
        assert_eq!(
            build_prompt("what is a contract"),
            "Act as a lawyer and provide advice on what is a contract"
        );
    }

    #[tokio::test]
    async fn complete_prefixes_and_sanitizes() {
        let generator = canned(Ok("* **Offer** and *acceptance*"));
        let client = CompletionClient::new(generator.clone());

        let reply = client.complete("what is a contract").await.unwrap();
        assert_eq!(reply, " Offer and acceptance");
        assert!(!reply.contains('*'));

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "Act as a lawyer and provide advice on what is a contract");
        assert_eq!(seen[0].1, GenerationConfig::default());
    }

    #[tokio::test]
    async fn complete_propagates_backend_errors() {
        let client = CompletionClient::new(canned(Err(())));
        let err = client.complete("anything").await.unwrap_err();
        assert!(matches!(err, CompletionError::Blocked(_)));
    }

    #[test]
    fn decoding_defaults_match_constants() {
        let config = GenerationConfig::default();
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.top_p, 0.95);
        assert_eq!(config.top_k, 40);
        assert_eq!(config.max_output_tokens, 8192);
    }
}
