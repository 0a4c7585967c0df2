//! Chat request handling: completion, then optional speech.
//!
//! Completion failures are soft: the error text becomes the reply and the
//! request still succeeds. Synthesis failures are hard and fail the request.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::completion::CompletionClient;
use crate::error::ApiError;
use crate::speech::playback::Playback;
use crate::speech::SpeechSynthesizer;

/// Where clients fetch the synthesized reply.
pub const AUDIO_URL: &str = "/audio";
pub const NO_INPUT: &str = "No input provided";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub text: String,
    pub tts_enabled: bool,
}

/// Outcome of the completion step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Answer(String),
    /// Human-readable description of an upstream failure.
    Failed(String),
}

impl Completion {
    pub fn text(&self) -> &str {
        match self {
            Self::Answer(t) | Self::Failed(t) => t,
        }
    }

    #[cfg(test)]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub completion: Completion,
    pub audio_url: Option<String>,
}

/// JSON body of a successful `/process` call.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        let response = match reply.completion {
            Completion::Answer(t) | Completion::Failed(t) => t,
        };
        Self {
            response,
            audio_url: reply.audio_url,
        }
    }
}

pub struct ChatService {
    completion: CompletionClient,
    synthesizer: SpeechSynthesizer,
    playback: Arc<dyn Playback>,
}

impl ChatService {
    pub fn new(
        completion: CompletionClient,
        synthesizer: SpeechSynthesizer,
        playback: Arc<dyn Playback>,
    ) -> Self {
        Self {
            completion,
            synthesizer,
            playback,
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply, ApiError> {
        if request.text.is_empty() {
            return Err(ApiError::InvalidInput(NO_INPUT.to_string()));
        }

        info!("Chat: {} tts={}", summarize(&request.text), request.tts_enabled);

        let completion = match self.completion.complete(&request.text).await {
            Ok(text) => Completion::Answer(text),
            Err(e) => {
                warn!("Completion failed: {e}");
                Completion::Failed(format!("Error generating response: {e}"))
            }
        };

        if !request.tts_enabled {
            return Ok(ChatReply {
                completion,
                audio_url: None,
            });
        }

        let artifact = self.synthesizer.synthesize(completion.text()).await?;
        self.playback.play(&artifact.path);

        Ok(ChatReply {
            completion,
            audio_url: Some(AUDIO_URL.to_string()),
        })
    }
}

/// One-line preview of user text for the request log.
fn summarize(text: &str) -> String {
    const PREVIEW_CHARS: usize = 80;

    let char_count = text.chars().count();
    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    format!(
        "\"{}{}\" ({char_count} chars)",
        preview.replace('\n', " "),
        if char_count > PREVIEW_CHARS { "..." } else { "" },
    )
}
