//! Google Translate TTS encoder.
//!
//! The endpoint only accepts short inputs, so longer text is cut into pieces
//! of at most 100 characters (sentence punctuation first, then whitespace,
//! then a hard cut). Each piece comes back as an MP3 stream; the streams are
//! concatenated frame-wise into one file.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::SpeechEncoder;
use crate::config::TtsConfig;
use crate::error::SynthesisError;

/// Longest piece the endpoint accepts.
pub const MAX_PART_CHARS: usize = 100;

const SPLIT_PUNCT: &[char] = &['.', '!', '?', ';', ':', ','];
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) lawful-ai-rs";

pub struct GoogleTranslateTts {
    client: Client,
    endpoint: String,
    lang: String,
    slow: bool,
}

impl GoogleTranslateTts {
    pub fn new(config: &TtsConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            lang: config.lang.clone(),
            slow: config.slow,
        })
    }
}

#[async_trait]
impl SpeechEncoder for GoogleTranslateTts {
    async fn encode(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let parts = split_for_tts(text, MAX_PART_CHARS);
        if parts.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let total = parts.len();
        let total_str = total.to_string();
        let speed = if self.slow { "0.24" } else { "1" };
        let mut audio = Vec::new();

        for (idx, part) in parts.iter().enumerate() {
            let idx_str = idx.to_string();
            let len_str = part.chars().count().to_string();

            let resp = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", part.as_str()),
                    ("tl", self.lang.as_str()),
                    ("total", total_str.as_str()),
                    ("idx", idx_str.as_str()),
                    ("textlen", len_str.as_str()),
                    ("client", "tw-ob"),
                    ("ttsspeed", speed),
                ])
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(SynthesisError::Status {
                    status: status.as_u16(),
                    part: idx + 1,
                    total,
                });
            }

            let bytes = resp.bytes().await?;
            debug!("TTS part {}/{total}: {} chars → {} bytes", idx + 1, len_str, bytes.len());
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }
}

/// Split text into request-sized pieces of at most `max_chars` characters.
/// Text that already fits is sent whole. Pieces without any alphanumeric
/// content are dropped.
pub fn split_for_tts(text: &str, max_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if !trimmed.chars().any(char::is_alphanumeric) {
        return Vec::new();
    }
    if trimmed.chars().count() <= max_chars {
        return vec![trimmed.to_string()];
    }

    let mut parts = Vec::new();
    for segment in split_segments(text) {
        if segment.chars().any(char::is_alphanumeric) {
            fit_segment(segment, max_chars, &mut parts);
        }
    }
    parts
}

/// Split at newlines and at punctuation followed by whitespace.
fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let at_boundary = c == '\n'
            || (SPLIT_PUNCT.contains(&c)
                && chars.peek().is_some_and(|(_, next)| next.is_whitespace()));
        if at_boundary {
            let end = i + c.len_utf8();
            let s = text[start..end].trim();
            if !s.is_empty() {
                segments.push(s);
            }
            start = end;
        }
    }

    // Remainder
    let s = text[start..].trim();
    if !s.is_empty() {
        segments.push(s);
    }

    segments
}

fn fit_segment(segment: &str, max_chars: usize, out: &mut Vec<String>) {
    if segment.chars().count() <= max_chars {
        out.push(segment.to_string());
        return;
    }

    let mut current = String::new();
    let mut current_len = 0;

    for mut word in segment.split_whitespace() {
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let cut = word
                .char_indices()
                .nth(max_chars)
                .map_or(word.len(), |(i, _)| i);
            out.push(word[..cut].to_string());
            word = &word[cut..];
        }

        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        out.push(current);
    }
}
