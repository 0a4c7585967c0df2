//! lawful-ai-rs: legal-advice chat backend.
//!
//! Forwards user questions to a Gemini model behind a lawyer persona,
//! optionally speaks the reply, and serves the latest audio to the browser.

pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod server;
pub mod speech;
