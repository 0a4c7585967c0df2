//! Configuration management for lawful-ai-rs.
//!
//! Loads config from a YAML file in standard locations. Every section
//! falls back to its defaults, so an empty or missing file is valid.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            cors_allowed_origins: vec![],
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "tunedModels/copy-of-finalefinal-mm6hnii9n2pp".into(),
            api_key_env: "GENAI_API_KEY".into(),
            timeout_secs: 60,
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub endpoint: String,
    pub lang: String,
    pub slow: bool,
    pub timeout_secs: u64,
    pub audio_path: PathBuf,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.google.com/translate_tts".into(),
            lang: "en".into(),
            slow: false,
            timeout_secs: 30,
            audio_path: PathBuf::from("audio/output.mp3"),
        }
    }
}

impl TtsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub enabled: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
    pub tts: TtsConfig,
    pub playback: PlaybackConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/lawful-ai/config.yaml
    /// 3. /etc/lawful-ai/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/lawful-ai/config.yaml")),
                Some(PathBuf::from("/etc/lawful-ai/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.completion.api_key_env, "GENAI_API_KEY");
        assert_eq!(config.tts.audio_path, PathBuf::from("audio/output.mp3"));
        assert!(config.playback.enabled);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let yaml = r#"
server:
  port: 8080
tts:
  lang: fr
  slow: true
playback:
  enabled: false
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.tts.lang, "fr");
        assert!(config.tts.slow);
        assert_eq!(config.tts.timeout(), Duration::from_secs(30));
        assert!(!config.playback.enabled);
        assert_eq!(
            config.completion.endpoint,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn missing_path_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let config = Config::load(Some(missing.as_path()));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn api_key_ignores_blank_values() {
        let config = CompletionConfig {
            api_key_env: "LAWFUL_AI_TEST_BLANK_KEY".into(),
            ..CompletionConfig::default()
        };
        std::env::set_var("LAWFUL_AI_TEST_BLANK_KEY", "   ");
        assert_eq!(config.api_key(), None);
        std::env::set_var("LAWFUL_AI_TEST_BLANK_KEY", "secret");
        assert_eq!(config.api_key().as_deref(), Some("secret"));
        std::env::remove_var("LAWFUL_AI_TEST_BLANK_KEY");
    }
}
