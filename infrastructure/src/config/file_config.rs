//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Secrets are never stored in the file, only the names of the
//! environment variables that carry them.

use roundtable_domain::DiscussionConfig;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completion service settings
    pub openai: FileOpenAiConfig,
    /// Chat platform settings
    pub slack: FileSlackConfig,
    /// Discussion engine settings
    pub discussion: FileDiscussionConfig,
    /// Report artifact settings
    pub reports: FileReportsConfig,
    /// Document extraction service settings
    pub extraction: FileExtractionConfig,
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: None,
            timeout_secs: 30,
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// `[slack]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSlackConfig {
    /// Environment variable holding the bot token.
    pub bot_token_env: String,
    /// Language hint passed to the transcription service.
    pub voice_language: String,
}

impl Default for FileSlackConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "SLACK_BOT_TOKEN".to_string(),
            voice_language: "en".to_string(),
        }
    }
}

/// `[discussion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    pub turns: usize,
    /// Overrides the default final-turn nudge when set.
    pub final_turn_suffix: Option<String>,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self {
            turns: DiscussionConfig::default().turns,
            final_turn_suffix: None,
        }
    }
}

impl FileDiscussionConfig {
    /// Resolve into the domain configuration surface.
    pub fn to_domain(&self) -> DiscussionConfig {
        let mut config = DiscussionConfig::default().with_turns(self.turns);
        if let Some(suffix) = &self.final_turn_suffix {
            config.final_turn_suffix = suffix.clone();
        }
        config
    }
}

/// `[reports]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReportsConfig {
    pub dir: String,
}

impl Default for FileReportsConfig {
    fn default() -> Self {
        Self {
            dir: "./reports".to_string(),
        }
    }
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExtractionConfig {
    /// Parse service endpoint; extraction is disabled when empty.
    pub endpoint: String,
    pub api_key_env: String,
}

impl Default for FileExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key_env: "LLAMA_CLOUD_API_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.discussion.turns, 6);
        assert_eq!(config.reports.dir, "./reports");
        assert!(config.extraction.endpoint.is_empty());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [discussion]
            turns = 8

            [openai]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert_eq!(config.discussion.turns, 8);
        assert_eq!(config.openai.model, "gpt-4o");
        // Untouched sections keep their defaults.
        assert_eq!(config.openai.timeout_secs, 30);
        assert_eq!(config.slack.voice_language, "en");
    }

    #[test]
    fn test_discussion_to_domain_keeps_default_suffix() {
        let file = FileDiscussionConfig {
            turns: 4,
            final_turn_suffix: None,
        };
        let domain = file.to_domain();
        assert_eq!(domain.turns, 4);
        assert_eq!(
            domain.final_turn_suffix,
            DiscussionConfig::default().final_turn_suffix
        );
    }
}
