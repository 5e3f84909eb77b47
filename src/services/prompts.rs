//! System-prompt configuration and final-prompt composition.
//!
//! Prompts live in a JSON file (`config/prompts.json`): a per-model map of
//! instruction lines plus a fallback entry. The parsed config is cached
//! in memory; `reload()` re-reads the file on demand (triggered by the
//! `?reload_prompts=true` query parameter). A reload racing an in-flight
//! compose is fine; readers see either the old or the new config.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

/// Fixed label the user's question is embedded under in the final prompt.
pub const QUESTION_LABEL: &str = "User question:";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    #[serde(default)]
    pub system_prompts: HashMap<String, Vec<String>>,
    #[serde(default = "default_fallback_prompt")]
    pub fallback_prompt: Vec<String>,
}

fn default_fallback_prompt() -> Vec<String> {
    vec!["You are a helpful AI assistant.".to_string()]
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompts: HashMap::new(),
            fallback_prompt: default_fallback_prompt(),
        }
    }
}

impl PromptConfig {
    /// Per-model instruction lines joined with newlines; models without a
    /// specific entry get the fallback prompt.
    pub fn system_prompt(&self, model: &str) -> String {
        self.system_prompts
            .get(model)
            .unwrap_or(&self.fallback_prompt)
            .join("\n")
    }

    /// Merge the system prompt with the user's question into the final
    /// prompt sent upstream. Pure; inputs are untouched.
    pub fn compose(&self, model: &str, question: &str) -> String {
        format!(
            "{}\n\n{} {}",
            self.system_prompt(model),
            QUESTION_LABEL,
            question
        )
    }
}

pub struct PromptStore {
    path: PathBuf,
    cached: RwLock<Arc<PromptConfig>>,
}

impl PromptStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = read_config(&path);
        Self {
            cached: RwLock::new(Arc::new(config)),
            path,
        }
    }

    /// Re-read the config file, replacing the cached copy. Eventually
    /// consistent with concurrent readers.
    pub fn reload(&self) {
        let config = read_config(&self.path);
        *self.cached.write() = Arc::new(config);
        tracing::info!(path = %self.path.display(), "prompt configuration reloaded");
    }

    pub fn config(&self) -> Arc<PromptConfig> {
        self.cached.read().clone()
    }

    pub fn compose(&self, model: &str, question: &str) -> String {
        self.config().compose(model, question)
    }
}

fn read_config(path: &Path) -> PromptConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "prompt configuration loaded");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "prompt configuration is not valid JSON ({}), using built-in fallback",
                    e
                );
                PromptConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                "prompt configuration unreadable ({}), using built-in fallback",
                e
            );
            PromptConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> PromptConfig {
        let json = r#"{
            "systemPrompts": {
                "gpt-oss:20b": ["You answer quickly.", "Keep it short."]
            },
            "fallbackPrompt": ["You are a helpful AI assistant."]
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn configured_model_joins_its_lines() {
        let config = sample_config();
        assert_eq!(
            config.system_prompt("gpt-oss:20b"),
            "You answer quickly.\nKeep it short."
        );
    }

    #[test]
    fn unknown_model_falls_back_to_the_default_prompt() {
        let config = sample_config();
        let prompt = config.compose("no-such-model", "hello");
        assert!(prompt.starts_with("You are a helpful AI assistant."));
        assert!(prompt.ends_with("User question: hello"));
    }

    #[test]
    fn compose_embeds_the_question_under_the_label() {
        let config = sample_config();
        assert_eq!(
            config.compose("gpt-oss:20b", "what is 2+2?"),
            "You answer quickly.\nKeep it short.\n\nUser question: what is 2+2?"
        );
    }

    #[test]
    fn missing_file_loads_the_built_in_fallback() {
        let store = PromptStore::load("/definitely/not/a/real/prompts.json");
        let prompt = store.compose("anything", "hi");
        assert!(prompt.contains("You are a helpful AI assistant."));
    }
}
