//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the synchronization pipeline without requiring API keys or network access.
//! Every request is recorded, so tests can assert how many translation calls
//! a run made and with which text.
//!
//! # Example
//!
//! ```ignore
//! use l10n_sync::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//!     assert_eq!(mock.request_count(), 1);
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    /// This keeps guarded placeholders intact
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation
    Mappings(HashMap<(String, String), String>),

    /// Simulate API errors
    Error(String),

    /// Fail only for the given target language, suffix for all others
    ErrorFor { target: String, message: String },

    /// No-op: return input unchanged
    NoOp,
}

/// One recorded call to [`MockTranslator::translate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub text: String,
    pub source_locale: String,
    pub target_locale: String,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    languages: Vec<String>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockTranslator {
    /// Language codes reported as both source and target by default
    pub const DEFAULT_LANGUAGES: &'static [&'static str] = &[
        "bg", "cs", "da", "de", "el", "en", "en-gb", "en-us", "es", "et", "fi", "fr", "hu", "it",
        "ja", "lt", "lv", "nl", "pl", "pt", "pt-br", "pt-pt", "ro", "ru", "sk", "sl", "sv", "zh",
    ];

    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            languages: Self::DEFAULT_LANGUAGES
                .iter()
                .map(|l| l.to_string())
                .collect(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Restrict the languages reported as supported
    pub fn with_languages(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_lowercase()).collect();
        self
    }

    /// All translate requests received so far, in call order
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, _source: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::ErrorFor {
                target: failing,
                message,
            } if failing == target => Err(MtError::TranslationError(message.clone())),
            MockMode::ErrorFor { .. } => Ok(format!("{}_{}", text, target)),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(MockRequest {
                text: text.to_string(),
                source_locale: source_locale.to_string(),
                target_locale: target_locale.to_string(),
            });
        }

        self.apply_translation(text, source_locale, target_locale)
    }

    async fn source_languages(&self) -> MtResult<Vec<String>> {
        Ok(self.languages.clone())
    }

    async fn target_languages(&self) -> MtResult<Vec<String>> {
        Ok(self.languages.clone())
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
