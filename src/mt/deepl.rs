//! DeepL API provider for machine translation
//!
//! This module integrates with the DeepL API v2 to provide real machine
//! translation, the list of supported languages, and the character quota.
//!
//! # Authentication
//!
//! The provider takes its authentication key as a constructor argument or
//! loads it from the `DEEPL_AUTH_KEY` environment variable. Keys of the free
//! plan end in `:fx` and are routed to `api-free.deepl.com`; all other keys
//! go to `api.deepl.com`.
//!
//! # Placeholders
//!
//! Every translate request is sent with `tag_handling=xml` and
//! `ignore_tags=donut`, so text wrapped by
//! [`protect`](crate::placeholder::protect) comes back unchanged.
//!
//! # Example
//!
//! ```ignore
//! use l10n_sync::mt::{DeepLProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLProvider::from_env()?;
//!     let result = provider.translate("Hello, world!", "en", "de").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, Usage, validate_locale};
use crate::placeholder::IGNORE_TAG;
use async_trait::async_trait;
use serde_json::Value;

/// Environment variable holding the DeepL authentication key
pub const AUTH_KEY_ENV: &str = "DEEPL_AUTH_KEY";

/// DeepL API v2 provider
#[derive(Clone)]
pub struct DeepLProvider {
    /// Authentication key, sent in the `Authorization` header
    auth_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL without the `/v2/...` endpoint
    base_url: String,
}

impl DeepLProvider {
    pub const FREE_API_URL: &'static str = "https://api-free.deepl.com";
    pub const PRO_API_URL: &'static str = "https://api.deepl.com";

    /// DeepL rejects request bodies above 128 KiB
    const MAX_TEXT_BYTES: usize = 128 * 1024;

    const TRANSLATE: &'static str = "/v2/translate";
    const LANGUAGES: &'static str = "/v2/languages";
    const USAGE: &'static str = "/v2/usage";

    /// Create a new provider with an explicit authentication key
    ///
    /// The base URL is chosen from the key: free-plan keys (`...:fx`) use
    /// [`Self::FREE_API_URL`], all others [`Self::PRO_API_URL`].
    ///
    /// # Errors
    ///
    /// * `MtError::ConfigError` - If the key is empty
    /// * `MtError::NetworkError` - If the HTTP client cannot be created
    pub fn new(auth_key: String) -> MtResult<Self> {
        let auth_key = auth_key.trim().to_string();
        if auth_key.is_empty() {
            return Err(MtError::ConfigError(
                "DeepL auth key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Self::default_base_url(&auth_key).to_string();
        Ok(Self {
            auth_key,
            client,
            base_url,
        })
    }

    /// Create a provider from the `DEEPL_AUTH_KEY` environment variable
    pub fn from_env() -> MtResult<Self> {
        let auth_key = std::env::var(AUTH_KEY_ENV).map_err(|_| {
            MtError::ConfigError(format!("{} environment variable not set", AUTH_KEY_ENV))
        })?;

        Self::new(auth_key)
    }

    /// Override the API base URL (e.g. a proxy or a local test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn default_base_url(auth_key: &str) -> &'static str {
        if auth_key.ends_with(":fx") {
            Self::FREE_API_URL
        } else {
            Self::PRO_API_URL
        }
    }

    /// POST a form to an API endpoint and return the parsed JSON body
    async fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> MtResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("DeepL-Auth-Key {}", self.auth_key),
            )
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("API server error ({}): {}", status, error_text))
            });
        }

        response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })
    }

    async fn languages(&self, kind: &str) -> MtResult<Vec<String>> {
        let json = self.post_form(Self::LANGUAGES, &[("type", kind)]).await?;
        Ok(extract_languages(&json))
    }
}

/// Pick the translated text out of a `/v2/translate` response
///
/// Anything but exactly one translation yields `default_text`, so a
/// surprising response leaves the text untranslated instead of failing.
pub fn extract_translation(json: &Value, default_text: &str) -> String {
    match json["translations"].as_array() {
        Some(translations) if translations.len() == 1 => translations[0]["text"]
            .as_str()
            .unwrap_or(default_text)
            .to_string(),
        _ => default_text.to_string(),
    }
}

/// Collect the lowercase language codes of a `/v2/languages` response
pub fn extract_languages(json: &Value) -> Vec<String> {
    let mut languages: Vec<String> = json
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry["language"].as_str())
                .map(str::to_lowercase)
                .collect()
        })
        .unwrap_or_default();
    languages.sort();
    languages.dedup();
    languages
}

impl std::fmt::Debug for DeepLProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLProvider")
            .field("auth_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeepLProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.len() > Self::MAX_TEXT_BYTES {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} bytes",
                Self::MAX_TEXT_BYTES
            )));
        }

        let source = source_locale.to_uppercase();
        let target = target_locale.to_uppercase();
        let json = self
            .post_form(
                Self::TRANSLATE,
                &[
                    ("text", text),
                    ("source_lang", source.as_str()),
                    ("target_lang", target.as_str()),
                    ("tag_handling", "xml"),
                    ("ignore_tags", IGNORE_TAG),
                ],
            )
            .await?;

        Ok(extract_translation(&json, text))
    }

    async fn source_languages(&self) -> MtResult<Vec<String>> {
        self.languages("source").await
    }

    async fn target_languages(&self) -> MtResult<Vec<String>> {
        self.languages("target").await
    }

    async fn usage(&self) -> MtResult<Option<Usage>> {
        let json = self.post_form(Self::USAGE, &[]).await?;
        let usage = serde_json::from_value(json).map_err(|e| {
            MtError::TranslationError(format!("Invalid usage response: {}", e))
        })?;
        Ok(Some(usage))
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
