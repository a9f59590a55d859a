//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! enabling support for different MT backends (DeepL, mock, etc.)
//! without coupling the synchronization pipeline to any specific implementation.
//!
//! # Example
//!
//! ```ignore
//! use l10n_sync::mt::{DeepLProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLProvider::from_env()?;
//!
//!     let result = provider.translate("Hello, world!", "en", "de").await?;
//!     println!("{}", result); // "Hallo, Welt!"
//!
//!     let targets = provider.target_languages().await?;
//!     println!("{:?}", targets); // ["bg", "cs", "da", "de", ...]
//!
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;
use serde::Deserialize;

/// Character quota reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub character_count: u64,
    pub character_limit: u64,
}

/// Generic trait for machine translation providers
///
/// Implementations of this trait handle the actual translation work,
/// whether through an API (DeepL) or deterministic logic (Mock).
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target language
    ///
    /// The text may contain markup produced by
    /// [`protect`](crate::placeholder::protect); implementations must pass it
    /// through untranslated.
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en")
    /// * `target_locale` - Target language code (e.g., "de", "en-gb")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If translation fails
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Lowercase language codes accepted as translation source
    async fn source_languages(&self) -> MtResult<Vec<String>>;

    /// Lowercase language codes accepted as translation target
    async fn target_languages(&self) -> MtResult<Vec<String>>;

    /// Character quota, if the provider reports one
    async fn usage(&self) -> MtResult<Option<Usage>> {
        Ok(None)
    }

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores (following ISO 639 conventions).
///
/// # Example
///
/// ```ignore
/// validate_locale("en")?; // OK
/// validate_locale("en-GB")?; // OK
/// validate_locale("invalid@code").unwrap_err(); // Error
/// ```
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
