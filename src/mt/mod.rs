//! Machine Translation Module
//!
//! This module provides the translation backends used by the synchronization
//! pipeline. The pipeline only depends on the [`MachineTranslator`] trait; the
//! concrete provider is picked once at startup.
//!
//! # Overview
//!
//! 1. **MT Trait** - Generic async trait for translating text and listing supported languages
//! 2. **DeepL Provider** - HTTP client for the DeepL API v2, placeholder-aware via `ignore_tags`
//! 3. **Mock Provider** - Deterministic offline provider that records every request
//!
//! # Example
//!
//! ```ignore
//! use l10n_sync::mt::{DeepLProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLProvider::new(std::env::var("DEEPL_AUTH_KEY")?)?;
//!     let translated = provider.translate("Open file", "en", "de").await?;
//!     println!("{}", translated);
//!     Ok(())
//! }
//! ```

pub mod deepl;
pub mod error;
pub mod mock;
pub mod translator;

pub use deepl::DeepLProvider;
pub use error::{MtError, MtResult};
pub use mock::{MockMode, MockRequest, MockTranslator};
pub use translator::{MachineTranslator, Usage, validate_locale};
