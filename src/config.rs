//! Command line options and the resolved run configuration
//!
//! Parsing happens in two steps. [`CliArgs::parse_from`] turns the raw
//! arguments into plain values without touching the network or the disk.
//! [`TranslationConfig::resolve`] then checks the requested languages against
//! the [`LanguageCatalog`] of the provider and, if no target was given,
//! discovers the target languages from the sub-directories of the
//! translations directory.

use crate::error::{SyncError, SyncResult};
use crate::mt::{MachineTranslator, MtResult, validate_locale};
use crate::storage::Storage;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
pub const DEFAULT_TRANSLATIONS_DIRECTORY: &str = "translations";
pub const DEFAULT_REPOSITORY_DIRECTORY: &str = ".";

/// Name of the localization file inside every language directory
pub const FILE_NAME: &str = "main.json";

const ABOUT: &str = "Reads all keys from the source language, finds the differences to each \
target file and to the previous commit of the source file, and fetches the changed \
translations from DeepL. The order of existing keys is preserved, new keys are added at the \
end of the target file.";

const EXAMPLE: &str = "Example: l10n-sync -s en -t de -p translations -r .";

/// The command line interface
pub fn command() -> Command {
    Command::new("l10n-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about(ABOUT)
        .after_help(EXAMPLE)
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .value_name("LANG")
                .help("Source language (default: en)")
                .default_value(DEFAULT_SOURCE_LANGUAGE),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .value_name("LANG[,LANG...]")
                .help("Target language(s), comma separated (default: all language directories except the source)")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("path")
                .long("path")
                .short('p')
                .value_name("DIR")
                .help("Translations directory inside the repository (default: translations)")
                .default_value(DEFAULT_TRANSLATIONS_DIRECTORY),
        )
        .arg(
            Arg::new("repo")
                .long("repo")
                .short('r')
                .value_name("DIR")
                .help("Git repository root (default: .)")
                .default_value(DEFAULT_REPOSITORY_DIRECTORY),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Turn on more output (default is off)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("auth-key")
                .long("auth-key")
                .value_name("KEY")
                .env(crate::mt::deepl::AUTH_KEY_ENV)
                .hide_env_values(true)
                .help("DeepL authentication key"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .value_name("URL")
                .help("DeepL API base URL (default: chosen from the key)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use the offline mock translator instead of DeepL")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .help("Continue with the remaining target languages when one fails")
                .action(ArgAction::SetTrue),
        )
}

/// Parsed command line, before any validation against the provider
#[derive(Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub source_language: String,
    /// `None` when the targets should be discovered from the directory layout
    pub target_languages: Option<Vec<String>>,
    pub translations_directory: PathBuf,
    pub repository_directory: PathBuf,
    pub verbose: bool,
    pub auth_key: Option<String>,
    pub api_url: Option<String>,
    pub mock: bool,
    pub keep_going: bool,
}

impl std::fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliArgs")
            .field("source_language", &self.source_language)
            .field("target_languages", &self.target_languages)
            .field("translations_directory", &self.translations_directory)
            .field("repository_directory", &self.repository_directory)
            .field("verbose", &self.verbose)
            .field("auth_key", &self.auth_key.as_ref().map(|_| "***"))
            .field("api_url", &self.api_url)
            .field("mock", &self.mock)
            .field("keep_going", &self.keep_going)
            .finish()
    }
}

impl CliArgs {
    /// Parse the arguments (the first item is the program name)
    ///
    /// # Errors
    /// - [`SyncError::HelpDisplayed`] after `--help`/`--version` was printed
    /// - [`SyncError::MissingArgument`] / [`SyncError::InvalidArgument`] for
    ///   anything clap rejects
    pub fn parse_from<I, T>(args: I) -> SyncResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                SyncError::HelpDisplayed
            }
            ErrorKind::MissingRequiredArgument => SyncError::MissingArgument(e.to_string()),
            _ => SyncError::InvalidArgument(e.to_string()),
        })?;

        let string = |id: &str| matches.get_one::<String>(id).map(|s| s.trim().to_string());
        let path = |id: &str| PathBuf::from(string(id).unwrap_or_default());

        Ok(Self {
            source_language: string("source").unwrap_or_default(),
            target_languages: matches.get_many::<String>("target").map(|values| {
                values
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            }),
            translations_directory: path("path"),
            repository_directory: path("repo"),
            verbose: matches.get_flag("verbose"),
            auth_key: string("auth-key").filter(|k| !k.is_empty()),
            api_url: string("api-url").filter(|u| !u.is_empty()),
            mock: matches.get_flag("mock"),
            keep_going: matches.get_flag("keep-going"),
        })
    }
}

/// Languages a provider accepts, lowercased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    source: BTreeSet<String>,
    target: BTreeSet<String>,
}

impl LanguageCatalog {
    pub fn new<S, T>(source: S, target: T) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        Self {
            source: source.into_iter().map(|l| l.as_ref().to_lowercase()).collect(),
            target: target.into_iter().map(|l| l.as_ref().to_lowercase()).collect(),
        }
    }

    /// Ask the provider for its supported languages
    pub async fn fetch(translator: &dyn MachineTranslator) -> MtResult<Self> {
        let source = translator.source_languages().await?;
        let target = translator.target_languages().await?;
        Ok(Self::new(source, target))
    }

    pub fn supports_source(&self, language: &str) -> bool {
        self.source.contains(&language.to_lowercase())
    }

    pub fn supports_target(&self, language: &str) -> bool {
        self.target.contains(&language.to_lowercase())
    }

    pub fn source_languages(&self) -> impl Iterator<Item = &str> {
        self.source.iter().map(String::as_str)
    }

    pub fn target_languages(&self) -> impl Iterator<Item = &str> {
        self.target.iter().map(String::as_str)
    }
}

/// Resolved, validated configuration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationConfig {
    pub source_language: String,
    /// Never empty; iterated in sorted order
    pub target_languages: BTreeSet<String>,
    pub translations_directory: PathBuf,
    pub repository_directory: PathBuf,
}

impl TranslationConfig {
    /// Validate the command line against the provider's languages
    ///
    /// Language codes keep the spelling they were given with (it is also the
    /// directory name); the catalog check ignores case.
    ///
    /// # Errors
    /// - [`SyncError::InvalidArgument`] for an unsupported or malformed
    ///   language, or when no target language remains
    /// - [`SyncError::FileNotFound`] if targets must be discovered and the
    ///   translations directory does not exist
    pub fn resolve(
        args: &CliArgs,
        catalog: &LanguageCatalog,
        storage: &dyn Storage,
    ) -> SyncResult<Self> {
        let source_language = args.source_language.clone();
        validate_locale(&source_language)
            .map_err(|e| SyncError::InvalidArgument(format!("source language: {}", e)))?;
        if !catalog.supports_source(&source_language) {
            return Err(SyncError::InvalidArgument(format!(
                "Source language '{}' is not allowed. Possible values are: {}",
                source_language,
                catalog.source_languages().collect::<Vec<_>>().join(", ")
            )));
        }

        let target_languages: BTreeSet<String> = match &args.target_languages {
            Some(targets) => {
                if let Some(same) = targets
                    .iter()
                    .find(|t| t.eq_ignore_ascii_case(&source_language))
                {
                    return Err(SyncError::InvalidArgument(format!(
                        "Target language '{}' is the source language",
                        same
                    )));
                }
                targets.iter().cloned().collect()
            }
            None => {
                let directory = args
                    .repository_directory
                    .join(&args.translations_directory);
                storage
                    .list_directories(&directory)?
                    .into_iter()
                    .filter(|language| language != &source_language)
                    .collect()
            }
        };

        if target_languages.is_empty() {
            return Err(SyncError::InvalidArgument(
                "No target language given and none found in the translations directory"
                    .to_string(),
            ));
        }

        let unsupported: Vec<&str> = target_languages
            .iter()
            .filter(|t| validate_locale(t).is_err() || !catalog.supports_target(t))
            .map(String::as_str)
            .collect();
        if !unsupported.is_empty() {
            return Err(SyncError::InvalidArgument(format!(
                "Some target languages [{}] are not allowed. Possible target languages are: {}",
                unsupported.join(", "),
                catalog.target_languages().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(Self {
            source_language,
            target_languages,
            translations_directory: args.translations_directory.clone(),
            repository_directory: args.repository_directory.clone(),
        })
    }

    /// `{translations}/{source}/main.json`, relative to the repository
    pub fn source_file(&self) -> PathBuf {
        self.language_file(&self.source_language)
    }

    /// `{translations}/{language}/main.json`, relative to the repository
    pub fn target_file(&self, language: &str) -> PathBuf {
        self.language_file(language)
    }

    /// Location of a repository-relative file on disk
    pub fn in_repository(&self, relative: &Path) -> PathBuf {
        self.repository_directory.join(relative)
    }

    fn language_file(&self, language: &str) -> PathBuf {
        self.translations_directory.join(language).join(FILE_NAME)
    }
}
