use l10n_sync::mt::deepl::AUTH_KEY_ENV;
use l10n_sync::{
    CliArgs, DeepLProvider, ExitStatus, FsStorage, GitHistory, LanguageCatalog, MachineTranslator,
    MockMode, MockTranslator, SyncError, SyncResult, Synchronizer, TranslationConfig,
};
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match CliArgs::parse_from(std::env::args_os()) {
        Ok(args) => args,
        Err(SyncError::HelpDisplayed) => process::exit(ExitStatus::Help.code()),
        Err(e) => {
            init_tracing(false);
            warn!("{}", e);
            process::exit(e.exit_status().code());
        }
    };

    init_tracing(args.verbose);

    let status = match run(&args).await {
        Ok(()) => ExitStatus::Ok,
        Err(e) => {
            warn!("{}", e);
            e.exit_status()
        }
    };
    process::exit(status.code());
}

/// `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

async fn run(args: &CliArgs) -> SyncResult<()> {
    let translator = build_translator(args)?;
    let catalog = LanguageCatalog::fetch(translator.as_ref()).await?;
    let config = TranslationConfig::resolve(args, &catalog, &FsStorage)?;

    Synchronizer::new(&config, &FsStorage, &GitHistory, translator.as_ref())
        .keep_going(args.keep_going)
        .run()
        .await?
        .into_result()?;
    Ok(())
}

fn build_translator(args: &CliArgs) -> SyncResult<Box<dyn MachineTranslator>> {
    if args.mock {
        return Ok(Box::new(MockTranslator::new(MockMode::Suffix)));
    }

    let auth_key = args.auth_key.clone().ok_or_else(|| {
        SyncError::MissingArgument(format!(
            "DeepL auth key, set {} or pass --auth-key (or use --mock)",
            AUTH_KEY_ENV
        ))
    })?;
    let provider =
        DeepLProvider::new(auth_key).map_err(|e| SyncError::MissingArgument(e.to_string()))?;

    let provider = match &args.api_url {
        Some(url) => provider.with_base_url(url.as_str()),
        None => provider,
    };
    Ok(Box::new(provider))
}
