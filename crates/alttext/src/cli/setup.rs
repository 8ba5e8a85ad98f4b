//! Service setup shared by the commands that touch the media library.

use std::path::PathBuf;
use std::sync::Arc;

use alttext_core::{AltTextService, Config, ManifestLibrary, SuggestionPipeline, TracingObserver};
use clap::Args;

/// Where the media library manifest lives.
#[derive(Args, Debug, Clone, Default)]
pub struct LibraryArgs {
    /// Media library manifest (defaults to `general.library` from the config)
    #[arg(long, env = "ALTTEXT_LIBRARY")]
    pub library: Option<PathBuf>,
}

/// Everything a library command needs.
pub struct ServiceContext {
    pub service: AltTextService,
    pub library: Arc<ManifestLibrary>,
}

/// Load the effective config, open the manifest and assemble the service.
pub async fn setup_service(args: &LibraryArgs) -> anyhow::Result<ServiceContext> {
    let config = Config::load_effective()?;
    let path = args
        .library
        .clone()
        .unwrap_or_else(|| config.library_path());

    if !path.exists() {
        anyhow::bail!(
            "Media library not found: {}\n\n  Hint: Pass --library, set ALTTEXT_LIBRARY, \
             or set general.library in the config file.",
            path.display()
        );
    }

    let library = Arc::new(ManifestLibrary::open(&path).await?);
    tracing::debug!(
        "Using library {} with provider '{}'",
        path.display(),
        config.general.default_provider
    );

    let pipeline = Arc::new(SuggestionPipeline::from_config(
        Arc::new(config),
        library.clone(),
    ));
    let service = AltTextService::new(pipeline, library.clone())
        .with_observer(Arc::new(TracingObserver));

    Ok(ServiceContext { service, library })
}
