//! Shared setup for model-backed commands.
//!
//! Loads settings, mirrors the workspace into a fresh sandbox, and builds
//! the model, research backend and tool registry a run needs.

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use vagent_core::{build_system_prompt, openrouter_api_key, Settings};
use vagent_provider::{create_model, BoxedLanguageModel};
use vagent_tools::{
    shared_fs, BoxedResearchBackend, Catalog, CatalogBackend, SharedFs, ToolRegistry,
};
use vagent_vfs::{VirtualFileSystem, HOME};

/// Options shared by `run` and `chat`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SessionArgs {
    /// Host directory mirrored into the sandbox
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,
    /// Model key (see `vagent models`)
    #[arg(short, long)]
    pub model: Option<String>,
    /// Thinking effort: off, low, medium or high
    #[arg(long)]
    pub thinking: Option<String>,
    /// Write the sandbox back to the workspace when done
    #[arg(long)]
    pub sync: bool,
}

/// Load settings with environment and command-line overrides.
pub async fn load_settings(args: &SessionArgs) -> anyhow::Result<Settings> {
    let mut settings = Settings::load().await?.with_env();
    if let Some(model) = &args.model {
        settings.set("model", model)?;
    }
    if let Some(thinking) = &args.thinking {
        settings.set("thinking", thinking)?;
    }
    if let Some(workspace) = &args.workspace {
        settings.workspace = Some(workspace.clone());
    }
    Ok(settings)
}

/// A fresh sandbox holding the workspace files under `/home/user`.
pub fn load_workspace(dir: &Path) -> VirtualFileSystem {
    let mut fs = VirtualFileSystem::new();
    let count = fs.load_from_disk(dir, HOME);
    info!(dir = %dir.display(), files = count, "Loaded workspace");
    fs
}

/// Write the sandbox back to the workspace directory.
pub fn sync_workspace(fs: &SharedFs, dir: &Path) -> anyhow::Result<usize> {
    let fs = fs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let count = fs
        .save_to_disk(dir, HOME)
        .with_context(|| format!("Failed to save workspace to {}", dir.display()))?;
    info!(dir = %dir.display(), files = count, "Saved workspace");
    Ok(count)
}

/// Research backend from the configured catalog.
///
/// Without a catalog the paper tools stay available but find nothing.
pub fn research_backend(settings: &Settings) -> anyhow::Result<BoxedResearchBackend> {
    let backend = match &settings.catalog {
        Some(path) => CatalogBackend::load(path)
            .with_context(|| format!("Failed to load research catalog {}", path.display()))?,
        None => {
            warn!("No research catalog configured; paper search will return nothing");
            CatalogBackend::new(Catalog::default())
        }
    };
    let backend = match &settings.papers_url {
        Some(url) => backend.with_papers_url(url.as_str()),
        None => backend,
    };
    Ok(Arc::new(backend))
}

/// Build the language model for the current settings.
pub fn language_model(settings: &Settings) -> anyhow::Result<BoxedLanguageModel> {
    let api_key = openrouter_api_key()?;
    let config = settings.model_config();
    info!(model = %config.key, thinking = %config.effort, "Selected model");
    Ok(create_model(&config, &api_key)?)
}

/// Everything a model-backed command needs.
pub struct Session {
    pub settings: Settings,
    pub workspace: PathBuf,
    pub fs: SharedFs,
    pub tools: Arc<ToolRegistry>,
    pub model: BoxedLanguageModel,
}

impl Session {
    /// Set up a session. Fails before any run starts when the API key is
    /// missing or the catalog cannot be read.
    pub async fn open(args: &SessionArgs) -> anyhow::Result<Self> {
        let settings = load_settings(args).await?;
        let model = language_model(&settings)?;
        let backend = research_backend(&settings)?;
        let workspace = settings.workspace_dir();
        let fs = shared_fs(load_workspace(&workspace));

        Ok(Self {
            settings,
            workspace,
            fs,
            tools: Arc::new(ToolRegistry::with_builtins(backend)),
            model,
        })
    }

    /// Rebuild the model after the model or thinking setting changed.
    pub fn reload_model(&mut self) -> anyhow::Result<()> {
        self.model = language_model(&self.settings)?;
        Ok(())
    }

    /// System prompt describing the sandbox as it is now.
    pub fn system_prompt(&self) -> String {
        let fs = self
            .fs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        build_system_prompt(&fs, None)
    }

    /// Save the sandbox to the workspace directory.
    pub fn sync(&self) -> anyhow::Result<usize> {
        sync_workspace(&self.fs, &self.workspace)
    }
}
