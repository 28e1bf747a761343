// cpk/src/cli/init.rs
use clap::Args;
use colored::Colorize;
use cpk_common::error::Result;
use cpk_common::{InstallationRoot, Settings};
use cpk_core::Installation;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        info!(
            "Initializing pack root at {}",
            settings.pack_root().display()
        );
        let root = InstallationRoot::set(settings.pack_root(), true)?;
        let mut installation = Installation::new(root);
        installation.prepare_layout()?;
        let entries = installation.local_index()?.len();

        if !settings.is_quiet() {
            println!(
                "✓ Pack root ready at {} ({} local index entries)",
                installation.root().path().display().to_string().green(),
                entries
            );
        }
        Ok(())
    }
}
