// cpk/src/cli/add.rs
use clap::Args;
use colored::Colorize;
use cpk_common::error::{CpkError, Result};
use cpk_common::reference::is_remote_location;
use cpk_common::Settings;
use cpk_core::{Installation, PdscUnit};
use cpk_net::{build_http_client, fetch_descriptor, Client};
use tracing::{debug, error};

use crate::cli::{finish_batch, open_installation};

#[derive(Args, Debug)]
pub struct Add {
    /// Descriptor files to add: a path, file:// or http(s):// URL ending in
    /// Vendor.Pack.pdsc
    #[arg(required = true)]
    pub references: Vec<String>,
}

impl Add {
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        let mut installation = open_installation(settings)?;
        let client = if self.references.iter().any(|r| is_remote_location(r)) {
            Some(build_http_client(settings.proxy.as_ref())?)
        } else {
            None
        };

        let mut errors: Vec<(String, CpkError)> = Vec::new();
        for reference in &self.references {
            match add_one(reference, &mut installation, client.as_ref()).await {
                Ok((unit, true)) => {
                    if !settings.is_quiet() {
                        match unit.descriptor().and_then(|d| d.description.as_deref()) {
                            Some(description) => println!(
                                "✓ Added {} ({})",
                                unit.tag().to_string().green(),
                                description
                            ),
                            None => println!("✓ Added {}", unit.tag().to_string().green()),
                        }
                    }
                }
                Ok((unit, false)) => {
                    if !settings.is_quiet() {
                        println!("{} is already installed", unit.tag().to_string().cyan());
                    }
                }
                Err(e) => {
                    error!("✖ Failed to add '{}': {}", reference.cyan(), e);
                    errors.push((reference.clone(), e));
                }
            }
        }

        let flushed = installation.flush();
        finish_batch("adding descriptors", errors, flushed)
    }
}

async fn add_one(
    reference: &str,
    installation: &mut Installation,
    client: Option<&Client>,
) -> Result<(PdscUnit, bool)> {
    let mut unit = PdscUnit::prepare(reference, installation)?;
    if unit.tag().is_remote() {
        let client = client.ok_or_else(|| {
            CpkError::HttpError(format!("no HTTP client available for {reference}"))
        })?;
        let dest = installation.root().download_dir();
        debug!("Fetching remote descriptor {} into {}", reference, dest.display());
        let local_copy = fetch_descriptor(client, reference, &dest).await?;
        unit.set_local_copy(local_copy);
    }
    let changed = unit.install(installation)?;
    Ok((unit, changed))
}
