// cpk/src/cli/rm.rs
use clap::Args;
use colored::Colorize;
use cpk_common::error::{CpkError, Result};
use cpk_common::Settings;
use cpk_core::PdscUnit;
use tracing::error;

use crate::cli::{finish_batch, open_installation};

#[derive(Args, Debug)]
pub struct Rm {
    /// Packs to remove: Vendor.Pack (every version), Vendor.Pack.x.y.z or a
    /// path to Vendor.Pack.pdsc
    #[arg(required = true)]
    pub references: Vec<String>,
}

impl Rm {
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        let mut installation = open_installation(settings)?;

        let mut errors: Vec<(String, CpkError)> = Vec::new();
        for reference in &self.references {
            let removed = PdscUnit::prepare_removal(reference, &mut installation)
                .and_then(|unit| unit.uninstall(&mut installation));
            match removed {
                Ok(removed) => {
                    if !settings.is_quiet() {
                        for record in removed {
                            println!("✓ Removed {}", record.to_string().green());
                        }
                    }
                }
                Err(e) => {
                    error!("✖ Failed to remove '{}': {}", reference.cyan(), e);
                    errors.push((reference.clone(), e));
                }
            }
        }

        let flushed = installation.flush();
        finish_batch("removing descriptors", errors, flushed)
    }
}
