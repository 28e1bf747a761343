// cpk/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use cpk_common::error::{CpkError, Result};
use cpk_common::{InstallationRoot, Settings};
use cpk_core::Installation;

// Module declarations
pub mod add;
pub mod init;
pub mod list;
pub mod rm;

pub use crate::cli::add::Add;
pub use crate::cli::init::InitArgs;
pub use crate::cli::list::List;
pub use crate::cli::rm::Rm;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "cpk", bin_name = "cpk")]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Pack root directory
    #[arg(short = 'R', long, global = true, env = "CMSIS_PACK_ROOT")]
    pub pack_root: Option<PathBuf>,

    /// Proxy for all HTTP(S) downloads
    #[arg(long, global = true, env = "CPK_PROXY")]
    pub proxy: Option<String>,

    /// Create the pack root if it does not exist
    #[arg(short = 'c', long, global = true)]
    pub create_pack_root: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    pub fn settings(&self) -> Result<Settings> {
        Settings::new(
            self.verbose,
            self.quiet,
            self.proxy.as_deref(),
            self.pack_root.clone(),
            self.create_pack_root,
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the pack root and an empty local index
    Init(InitArgs),
    /// Manage packs installed through their descriptor (.pdsc) file
    Pdsc(PdscArgs),
}

#[derive(Args, Debug)]
pub struct PdscArgs {
    #[command(subcommand)]
    pub command: PdscCommand,
}

#[derive(Subcommand, Debug)]
pub enum PdscCommand {
    /// Add descriptors to the local index
    Add(Add),
    /// Remove descriptors from the local index
    Rm(Rm),
    /// Show the local index
    List(List),
}

impl Command {
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        match self {
            Self::Init(command) => command.run(settings).await,
            Self::Pdsc(PdscArgs { command }) => match command {
                PdscCommand::Add(command) => command.run(settings).await,
                PdscCommand::Rm(command) => command.run(settings).await,
                PdscCommand::List(command) => command.run(settings).await,
            },
        }
    }
}

/// Opens the installation for a pdsc command. A pack root created by this
/// run gets the standard layout right away.
pub(crate) fn open_installation(settings: &Settings) -> Result<Installation> {
    let root = InstallationRoot::set(settings.pack_root(), settings.create_pack_root)?;
    let mut installation = Installation::new(root);
    if installation.root().created() {
        installation.prepare_layout()?;
    }
    Ok(installation)
}

/// Prints per-reference failures of a batch together with the outcome of
/// the final index flush, and turns them into one error.
pub(crate) fn finish_batch(
    action: &str,
    errors: Vec<(String, CpkError)>,
    flushed: Result<()>,
) -> Result<()> {
    if errors.is_empty() {
        return flushed;
    }
    eprintln!("\n{}:", format!("Finished {action} with errors").yellow());
    for (reference, error) in &errors {
        eprintln!("Reference '{}':", reference.cyan());
        eprintln!("- {}", error.to_string().red());
    }
    if errors.iter().any(|(_, e)| e.is_identifier_error()) {
        eprintln!(
            "{}",
            "Packs are named Vendor.Pack[.x.y.z], descriptors [location/]Vendor.Pack.pdsc"
                .yellow()
        );
    }
    if let Err(e) = &flushed {
        eprintln!("Local index:");
        eprintln!("- {}", e.to_string().red());
    }
    Err(CpkError::Generic(format!(
        "{} of the given references could not be processed{}",
        errors.len(),
        if flushed.is_err() {
            " and the local index was not written"
        } else {
            ""
        }
    )))
}
