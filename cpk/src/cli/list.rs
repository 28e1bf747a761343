// cpk/src/cli/list.rs
use clap::Args;
use colored::Colorize;
use cpk_common::error::{CpkError, Result};
use cpk_common::{InstallationRoot, Settings};
use cpk_core::Installation;
use prettytable::{format, Cell, Row, Table};

#[derive(Args, Debug)]
pub struct List {
    /// Print the entries as JSON
    #[arg(long)]
    pub json: bool,
}

impl List {
    pub async fn run(&self, settings: &Settings) -> Result<()> {
        let root = InstallationRoot::set(settings.pack_root(), settings.create_pack_root)?;
        let mut installation = Installation::new(root);
        let mut records = installation.local_index()?.records().to_vec();
        records.sort_by(|a, b| {
            a.vendor
                .cmp(&b.vendor)
                .then(a.name.cmp(&b.name))
                .then(a.version.cmp(&b.version))
        });

        if self.json {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| CpkError::Generic(format!("Failed to render JSON: {e}")))?;
            println!("{json}");
            return Ok(());
        }

        if records.is_empty() {
            println!("{}", "0 descriptors installed".yellow());
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Vendor").style_spec("b"),
            Cell::new("Name").style_spec("b"),
            Cell::new("Version").style_spec("b"),
            Cell::new("Location").style_spec("b"),
        ]));
        for record in &records {
            table.add_row(Row::new(vec![
                Cell::new(&record.vendor),
                Cell::new(&record.name).style_spec("Fb"),
                Cell::new(&record.version),
                Cell::new(&record.location),
            ]));
        }
        table.printstd();
        println!(
            "{}",
            format!("{} descriptors installed", records.len()).bold()
        );
        Ok(())
    }
}
