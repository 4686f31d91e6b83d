//! Command-line interface

mod examine;
mod import;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "excel-import", about = "Import Excel workbooks into dynamically created database tables", version)]
pub struct Cli {
    /// Database URL; falls back to DATABASE_URL, then a local SQLite file
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a workbook's sheets and the table mapping each one would get
    Examine {
        /// Path to the .xlsx file
        file: PathBuf,
    },
    /// Import selected sheets into the database
    Import {
        /// Path to the .xlsx file
        file: PathBuf,
        /// Comma-separated sheet names; defaults to every sheet
        #[arg(long, value_delimiter = ',')]
        sheets: Vec<String>,
        /// Acting user id; defaults to the first user in the database
        #[arg(long)]
        user_id: Option<i64>,
        /// Print the report as JSON instead of human-readable output
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn resolve_database_url(&self) -> String {
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| "sqlite://excel_import.db?mode=rwc".to_string())
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Examine { file } => examine::handle(file),
        Commands::Import {
            file,
            sheets,
            user_id,
            json,
        } => {
            let url = cli.resolve_database_url();
            import::handle(&url, file, sheets, *user_id, *json).await
        }
    }
}
