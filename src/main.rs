use anyhow::Result;
use clap::Parser;

use excel_import::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    run(cli).await
}
