use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use shardfetch::commands::fetch::{self, CommonArgs};
use shardfetch::core::extract::ExtractPolicy;
use shardfetch::utils::logging;

#[derive(Parser)]
#[clap(name = "shardfetch")]
#[clap(about = "Download and extract files.")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(flatten)]
    common: CommonArgs,
    /// Directory to store extracted files
    #[clap(long = "data_dir", default_value = "images")]
    data_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.common.verbose, cli.common.quiet);

    let config = cli.common.into_config(ExtractPolicy::All {
        data_dir: cli.data_dir,
    });

    if let Err(e) = fetch::run(&config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    println!("All files extracted successfully!");
    Ok(())
}
