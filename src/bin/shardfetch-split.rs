//! `shardfetch-split`: like `shardfetch`, but routes archive members by suffix.
//!
//!   *.jpg  → --images_dir
//!   *.json → --masks_dir
//!   other  → dropped

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use shardfetch::commands::fetch::{self, CommonArgs};
use shardfetch::core::extract::ExtractPolicy;
use shardfetch::utils::logging;

#[derive(Parser)]
#[clap(name = "shardfetch-split")]
#[clap(about = "Download files and extract images and masks into separate directories.")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(flatten)]
    common: CommonArgs,
    /// Directory to store extracted .jpg images
    #[clap(long = "images_dir", default_value = "images")]
    images_dir: PathBuf,
    /// Directory to store extracted .json annotations
    #[clap(long = "masks_dir", default_value = "annotations")]
    masks_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.common.verbose, cli.common.quiet);

    let config = cli.common.into_config(ExtractPolicy::Split {
        images_dir: cli.images_dir,
        masks_dir: cli.masks_dir,
    });

    if let Err(e) = fetch::run(&config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    println!("All files extracted successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_dir_defaults() {
        let cli = Cli::try_parse_from(["shardfetch-split"]).unwrap();
        assert_eq!(cli.images_dir, PathBuf::from("images"));
        assert_eq!(cli.masks_dir, PathBuf::from("annotations"));
        assert_eq!(cli.common.processes, 4);
    }

    #[test]
    fn test_split_dir_flags() {
        let cli = Cli::try_parse_from([
            "shardfetch-split",
            "--images_dir",
            "jpgs",
            "--masks_dir",
            "masks",
            "--processes",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.images_dir, PathBuf::from("jpgs"));
        assert_eq!(cli.masks_dir, PathBuf::from("masks"));
        assert_eq!(cli.common.processes, 2);
    }

    #[test]
    fn test_data_dir_is_not_accepted() {
        assert!(Cli::try_parse_from(["shardfetch-split", "--data_dir", "x"]).is_err());
    }
}
