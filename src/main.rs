use anyhow::Result;
use clap::{ColorChoice, Parser};

use pagearchive::cli::{start_download_checked, Cli, Commands, Format};
use pagearchive::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    logger::set_verbose(cli.verbose);

    match cli.command {
        Commands::Mhtml { source, dest } => {
            start_download_checked(dest, Format::Mhtml, &source.source, &source.base_url).await
        }
        Commands::Folder { source, dest } => {
            start_download_checked(dest, Format::Folder, &source.source, &source.base_url).await
        }
    }
}
