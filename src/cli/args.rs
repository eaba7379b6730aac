//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Archive a rendered web page as MHTML or a folder of rewritten assets.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Save as a single self-contained .mht file
    Mhtml {
        #[command(flatten)]
        source: SourceArgs,

        /// Output path for the .mht file
        dest: PathBuf,
    },

    /// Save as root HTML plus a sibling folder of rewritten assets
    Folder {
        #[command(flatten)]
        source: SourceArgs,

        /// Output path for the root HTML file
        dest: PathBuf,
    },
}

/// Arguments shared by both archive commands: where the rendered DOM comes
/// from and what URL it was rendered at.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Path to a serialized HTML document, or `-` to read from stdin
    #[arg(long, value_name = "PATH-OR-DASH")]
    pub source: String,

    /// The URL the document was rendered at, used to resolve relative
    /// references
    #[arg(long, value_name = "URL")]
    pub base_url: String,
}
