//! Entry point (C6): wires a parsed command to a running coordinator.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::coordinator::Coordinator;
use crate::dom::TlDocument;
use crate::download::HttpFetcher;
use crate::log;
use crate::writer::Writer;

pub enum Format {
    Mhtml,
    Folder,
}

impl Format {
    fn suggested_ext(&self) -> &'static str {
        match self {
            Format::Mhtml => ".mht",
            Format::Folder => ".html",
        }
    }
}

/// Archive unconditionally, overwriting `dest` if it already exists.
pub async fn start_download(dest: PathBuf, format: Format, source: &str, base_url: &str) -> Result<()> {
    let html = read_source(source).context("reading DOM source")?;
    let base_url = Url::parse(base_url).context("invalid --base-url")?;
    let suggested_ext = format.suggested_ext();

    let dom = TlDocument::parse(&html)?;
    let fetcher = HttpFetcher::new();

    let writer = match format {
        Format::Mhtml => Writer::new_mhtml(Vec::new(), base_url.to_string(), Some("text/html".into()), dest.clone()),
        Format::Folder => Writer::new_folder(Vec::new(), base_url.clone(), dest.clone()),
    };

    let coordinator = Coordinator::new(dom, fetcher, base_url, writer);
    coordinator.run().await?;

    log!("archive"; "saved {} ({suggested_ext}) to {}", dest.display(), dest.display());
    Ok(())
}

/// Archive, but ask first if `dest` already exists as a regular file.
pub async fn start_download_checked(dest: PathBuf, format: Format, source: &str, base_url: &str) -> Result<()> {
    if dest.is_file() && !prompt_overwrite(&dest)? {
        log!("archive"; "skipped, {} was not overwritten", dest.display());
        return Ok(());
    }
    start_download(dest, format, source, base_url).await
}

/// Ask the user whether to overwrite `dest`. The yes/no parsing itself lives
/// in `parse_confirmation` so it can be unit tested without real stdin.
pub fn prompt_overwrite(dest: &Path) -> Result<bool> {
    eprint!("{} exists. Overwrite? [y/N] ", dest.display());
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(parse_confirmation(&input))
}

fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(source).with_context(|| format!("reading {source}"))
    }
}
