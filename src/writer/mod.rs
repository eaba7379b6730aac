//! Writer interface (C2) and its two back-ends (C3 MHTML, C4 folder).
//!
//! `Writer` is a closed sum type rather than a trait object: the set of
//! back-ends is fixed at compile time and the coordinator always owns
//! exactly one writer by value.

mod folder;
mod mhtml;
mod quopri;

pub use folder::{asset_folder_path, inc_filename};
pub use folder::FolderWriter;
pub use mhtml::MhtmlWriter;

use std::path::PathBuf;
use url::Url;

use crate::core::ArchiveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    Base64,
    QuotedPrintable,
}

struct AssetFile {
    content: Vec<u8>,
    content_type: Option<String>,
    content_location: String,
    transfer_encoding: TransferEncoding,
}

pub enum Writer {
    Mhtml(MhtmlWriter),
    Folder(FolderWriter),
}

impl Writer {
    pub fn new_mhtml(
        root_content: Vec<u8>,
        content_location: String,
        content_type: Option<String>,
        dest: PathBuf,
    ) -> Self {
        Writer::Mhtml(MhtmlWriter::new(root_content, content_location, content_type, dest))
    }

    pub fn new_folder(root_content: Vec<u8>, content_location: Url, dest: PathBuf) -> Self {
        Writer::Folder(FolderWriter::new(root_content, content_location, dest))
    }

    pub fn suggested_ext(&self) -> &'static str {
        match self {
            Writer::Mhtml(w) => w.suggested_ext(),
            Writer::Folder(w) => w.suggested_ext(),
        }
    }

    pub fn rewrite_url(&mut self, url: &Url, base: Option<&Url>) -> String {
        match self {
            Writer::Mhtml(w) => w.rewrite_url(url, base),
            Writer::Folder(w) => w.rewrite_url(url, base),
        }
    }

    pub fn add_file(
        &mut self,
        location: &Url,
        content: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), ArchiveError> {
        match self {
            Writer::Mhtml(w) => {
                w.add_file(location, content, content_type);
                Ok(())
            }
            Writer::Folder(w) => w.add_file(location, content, content_type),
        }
    }

    pub fn remove_file(&mut self, location: &Url) -> Result<(), ArchiveError> {
        match self {
            Writer::Mhtml(w) => {
                w.remove_file(location);
                Ok(())
            }
            Writer::Folder(w) => w.remove_file(location),
        }
    }

    pub fn set_root_content(&mut self, content: Vec<u8>) {
        match self {
            Writer::Mhtml(w) => w.root_content = content,
            Writer::Folder(w) => w.root_content = content,
        }
    }

    pub fn write(&self) -> Result<(), ArchiveError> {
        match self {
            Writer::Mhtml(w) => w.write(),
            Writer::Folder(w) => w.write(),
        }
    }
}
