//! Folder writer (C4): root HTML + a sibling folder of allocated assets.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::core::{self, ArchiveError};

pub struct FolderWriter {
    pub root_content: Vec<u8>,
    content_location: Url,
    pub dest: PathBuf,
    folder_path: PathBuf,
    /// url -> allocated filename. Injective on the value side by
    /// construction: `inc_filename` is retried until no collision remains.
    file_mapping: HashMap<Url, String>,
}

impl FolderWriter {
    pub fn new(root_content: Vec<u8>, content_location: Url, dest: PathBuf) -> Self {
        let folder_path = asset_folder_path(&dest);
        Self {
            root_content,
            content_location,
            dest,
            folder_path,
            file_mapping: HashMap::new(),
        }
    }

    pub fn suggested_ext(&self) -> &'static str {
        ".html"
    }

    pub fn folder_name(&self) -> String {
        self.folder_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn rewrite_url(&mut self, url: &Url, base: Option<&Url>) -> String {
        if core::is_data(url) {
            return url.to_string();
        }

        let resolved = match base {
            Some(base) => base.clone(),
            None => self.content_location.clone(),
        }
        .join(url.as_str())
        .unwrap_or_else(|_| url.clone());

        let filename = if let Some(existing) = self.file_mapping.get(&resolved) {
            existing.clone()
        } else {
            let mut candidate = core::file_name(&resolved).unwrap_or_else(|| "asset".to_string());
            while self.file_mapping.values().any(|v| v == &candidate) {
                candidate = inc_filename(&candidate);
            }
            self.file_mapping.insert(resolved.clone(), candidate.clone());
            candidate
        };

        let is_root_reference = base.map_or(true, |b| *b == self.content_location);
        if is_root_reference {
            format!("{}/{}", self.folder_name(), filename)
        } else {
            filename
        }
    }

    pub fn add_file(&mut self, location: &Url, content: Vec<u8>, _content_type: Option<String>) -> Result<(), ArchiveError> {
        let filename = self
            .file_mapping
            .get(location)
            .cloned()
            .unwrap_or_else(|| "asset".to_string());
        let path = self.folder_path.join(&filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(path.display().to_string(), e))?;
        }
        fs::write(&path, content).map_err(|e| ArchiveError::io(path.display().to_string(), e))
    }

    pub fn remove_file(&mut self, location: &Url) -> Result<(), ArchiveError> {
        if let Some(filename) = self.file_mapping.get(location) {
            let path = self.folder_path.join(filename);
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ArchiveError::io(path.display().to_string(), e)),
            }
        } else {
            Ok(())
        }
    }

    pub fn write(&self) -> Result<(), ArchiveError> {
        if let Some(parent) = self.dest.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(self.dest.display().to_string(), e))?;
        }
        fs::write(&self.dest, &self.root_content)
            .map_err(|e| ArchiveError::io(self.dest.display().to_string(), e))
    }
}

/// Derive the assets folder path from the root document's destination path.
pub fn asset_folder_path(dest: &Path) -> PathBuf {
    match dest.extension() {
        Some(_) => dest.with_extension(""),
        None => {
            let mut name = dest.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            name.push_str(" - assets");
            match dest.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
                _ => PathBuf::from(name),
            }
        }
    }
}

static TRAILING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-(\d+)$").unwrap());

/// Bump the trailing `-<digits>` counter in a filename's stem, or append
/// `-1` if there is none. The extension is preserved verbatim.
pub fn inc_filename(filename: &str) -> String {
    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    };

    match TRAILING_NUMBER.captures(stem) {
        Some(caps) => {
            let digits = &caps[1];
            let num: u64 = digits.parse().unwrap_or(0) + 1;
            let prefix = &stem[..stem.len() - caps[0].len()];
            format!("{prefix}-{num}{ext}")
        }
        None => format!("{stem}-1{ext}"),
    }
}
