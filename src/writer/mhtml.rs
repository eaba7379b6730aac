//! MHTML writer (C3): a single `multipart/related` MIME message.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use url::Url;
use uuid::Uuid;

use super::quopri::{encode_base64_wrapped, encode_quoted_printable};
use super::{AssetFile, TransferEncoding};
use crate::core::ArchiveError;

pub struct MhtmlWriter {
    pub root_content: Vec<u8>,
    pub content_location: String,
    pub content_type: Option<String>,
    pub dest: PathBuf,
    /// Keyed by `content_location`; `BTreeMap`'s default `Ord` on `String`
    /// gives byte-ordered sorting for free at write time.
    files: BTreeMap<String, AssetFile>,
    boundary: String,
}

impl MhtmlWriter {
    pub fn new(
        root_content: Vec<u8>,
        content_location: String,
        content_type: Option<String>,
        dest: PathBuf,
    ) -> Self {
        Self {
            root_content,
            content_location,
            content_type,
            dest,
            files: BTreeMap::new(),
            boundary: format!("---=_qute-{}", Uuid::new_v4()),
        }
    }

    pub fn suggested_ext(&self) -> &'static str {
        ".mht"
    }

    /// Identity: MHTML is content-addressed by the original URLs.
    pub fn rewrite_url(&mut self, url: &Url, _base: Option<&Url>) -> String {
        url.to_string()
    }

    pub fn add_file(&mut self, location: &Url, content: Vec<u8>, content_type: Option<String>) {
        let transfer_encoding = match &content_type {
            Some(ct) if ct.starts_with("text/") => TransferEncoding::QuotedPrintable,
            _ => TransferEncoding::Base64,
        };
        self.files.insert(
            location.to_string(),
            AssetFile {
                content,
                content_type,
                content_location: location.to_string(),
                transfer_encoding,
            },
        );
    }

    pub fn remove_file(&mut self, location: &Url) {
        self.files.remove(location.as_str());
    }

    pub fn write(&self) -> Result<(), ArchiveError> {
        let mut out = Vec::new();

        out.extend_from_slice(b"MIME-Version: 1.0\r\n");
        out.extend_from_slice(
            format!(
                "Content-Type: multipart/related;\r\n\tboundary=\"{}\"\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        out.extend_from_slice(b"\r\n");

        let root = AssetFile {
            content: self.root_content.clone(),
            content_type: self.content_type.clone(),
            content_location: self.content_location.clone(),
            transfer_encoding: TransferEncoding::QuotedPrintable,
        };
        self.write_part(&mut out, &root)?;

        for file in self.files.values() {
            self.write_part(&mut out, file)?;
        }

        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        fs::create_dir_all(self.dest.parent().unwrap_or_else(|| std::path::Path::new(".")))
            .map_err(|e| ArchiveError::io(self.dest.display().to_string(), e))?;
        fs::write(&self.dest, out).map_err(|e| ArchiveError::io(self.dest.display().to_string(), e))
    }

    fn write_part(&self, out: &mut Vec<u8>, file: &AssetFile) -> Result<(), ArchiveError> {
        require_ascii("content_location", &file.content_location)?;
        if let Some(ct) = &file.content_type {
            require_ascii("content_type", ct)?;
        }

        out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        out.extend_from_slice(format!("Content-Location: {}\r\n", file.content_location).as_bytes());
        out.extend_from_slice(b"MIME-Version: 1.0\r\n");
        if let Some(ct) = &file.content_type {
            out.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        let encoding_name = match file.transfer_encoding {
            TransferEncoding::Base64 => "base64",
            TransferEncoding::QuotedPrintable => "quoted-printable",
        };
        out.extend_from_slice(format!("Content-Transfer-Encoding: {encoding_name}\r\n").as_bytes());
        out.extend_from_slice(b"\r\n");

        let payload = match file.transfer_encoding {
            TransferEncoding::Base64 => encode_base64_wrapped(&file.content),
            TransferEncoding::QuotedPrintable => encode_quoted_printable(&file.content),
        };
        out.extend_from_slice(&payload);
        out.extend_from_slice(b"\r\n");
        Ok(())
    }
}

fn require_ascii(field: &'static str, value: &str) -> Result<(), ArchiveError> {
    if value.is_ascii() {
        Ok(())
    } else {
        Err(ArchiveError::encoding(field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn temp_dest(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pagearchive-mhtml-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_rewrite_url_is_identity() {
        let mut writer = MhtmlWriter::new(
            b"root".to_vec(),
            "http://example.com/".into(),
            None,
            PathBuf::from("/tmp/out.mht"),
        );
        let url = Url::parse("http://example.com/style.css").unwrap();
        assert_eq!(writer.rewrite_url(&url, None), url.to_string());
    }

    #[test]
    fn test_files_sorted_by_content_location() {
        let dest = temp_dest("sorted");
        let mut writer = MhtmlWriter::new(
            b"root".to_vec(),
            "http://www.example.com/".into(),
            Some("text/html".into()),
            dest.clone(),
        );
        for sub in ["a", "h", "g", "b", "i", "z", "t"] {
            let url = Url::parse(&format!("http://{sub}.example.com/")).unwrap();
            writer.add_file(&url, b"x".to_vec(), Some("text/plain".into()));
        }
        writer.write().unwrap();
        let content = String::from_utf8(fs::read(&dest).unwrap()).unwrap();
        let locations: Vec<&str> = content
            .lines()
            .filter_map(|l| l.strip_prefix("Content-Location: "))
            .collect();
        assert_eq!(
            locations,
            vec![
                "http://www.example.com/",
                "http://a.example.com/",
                "http://b.example.com/",
                "http://g.example.com/",
                "http://h.example.com/",
                "http://i.example.com/",
                "http://t.example.com/",
                "http://z.example.com/",
            ]
        );
        fs::remove_file(&dest).ok();
    }

    #[test]
    fn test_base64_part_for_image() {
        let dest = temp_dest("base64");
        let mut writer = MhtmlWriter::new(b"root".to_vec(), "http://e/".into(), None, dest.clone());
        let url = Url::parse("http://e/image.png").unwrap();
        writer.add_file(&url, "😁 image data".as_bytes().to_vec(), Some("image/png".into()));
        writer.write().unwrap();
        let content = String::from_utf8(fs::read(&dest).unwrap()).unwrap();
        assert!(content.contains("Content-Transfer-Encoding: base64"));
        assert!(content.contains("8J+YgSBpbWFnZSBkYXRh"));
        fs::remove_file(&dest).ok();
    }

    #[test]
    fn test_non_ascii_content_location_errors() {
        let dest = temp_dest("ascii");
        let mut writer = MhtmlWriter::new(b"root".to_vec(), "http://e/".into(), None, dest);
        let url = Url::parse("http://e/%C3%A9.png").unwrap();
        // percent-decoded form would contain non-ASCII if we stored it
        // directly; force the scenario by writing a raw non-ASCII location.
        writer.files.insert(
            "héllo".into(),
            AssetFile {
                content: vec![],
                content_type: None,
                content_location: "héllo".into(),
                transfer_encoding: TransferEncoding::Base64,
            },
        );
        let _ = url;
        assert!(writer.write().is_err());
    }

    #[test]
    fn test_lines_wrap_under_76_columns() {
        let dest = temp_dest("wrap");
        let mut writer = MhtmlWriter::new(b"root".to_vec(), "http://e/".into(), None, dest.clone());
        let url = Url::parse("http://e/big.bin").unwrap();
        writer.add_file(&url, vec![0xFFu8; 1000], Some("application/octet-stream".into()));
        writer.write().unwrap();
        let content = fs::read(&dest).unwrap();
        for line in content.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            assert!(line.len() <= 76, "line too long: {} bytes", line.len());
        }
        fs::remove_file(&dest).ok();
    }

    #[test]
    fn test_remove_file() {
        let mut writer = MhtmlWriter::new(b"root".to_vec(), "http://e/".into(), None, Path::new("/tmp/x").into());
        let url = Url::parse("http://e/accidental.css").unwrap();
        writer.add_file(&url, b"nope".to_vec(), Some("text/css".into()));
        assert_eq!(writer.files.len(), 1);
        writer.remove_file(&url);
        assert!(writer.files.is_empty());
    }
}
