//! Image storage: where embedded DOCX images are written during conversion.
//!
//! The DOCX converter never touches the file system itself. It hands every
//! embedded image to an injected [`ImageStore`] and records the returned path
//! in the [`crate::model::ImageMap`]. Two stores ship with the crate:
//!
//! * [`TempImageStore`]: a `TempDir` owned by the conversion output; the
//!   images disappear when the output is dropped, after preview or delivery.
//! * [`DirImageStore`]: writes into a caller-owned directory and leaves the
//!   files in place.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// An image extracted from the document package.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedImage<'a> {
    /// MIME type, e.g. `image/png`.
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

impl EmbeddedImage<'_> {
    /// File extension derived from the MIME subtype (`image/jpeg` → `jpeg`,
    /// `image/svg+xml` → `svg`, `image/x-emf` → `emf`).
    pub fn extension(&self) -> &str {
        self.content_type
            .rsplit('/')
            .next()
            .and_then(|sub| sub.split('+').next())
            .map(|sub| sub.trim_start_matches("x-"))
            .filter(|ext| !ext.is_empty() && *ext != "octet-stream")
            .unwrap_or("bin")
    }
}

/// Capability invoked once per embedded image.
pub trait ImageStore {
    /// Persist `image` and return the path it can be read back from.
    fn save(&mut self, image: EmbeddedImage<'_>) -> io::Result<PathBuf>;
}

/// Writes `img_<n>.<ext>` files into a scoped temporary directory.
#[derive(Debug)]
pub struct TempImageStore {
    dir: TempDir,
    count: usize,
}

impl TempImageStore {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("docx2discord-").tempdir()?,
            count: 0,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl ImageStore for TempImageStore {
    fn save(&mut self, image: EmbeddedImage<'_>) -> io::Result<PathBuf> {
        let path = write_numbered(self.dir.path(), self.count, image)?;
        self.count += 1;
        Ok(path)
    }
}

/// Writes `img_<n>.<ext>` files into a directory the caller keeps.
///
/// Numbering continues after the highest `img_<n>` already present, and an
/// existing file is never overwritten.
#[derive(Debug)]
pub struct DirImageStore {
    dir: PathBuf,
    count: usize,
}

impl DirImageStore {
    /// Create the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let count = next_free_index(&dir)?;
        Ok(Self { dir, count })
    }
}

impl ImageStore for DirImageStore {
    fn save(&mut self, image: EmbeddedImage<'_>) -> io::Result<PathBuf> {
        loop {
            let n = self.count;
            self.count += 1;
            match write_numbered(&self.dir, n, image) {
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                other => return other,
            }
        }
    }
}

/// One past the highest `img_<n>.*` index in `dir`.
fn next_free_index(dir: &Path) -> io::Result<usize> {
    let mut next = 0;
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_prefix("img_"))
            .and_then(|n| n.split('.').next())
            .and_then(|n| n.parse::<usize>().ok());
        if let Some(i) = index {
            next = next.max(i + 1);
        }
    }
    Ok(next)
}

fn write_numbered(dir: &Path, n: usize, image: EmbeddedImage<'_>) -> io::Result<PathBuf> {
    let path = dir.join(format!("img_{n}.{}", image.extension()));
    let mut file = std::fs::OpenOptions::new().write(true).create_new(true).open(&path)?;
    file.write_all(image.bytes)?;
    debug!("Stored {} bytes of {} at {}", image.bytes.len(), image.content_type, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn test_extension() {
        let img = EmbeddedImage { content_type: "image/jpeg", bytes: &[] };
        assert_eq!(img.extension(), "jpeg");
        let img = EmbeddedImage { content_type: "image/svg+xml", bytes: &[] };
        assert_eq!(img.extension(), "svg");
        let img = EmbeddedImage { content_type: "image/x-emf", bytes: &[] };
        assert_eq!(img.extension(), "emf");
        let img = EmbeddedImage { content_type: "application/octet-stream", bytes: &[] };
        assert_eq!(img.extension(), "bin");
        let img = EmbeddedImage { content_type: "", bytes: &[] };
        assert_eq!(img.extension(), "bin");
    }

    #[test]
    fn test_temp_store_writes_and_cleans_up() {
        let mut store = TempImageStore::new().unwrap();
        let root = store.path().to_path_buf();
        let a = store.save(EmbeddedImage { content_type: "image/png", bytes: PNG }).unwrap();
        let b = store.save(EmbeddedImage { content_type: "image/gif", bytes: b"GIF89a" }).unwrap();
        assert_eq!(a.file_name().unwrap(), "img_0.png");
        assert_eq!(b.file_name().unwrap(), "img_1.gif");
        assert_eq!(std::fs::read(&a).unwrap(), PNG);
        drop(store);
        assert!(!root.exists(), "temp dir should be removed on drop");
    }

    #[test]
    fn test_dir_store_keeps_files() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested/images");
        let mut store = DirImageStore::new(&target).unwrap();
        let p = store.save(EmbeddedImage { content_type: "image/png", bytes: PNG }).unwrap();
        drop(store);
        assert!(p.exists());
        assert!(p.starts_with(&target));
    }

    #[test]
    fn test_dir_store_reuse_does_not_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let mut first = DirImageStore::new(tmp.path()).unwrap();
        let a = first.save(EmbeddedImage { content_type: "image/png", bytes: PNG }).unwrap();
        drop(first);

        let mut second = DirImageStore::new(tmp.path()).unwrap();
        let b = second.save(EmbeddedImage { content_type: "image/gif", bytes: b"GIF89a" }).unwrap();
        assert_eq!(a.file_name().unwrap(), "img_0.png");
        assert_eq!(b.file_name().unwrap(), "img_1.gif");
        assert_eq!(std::fs::read(&a).unwrap(), PNG);
        assert_eq!(std::fs::read(&b).unwrap(), b"GIF89a");
    }

    #[test]
    fn test_dir_store_skips_taken_names() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirImageStore::new(tmp.path()).unwrap();
        std::fs::write(tmp.path().join("img_0.png"), b"keep").unwrap();
        let p = store.save(EmbeddedImage { content_type: "image/png", bytes: PNG }).unwrap();
        assert_eq!(p.file_name().unwrap(), "img_1.png");
        assert_eq!(std::fs::read(tmp.path().join("img_0.png")).unwrap(), b"keep");
    }
}
