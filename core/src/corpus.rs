//! The corpus as seen by the builder: a manifest of document IDs and a source that resolves them.

use crate::error::{IndexError, Result};
use crate::extract::{HtmlExtractor, TextExtractor};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub doc_id: String,
    /// Display value for results, typically the document's original URL.
    pub location: String,
}

/// Ordered document ID -> location mapping with unique IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    positions: HashMap<String, usize>,
}

impl Manifest {
    /// Keeps the first occurrence of a duplicated ID.
    pub fn from_entries<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut entries = Vec::new();
        let mut positions = HashMap::new();
        for (doc_id, location) in pairs {
            if positions.contains_key(&doc_id) {
                continue;
            }
            positions.insert(doc_id.clone(), entries.len());
            entries.push(ManifestEntry { doc_id, location });
        }
        Self { entries, positions }
    }

    /// Read a JSON object `{ "doc_id": "location", ... }`, preserving file order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| IndexError::manifest(path, e))?;
        let json: serde_json::Value =
            serde_json::from_reader(BufReader::new(f)).map_err(|e| IndexError::manifest(path, e))?;
        let obj = match json {
            serde_json::Value::Object(obj) => obj,
            _ => return Err(IndexError::manifest(path, "expected a JSON object")),
        };
        let mut pairs = Vec::with_capacity(obj.len());
        for (doc_id, v) in obj {
            let location = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            pairs.push((doc_id, location));
        }
        Ok(Self::from_entries(pairs))
    }

    /// Every regular file under `root`, keyed by its `/`-separated relative path, in sorted order.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::from_dir_excluding(root, &[])
    }

    /// Like [`Manifest::from_dir`], skipping the files in `exclude` (for example
    /// an index written inside the corpus). Unreadable entries are logged and skipped.
    pub fn from_dir_excluding<P: AsRef<Path>>(root: P, exclude: &[PathBuf]) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(IndexError::manifest(root, "not a directory"));
        }
        let excluded: HashSet<PathBuf> = exclude.iter().filter_map(|p| resolved(p)).collect();
        let mut pairs = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable corpus entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if resolved(entry.path()).is_some_and(|p| excluded.contains(&p)) {
                tracing::debug!(path = %entry.path().display(), "excluded from corpus walk");
                continue;
            }
            let rel = match entry.path().strip_prefix(root) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let id = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            pairs.push((id.clone(), id));
        }
        Ok(Self::from_entries(pairs))
    }

    pub fn get(&self, doc_id: &str) -> Option<&str> {
        self.positions.get(doc_id).map(|&i| self.entries[i].location.as_str())
    }

    pub fn entries(&self) -> &[ManifestEntry] { &self.entries }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// Canonical parent directory joined with the file name; the file itself need not exist.
fn resolved(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(fs::canonicalize(parent).ok()?.join(name))
}

/// Resolves a document ID to extracted plain text.
pub trait DocumentSource: Send + Sync {
    fn read(&self, doc_id: &str) -> Result<String>;
}

/// Documents stored as files under a root directory, named by their ID.
pub struct FsDocumentSource<E = HtmlExtractor> {
    root: PathBuf,
    extractor: E,
}

impl FsDocumentSource<HtmlExtractor> {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf(), extractor: HtmlExtractor }
    }
}

impl<E: TextExtractor> FsDocumentSource<E> {
    pub fn with_extractor<P: AsRef<Path>>(root: P, extractor: E) -> Self {
        Self { root: root.as_ref().to_path_buf(), extractor }
    }

    pub fn root(&self) -> &Path { &self.root }
}

impl<E: TextExtractor> DocumentSource for FsDocumentSource<E> {
    fn read(&self, doc_id: &str) -> Result<String> {
        let path = self.root.join(doc_id);
        let bytes = fs::read(&path).map_err(|e| IndexError::document_read(doc_id, e))?;
        let raw = String::from_utf8(bytes).map_err(|e| IndexError::document_read(doc_id, e))?;
        Ok(self.extractor.extract(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PlainTextExtractor;
    use tempfile::tempdir;

    #[test]
    fn manifest_keeps_file_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bookkeeping.json");
        fs::write(&path, r#"{"0/2": "b.example/2", "0/10": "a.example/10", "0/1": "c.example/1"}"#).unwrap();
        let m = Manifest::load(&path).unwrap();
        let ids: Vec<&str> = m.entries().iter().map(|e| e.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["0/2", "0/10", "0/1"]);
        assert_eq!(m.get("0/10"), Some("a.example/10"));
    }

    #[test]
    fn manifest_must_be_an_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(Manifest::load(&path), Err(IndexError::Manifest { .. })));
        assert!(matches!(Manifest::load(dir.path().join("nope.json")), Err(IndexError::Manifest { .. })));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let m = Manifest::from_entries(vec![
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
        ]);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("a"), Some("1"));
    }

    #[test]
    fn manifest_from_directory_walk() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("0")).unwrap();
        fs::write(dir.path().join("0/1"), "x").unwrap();
        fs::write(dir.path().join("0/0"), "y").unwrap();
        let m = Manifest::from_dir(dir.path()).unwrap();
        let ids: Vec<&str> = m.entries().iter().map(|e| e.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["0/0", "0/1"]);
    }

    #[test]
    fn directory_walk_skips_excluded_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "x").unwrap();
        fs::write(dir.path().join("inverted_index"), "{}").unwrap();
        let exclude = vec![dir.path().join("inverted_index"), dir.path().join("inverted_index.tmp")];
        let m = Manifest::from_dir_excluding(dir.path(), &exclude).unwrap();
        let ids: Vec<&str> = m.entries().iter().map(|e| e.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["a.html"]);
    }

    #[cfg(unix)]
    #[test]
    fn directory_walk_survives_dangling_links() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.html"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("broken")).unwrap();
        let m = Manifest::from_dir(dir.path()).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("a.html"), Some("a.html"));
    }

    #[test]
    fn fs_source_extracts_html_and_reports_bad_documents() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good"), "<p>hello</p>").unwrap();
        fs::write(dir.path().join("binary"), [0xff, 0xfe, 0x00]).unwrap();
        let src = FsDocumentSource::new(dir.path());
        assert_eq!(src.read("good").unwrap(), "hello");
        assert!(matches!(src.read("binary"), Err(IndexError::DocumentRead { .. })));
        assert!(matches!(src.read("missing"), Err(IndexError::DocumentRead { .. })));

        let plain = FsDocumentSource::with_extractor(dir.path(), PlainTextExtractor);
        assert_eq!(plain.read("good").unwrap(), "<p>hello</p>");
    }
}
