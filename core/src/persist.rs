use crate::build::BuildReport;
use crate::config::{IndexFormat, Normalizer};
use crate::error::{IndexError, Result};
use crate::index::{InvertedIndex, Postings, Term};
use bincode::Options;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Informational sidecar written next to the index after a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub num_docs: u32,
    pub indexed_docs: u32,
    pub skipped_docs: u32,
    pub num_terms: usize,
    pub normalizer: Normalizer,
    pub format: IndexFormat,
    pub created_at: String,
}

impl IndexMeta {
    pub fn new(report: &BuildReport, index: &InvertedIndex, normalizer: Normalizer, format: IndexFormat) -> Self {
        Self {
            num_docs: report.total_documents,
            indexed_docs: report.indexed_documents,
            skipped_docs: report.skipped.len() as u32,
            num_terms: index.num_terms(),
            normalizer,
            format,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "".into()),
        }
    }
}

/// Durable home of one inverted index file.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
    format: IndexFormat,
}

impl IndexStore {
    pub fn new<P: AsRef<Path>>(path: P, format: IndexFormat) -> Self {
        Self { path: path.as_ref().to_path_buf(), format }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn format(&self) -> IndexFormat { self.format }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn tmp_path(&self) -> PathBuf { self.sibling(".tmp") }

    pub fn meta_path(&self) -> PathBuf { self.sibling(".meta.json") }

    fn meta_tmp_path(&self) -> PathBuf { self.sibling(".meta.json.tmp") }

    /// Every file this store may create: the index, its sidecar and their temp files.
    pub fn owned_paths(&self) -> Vec<PathBuf> {
        vec![self.path.clone(), self.tmp_path(), self.meta_path(), self.meta_tmp_path()]
    }

    pub fn exists(&self) -> bool { self.path.is_file() }

    pub fn size_bytes(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(IndexError::unavailable(&self.path, e)),
            Err(e) => Err(e.into()),
        }
    }

    /// Serialize with terms (and document IDs within each term) in ascending order.
    pub fn encode(&self, index: &InvertedIndex) -> Result<Vec<u8>> {
        match self.format {
            IndexFormat::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
                index.serialize(&mut ser).map_err(|e| IndexError::Encode(e.to_string()))?;
                Ok(buf)
            }
            IndexFormat::Bincode => bincode_options().serialize(index).map_err(|e| IndexError::Encode(e.to_string())),
        }
    }

    /// Parse and validate persisted bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<InvertedIndex> {
        let parsed: StrictMap<StrictMap<f64>> = match self.format {
            IndexFormat::Json => serde_json::from_slice(bytes).map_err(|e| IndexError::corrupt(&self.path, e))?,
            IndexFormat::Bincode => bincode_options().deserialize(bytes).map_err(|e| IndexError::corrupt(&self.path, e))?,
        };
        let mut terms: BTreeMap<Term, Postings> = BTreeMap::new();
        for (term, postings) in parsed.0 {
            if postings.0.is_empty() {
                return Err(IndexError::corrupt(&self.path, format!("term `{term}` has no postings")));
            }
            if let Some((doc, w)) = postings.0.iter().find(|(_, w)| !w.is_finite()) {
                return Err(IndexError::corrupt(&self.path, format!("non-finite weight {w} for `{term}` in `{doc}`")));
            }
            terms.insert(term, postings.0);
        }
        Ok(InvertedIndex::from_terms(terms))
    }

    /// Atomically replace the index file. Returns the number of bytes written.
    pub fn save(&self, index: &InvertedIndex) -> Result<u64> {
        let bytes = self.encode(index)?;
        write_atomic(&self.path, &self.tmp_path(), &bytes)?;
        tracing::info!(path = %self.path.display(), format = %self.format, terms = index.num_terms(), bytes = bytes.len(), "saved index");
        Ok(bytes.len() as u64)
    }

    pub fn load(&self) -> Result<InvertedIndex> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(IndexError::unavailable(&self.path, e)),
            Err(e) => return Err(e.into()),
        };
        let index = self.decode(&bytes)?;
        tracing::info!(path = %self.path.display(), terms = index.num_terms(), bytes = bytes.len(), "loaded index");
        Ok(index)
    }

    pub fn save_meta(&self, meta: &IndexMeta) -> Result<()> {
        let json = serde_json::to_string_pretty(meta).map_err(|e| IndexError::Encode(e.to_string()))?;
        write_atomic(&self.meta_path(), &self.meta_tmp_path(), json.as_bytes())?;
        Ok(())
    }

    pub fn load_meta(&self) -> Result<IndexMeta> {
        let path = self.meta_path();
        let buf = fs::read_to_string(&path)?;
        serde_json::from_str(&buf).map_err(|e| IndexError::corrupt(path, e))
    }
}

/// Write `bytes` to `tmp`, sync, then rename over `path`. The temp file never outlives a failure.
fn write_atomic(path: &Path, tmp: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let res = write_and_rename(path, tmp, bytes);
    if res.is_err() {
        let _ = fs::remove_file(tmp);
    }
    res
}

fn write_and_rename(path: &Path, tmp: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut f = File::create(tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    drop(f);
    fs::rename(tmp, path)
}

// Fixed-width little-endian integers, trailing bytes rejected.
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// Map that refuses duplicate keys instead of silently keeping the last one.
struct StrictMap<V>(BTreeMap<String, V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for StrictMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StrictVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for StrictVisitor<V> {
            type Value = StrictMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with unique string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut out = BTreeMap::new();
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    if out.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    out.insert(key, value);
                }
                Ok(StrictMap(out))
            }
        }

        deserializer.deserialize_map(StrictVisitor(PhantomData))
    }
}
