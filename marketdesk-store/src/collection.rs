//! JSONL document collections.
//!
//! Each collection is one append-only file with one JSON document per line.
//! Keyed documents are indexed in memory by their unique key; the duplicate
//! check and the append happen under the collection mutex, so two concurrent
//! inserts of the same key cannot both succeed. Full listings are read back
//! from the file.
//!
//! A line is written with a single `write_all`. If the file does not end in a
//! newline (an earlier write was cut short), the next append starts on a
//! fresh line so only the torn line is lost.

use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A type stored in a [`Collection`].
pub trait Document: Serialize + DeserializeOwned + Clone + Send {
    /// Collection name; also the file stem (`{name}.jsonl`).
    const COLLECTION: &'static str;

    /// Value that must be unique across the collection, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

struct State<T> {
    index: HashMap<String, T>,
    count: usize,
    /// File does not end with a newline.
    torn_tail: bool,
}

/// File-backed collection of documents of one type.
pub struct Collection<T: Document> {
    path: PathBuf,
    state: Mutex<State<T>>,
}

impl<T: Document> Collection<T> {
    /// Open `{dir}/{COLLECTION}.jsonl`, creating the directory if needed.
    pub fn open_in(dir: &Path) -> StoreResult<Self> {
        Self::open(dir.join(format!("{}.jsonl", T::COLLECTION)))
    }

    /// Open a collection file. A missing file is an empty collection.
    ///
    /// Malformed lines are skipped with a warning.
    pub fn open(path: PathBuf) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut index = HashMap::new();
        let mut count = 0;
        for doc in read_documents::<T>(&path)? {
            if let Some(key) = doc.unique_key() {
                index.insert(key, doc);
            }
            count += 1;
        }
        let torn_tail = ends_without_newline(&path)?;
        if torn_tail {
            tracing::warn!(
                collection = T::COLLECTION,
                "file ends mid-line; next append starts a new line"
            );
        }

        tracing::debug!(collection = T::COLLECTION, documents = count, "collection opened");
        Ok(Self {
            path,
            state: Mutex::new(State {
                index,
                count,
                torn_tail,
            }),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State<T>>> {
        self.state
            .lock()
            .map_err(|_| StoreError::LockPoisoned(T::COLLECTION))
    }

    /// Append a document, enforcing the unique key if the type declares one.
    pub fn insert(&self, doc: T) -> StoreResult<()> {
        let mut state = self.lock()?;

        let key = doc.unique_key();
        if let Some(key) = &key {
            if state.index.contains_key(key) {
                return Err(StoreError::DuplicateKey {
                    collection: T::COLLECTION,
                    key: key.clone(),
                });
            }
        }

        let mut line = String::new();
        if state.torn_tail {
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(&doc)?);
        line.push('\n');

        if let Err(e) = append(&self.path, line.as_bytes()) {
            // Part of the line may have landed.
            state.torn_tail = true;
            return Err(e.into());
        }
        state.torn_tail = false;

        if let Some(key) = key {
            state.index.insert(key, doc);
        }
        state.count += 1;
        Ok(())
    }

    /// Look a document up by its unique key.
    pub fn find_by_key(&self, key: &str) -> StoreResult<Option<T>> {
        Ok(self.lock()?.index.get(key).cloned())
    }

    /// True if a document with this unique key exists.
    pub fn contains_key(&self, key: &str) -> StoreResult<bool> {
        Ok(self.lock()?.index.contains_key(key))
    }

    /// All documents in insertion order, read from the file.
    pub fn all(&self) -> StoreResult<Vec<T>> {
        let _state = self.lock()?;
        read_documents(&self.path)
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.count)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn append(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(bytes)?;
    file.flush()
}

fn ends_without_newline(path: &Path) -> io::Result<bool> {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn read_documents<T: Document>(path: &Path) -> StoreResult<Vec<T>> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut docs = Vec::new();
    for (line_no, line) in io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(doc) => docs.push(doc),
            Err(e) => tracing::warn!(
                collection = T::COLLECTION,
                line = line_no + 1,
                error = %e,
                "skipping malformed document"
            ),
        }
    }
    Ok(docs)
}
