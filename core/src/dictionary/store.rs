//! dictionary/store.rs
//! Versioned, namespace-scoped dictionary storage.
//!
//! Each namespace holds an append-only list of versions, oldest first. Only
//! the newest `retain` versions are kept; evicted versions are dropped from
//! memory and disk. With a root directory every version is written as
//! `<root>/<namespace>/<version>.dict` plus `<version>.meta.json`.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, warn};

use crate::dictionary::types::{check_size, validate_namespace, Dictionary, DictionaryError, DictionaryMetadata};
use crate::utils::{lock, now_millis, sha256_hex};

const DICT_EXT: &str = "dict";
const META_SUFFIX: &str = ".meta.json";

pub struct DictionaryStore {
    root: Option<PathBuf>,
    retain: usize,
    versions: Mutex<HashMap<String, Vec<Arc<Dictionary>>>>,
    build_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DictionaryStore {
    /// In-memory store.
    pub fn new(retain: usize) -> Self {
        Self {
            root: None,
            retain: retain.max(1),
            versions: Mutex::new(HashMap::new()),
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Disk-backed store. Existing versions under `root` are loaded; entries
    /// that fail to parse or verify are skipped with a warning.
    pub fn open(root: impl Into<PathBuf>, retain: usize) -> Result<Self, DictionaryError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let mut store = Self::new(retain);

        let mut loaded = HashMap::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(namespace) = entry.file_name().to_str().map(str::to_owned) else { continue };
            if validate_namespace(&namespace).is_err() {
                continue;
            }
            let mut list = load_namespace(&entry.path(), &namespace)?;
            list.sort_by_key(|d| d.version);
            let excess = list.len().saturating_sub(store.retain);
            list.drain(..excess);
            if !list.is_empty() {
                loaded.insert(namespace, list);
            }
        }

        let count: usize = loaded.values().map(Vec::len).sum();
        info!(root = %root.display(), namespaces = loaded.len(), versions = count, "dictionary store opened");
        store.versions = Mutex::new(loaded);
        store.root = Some(root);
        Ok(store)
    }

    /// Lock serializing builds for one namespace.
    pub fn build_lock(&self, namespace: &str) -> Result<Arc<Mutex<()>>, DictionaryError> {
        validate_namespace(namespace)?;
        let mut locks = lock(&self.build_locks);
        Ok(locks.entry(namespace.to_owned()).or_default().clone())
    }

    /// Store `bytes` as the next version of `namespace`.
    pub fn insert(
        &self,
        namespace: &str,
        bytes: Vec<u8>,
        pattern_count: usize,
        training_sample_count: usize,
    ) -> Result<Arc<Dictionary>, DictionaryError> {
        validate_namespace(namespace)?;
        check_size(&bytes)?;

        let mut versions = lock(&self.versions);
        let list = versions.entry(namespace.to_owned()).or_default();
        let version = match list.last() {
            Some(prev) => now_millis().max(prev.version + 1),
            None => now_millis(),
        };

        let dictionary = Arc::new(Dictionary {
            namespace: namespace.to_owned(),
            version,
            checksum: sha256_hex(&bytes),
            bytes,
            created_at: Utc::now(),
            pattern_count,
            training_sample_count,
        });

        if let Some(root) = &self.root {
            persist(root, &dictionary)?;
        }
        list.push(dictionary.clone());

        let excess = list.len().saturating_sub(self.retain);
        for evicted in list.drain(..excess) {
            if let Some(root) = &self.root {
                if let Err(e) = remove(root, &evicted) {
                    warn!(namespace, version = evicted.version, error = %e, "failed to remove evicted dictionary");
                }
            }
            info!(namespace, version = evicted.version, "dictionary version evicted");
        }
        Ok(dictionary)
    }

    pub fn current(&self, namespace: &str) -> Option<Arc<Dictionary>> {
        lock(&self.versions).get(namespace).and_then(|l| l.last().cloned())
    }

    pub fn get(&self, namespace: &str, version: u64) -> Result<Arc<Dictionary>, DictionaryError> {
        lock(&self.versions)
            .get(namespace)
            .and_then(|l| l.iter().find(|d| d.version == version).cloned())
            .ok_or_else(|| DictionaryError::NotFound { namespace: namespace.to_owned(), version: Some(version) })
    }

    /// Known versions, most recent last.
    pub fn get_dictionary_versions(&self, namespace: &str) -> Vec<u64> {
        lock(&self.versions)
            .get(namespace)
            .map(|l| l.iter().map(|d| d.version).collect())
            .unwrap_or_default()
    }

    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.versions).keys().cloned().collect();
        names.sort();
        names
    }
}

fn paths(root: &Path, namespace: &str, version: u64) -> (PathBuf, PathBuf) {
    let dir = root.join(namespace);
    (dir.join(format!("{version}.{DICT_EXT}")), dir.join(format!("{version}{META_SUFFIX}")))
}

fn persist(root: &Path, dictionary: &Dictionary) -> Result<(), DictionaryError> {
    let (dict_path, meta_path) = paths(root, &dictionary.namespace, dictionary.version);
    if let Some(dir) = dict_path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&dict_path, &dictionary.bytes)?;
    fs::write(&meta_path, serde_json::to_vec_pretty(&dictionary.metadata())?)?;
    Ok(())
}

fn remove(root: &Path, dictionary: &Dictionary) -> std::io::Result<()> {
    let (dict_path, meta_path) = paths(root, &dictionary.namespace, dictionary.version);
    fs::remove_file(dict_path)?;
    fs::remove_file(meta_path)
}

fn load_namespace(dir: &Path, namespace: &str) -> Result<Vec<Arc<Dictionary>>, DictionaryError> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        let Some(stem) = name.strip_suffix(META_SUFFIX) else { continue };
        let Ok(version) = stem.parse::<u64>() else { continue };

        match load_version(dir, namespace, version, &path) {
            Ok(d) => out.push(Arc::new(d)),
            Err(e) => warn!(namespace, version, error = %e, "skipping unreadable dictionary"),
        }
    }
    Ok(out)
}

fn load_version(dir: &Path, namespace: &str, version: u64, meta_path: &Path) -> Result<Dictionary, String> {
    let meta: DictionaryMetadata = serde_json::from_slice(&fs::read(meta_path).map_err(|e| e.to_string())?)
        .map_err(|e| e.to_string())?;
    if meta.namespace != namespace || meta.version != version {
        return Err("metadata does not match its location".into());
    }
    let bytes = fs::read(dir.join(format!("{version}.{DICT_EXT}"))).map_err(|e| e.to_string())?;
    check_size(&bytes).map_err(|e| e.to_string())?;
    if sha256_hex(&bytes) != meta.checksum || bytes.len() != meta.size_bytes {
        return Err("checksum mismatch".into());
    }
    Ok(Dictionary::from_parts(meta, bytes))
}
