//! dictionary/types.rs
//! Dictionary records, their on-disk metadata and the layer's error type.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::DictionaryRef;
use crate::constants::MAX_DICTIONARY_SIZE;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("no mined patterns available for namespace '{namespace}'")]
    EmptyPatternSet { namespace: String },

    #[error("dictionary of {size} bytes exceeds the {max}-byte cap")]
    OversizeInvariantViolation { size: usize, max: usize },

    #[error("invalid dictionary namespace '{0}'")]
    InvalidNamespace(String),

    #[error("dictionary {namespace}@{version:?} not found")]
    NotFound { namespace: String, version: Option<u64> },

    #[error("dictionary I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dictionary metadata error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Non-empty, `[A-Za-z0-9_.-]` only, and not a relative path component.
pub fn validate_namespace(namespace: &str) -> Result<(), DictionaryError> {
    let ok = !namespace.is_empty()
        && namespace != "."
        && namespace != ".."
        && namespace.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'));
    if ok {
        Ok(())
    } else {
        Err(DictionaryError::InvalidNamespace(namespace.to_owned()))
    }
}

/// An immutable dictionary version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    pub namespace: String,
    pub version: u64,
    pub bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub pattern_count: usize,
    pub training_sample_count: usize,
    /// Hex SHA-256 of `bytes`.
    pub checksum: String,
}

impl Dictionary {
    pub fn reference(&self) -> DictionaryRef {
        DictionaryRef { namespace: self.namespace.clone(), version: self.version }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn metadata(&self) -> DictionaryMetadata {
        DictionaryMetadata {
            namespace: self.namespace.clone(),
            version: self.version,
            created: self.created_at,
            patterns_count: self.pattern_count,
            training_samples: self.training_sample_count,
            size_bytes: self.bytes.len(),
            checksum: self.checksum.clone(),
        }
    }

    pub fn from_parts(meta: DictionaryMetadata, bytes: Vec<u8>) -> Self {
        Self {
            namespace: meta.namespace,
            version: meta.version,
            bytes,
            created_at: meta.created,
            pattern_count: meta.patterns_count,
            training_sample_count: meta.training_samples,
            checksum: meta.checksum,
        }
    }
}

/// Sidecar record written next to the dictionary bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryMetadata {
    pub namespace: String,
    pub version: u64,
    pub created: DateTime<Utc>,
    pub patterns_count: usize,
    pub training_samples: usize,
    pub size_bytes: usize,
    pub checksum: String,
}

pub fn check_size(bytes: &[u8]) -> Result<(), DictionaryError> {
    if bytes.len() > MAX_DICTIONARY_SIZE {
        return Err(DictionaryError::OversizeInvariantViolation { size: bytes.len(), max: MAX_DICTIONARY_SIZE });
    }
    Ok(())
}
