//! profiler/types.rs
//! Caller input and the characteristics derived from it.
use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller input.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured document; canonical form is compact JSON.
    Structured(Value),
    /// Plain text; canonical form is its UTF-8 bytes.
    Text(String),
    /// Raw binary buffer; canonical form is the bytes themselves.
    Binary(Vec<u8>),
}

impl Payload {
    /// Canonical byte form used for measurement and as codec input.
    pub fn canonicalize(&self) -> Result<Canonical<'_>, serde_json::Error> {
        let bytes = match self {
            Payload::Structured(v) => Cow::Owned(serde_json::to_vec(v)?),
            Payload::Text(s) => Cow::Borrowed(s.as_bytes()),
            Payload::Binary(b) => Cow::Borrowed(b.as_slice()),
        };
        Ok(Canonical { payload: self, bytes })
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Structured(v)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_owned())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Binary(b)
    }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self {
        Payload::Binary(b.to_vec())
    }
}

/// A payload paired with its canonical bytes. Borrowed for text and binary.
pub struct Canonical<'a> {
    pub payload: &'a Payload,
    pub bytes: Cow<'a, [u8]>,
}

impl Canonical<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    Flat,
    Nested,
    Array,
    Repetitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoarseType {
    Text,
    Number,
    Binary,
    Mixed,
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Structure::Flat       => "flat",
            Structure::Nested     => "nested",
            Structure::Array      => "array",
            Structure::Repetitive => "repetitive",
        };
        f.write_str(name)
    }
}

impl fmt::Display for CoarseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoarseType::Text   => "text",
            CoarseType::Number => "number",
            CoarseType::Binary => "binary",
            CoarseType::Mixed  => "mixed",
        };
        f.write_str(name)
    }
}

/// Profiler output. Recomputed per call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCharacteristics {
    pub size_bytes: u64,
    /// Normalized Shannon entropy, [0, 1].
    pub entropy: f64,
    /// Fraction of scanned windows already seen, [0, 1].
    pub repetition: f64,
    pub structure: Structure,
    pub coarse_type: CoarseType,
    /// At most 50 repeated substrings, in discovery order.
    pub patterns: Vec<String>,
}

impl DataCharacteristics {
    pub fn features(&self) -> Features {
        Features {
            size_bytes: self.size_bytes,
            entropy: self.entropy,
            repetition: self.repetition,
            structure: self.structure,
            coarse_type: self.coarse_type,
        }
    }
}

/// The subset of characteristics that selection rules and history use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub size_bytes: u64,
    pub entropy: f64,
    pub repetition: f64,
    pub structure: Structure,
    pub coarse_type: CoarseType,
}

impl From<&DataCharacteristics> for Features {
    fn from(c: &DataCharacteristics) -> Self {
        c.features()
    }
}
