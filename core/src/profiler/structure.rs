//! Structural shape and coarse type classification.
use std::collections::HashSet;

use serde_json::Value;

use crate::profiler::types::{CoarseType, Payload, Structure};

const REPETITIVE_ARRAY_MIN_LEN: usize = 10;
const REPETITIVE_ARRAY_MAX_UNIQUE: f64 = 0.3;
const REPETITIVE_OBJECT_MIN_LEN: usize = 5;
const REPETITIVE_OBJECT_MAX_UNIQUE: f64 = 0.4;
const TEXT_LETTER_RATIO: f64 = 0.6;
const NUMBER_DIGIT_RATIO: f64 = 0.4;

pub fn detect_structure(payload: &Payload) -> Structure {
    match payload {
        Payload::Structured(value) => structure_of(value),
        Payload::Text(_) | Payload::Binary(_) => Structure::Flat,
    }
}

fn structure_of(value: &Value) -> Structure {
    match value {
        Value::Array(items) if is_repetitive_array(items) => Structure::Repetitive,
        Value::Array(_) => Structure::Array,
        Value::Object(map) => {
            // A wrapper object around a repetitive collection ({"users": [...]})
            // is as repetitive as the collection itself.
            let wraps_repetitive = map
                .values()
                .any(|v| matches!(v, Value::Array(items) if is_repetitive_array(items)));
            if wraps_repetitive {
                Structure::Repetitive
            } else if map.values().any(Value::is_object) {
                Structure::Nested
            } else if map.len() > REPETITIVE_OBJECT_MIN_LEN
                && unique_ratio(map.values()) < REPETITIVE_OBJECT_MAX_UNIQUE
            {
                Structure::Repetitive
            } else {
                Structure::Flat
            }
        }
        _ => Structure::Flat,
    }
}

fn is_repetitive_array(items: &[Value]) -> bool {
    items.len() > REPETITIVE_ARRAY_MIN_LEN && unique_ratio(items.iter()) < REPETITIVE_ARRAY_MAX_UNIQUE
}

/// Distinct serialized values / total values.
fn unique_ratio<'a>(values: impl Iterator<Item = &'a Value>) -> f64 {
    let mut total = 0usize;
    let mut unique = HashSet::new();
    for v in values {
        total += 1;
        unique.insert(v.to_string());
    }
    if total == 0 {
        1.0
    } else {
        unique.len() as f64 / total as f64
    }
}

pub fn detect_coarse_type(payload: &Payload, canonical: &[u8]) -> CoarseType {
    match payload {
        Payload::Structured(Value::String(_)) | Payload::Text(_) => CoarseType::Text,
        Payload::Structured(Value::Number(_)) => CoarseType::Number,
        Payload::Binary(_) => CoarseType::Binary,
        Payload::Structured(_) => classify_serialized(canonical),
    }
}

fn classify_serialized(canonical: &[u8]) -> CoarseType {
    let text = String::from_utf8_lossy(canonical);
    let mut total = 0usize;
    let mut letters = 0usize;
    let mut digits = 0usize;
    for c in text.chars() {
        total += 1;
        if c.is_alphabetic() {
            letters += 1;
        } else if c.is_ascii_digit() {
            digits += 1;
        }
    }
    if total == 0 {
        return CoarseType::Mixed;
    }

    let total = total as f64;
    if letters as f64 / total > TEXT_LETTER_RATIO {
        CoarseType::Text
    } else if digits as f64 / total > NUMBER_DIGIT_RATIO {
        CoarseType::Number
    } else {
        CoarseType::Mixed
    }
}
