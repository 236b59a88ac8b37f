//! dictionary/builder.rs
//! Turns mined patterns into dictionary bytes.
//!
//! Steps:
//! 1. Synthesize representative samples from the patterns in three shapes
//!    (flat object, array, nested object).
//! 2. Count every byte window of 4 to 64 bytes across that corpus.
//! 3. Pack the windows seen more than twice, most frequent first, up to the
//!    target size. The 120,000-byte cap is checked before returning.
use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::DictionaryConfig;
use crate::constants::{
    MAX_DICTIONARY_SIZE, MAX_DICTIONARY_WINDOW, MIN_DICTIONARY_WINDOW, MIN_SUBSEQUENCE_OCCURRENCES,
    PATTERNS_PER_SAMPLE,
};
use crate::dictionary::miner::Pattern;
use crate::dictionary::types::{check_size, DictionaryError};

#[derive(Debug, Clone)]
pub struct BuiltDictionary {
    pub bytes: Vec<u8>,
    pub pattern_count: usize,
    pub training_sample_count: usize,
}

pub struct DictionaryBuilder {
    target_size: usize,
    max_patterns: usize,
    sample_count: usize,
}

impl DictionaryBuilder {
    pub fn new(config: &DictionaryConfig) -> Self {
        Self {
            target_size: config.target_size.min(MAX_DICTIONARY_SIZE),
            max_patterns: config.max_patterns,
            sample_count: config.synthetic_samples.max(1),
        }
    }

    pub fn build(&self, namespace: &str, patterns: &[Pattern]) -> Result<BuiltDictionary, DictionaryError> {
        let patterns = &patterns[..patterns.len().min(self.max_patterns)];
        if patterns.is_empty() {
            return Err(DictionaryError::EmptyPatternSet { namespace: namespace.to_owned() });
        }

        let samples = self.synthesize(patterns);
        let bytes = self.pack(&samples);
        check_size(&bytes)?;

        debug!(
            namespace,
            patterns = patterns.len(),
            samples = samples.len(),
            size = bytes.len(),
            "dictionary packed"
        );
        Ok(BuiltDictionary { bytes, pattern_count: patterns.len(), training_sample_count: samples.len() })
    }

    fn synthesize(&self, patterns: &[Pattern]) -> Vec<Vec<u8>> {
        let per_sample = PATTERNS_PER_SAMPLE.min(patterns.len());
        (0..self.sample_count)
            .map(|i| {
                let start = (i * per_sample) % patterns.len();
                let picked: Vec<&str> = (0..per_sample)
                    .map(|k| patterns[(start + k) % patterns.len()].text.as_str())
                    .collect();
                let value = match i % 3 {
                    0 => flat_sample(&picked),
                    1 => json!(picked),
                    _ => nested_sample(&picked),
                };
                serde_json::to_vec(&value).unwrap_or_default()
            })
            .collect()
    }

    fn pack(&self, samples: &[Vec<u8>]) -> Vec<u8> {
        // window -> (count, first position in corpus order)
        let mut counts: HashMap<&[u8], (u32, usize)> = HashMap::new();
        let mut order = 0usize;
        for sample in samples {
            for w in MIN_DICTIONARY_WINDOW..=MAX_DICTIONARY_WINDOW {
                for window in sample.windows(w) {
                    let slot = counts.entry(window).or_insert((0, order));
                    slot.0 += 1;
                    order += 1;
                }
            }
        }

        let mut candidates: Vec<(&[u8], u32, usize)> = counts
            .into_iter()
            .filter(|(_, (count, _))| *count > MIN_SUBSEQUENCE_OCCURRENCES)
            .map(|(w, (count, first))| (w, count, first))
            .collect();
        candidates.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then(b.0.len().cmp(&a.0.len()))
                .then(a.2.cmp(&b.2))
        });

        let mut chosen: Vec<&[u8]> = Vec::new();
        let mut seen: HashSet<&[u8]> = HashSet::new();
        let mut size = 0usize;
        for (window, _, _) in candidates {
            if size + window.len() > self.target_size {
                continue;
            }
            if seen.insert(window) {
                size += window.len();
                chosen.push(window);
            }
        }

        // Most frequent content ends up last, closest to the data.
        let mut out = Vec::with_capacity(size);
        for window in chosen.into_iter().rev() {
            out.extend_from_slice(window);
        }
        out
    }
}

fn flat_sample(picked: &[&str]) -> Value {
    let mut map = Map::new();
    for pair in picked.chunks(2) {
        let value = pair.get(1).copied().unwrap_or(pair[0]);
        map.insert(pair[0].to_owned(), Value::String(value.to_owned()));
    }
    Value::Object(map)
}

fn nested_sample(picked: &[&str]) -> Value {
    let items: Vec<Value> = picked
        .chunks(2)
        .map(|pair| json!({ "key": pair[0], "value": pair.get(1).copied().unwrap_or(pair[0]) }))
        .collect();
    json!({ "data": { "items": items } })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(text: &str, frequency: u64) -> Pattern {
        Pattern { text: text.into(), frequency, weight: (frequency as f64 / 100.0).min(1.0) }
    }

    #[test]
    fn empty_patterns_fail() {
        let builder = DictionaryBuilder::new(&DictionaryConfig::default());
        assert!(matches!(builder.build("ns", &[]), Err(DictionaryError::EmptyPatternSet { .. })));
    }

    #[test]
    fn single_pattern_builds_non_empty_dictionary() {
        let builder = DictionaryBuilder::new(&DictionaryConfig::default());
        let built = builder.build("ns", &[pattern("customer_name", 40)]).unwrap();
        assert!(!built.bytes.is_empty());
        assert_eq!(built.pattern_count, 1);
        assert_eq!(built.training_sample_count, 100);
        assert!(built.bytes.windows(4).any(|w| w == b"cust"));
    }

    #[test]
    fn pattern_list_is_truncated() {
        let config = DictionaryConfig { max_patterns: 3, ..DictionaryConfig::default() };
        let patterns: Vec<_> = (0..10).map(|i| pattern(&format!("token{i}"), 50)).collect();
        let built = DictionaryBuilder::new(&config).build("ns", &patterns).unwrap();
        assert_eq!(built.pattern_count, 3);
    }

    #[test]
    fn odd_length_windows_are_packed() {
        let builder = DictionaryBuilder::new(&DictionaryConfig::default());
        let out = builder.pack(&vec![b"abcde".to_vec(); 3]);
        assert_eq!(out, b"bcdeabcdabcde");

        let seven = builder.pack(&vec![b"status!".to_vec(); 3]);
        assert!(seven.ends_with(b"status!"));
    }
}
