//! dictionary/miner.rs
//! Buffers serialized samples and mines frequent tokens in batches.
use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MinerConfig;
use crate::utils::lock;

/// A mined token. `weight = min(frequency / 100, 1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub text: String,
    pub frequency: u64,
    pub weight: f64,
}

#[derive(Default)]
struct TokenCount {
    frequency: u64,
    first_seen: u64,
}

#[derive(Default)]
struct MinerState {
    buffer: Vec<Vec<u8>>,
    counts: HashMap<String, TokenCount>,
    next_seen: u64,
    samples_seen: usize,
}

pub struct PatternMiner {
    config: MinerConfig,
    state: Mutex<MinerState>,
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | '"' | ':' | ',' | '(' | ')' | ';' | '\\')
}

impl PatternMiner {
    pub fn new(config: MinerConfig) -> Self {
        Self { config, state: Mutex::new(MinerState::default()) }
    }

    /// Append one serialized sample. Returns `true` if this sample filled the
    /// buffer and triggered an analysis pass.
    pub fn add_sample(&self, serialized: &[u8]) -> bool {
        let mut state = lock(&self.state);
        state.buffer.push(serialized.to_vec());
        state.samples_seen += 1;
        if state.buffer.len() >= self.config.buffer_size.max(1) {
            self.analyze(&mut state);
            true
        } else {
            false
        }
    }

    /// Run an analysis pass over whatever is buffered.
    pub fn flush(&self) {
        let mut state = lock(&self.state);
        if !state.buffer.is_empty() {
            self.analyze(&mut state);
        }
    }

    fn analyze(&self, state: &mut MinerState) {
        let buffer = std::mem::take(&mut state.buffer);
        for sample in &buffer {
            let text = String::from_utf8_lossy(sample);
            for token in text.split(is_separator).filter(|t| t.chars().count() > self.config.min_token_len) {
                let next = state.next_seen;
                let slot = state.counts.entry(token.to_owned()).or_insert_with(|| TokenCount {
                    frequency: 0,
                    first_seen: next,
                });
                if slot.frequency == 0 {
                    state.next_seen += 1;
                }
                slot.frequency += 1;
            }
        }
        let evicted = self.evict(state);
        debug!(samples = buffer.len(), distinct_tokens = state.counts.len(), evicted, "pattern analysis pass");
    }

    /// Trim the token map to `max_tracked_tokens`, dropping entries from the
    /// bottom of the ranking `get_top_patterns` uses. Returns how many went.
    fn evict(&self, state: &mut MinerState) -> usize {
        let cap = self.config.max_tracked_tokens.max(1);
        let before = state.counts.len();
        if before <= cap {
            return 0;
        }
        let mut ranked: Vec<(u64, u64)> = state.counts.values().map(|c| (c.frequency, c.first_seen)).collect();
        ranked.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let (floor, last_seen) = ranked[cap - 1];
        state
            .counts
            .retain(|_, c| c.frequency > floor || (c.frequency == floor && c.first_seen <= last_seen));
        before - state.counts.len()
    }

    /// The `n` most frequent patterns; ties keep first-seen order.
    pub fn get_top_patterns(&self, n: usize) -> Vec<Pattern> {
        let state = lock(&self.state);
        let mut kept: Vec<(&String, &TokenCount)> = state
            .counts
            .iter()
            .filter(|(_, c)| c.frequency > self.config.min_frequency)
            .collect();
        kept.sort_by(|a, b| b.1.frequency.cmp(&a.1.frequency).then(a.1.first_seen.cmp(&b.1.first_seen)));
        kept.into_iter()
            .take(n)
            .map(|(text, c)| Pattern {
                text: text.clone(),
                frequency: c.frequency,
                weight: (c.frequency as f64 / 100.0).min(1.0),
            })
            .collect()
    }

    pub fn pattern_count(&self) -> usize {
        let state = lock(&self.state);
        state.counts.values().filter(|c| c.frequency > self.config.min_frequency).count()
    }

    pub fn buffered(&self) -> usize {
        lock(&self.state).buffer.len()
    }

    pub fn samples_seen(&self) -> usize {
        lock(&self.state).samples_seen
    }

    /// Distinct tokens currently counted, qualifying or not.
    pub fn tracked_tokens(&self) -> usize {
        lock(&self.state).counts.len()
    }
}

impl Default for PatternMiner {
    fn default() -> Self {
        Self::new(MinerConfig::default())
    }
}
