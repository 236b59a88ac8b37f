//! Shannon entropy of a byte sequence, normalized to [0, 1].

use crate::utils::unit_clamp;

/// Entropy in bits per byte divided by log2(256). Empty input is 0.
pub fn normalized_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut histogram = [0u64; 256];
    for &byte in data {
        histogram[byte as usize] += 1;
    }

    // H(X) = -sum(p(x) * log2(p(x)))
    let total = data.len() as f64;
    let mut entropy = 0.0;
    for &count in &histogram {
        if count > 0 {
            let p = count as f64 / total;
            entropy -= p * p.log2();
        }
    }

    unit_clamp(entropy / 8.0)
}
