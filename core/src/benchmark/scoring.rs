//! benchmark/scoring.rs
//! Score benchmark results and pick a deterministic winner.
use crate::compression::CompressionResult;
use crate::constants::{RATIO_WEIGHT, SPEED_BUDGET_MS, SPEED_WEIGHT};

/// `0.7 * (1 - ratio) * 100 + 0.3 * max(0, 100 - duration_ms)`
pub fn score(ratio: f64, duration_ms: f64) -> f64 {
    RATIO_WEIGHT * (1.0 - ratio) * 100.0 + SPEED_WEIGHT * (SPEED_BUDGET_MS - duration_ms).max(0.0)
}

pub fn score_result(result: &CompressionResult) -> f64 {
    score(result.ratio, result.duration_ms())
}

/// A successful attempt tagged with its codec's registration position.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub position: usize,
    pub result: CompressionResult,
}

/// Highest score wins; equal scores go to the earlier registration.
/// Arrival order of `candidates` does not matter.
pub fn select_winner(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.into_iter().fold(None, |best: Option<(f64, Candidate)>, c| {
        let s = score_result(&c.result);
        match best {
            Some((bs, b)) if bs > s || (bs == s && b.position < c.position) => Some((bs, b)),
            _ => Some((s, c)),
        }
    })
    .map(|(_, c)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn candidate(position: usize, compressed: usize, ms: u64) -> Candidate {
        Candidate {
            position,
            result: CompressionResult::new("c", None, vec![0; compressed], 1000, Duration::from_millis(ms), None),
        }
    }

    #[test]
    fn reference_scores() {
        assert!((score(0.1, 50.0) - 78.0).abs() < 1e-9);
        assert!((score(0.5, 10.0) - 62.0).abs() < 1e-9);
    }

    #[test]
    fn slow_codecs_get_no_speed_credit() {
        assert!((score(0.0, 500.0) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn best_score_wins_regardless_of_arrival() {
        let winner = select_winner(vec![candidate(1, 500, 10), candidate(0, 100, 50)]).unwrap();
        assert_eq!(winner.position, 0);
    }

    #[test]
    fn ties_go_to_earlier_registration() {
        let winner = select_winner(vec![candidate(2, 300, 5), candidate(1, 300, 5)]).unwrap();
        assert_eq!(winner.position, 1);
    }

    #[test]
    fn empty_has_no_winner() {
        assert!(select_winner(vec![]).is_none());
    }
}
