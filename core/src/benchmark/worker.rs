//! benchmark/worker.rs
//! One compression attempt per codec, fanned out on threads and gathered
//! over a crossbeam channel.
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use tracing::warn;

use crate::compression::{Codec, CodecOptions, CompressionError, CompressionResult};

/// Codec to attempt, with its registration position for tie-breaks.
#[derive(Clone)]
pub struct Job {
    pub position: usize,
    pub name: String,
    pub codec: Arc<dyn Codec>,
}

#[derive(Debug)]
pub struct Attempt {
    pub position: usize,
    pub name: String,
    pub outcome: Result<CompressionResult, CompressionError>,
}

/// Everything gathered from one fan-out.
#[derive(Debug, Default)]
pub struct FanOut {
    pub attempts: Vec<Attempt>,
    /// Jobs that had not reported when the deadline passed.
    pub timed_out: usize,
}

/// Run one attempt. A panicking codec counts as a failed attempt.
pub fn run_attempt(job: &Job, data: &[u8], options: &CodecOptions) -> Attempt {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.codec.compress(data, options)))
        .unwrap_or_else(|_| {
            Err(CompressionError::CodecProcessFailed { codec: job.name.clone(), msg: "codec panicked".into() })
        })
        .map(|mut result| {
            result.algorithm = job.name.clone();
            result
        });
    if let Err(e) = &outcome {
        warn!(codec = %job.name, error = %e, "codec attempt failed");
    }
    Attempt { position: job.position, name: job.name.clone(), outcome }
}

fn send(tx: &Sender<Attempt>, attempt: Attempt) {
    // The receiver is gone once the gather point has given up.
    let _ = tx.send(attempt);
}

/// Run every job concurrently and wait for all of them.
pub fn fan_out(jobs: &[Job], data: &[u8]) -> FanOut {
    let (tx, rx) = channel::bounded(jobs.len());
    thread::scope(|scope| {
        for job in jobs {
            let tx = tx.clone();
            scope.spawn(move || send(&tx, run_attempt(job, data, &CodecOptions::default())));
        }
    });
    drop(tx);
    FanOut { attempts: rx.iter().collect(), timed_out: 0 }
}

/// Run every job on detached threads and gather until `timeout` elapses.
/// Results arriving after the deadline are dropped.
pub fn fan_out_with_deadline(jobs: &[Job], data: Arc<[u8]>, timeout: Duration) -> FanOut {
    let (tx, rx) = channel::bounded(jobs.len());
    for job in jobs.iter().cloned() {
        let tx = tx.clone();
        let data = data.clone();
        thread::spawn(move || send(&tx, run_attempt(&job, &data, &CodecOptions::default())));
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let mut out = FanOut::default();
    while out.attempts.len() < jobs.len() {
        match rx.recv_deadline(deadline) {
            Ok(attempt) => out.attempts.push(attempt),
            Err(RecvTimeoutError::Timeout) => {
                out.timed_out = jobs.len() - out.attempts.len();
                warn!(pending = out.timed_out, timeout_ms = timeout.as_millis() as u64, "benchmark deadline passed");
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::codecs::{Lz4Codec, StoreCodec};
    use crate::compression::AlgorithmCapabilities;

    struct Sleepy {
        caps: AlgorithmCapabilities,
        delay: Duration,
    }

    impl Codec for Sleepy {
        fn capabilities(&self) -> &AlgorithmCapabilities {
            &self.caps
        }
        fn compress_chunk(&self, input: &[u8], _: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
            thread::sleep(self.delay);
            out.extend_from_slice(input);
            Ok(())
        }
        fn decompress_chunk(&self, input: &[u8], _: &CodecOptions, out: &mut Vec<u8>) -> Result<(), CompressionError> {
            out.extend_from_slice(input);
            Ok(())
        }
    }

    fn sleepy(delay_ms: u64) -> Arc<dyn Codec> {
        let mut caps = StoreCodec::new().capabilities().clone();
        caps.name = "sleepy".into();
        Arc::new(Sleepy { caps, delay: Duration::from_millis(delay_ms) })
    }

    fn job(position: usize, name: &str, codec: Arc<dyn Codec>) -> Job {
        Job { position, name: name.into(), codec }
    }

    #[test]
    fn fan_out_collects_every_attempt() {
        let jobs = vec![job(0, "lz4", Arc::new(Lz4Codec::new())), job(1, "store", Arc::new(StoreCodec::new()))];
        let out = fan_out(&jobs, b"hello hello hello hello");
        assert_eq!(out.attempts.len(), 2);
        assert!(out.attempts.iter().all(|a| a.outcome.is_ok()));
    }

    #[test]
    fn deadline_drops_slow_attempts() {
        let jobs = vec![job(0, "store", Arc::new(StoreCodec::new())), job(1, "sleepy", sleepy(2_000))];
        let out = fan_out_with_deadline(&jobs, Arc::from(&b"payload"[..]), Duration::from_millis(300));
        assert_eq!(out.attempts.len(), 1);
        assert_eq!(out.attempts[0].name, "store");
        assert_eq!(out.timed_out, 1);
    }
}
