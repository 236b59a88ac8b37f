// End-to-end engine behavior:
// * compress_optimal round-trips structured, text and binary payloads
// * tampered or unknown results are refused before decoding
// * counters and stage timers track every call
// * configuration loads from JSON files

#[cfg(test)]
mod engine_tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use rand::{rngs::StdRng, RngCore, SeedableRng};
    use serde_json::json;
    use tempfile::{tempdir, NamedTempFile};

    use compress_core::config::{ConfigError, EngineConfig};
    use compress_core::engine::CompressionEngine;
    use compress_core::profiler::Payload;
    use compress_core::telemetry::Stage;
    use compress_core::types::EngineError;

    fn payloads() -> Vec<Payload> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut noise = vec![0u8; 8 * 1024];
        rng.fill_bytes(&mut noise);

        let rows: Vec<_> = (0..200).map(|i| json!({"id": i, "kind": "event", "ok": i % 3 == 0})).collect();
        vec![
            Payload::Structured(json!({ "events": rows })),
            Payload::Structured(json!({"a": {"b": [1, 2, 3]}, "c": null})),
            Payload::Text("It was the best of times, it was the worst of times. ".repeat(200)),
            Payload::Text("short".into()),
            Payload::Binary(noise),
            Payload::Binary(vec![]),
        ]
    }

    #[test]
    fn optimal_compression_round_trips() {
        let engine = CompressionEngine::new();
        for payload in payloads() {
            let canonical = payload.canonicalize().unwrap().as_bytes().to_vec();
            let result = engine.compress_optimal(&payload).unwrap();

            assert_eq!(result.original_size, canonical.len() as u64);
            assert_eq!(result.compressed_size, result.payload.len() as u64);
            if result.original_size > 0 {
                let expected = result.compressed_size as f64 / result.original_size as f64;
                assert!((result.ratio - expected).abs() < 1e-12);
            }
            assert_eq!(engine.decompress(&result).unwrap(), canonical, "{}", result.algorithm);
        }
    }

    #[test]
    fn tampered_payload_is_a_checksum_mismatch() {
        let engine = CompressionEngine::new();
        let mut result = engine.compress_optimal(&Payload::Text("tamper ".repeat(100))).unwrap();
        let last = result.payload.len() - 1;
        result.payload[last] ^= 0x01;
        assert!(matches!(engine.decompress(&result), Err(EngineError::ChecksumMismatch { .. })));
    }

    #[test]
    fn wrong_original_size_is_a_round_trip_violation() {
        let engine = CompressionEngine::new();
        let mut result = engine.compress_optimal(&Payload::Text("sized ".repeat(100))).unwrap();
        result.original_size += 1;
        assert!(matches!(
            engine.decompress(&result),
            Err(EngineError::RoundTripViolation { expected: 601, actual: 600 })
        ));
    }

    #[test]
    fn unknown_algorithm_is_not_found() {
        let engine = CompressionEngine::new();
        let mut result = engine.compress_optimal(&Payload::Text("abc".into())).unwrap();
        result.algorithm = "brotli".into();
        assert!(matches!(engine.decompress(&result), Err(EngineError::AlgorithmNotFound(name)) if name == "brotli"));
    }

    #[test]
    fn results_survive_serialization() {
        let engine = CompressionEngine::new();
        let result = engine.compress_optimal(&Payload::Text("wire format ".repeat(40))).unwrap();
        let wire = serde_json::to_string(&result).unwrap();
        let back = serde_json::from_str(&wire).unwrap();
        assert_eq!(engine.decompress(&back).unwrap(), "wire format ".repeat(40).into_bytes());
    }

    #[test]
    fn counters_and_timers_track_calls() {
        let engine = CompressionEngine::new();
        let mut bytes_in = 0;
        for payload in payloads().into_iter().take(4) {
            let result = engine.compress_optimal(&payload).unwrap();
            bytes_in += result.original_size;
            engine.decompress(&result).unwrap();
        }

        let stats = engine.get_statistics();
        let c = &stats.telemetry.counters;
        assert_eq!(c.compressions, 4);
        assert_eq!(c.direct_selections + c.benchmarked_selections, 4);
        assert_eq!(c.decompressions, 4);
        assert_eq!(c.bytes_in, bytes_in);
        assert_eq!(stats.learner.total_samples, 4);
        assert_eq!(stats.algorithms, ["zstd", "lz4", "deflate", "store"]);
        assert!(stats.telemetry.stage_times.get(Stage::Profile) > Duration::ZERO);
        assert!(stats.telemetry.stage_times.get(Stage::Decompress) > Duration::ZERO);
        assert!(serde_json::to_value(&stats).is_ok());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = Arc::new(CompressionEngine::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let engine = engine.clone();
                thread::spawn(move || {
                    for i in 0..10 {
                        let payload = Payload::Text(format!("thread {t} item {i} ").repeat(20));
                        let result = engine.compress_optimal(&payload).unwrap();
                        assert_eq!(engine.decompress(&result).unwrap(), format!("thread {t} item {i} ").repeat(20).into_bytes());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(engine.get_statistics().learner.total_samples, 40);
    }

    #[test]
    fn config_loads_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"benchmark": {{"timeout_ms": 2000}}, "dictionary": {{"retain_versions": 2}}}}"#).unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.benchmark.timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.dictionary.retain_versions, 2);

        let engine = CompressionEngine::with_config(config).unwrap();
        let result = engine.compress_optimal(&Payload::Text("configured ".repeat(30))).unwrap();
        assert!(engine.decompress(&result).is_ok());
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = EngineConfig::default();
        config.dictionary.retain_versions = 0;
        assert!(matches!(
            CompressionEngine::with_config(config),
            Err(EngineError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn history_saves_to_configured_path() {
        let dir = tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.learner.snapshot_path = Some(dir.path().join("history.json"));

        let engine = CompressionEngine::with_config(config.clone()).unwrap();
        for i in 0..12 {
            engine.compress_optimal(&Payload::Text(format!("entry {i} ").repeat(5))).unwrap();
        }
        assert_eq!(engine.save_history().unwrap(), 12);

        let restored = CompressionEngine::with_config(config).unwrap();
        assert_eq!(restored.learner().len(), 12);
        assert!(restored.learner().current_model().is_none());
    }

    #[test]
    fn save_without_path_writes_nothing() {
        let engine = CompressionEngine::new();
        engine.compress_optimal(&Payload::Text("x".into())).unwrap();
        assert_eq!(engine.save_history().unwrap(), 0);
    }
}
