// Pattern mining and versioned dictionaries:
// * an empty pattern set is an error, not an empty dictionary
// * the size cap holds for oversized pattern sets
// * versions are monotonic, bounded by retention and survive restarts
// * payloads referencing an evicted version cannot be decompressed

#[cfg(test)]
mod dictionary_tests {
    use tempfile::tempdir;

    use compress_core::config::EngineConfig;
    use compress_core::dictionary::{DictionaryError, PatternMiner};
    use compress_core::engine::CompressionEngine;
    use compress_core::profiler::Payload;
    use compress_core::types::EngineError;

    fn record(i: usize) -> Payload {
        Payload::Structured(serde_json::json!({
            "customer_id": i,
            "status": "shipped",
            "warehouse": "north_east",
            "carrier": "express_freight",
        }))
    }

    fn train(engine: &CompressionEngine, samples: usize) {
        for i in 0..samples {
            engine.add_sample(&record(i)).unwrap();
        }
        engine.flush_samples();
    }

    fn config_in(root: &std::path::Path) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.dictionary.root = Some(root.to_path_buf());
        config
    }

    #[test]
    fn empty_pattern_set_is_rejected() {
        let engine = CompressionEngine::new();
        let err = engine.build_dictionary("orders").unwrap_err();
        assert!(err.is_empty_pattern_set());
        assert!(engine.get_dictionary_versions("orders").is_empty());
    }

    #[test]
    fn invalid_namespace_is_rejected() {
        let engine = CompressionEngine::new();
        train(&engine, 20);
        for ns in ["", "..", "a/b", "with space"] {
            let err = engine.build_dictionary(ns).unwrap_err();
            assert!(matches!(err, EngineError::Dictionary(DictionaryError::InvalidNamespace(_))), "{ns:?}");
        }
    }

    #[test]
    fn miner_keeps_frequent_tokens_only() {
        let miner = PatternMiner::default();
        for _ in 0..6 {
            miner.add_sample(br#"{"frequent": "value", "ab": 1}"#);
        }
        miner.add_sample(b"rare_token");
        miner.flush();

        let top = miner.get_top_patterns(10);
        let texts: Vec<&str> = top.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["frequent", "value"]);
        assert!(top.iter().all(|p| p.frequency == 6 && (p.weight - 0.06).abs() < 1e-9));
    }

    #[test]
    fn oversized_pattern_sets_respect_the_cap() {
        let engine = CompressionEngine::new();
        // 1500 distinct tokens, each seen exactly six times.
        for j in 0..100 {
            let text: Vec<String> = (0..90).map(|k| format!("token{:04}", (j * 90 + k) % 1500)).collect();
            engine.add_sample(&Payload::Text(text.join(" "))).unwrap();
        }
        engine.flush_samples();
        assert_eq!(engine.get_statistics().mined_patterns, 1500);

        let dict = engine.build_dictionary("tokens").unwrap();
        assert!(dict.len() <= 120_000);
        assert!(!dict.is_empty());
        assert_eq!(dict.pattern_count, 1000);
        assert_eq!(dict.training_sample_count, 100);
    }

    #[test]
    fn versions_increase_and_are_bounded() {
        let engine = CompressionEngine::new();
        train(&engine, 20);
        let built: Vec<u64> = (0..7).map(|_| engine.build_dictionary("orders").unwrap().version).collect();
        assert!(built.windows(2).all(|w| w[0] < w[1]));

        let versions = engine.get_dictionary_versions("orders");
        assert_eq!(versions, built[2..]);
        assert_eq!(engine.current_dictionary("orders").unwrap().version, built[6]);
    }

    #[test]
    fn dictionary_compression_round_trips() {
        let engine = CompressionEngine::new();
        train(&engine, 50);
        let dict = engine.build_dictionary("orders").unwrap();

        let result = engine.compress_with_dictionary(&record(7), "orders").unwrap();
        let reference = result.dictionary_ref.clone().unwrap();
        assert_eq!(reference.namespace, "orders");
        assert_eq!(reference.version, dict.version);
        assert_eq!(result.algorithm, "zstd");

        let expected = serde_json::to_vec(&serde_json::json!({
            "customer_id": 7,
            "status": "shipped",
            "warehouse": "north_east",
            "carrier": "express_freight",
        }))
        .unwrap();
        assert_eq!(engine.decompress(&result).unwrap(), expected);
        assert_eq!(engine.get_statistics().telemetry.counters.dictionary_compressions, 1);
    }

    #[test]
    fn missing_namespace_has_no_dictionary() {
        let engine = CompressionEngine::new();
        let err = engine.compress_with_dictionary(&record(1), "nothing").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Dictionary(DictionaryError::NotFound { version: None, .. })
        ));
    }

    #[test]
    fn evicted_version_cannot_decompress() {
        let engine = CompressionEngine::new();
        train(&engine, 20);
        engine.build_dictionary("orders").unwrap();
        let old = engine.compress_with_dictionary(&record(1), "orders").unwrap();

        for _ in 0..5 {
            engine.build_dictionary("orders").unwrap();
        }
        let err = engine.decompress(&old).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Dictionary(DictionaryError::NotFound { version: Some(_), .. })
        ));
    }

    #[test]
    fn dictionaries_persist_across_engines() {
        let dir = tempdir().unwrap();
        let (versions, result) = {
            let engine = CompressionEngine::with_config(config_in(dir.path())).unwrap();
            train(&engine, 30);
            engine.build_dictionary("orders").unwrap();
            engine.build_dictionary("orders").unwrap();
            let result = engine.compress_with_dictionary(&record(3), "orders").unwrap();
            (engine.get_dictionary_versions("orders"), result)
        };

        let reopened = CompressionEngine::with_config(config_in(dir.path())).unwrap();
        assert_eq!(reopened.get_dictionary_versions("orders"), versions);
        assert!(reopened.decompress(&result).is_ok());
        assert_eq!(reopened.get_statistics().dictionary_namespaces, ["orders"]);
    }

    #[test]
    fn corrupted_dictionary_files_are_skipped() {
        let dir = tempdir().unwrap();
        let version = {
            let engine = CompressionEngine::with_config(config_in(dir.path())).unwrap();
            train(&engine, 30);
            engine.build_dictionary("orders").unwrap().version
        };

        let dict_path = dir.path().join("orders").join(format!("{version}.dict"));
        let mut bytes = std::fs::read(&dict_path).unwrap();
        bytes[0] ^= 0xFF;
        std::fs::write(&dict_path, bytes).unwrap();

        let reopened = CompressionEngine::with_config(config_in(dir.path())).unwrap();
        assert!(reopened.get_dictionary_versions("orders").is_empty());
    }
}
