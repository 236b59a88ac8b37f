#[cfg(test)]
mod telemetry_snapshot_tests {
    use std::time::Duration;

    use compress_core::telemetry::{Stage, StageTimes, Telemetry, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    fn make_counters() -> TelemetryCounters {
        let mut c = TelemetryCounters::default();
        c.add_compression(1_000, 250);
        c.add_direct();
        c.add_compression(500, 500);
        c.add_benchmarked();
        c.add_codec_failures(2);
        c
    }

    fn make_timer() -> TelemetryTimer {
        let mut timer = TelemetryTimer::new();
        std::thread::sleep(Duration::from_millis(20)); // ensure elapsed > stage times
        timer.add_stage_time(Stage::Profile, Duration::from_millis(5));
        timer.add_stage_time(Stage::Benchmark, Duration::from_millis(10));
        timer
    }

    #[test]
    fn ratio_is_aggregate_bytes_out_over_in() {
        let snapshot = TelemetrySnapshot::from(&make_counters(), &make_timer());
        assert!((snapshot.compression_ratio - 750.0 / 1_500.0).abs() < 1e-12);
        assert!(snapshot.throughput_bytes_per_sec > 0.0);
    }

    #[test]
    fn empty_counters_report_unit_ratio() {
        let snapshot = TelemetrySnapshot::from(&TelemetryCounters::default(), &TelemetryTimer::new());
        assert_eq!(snapshot.compression_ratio, 1.0);
        assert!(snapshot.sanity_check());
    }

    #[test]
    fn stage_times_accumulate_and_merge() {
        let mut a = StageTimes::default();
        a.add(Stage::Compress, Duration::from_millis(3));
        a.add(Stage::Compress, Duration::from_millis(4));

        let mut b = StageTimes::default();
        b.add(Stage::Compress, Duration::from_millis(1));
        b.add(Stage::Learn, Duration::from_millis(2));

        a.merge(&b);
        assert_eq!(a.get(Stage::Compress), Duration::from_millis(8));
        assert_eq!(a.total(), Duration::from_millis(10));
        assert!(a.has_all(&[Stage::Compress, Stage::Learn]));
        assert!(!a.has_all(&[Stage::Mine]));
        assert!((a.get_ms(Stage::Learn) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn counters_merge_field_by_field() {
        let mut total = make_counters();
        total += make_counters();
        assert_eq!(total.compressions, 4);
        assert_eq!(total.codec_failures, 4);
        assert_eq!(total.bytes_in, 3_000);
    }

    #[test]
    fn snapshot_passes_sanity_check() {
        let snapshot = TelemetrySnapshot::from(&make_counters(), &make_timer());
        assert!(snapshot.sanity_check());
        assert!(snapshot.has_all_stages(&[Stage::Profile, Stage::Benchmark]));
        assert_eq!(snapshot.total_stage_time(), Duration::from_millis(15));
    }

    #[test]
    fn overlapping_stage_time_is_not_a_failure() {
        let mut timer = TelemetryTimer::new();
        for _ in 0..4 {
            timer.add_stage_time(Stage::Compress, Duration::from_secs(5));
        }
        let mut counters = TelemetryCounters::default();
        counters.add_compression(100, 40);
        counters.add_benchmarked();

        let snapshot = TelemetrySnapshot::from(&counters, &timer);
        assert!(snapshot.total_stage_time() > snapshot.elapsed);
        assert!(snapshot.sanity_check());
    }

    #[test]
    fn unserved_compression_fails_sanity_check() {
        let mut counters = TelemetryCounters::default();
        counters.add_compression(100, 40);
        assert!(!TelemetrySnapshot::from(&counters, &TelemetryTimer::new()).sanity_check());
    }

    #[test]
    fn shared_sink_times_closures() {
        let telemetry = Telemetry::new();
        let out = telemetry.time(Stage::Mine, || {
            std::thread::sleep(Duration::from_millis(2));
            7
        });
        telemetry.update(|c| c.add_decompression());

        let snapshot = telemetry.snapshot();
        assert_eq!(out, 7);
        assert!(snapshot.stage_times.get(Stage::Mine) >= Duration::from_millis(2));
        assert_eq!(snapshot.counters.decompressions, 1);
    }

    #[test]
    fn stages_display_in_snake_case() {
        assert_eq!(Stage::DictionaryBuild.to_string(), "dictionary_build");
        assert_eq!(Stage::Profile.to_string(), "profile");
    }
}
