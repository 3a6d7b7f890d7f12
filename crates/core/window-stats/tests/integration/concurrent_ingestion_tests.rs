//! Integration tests for concurrent ingestion scenarios

use chrono::{DateTime, TimeDelta, Utc};
use rstest::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Barrier};
use std::thread;
use window_stats::{IngestOutcome, ManualClock, StatisticsEngine, Transaction};

#[fixture]
fn shared_engine() -> Arc<StatisticsEngine> {
    let start = DateTime::parse_from_rfc3339("2024-01-01T12:00:00.900Z")
        .unwrap()
        .with_timezone(&Utc);
    Arc::new(StatisticsEngine::with_clock(Arc::new(ManualClock::new(start))))
}

#[rstest]
fn test_concurrent_same_second_ingestion(shared_engine: Arc<StatisticsEngine>) {
    let num_producers = 16;
    let trades_per_producer = 500;
    let amount = Decimal::from_str("0.01").unwrap();
    let timestamp = shared_engine.now() - TimeDelta::seconds(3);
    let barrier = Arc::new(Barrier::new(num_producers));

    let handles: Vec<_> = (0..num_producers)
        .map(|_| {
            let engine = Arc::clone(&shared_engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let tx = Transaction::new(amount, timestamp, engine.now()).unwrap();
                barrier.wait();
                (0..trades_per_producer)
                    .filter(|_| engine.ingest(&tx) == IngestOutcome::Accepted)
                    .count()
            })
        })
        .collect();

    let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let total = num_producers * trades_per_producer;
    assert_eq!(accepted, total);

    let stats = shared_engine.query();
    assert_eq!(stats.count, total as u64);
    assert_eq!(stats.sum, amount * Decimal::from(total));
    assert_eq!(shared_engine.bucket_count(), 1);
}

#[rstest]
fn test_concurrent_multi_second_ingestion(shared_engine: Arc<StatisticsEngine>) {
    let num_producers: i64 = 10;
    let per_producer: i64 = 200;

    let handles: Vec<_> = (0..num_producers)
        .map(|producer_id| {
            let engine = Arc::clone(&shared_engine);
            thread::spawn(move || {
                let now = engine.now();
                for i in 0..per_producer {
                    let age = TimeDelta::seconds((producer_id * 7 + i) % 60);
                    let tx = Transaction::new(Decimal::from(i - 100), now - age, now).unwrap();
                    engine.ingest(&tx);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = shared_engine.query();
    let expected_sum: i64 = num_producers * (0..per_producer).map(|i| i - 100).sum::<i64>();
    assert_eq!(stats.count, (num_producers * per_producer) as u64);
    assert_eq!(stats.sum, Decimal::from(expected_sum));
    assert_eq!(stats.max, Decimal::from(99));
    assert_eq!(stats.min, Decimal::from(-100));
    assert!(shared_engine.bucket_count() <= 60);
}

#[rstest]
fn test_queries_and_reset_during_ingestion(shared_engine: Arc<StatisticsEngine>) {
    let writer = {
        let engine = Arc::clone(&shared_engine);
        thread::spawn(move || {
            let now = engine.now();
            let tx = Transaction::new(Decimal::ONE, now - TimeDelta::seconds(1), now).unwrap();
            for _ in 0..5_000 {
                engine.ingest(&tx);
            }
        })
    };
    let reader = {
        let engine = Arc::clone(&shared_engine);
        thread::spawn(move || {
            for i in 0..200 {
                let stats = engine.query();
                // Every bucket holds amounts of exactly one
                assert_eq!(stats.sum, Decimal::from(stats.count));
                if i % 50 == 0 {
                    engine.reset();
                }
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    let stats = shared_engine.query();
    assert!(stats.count <= 5_000);
    assert_eq!(stats.sum, Decimal::from(stats.count));
}
