//! End-to-end window scenarios driven by a manual clock

use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use rstest::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use window_stats::{IngestOutcome, ManualClock, StatisticsEngine, Transaction};

const EMPTY_RESPONSE: &str = r#"{"sum":"0.00","avg":"0.00","max":"0.00","min":"0.00","count":0}"#;

struct Fixture {
    engine: StatisticsEngine,
    clock: Arc<ManualClock>,
}

impl Fixture {
    fn ingest(&self, amount: &str, age: TimeDelta) -> IngestOutcome {
        let now = self.engine.now();
        let tx = Transaction::new(Decimal::from_str(amount).unwrap(), now - age, now).unwrap();
        self.engine.ingest(&tx)
    }

    fn statistics_json(&self) -> String {
        serde_json::to_string(&self.engine.query()).unwrap()
    }
}

#[fixture]
fn fixture() -> Fixture {
    let start = DateTime::parse_from_rfc3339("2024-01-01T12:00:00.123Z")
        .unwrap()
        .with_timezone(&Utc);
    let clock = Arc::new(ManualClock::new(start));
    Fixture {
        engine: StatisticsEngine::with_clock(clock.clone()),
        clock,
    }
}

#[rstest]
fn test_add_transactions(fixture: Fixture) {
    let outcomes = [
        fixture.ingest("10.0", TimeDelta::seconds(5)),
        fixture.ingest("15.0", TimeDelta::seconds(5)),
        fixture.ingest("-5.0", TimeDelta::seconds(11)),
        fixture.ingest("20000.256525", TimeDelta::seconds(25)),
        fixture.ingest("2525.10101", TimeDelta::seconds(25)),
    ];
    assert!(outcomes.iter().all(|o| *o == IngestOutcome::Accepted));

    assert_eq!(
        fixture.statistics_json(),
        r#"{"sum":"22545.36","avg":"4509.07","max":"20000.26","min":"-5.00","count":5}"#
    );
}

#[rstest]
fn test_expiring_transaction(fixture: Fixture) {
    assert_eq!(
        fixture.ingest("12345.678", TimeDelta::seconds(55)),
        IngestOutcome::Accepted
    );
    assert_eq!(fixture.engine.query().count, 1);

    fixture.clock.advance(TimeDelta::seconds(8));
    assert_eq!(fixture.statistics_json(), EMPTY_RESPONSE);
}

#[rstest]
fn test_add_expired_transaction(fixture: Fixture) {
    assert_eq!(
        fixture.ingest("12345.678", TimeDelta::days(5)),
        IngestOutcome::Expired
    );
    assert_eq!(fixture.statistics_json(), EMPTY_RESPONSE);
}

#[rstest]
fn test_delete_transactions(fixture: Fixture) {
    for _ in 0..5 {
        fixture.ingest("12345.678", TimeDelta::seconds(5));
    }
    assert_eq!(fixture.engine.query().count, 5);

    fixture.engine.reset();
    assert_eq!(fixture.statistics_json(), EMPTY_RESPONSE);
}

#[rstest]
#[case(0)]
#[case(30)]
#[case(59)]
fn test_every_window_second_is_counted(fixture: Fixture, #[case] age_secs: i64) {
    fixture.ingest("1.005", TimeDelta::seconds(age_secs));
    let stats = fixture.engine.query();

    assert_eq!(stats.count, 1);
    assert_eq!(stats.sum.to_string(), "1.01");
}

#[rstest]
fn test_statistics_track_true_extrema_over_time(fixture: Fixture) {
    fixture.ingest("100", TimeDelta::seconds(40));
    fixture.ingest("-100", TimeDelta::seconds(40));
    fixture.ingest("7", TimeDelta::seconds(10));
    fixture.ingest("3", TimeDelta::seconds(0));

    let stats = fixture.engine.query();
    assert_eq!(stats.max.to_string(), "100.00");
    assert_eq!(stats.min.to_string(), "-100.00");
    assert_eq!(stats.count, 4);
    assert_eq!(stats.avg.to_string(), "2.50");

    // The second holding both extrema leaves the window
    fixture.clock.advance(TimeDelta::seconds(20));
    let stats = fixture.engine.query();
    assert_eq!(stats.max.to_string(), "7.00");
    assert_eq!(stats.min.to_string(), "3.00");
    assert_eq!(stats.count, 2);
    assert_eq!(stats.avg.to_string(), "5.00");
}

#[rstest]
fn test_stale_buckets_survive_without_compaction(fixture: Fixture) {
    fixture.ingest("1", TimeDelta::seconds(30));
    fixture.clock.advance(TimeDelta::minutes(10));

    assert_eq!(fixture.engine.query().count, 0);
    assert_eq!(fixture.engine.bucket_count(), 1);

    assert_eq!(fixture.engine.compact(), 1);
    assert_eq!(fixture.engine.bucket_count(), 0);
}

#[rstest]
fn test_compaction_never_changes_query_result(fixture: Fixture) {
    for age in [50, 20, 0] {
        fixture.ingest("1", TimeDelta::seconds(age));
    }
    fixture.clock.advance(TimeDelta::seconds(15));

    let before = fixture.engine.query();
    assert_eq!(before.count, 2);
    assert_eq!(fixture.engine.compact(), 1);
    assert_eq!(fixture.engine.query(), before);
}
