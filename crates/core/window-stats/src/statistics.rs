//! Window aggregate and the rendered statistics snapshot

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::bucket::BucketSnapshot;

/// Fraction digits every monetary field is rendered with
pub const MONEY_SCALE: u32 = 2;

/// Round half-up (ties away from zero) to exactly two fraction digits
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

fn serialize_money<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&round_money(*value))
}

/// Statistics over the live window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionStatistics {
    /// Sum of amounts
    #[serde(serialize_with = "serialize_money")]
    pub sum: Decimal,
    /// Mean amount, zero when the window is empty
    #[serde(serialize_with = "serialize_money")]
    pub avg: Decimal,
    /// Largest amount, zero when the window is empty
    #[serde(serialize_with = "serialize_money")]
    pub max: Decimal,
    /// Smallest amount, zero when the window is empty
    #[serde(serialize_with = "serialize_money")]
    pub min: Decimal,
    /// Number of transactions
    pub count: u64,
}

impl TransactionStatistics {
    /// Statistics of an empty window
    #[must_use]
    pub fn empty() -> Self {
        WindowAggregate::default().finish()
    }
}

/// Running merge of bucket snapshots across the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowAggregate {
    sum: Decimal,
    max: Option<Decimal>,
    min: Option<Decimal>,
    count: u64,
}

impl WindowAggregate {
    /// Fold one bucket snapshot in
    pub fn merge(&mut self, snapshot: &BucketSnapshot) {
        self.sum = self.sum.saturating_add(snapshot.sum);
        if let Some(max) = snapshot.max {
            self.max = Some(self.max.map_or(max, |current| current.max(max)));
        }
        if let Some(min) = snapshot.min {
            self.min = Some(self.min.map_or(min, |current| current.min(min)));
        }
        self.count = self.count.saturating_add(snapshot.count);
    }

    /// Number of transactions merged so far
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Render the aggregate with two-digit half-up rounding
    #[must_use]
    pub fn finish(self) -> TransactionStatistics {
        let avg = if self.count > 0 {
            self.sum
                .checked_div(Decimal::from(self.count))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        TransactionStatistics {
            sum: round_money(self.sum),
            avg: round_money(avg),
            max: round_money(self.max.unwrap_or(Decimal::ZERO)),
            min: round_money(self.min.unwrap_or(Decimal::ZERO)),
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot(sum: &str, max: &str, min: &str, count: u64) -> BucketSnapshot {
        BucketSnapshot {
            sum: dec(sum),
            max: Some(dec(max)),
            min: Some(dec(min)),
            count,
        }
    }

    #[rstest]
    #[case("1234.5678", "1234.57")]
    #[case("43.455", "43.46")]
    #[case("-155.251", "-155.25")]
    #[case("-0.005", "-0.01")]
    #[case("-0.004", "0.00")]
    #[case("1000", "1000.00")]
    #[case("0", "0.00")]
    #[case("20000.256525", "20000.26")]
    fn test_round_money(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(round_money(dec(input)).to_string(), expected);
    }

    #[test]
    fn test_empty_statistics_serialization() {
        let json = serde_json::to_string(&TransactionStatistics::empty()).unwrap();
        assert_eq!(
            json,
            r#"{"sum":"0.00","avg":"0.00","max":"0.00","min":"0.00","count":0}"#
        );
    }

    #[test]
    fn test_full_statistics_serialization() {
        let stats = TransactionStatistics {
            sum: dec("1234.5678"),
            avg: dec("43.454"),
            max: dec("1000"),
            min: dec("-155.251"),
            count: 10,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"sum":"1234.57","avg":"43.45","max":"1000.00","min":"-155.25","count":10}"#
        );
    }

    #[test]
    fn test_merge_across_buckets() {
        let mut aggregate = WindowAggregate::default();
        aggregate.merge(&snapshot("25.0", "15.0", "10.0", 2));
        aggregate.merge(&BucketSnapshot::default());
        aggregate.merge(&snapshot("-5.0", "-5.0", "-5.0", 1));
        aggregate.merge(&snapshot("22525.357535", "20000.256525", "2525.10101", 2));

        assert_eq!(aggregate.count(), 5);
        let stats = aggregate.finish();
        assert_eq!(stats.sum.to_string(), "22545.36");
        assert_eq!(stats.avg.to_string(), "4509.07");
        assert_eq!(stats.max.to_string(), "20000.26");
        assert_eq!(stats.min.to_string(), "-5.00");
        assert_eq!(stats.count, 5);
    }

    #[test]
    fn test_negative_only_window_keeps_negative_max() {
        let mut aggregate = WindowAggregate::default();
        aggregate.merge(&snapshot("-3", "-1", "-2", 2));
        let stats = aggregate.finish();

        assert_eq!(stats.max, dec("-1"));
        assert_eq!(stats.min, dec("-2"));
        assert_eq!(stats.avg.to_string(), "-1.50");
    }
}
