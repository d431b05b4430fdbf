//! Rest buckets.
//!
//! The threshold table lives here and nowhere else. Earlier iterations of
//! this analysis disagreed on where back-to-back ended and "rested" began;
//! every call site now goes through [`RestBucket::classify`].

use serde::Serialize;

/// Upper bounds, inclusive, in whole days of rest.
pub const BACK_TO_BACK_MAX_DAYS: i64 = 1;
pub const SHORT_REST_MAX_DAYS: i64 = 2;
pub const NORMAL_REST_MAX_DAYS: i64 = 3;

/// Discrete rest category, ordered shortest rest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestBucket {
    BackToBack,
    Short,
    Normal,
    Extended,
}

impl RestBucket {
    /// Canonical presentation order. Aggregated tables always emit one row
    /// per entry, in this order, whether or not the bucket has games.
    pub const ALL: [RestBucket; 4] = [
        RestBucket::BackToBack,
        RestBucket::Short,
        RestBucket::Normal,
        RestBucket::Extended,
    ];

    /// Total over non-negative rest gaps. A `None` gap (first game of a
    /// group) has no bucket and stays out of aggregation.
    pub fn classify(days_rest: i64) -> RestBucket {
        if days_rest <= BACK_TO_BACK_MAX_DAYS {
            RestBucket::BackToBack
        } else if days_rest <= SHORT_REST_MAX_DAYS {
            RestBucket::Short
        } else if days_rest <= NORMAL_REST_MAX_DAYS {
            RestBucket::Normal
        } else {
            RestBucket::Extended
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RestBucket::BackToBack => "0-1 days (B2B)",
            RestBucket::Short => "2 days",
            RestBucket::Normal => "3 days",
            RestBucket::Extended => "4+ days",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_table() {
        assert_eq!(RestBucket::classify(0), RestBucket::BackToBack);
        assert_eq!(RestBucket::classify(1), RestBucket::BackToBack);
        assert_eq!(RestBucket::classify(2), RestBucket::Short);
        assert_eq!(RestBucket::classify(3), RestBucket::Normal);
        assert_eq!(RestBucket::classify(4), RestBucket::Extended);
        assert_eq!(RestBucket::classify(17), RestBucket::Extended);
    }

    #[test]
    fn canonical_order_runs_shortest_to_longest() {
        let labels: Vec<&str> = RestBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels, ["0-1 days (B2B)", "2 days", "3 days", "4+ days"]);
    }
}
