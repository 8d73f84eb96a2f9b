//! Statistics over stored labels
//!
//! Pure projections of `LabelStore::read_all`; recomputed on every request.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::models::LabelRecord;

/// Default size of the recent-labels view
pub const DEFAULT_RECENT_LIMIT: usize = 15;

/// One bar of a distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub name: String,
    pub count: usize,
}

/// Aggregated view of every stored label
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelStats {
    pub total: usize,
    /// Labels per annotator, most active first
    pub per_labeler: Vec<CountEntry>,
    /// Labels per sentiment, most frequent first
    pub per_sentiment: Vec<CountEntry>,
    /// Number of distinct annotators
    pub team_members: usize,
    /// Labels by the requesting annotator, when one was named
    pub labeler_total: Option<usize>,
    /// Last `recent_limit` records, in store order
    pub recent: Vec<LabelRecord>,
}

impl LabelStats {
    pub fn from_records(
        records: &[LabelRecord],
        recent_limit: usize,
        labeler: Option<&str>,
    ) -> Self {
        let per_labeler = count_by(records.iter().map(|r| r.labeled_by.as_str()));
        let per_sentiment = count_by(records.iter().map(|r| r.sentiment.as_str()));

        let team_members = records
            .iter()
            .map(|r| r.labeled_by.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let labeler_total =
            labeler.map(|name| records.iter().filter(|r| r.labeled_by == name).count());

        let recent_start = records.len().saturating_sub(recent_limit);

        Self {
            total: records.len(),
            per_labeler,
            per_sentiment,
            team_members,
            labeler_total,
            recent: records[recent_start..].to_vec(),
        }
    }
}

/// Count occurrences, sorted by descending count then name
fn count_by<'a>(names: impl Iterator<Item = &'a str>) -> Vec<CountEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }

    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(name, count)| CountEntry {
            name: name.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Confidence, Sentiment};
    use crate::time::parse_timestamp;

    fn record(id: u32, sentiment: Sentiment, labeler: &str) -> LabelRecord {
        LabelRecord {
            message_id: id,
            message: format!("message {}", id),
            sentiment,
            confidence: Confidence::new(3).unwrap(),
            labeled_by: labeler.to_string(),
            timestamp: parse_timestamp("2024-05-01 12:00:00").unwrap(),
        }
    }

    fn entry(name: &str, count: usize) -> CountEntry {
        CountEntry {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_empty_records() {
        let stats = LabelStats::from_records(&[], DEFAULT_RECENT_LIMIT, Some("Alice"));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.team_members, 0);
        assert_eq!(stats.labeler_total, Some(0));
        assert!(stats.recent.is_empty());
    }

    #[test]
    fn test_distributions_sorted_by_count_then_name() {
        let records = vec![
            record(10001, Sentiment::Humor, "Bob"),
            record(10002, Sentiment::Excitement, "Alice"),
            record(10003, Sentiment::Humor, "Alice"),
            record(10004, Sentiment::Neutral, "Carol"),
        ];

        let stats = LabelStats::from_records(&records, DEFAULT_RECENT_LIMIT, None);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.team_members, 3);
        assert_eq!(stats.labeler_total, None);
        assert_eq!(
            stats.per_labeler,
            vec![entry("Alice", 2), entry("Bob", 1), entry("Carol", 1)]
        );
        assert_eq!(
            stats.per_sentiment,
            vec![entry("Humor", 2), entry("Excitement", 1), entry("Neutral", 1)]
        );
    }

    #[test]
    fn test_labeler_total() {
        let records = vec![
            record(10001, Sentiment::Humor, "Bob"),
            record(10002, Sentiment::Boredom, "Alice"),
            record(10003, Sentiment::Humor, "Bob"),
        ];

        let stats = LabelStats::from_records(&records, DEFAULT_RECENT_LIMIT, Some("Bob"));
        assert_eq!(stats.labeler_total, Some(2));
    }

    #[test]
    fn test_recent_is_tail_in_store_order() {
        let records: Vec<LabelRecord> = (0..20)
            .map(|i| record(10000 + i, Sentiment::Neutral, "Alice"))
            .collect();

        let stats = LabelStats::from_records(&records, 3, None);
        let ids: Vec<u32> = stats.recent.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, vec![10017, 10018, 10019]);
    }
}
