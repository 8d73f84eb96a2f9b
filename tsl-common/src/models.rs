//! Label data model
//!
//! The sentiment category set and the confidence scale are closed; anything
//! outside them is rejected before a record is built.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::time::{format_timestamp, parse_timestamp};

/// Lowest display identifier handed out by `select_next`
pub const MESSAGE_ID_MIN: u32 = 10_000;
/// Highest display identifier handed out by `select_next`
pub const MESSAGE_ID_MAX: u32 = 99_999;

/// Persisted column layout, in order
pub const COLUMNS: [&str; 6] = [
    "message_id",
    "message",
    "sentiment",
    "confidence",
    "labeled_by",
    "timestamp",
];

/// Sentiment category assigned by an annotator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Excitement,
    Frustration,
    Humor,
    Confusion,
    Boredom,
    Neutral,
}

impl Sentiment {
    /// All categories in display order
    pub const ALL: [Sentiment; 6] = [
        Sentiment::Excitement,
        Sentiment::Frustration,
        Sentiment::Humor,
        Sentiment::Confusion,
        Sentiment::Boredom,
        Sentiment::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Excitement => "Excitement",
            Sentiment::Frustration => "Frustration",
            Sentiment::Humor => "Humor",
            Sentiment::Confusion => "Confusion",
            Sentiment::Boredom => "Boredom",
            Sentiment::Neutral => "Neutral",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::Excitement => "😄",
            Sentiment::Frustration => "😠",
            Sentiment::Humor => "😂",
            Sentiment::Confusion => "❓",
            Sentiment::Boredom => "😴",
            Sentiment::Neutral => "😐",
        }
    }

    /// One-line labeling guidance
    pub fn description(&self) -> &'static str {
        match self {
            Sentiment::Excitement => "Positive emotion about gameplay",
            Sentiment::Frustration => "Negative emotion, disappointment",
            Sentiment::Humor => "Jokes, memes, sarcasm, playfulness",
            Sentiment::Confusion => "Questions, not understanding",
            Sentiment::Boredom => "Lack of interest, slow pace",
            Sentiment::Neutral => "Everything else",
        }
    }

    /// Typical chat text for the category
    pub fn examples(&self) -> &'static [&'static str] {
        match self {
            Sentiment::Excitement => &["POGGERS", "LETS GO", "CLUTCH", "HOLY"],
            Sentiment::Frustration => &["wtf", "trash", "ff15", "throw"],
            Sentiment::Humor => &["KEKW", "copypasta", "laugh emotes"],
            Sentiment::Confusion => &["what happened?", "???", "how?"],
            Sentiment::Boredom => &["ResidentSleeper", "zzzz", "boring"],
            Sentiment::Neutral => &["hi", "gg", "nice", "general chat"],
        }
    }

    /// Cues that usually point at the category
    pub fn signs(&self) -> &'static str {
        match self {
            Sentiment::Excitement => "Caps lock, !, positive gaming emotes",
            Sentiment::Frustration => "Curse words, negative words, ?",
            Sentiment::Humor => "Laugh emotes, joke structure, sarcasm",
            Sentiment::Confusion => "Question marks, confusion emotes",
            Sentiment::Boredom => "Sleep emotes, pace complaints",
            Sentiment::Neutral => "Informational, greetings, generic",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    /// Exact category name; no case folding or aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|sentiment| sentiment.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Annotator certainty, 1 (Very Unsure) to 5 (Very Confident)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw score; `None` when outside [1,5]
    pub fn new(score: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&score) {
            Some(Self(score as u8))
        } else {
            None
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Very Unsure",
            2 => "Unsure",
            3 => "Neutral",
            4 => "Confident",
            _ => "Very Confident",
        }
    }

    /// The whole scale, lowest first
    pub fn scale() -> impl Iterator<Item = Confidence> {
        (Self::MIN..=Self::MAX).map(Confidence)
    }
}

impl TryFrom<i64> for Confidence {
    type Error = String;

    fn try_from(score: i64) -> Result<Self, Self::Error> {
        Confidence::new(score).ok_or_else(|| format!("confidence {} outside 1-5", score))
    }
}

impl From<Confidence> for u8 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.0, self.label())
    }
}

/// The single message currently presented for labeling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedItem {
    /// Display/session tag, not a dataset key
    pub message_id: u32,
    pub message: String,
}

/// One completed annotation
///
/// Created once per successful submission; never mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub message_id: u32,
    pub message: String,
    pub sentiment: Sentiment,
    pub confidence: Confidence,
    pub labeled_by: String,
    #[serde(with = "crate::time::serde_timestamp")]
    pub timestamp: NaiveDateTime,
}

impl LabelRecord {
    /// Render as the six persisted columns
    pub fn to_row(&self) -> [String; 6] {
        [
            self.message_id.to_string(),
            self.message.clone(),
            self.sentiment.to_string(),
            self.confidence.value().to_string(),
            self.labeled_by.clone(),
            format_timestamp(&self.timestamp),
        ]
    }

    /// Parse the six persisted columns
    ///
    /// Extra trailing columns are ignored; fewer than six is an error.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, String> {
        if row.len() < COLUMNS.len() {
            return Err(format!(
                "expected {} columns, found {}",
                COLUMNS.len(),
                row.len()
            ));
        }

        let field = |i: usize| row[i].as_ref();

        let message_id = field(0)
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("message_id {:?}: {}", field(0), e))?;
        let sentiment = field(2)
            .trim()
            .parse::<Sentiment>()
            .map_err(|s| format!("unknown sentiment {:?}", s))?;
        let confidence = field(3)
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(Confidence::new)
            .ok_or_else(|| format!("confidence {:?} outside 1-5", field(3)))?;
        let timestamp = parse_timestamp(field(5))
            .ok_or_else(|| format!("timestamp {:?}", field(5)))?;

        Ok(Self {
            message_id,
            message: field(1).to_string(),
            sentiment,
            confidence,
            labeled_by: field(4).to_string(),
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_parse_exact_names() {
        for sentiment in Sentiment::ALL {
            assert_eq!(sentiment.as_str().parse::<Sentiment>(), Ok(sentiment));
        }
    }

    #[test]
    fn test_sentiment_parse_rejects_unknown_and_case_variants() {
        assert!("excitement".parse::<Sentiment>().is_err());
        assert!("Joy".parse::<Sentiment>().is_err());
        assert!("".parse::<Sentiment>().is_err());
        assert!("Select...".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_confidence_bounds() {
        assert!(Confidence::new(0).is_none());
        assert!(Confidence::new(6).is_none());
        assert!(Confidence::new(-3).is_none());
        assert_eq!(Confidence::new(1).map(|c| c.value()), Some(1));
        assert_eq!(Confidence::new(5).map(|c| c.value()), Some(5));
    }

    #[test]
    fn test_confidence_labels() {
        let labels: Vec<String> = Confidence::scale().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "1 - Very Unsure",
                "2 - Unsure",
                "3 - Neutral",
                "4 - Confident",
                "5 - Very Confident",
            ]
        );
    }

    #[test]
    fn test_confidence_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Confidence>("7").is_err());
        assert_eq!(serde_json::from_str::<Confidence>("4").unwrap().value(), 4);
    }

    #[test]
    fn test_from_row_rejects_short_rows() {
        let err = LabelRecord::from_row(&["12345", "gg", "Neutral"]).unwrap_err();
        assert!(err.contains("expected 6 columns"));
    }

    #[test]
    fn test_from_row_parses_persisted_layout() {
        let record = LabelRecord::from_row(&[
            "54321",
            "KEKW, that was, \"funny\"",
            "Humor",
            "3",
            "Bob",
            "2024-05-01 12:00:00",
        ])
        .unwrap();

        assert_eq!(record.message_id, 54321);
        assert_eq!(record.message, "KEKW, that was, \"funny\"");
        assert_eq!(record.sentiment, Sentiment::Humor);
        assert_eq!(record.confidence.value(), 3);
        assert_eq!(record.labeled_by, "Bob");
        assert_eq!(record.to_row()[5], "2024-05-01 12:00:00");
    }

    #[test]
    fn test_from_row_rejects_bad_confidence() {
        let err = LabelRecord::from_row(&[
            "54321",
            "hi",
            "Neutral",
            "9",
            "Bob",
            "2024-05-01 12:00:00",
        ])
        .unwrap_err();
        assert!(err.contains("confidence"));
    }
}
