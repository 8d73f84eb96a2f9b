//! Labeling guide: sentiment categories and the confidence scale

use axum::Json;
use serde::Serialize;
use tsl_common::{Confidence, Sentiment};

#[derive(Debug, Serialize)]
pub struct CategoryGuide {
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
    pub signs: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConfidenceLevel {
    pub value: u8,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GuideResponse {
    pub categories: Vec<CategoryGuide>,
    pub confidence: Vec<ConfidenceLevel>,
}

/// GET /api/guide
pub async fn get_guide() -> Json<GuideResponse> {
    let categories = Sentiment::ALL
        .iter()
        .map(|s| CategoryGuide {
            name: s.as_str(),
            emoji: s.emoji(),
            description: s.description(),
            examples: s.examples(),
            signs: s.signs(),
        })
        .collect();

    let confidence = Confidence::scale()
        .map(|c| ConfidenceLevel {
            value: c.value(),
            label: c.label(),
        })
        .collect();

    Json(GuideResponse {
        categories,
        confidence,
    })
}
