//! Response formatting
//!
//! Complete mode renders items verbatim. Compact mode keeps a fixed set of
//! high-value fields per category; fields an item lacks are left out rather
//! than filled with placeholders.

use super::types::{ClassifiedResult, FormattedResponse, FormattedSection, ResultCategory};
use crate::search::ResponseMode;
use serde_json::{Map, Value};

/// Fields kept in compact mode, per category
const COMPACT_FIELDS: &[(ResultCategory, &[&str])] = &[
    (
        ResultCategory::AnswerBox,
        &[
            "type",
            "title",
            "answer",
            "result",
            "snippet",
            "temperature",
            "unit",
            "weather",
            "location",
            "date",
            "stock",
            "exchange",
            "price",
            "currency",
            "price_movement",
            "link",
        ],
    ),
    (
        ResultCategory::KnowledgeGraph,
        &[
            "title",
            "type",
            "description",
            "website",
            "source",
            "price",
            "currency",
            "stock",
            "exchange",
        ],
    ),
    (ResultCategory::Organic, &["title", "link", "snippet"]),
    (
        ResultCategory::News,
        &["title", "link", "snippet", "source", "date"],
    ),
    (
        ResultCategory::Images,
        &["title", "link", "original", "thumbnail", "source"],
    ),
    (
        ResultCategory::Shopping,
        &["title", "name", "price", "source", "link"],
    ),
];

/// Renders classified results at the requested fidelity
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Render every category of `classified`, in order
    pub fn format(&self, classified: &ClassifiedResult, mode: ResponseMode) -> FormattedResponse {
        let sections = classified
            .categories()
            .iter()
            .map(|block| FormattedSection {
                category: block.category,
                items: block
                    .items
                    .iter()
                    .map(|item| render_item(block.category, item, mode))
                    .collect(),
            })
            .collect();

        FormattedResponse { mode, sections }
    }

    /// Compact field set for `category`; `None` means items pass through whole
    pub fn compact_fields(category: ResultCategory) -> Option<&'static [&'static str]> {
        COMPACT_FIELDS
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, fields)| *fields)
    }
}

fn render_item(category: ResultCategory, item: &Value, mode: ResponseMode) -> Value {
    let fields = match mode {
        ResponseMode::Complete => return item.clone(),
        ResponseMode::Compact => ResponseFormatter::compact_fields(category),
    };

    match (fields, item) {
        (Some(fields), Value::Object(object)) => {
            let reduced: Map<String, Value> = object
                .iter()
                .filter(|(key, _)| fields.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Value::Object(reduced)
        }
        _ => item.clone(),
    }
}
