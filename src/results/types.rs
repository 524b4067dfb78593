//! Result type definitions

use crate::search::ResponseMode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Untouched payload returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResult(Value);

impl RawResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Top-level object, when the payload is one
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for RawResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Semantic category of a block of results.
///
/// Declaration order is the priority order used everywhere results are listed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    AnswerBox,
    KnowledgeGraph,
    Organic,
    News,
    Images,
    Shopping,
    Unstructured,
}

impl ResultCategory {
    /// All categories in priority order
    pub const ALL: [ResultCategory; 7] = [
        Self::AnswerBox,
        Self::KnowledgeGraph,
        Self::Organic,
        Self::News,
        Self::Images,
        Self::Shopping,
        Self::Unstructured,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnswerBox => "answer_box",
            Self::KnowledgeGraph => "knowledge_graph",
            Self::Organic => "organic",
            Self::News => "news",
            Self::Images => "images",
            Self::Shopping => "shopping",
            Self::Unstructured => "unstructured",
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Items of one category, in backend order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResults {
    pub category: ResultCategory,
    pub items: Vec<Value>,
}

/// Backend payload partitioned into categories, in priority order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifiedResult {
    categories: Vec<CategoryResults>,
}

impl ClassifiedResult {
    pub(crate) fn from_categories(categories: Vec<CategoryResults>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[CategoryResults] {
        &self.categories
    }

    /// Items of `category`, if it was present
    pub fn get(&self, category: ResultCategory) -> Option<&[Value]> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.items.as_slice())
    }

    /// Category tags in order
    pub fn category_names(&self) -> Vec<ResultCategory> {
        self.categories.iter().map(|c| c.category).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// One rendered category block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedSection {
    pub category: ResultCategory,
    pub items: Vec<Value>,
}

/// Rendered response handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedResponse {
    pub mode: ResponseMode,
    pub sections: Vec<FormattedSection>,
}

impl FormattedResponse {
    /// Section for `category`, if rendered
    pub fn section(&self, category: ResultCategory) -> Option<&FormattedSection> {
        self.sections.iter().find(|s| s.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_priority_order() {
        let mut shuffled = vec![
            ResultCategory::Shopping,
            ResultCategory::Unstructured,
            ResultCategory::AnswerBox,
            ResultCategory::News,
            ResultCategory::Organic,
            ResultCategory::KnowledgeGraph,
            ResultCategory::Images,
        ];
        shuffled.sort();
        assert_eq!(shuffled, ResultCategory::ALL.to_vec());
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_value(ResultCategory::AnswerBox).unwrap(),
            "answer_box"
        );
        assert_eq!(ResultCategory::KnowledgeGraph.to_string(), "knowledge_graph");
    }
}
