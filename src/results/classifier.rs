//! Payload classification
//!
//! The backend's response shape depends on the engine and the query. Known
//! top-level keys are probed in a fixed order; anything the table does not
//! recognize falls through to [`ResultCategory::Unstructured`].

use super::types::{CategoryResults, ClassifiedResult, RawResult, ResultCategory};
use serde_json::Value;

/// Probe table: category and the top-level keys that feed it, in priority order
const PROBES: &[(ResultCategory, &[&str])] = &[
    (ResultCategory::AnswerBox, &["answer_box"]),
    (ResultCategory::KnowledgeGraph, &["knowledge_graph"]),
    (ResultCategory::Organic, &["organic_results"]),
    (ResultCategory::News, &["news_results", "top_stories"]),
    (ResultCategory::Images, &["images_results", "inline_images"]),
    (
        ResultCategory::Shopping,
        &["shopping_results", "inline_shopping_results"],
    ),
];

/// Partitions backend payloads into result categories
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultClassifier;

impl ResultClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a payload. Never fails and never drops data it cannot place.
    pub fn classify(&self, raw: &RawResult) -> ClassifiedResult {
        let mut categories = Vec::new();

        if let Some(object) = raw.as_object() {
            for (category, keys) in PROBES {
                let items: Vec<Value> = keys
                    .iter()
                    .filter_map(|key| object.get(*key))
                    .flat_map(usable_items)
                    .collect();

                if !items.is_empty() {
                    categories.push(CategoryResults {
                        category: *category,
                        items,
                    });
                }
            }
        }

        if categories.is_empty() {
            categories.push(CategoryResults {
                category: ResultCategory::Unstructured,
                items: vec![raw.as_value().clone()],
            });
        }

        ClassifiedResult::from_categories(categories)
    }

    /// Top-level keys probed for a category
    pub fn probe_keys(category: ResultCategory) -> &'static [&'static str] {
        PROBES
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, keys)| *keys)
            .unwrap_or(&[])
    }
}

/// Items contributed by one probed value: array elements, or a lone object
fn usable_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) if !map.is_empty() => vec![value.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: Value) -> ClassifiedResult {
        ResultClassifier::new().classify(&RawResult::new(value))
    }

    #[test]
    fn test_answer_box_before_organic() {
        // Key order in the payload must not matter.
        let result = classify(json!({
            "organic_results": [{"title": "BBC Weather", "link": "https://bbc.co.uk"}],
            "answer_box": {"type": "weather_result", "temperature": "12", "unit": "Celsius"}
        }));

        assert_eq!(
            result.category_names(),
            vec![ResultCategory::AnswerBox, ResultCategory::Organic]
        );
    }

    #[test]
    fn test_all_categories_retained_in_priority_order() {
        let result = classify(json!({
            "shopping_results": [{"title": "Mug", "price": "$5"}],
            "images_results": [{"title": "Cup"}],
            "news_results": [{"title": "Coffee prices rise"}],
            "organic_results": [{"title": "Coffee"}],
            "knowledge_graph": {"title": "Coffee", "type": "Beverage"},
            "answer_box": {"answer": "A brewed drink"}
        }));

        assert_eq!(
            result.category_names(),
            vec![
                ResultCategory::AnswerBox,
                ResultCategory::KnowledgeGraph,
                ResultCategory::Organic,
                ResultCategory::News,
                ResultCategory::Images,
                ResultCategory::Shopping,
            ]
        );
    }

    #[test]
    fn test_item_order_preserved_and_aliases_concatenated() {
        let result = classify(json!({
            "top_stories": [{"title": "c"}],
            "news_results": [{"title": "a"}, {"title": "b"}]
        }));

        let titles: Vec<&str> = result
            .get(ResultCategory::News)
            .unwrap()
            .iter()
            .map(|item| item["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_values_are_not_usable() {
        let result = classify(json!({
            "organic_results": [],
            "answer_box": {},
            "knowledge_graph": null,
            "news_results": "none",
            "images_results": [{"title": "kept"}]
        }));

        assert_eq!(result.category_names(), vec![ResultCategory::Images]);
    }

    #[test]
    fn test_unstructured_fallback_keeps_everything() {
        let payload = json!({
            "search_metadata": {"id": "abc", "status": "Success"},
            "flights": [{"price": 420}],
            "error": "Google hasn't returned any results for this query."
        });
        let result = classify(payload.clone());

        assert_eq!(result.len(), 1);
        assert_eq!(result.category_names(), vec![ResultCategory::Unstructured]);
        assert_eq!(result.get(ResultCategory::Unstructured), Some(&[payload][..]));
    }

    #[test]
    fn test_non_object_payload_is_unstructured() {
        let result = classify(json!(["a", "b"]));
        assert_eq!(result.category_names(), vec![ResultCategory::Unstructured]);
        assert_eq!(
            result.get(ResultCategory::Unstructured),
            Some(&[json!(["a", "b"])][..])
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let payload = json!({
            "organic_results": [{"title": "x"}],
            "answer_box": {"answer": "42"}
        });
        assert_eq!(classify(payload.clone()), classify(payload));
    }

    #[test]
    fn test_probe_keys() {
        assert_eq!(
            ResultClassifier::probe_keys(ResultCategory::News),
            &["news_results", "top_stories"]
        );
        assert!(ResultClassifier::probe_keys(ResultCategory::Unstructured).is_empty());
    }
}
