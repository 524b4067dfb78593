//! Catalogue builder
//!
//! Turns the backend's published parameter dump (one JSON document covering
//! every engine) into the per-engine schema files served as resources.

use super::registry::{EngineSchema, ParamSpec};
use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Engines that are never written to the catalogue
pub const EXCLUDED_ENGINES: &[&str] = &[
    "google_scholar_profiles",
    "google_light_fast",
    "google_lens_image_sources",
];

/// Group whose parameters are shared by every engine
const COMMON_GROUP: &str = "serpapi_parameters";

static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<code[^>]*>(.*?)</code>").unwrap());
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:b|strong)\b[^>]*>(.*?)</(?:b|strong)>").unwrap());
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:i|em)\b[^>]*>(.*?)</(?:i|em)>").unwrap());
static BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>").unwrap());
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Convert a parameter's HTML help text into light markdown. Links keep
/// their text only.
pub fn html_to_text(html: &str) -> String {
    let text = CODE.replace_all(html, "`$1`");
    let text = BOLD.replace_all(&text, "**$1**");
    let text = ITALIC.replace_all(&text, "*$1*");
    let text = BREAK.replace_all(&text, " ");

    // Parsing drops the remaining tags and decodes every entity.
    let fragment = Html::parse_fragment(&text);
    let text: String = fragment.root_element().text().collect();
    SPACE.replace_all(&text, " ").trim().to_string()
}

/// Collapse `[value, label]` option pairs to the bare value.
///
/// A pair is kept intact when its value is numeric and differs from the
/// label, since the label is the only readable name for it.
pub fn normalize_options(options: &[Value]) -> Vec<Value> {
    options
        .iter()
        .map(|option| match option.as_array() {
            Some(pair) if !pair.is_empty() => {
                let value = &pair[0];
                match pair.get(1) {
                    Some(label) if is_numeric(value) && value != label => option.clone(),
                    _ => value.clone(),
                }
            }
            _ => option.clone(),
        })
        .collect()
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn normalize_param(raw: &Map<String, Value>, group: &str) -> Option<ParamSpec> {
    let spec = ParamSpec {
        description: raw.get("html").and_then(Value::as_str).map(html_to_text),
        kind: raw.get("type").and_then(Value::as_str).map(str::to_string),
        options: raw
            .get("options")
            .and_then(Value::as_array)
            .map(|options| normalize_options(options))
            .unwrap_or_default(),
        required: raw.get("required").and_then(Value::as_bool),
        group: None,
    };

    if spec == ParamSpec::default() {
        return None;
    }

    Some(ParamSpec {
        group: Some(group.to_string()),
        ..spec
    })
}

/// Normalize one engine's entry from the parameter dump
pub fn normalize_engine(engine: &str, payload: &Value) -> EngineSchema {
    let mut schema = EngineSchema::new(engine);

    let Some(groups) = payload.as_object() else {
        return schema;
    };

    for (group_name, group) in groups {
        let Some(params) = group.get("parameters").and_then(Value::as_object) else {
            continue;
        };

        for (name, raw) in params {
            let Some(spec) = raw.as_object().and_then(|raw| normalize_param(raw, group_name))
            else {
                continue;
            };

            if group_name == COMMON_GROUP {
                schema.common_params.insert(name.clone(), spec);
            } else {
                schema.params.insert(name.clone(), spec);
            }
        }
    }

    schema
}

/// Normalize every engine in the dump's `parameters` map, skipping
/// excluded engines
pub fn build_catalogue(props: &Value) -> Result<Vec<EngineSchema>> {
    let Some(engines) = props.get("parameters").and_then(Value::as_object) else {
        bail!("parameter dump is missing the 'parameters' map");
    };

    Ok(engines
        .iter()
        .filter(|(engine, _)| !EXCLUDED_ENGINES.contains(&engine.as_str()))
        .filter(|(_, payload)| payload.is_object())
        .map(|(engine, payload)| normalize_engine(engine, payload))
        .collect())
}

/// Write one `<engine>.json` per schema into `out_dir`
pub fn write_catalogue(schemas: &[EngineSchema], out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    for schema in schemas {
        let path = out_dir.join(format!("{}.json", schema.engine));
        let content = serde_json::to_string_pretty(schema)?;
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        debug!("Wrote {}", path.display());
    }

    info!(
        "Wrote {} engine schemas to {}",
        schemas.len(),
        out_dir.display()
    );
    Ok(())
}

/// Read the parameter dump at `props_path` and write the catalogue
pub fn build_from_file(props_path: &Path, out_dir: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(props_path)
        .with_context(|| format!("reading {}", props_path.display()))?;
    let props: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", props_path.display()))?;

    let schemas = build_catalogue(&props)?;
    write_catalogue(&schemas, out_dir)?;
    Ok(schemas.len())
}
