//! Type-safe schema generation for OpenAI structured outputs.
//!
//! Uses `schemars` to generate a JSON schema from a Rust type, then rewrites
//! it into the subset OpenAI accepts in strict mode.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct Caption {
//!     text: String,
//! }
//!
//! let schema = Caption::openai_schema();
//! ```

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Types that can be requested as OpenAI structured output.
///
/// Implemented for every `JsonSchema + DeserializeOwned` type.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// OpenAI strict-mode schema for this type.
    fn openai_schema() -> Value {
        let schema = schema_for!(Self);
        to_strict_schema(serde_json::to_value(schema).unwrap_or_default())
    }

    /// Schema name for this type.
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Rewrite a schemars root schema for OpenAI strict mode.
///
/// Strict mode requires every object to carry `additionalProperties: false`
/// and list all of its properties in `required`, and it does not follow
/// `$ref` or single-member `allOf` wrappers reliably.
pub fn to_strict_schema(mut value: Value) -> Value {
    let definitions = match &mut value {
        Value::Object(root) => {
            root.remove("$schema");
            root.remove("definitions")
        }
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs(&mut value, &defs);
    }
    normalize(&mut value);
    value
}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut def) = target {
                // Sibling keywords (for example a field description) survive the inlining.
                map.remove("$ref");
                if let Value::Object(def_map) = &mut def {
                    for (k, v) in std::mem::take(map) {
                        def_map.entry(k).or_insert(v);
                    }
                }
                *value = def;
                inline_refs(value, definitions);
                return;
            }

            for v in map.values_mut() {
                inline_refs(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

fn normalize(value: &mut Value) {
    match value {
        Value::Object(map) => {
            flatten_single_all_of(map);

            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                let keys: Option<Vec<Value>> = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().map(Value::String).collect());
                if let Some(keys) = keys {
                    map.insert("required".to_string(), Value::Array(keys));
                }
            }

            for v in map.values_mut() {
                normalize(v);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                normalize(item);
            }
        }
        _ => {}
    }
}

/// `{"description": .., "allOf": [S]}` becomes `S` plus the description.
fn flatten_single_all_of(map: &mut Map<String, Value>) {
    let single = match map.get("allOf").and_then(Value::as_array) {
        Some(members) if members.len() == 1 => members[0].clone(),
        _ => return,
    };
    map.remove("allOf");
    if let Value::Object(inner) = single {
        for (k, v) in inner {
            map.entry(k).or_insert(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    enum Shade {
        #[serde(rename = "light grey")]
        LightGrey,
        Black,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Swatch {
        name: String,
        /// Colour of the swatch
        shade: Shade,
        note: Option<String>,
    }

    fn required_of(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .expect("required array")
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    #[test]
    fn test_root_metadata_removed() {
        let schema = Swatch::openai_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("$schema"));
        assert!(!obj.contains_key("definitions"));
        assert_eq!(obj.get("additionalProperties"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_all_properties_required() {
        let schema = Swatch::openai_schema();
        let required = required_of(&schema);

        assert_eq!(required.len(), 3);
        assert!(required.contains(&"name"));
        assert!(required.contains(&"shade"));
        assert!(required.contains(&"note"), "Option fields are required in strict mode");
    }

    #[test]
    fn test_enum_is_inlined_with_description() {
        let schema = Swatch::openai_schema();
        let shade = &schema["properties"]["shade"];

        assert!(shade.get("$ref").is_none());
        assert!(shade.get("allOf").is_none());
        assert_eq!(shade["type"], "string");
        assert_eq!(shade["enum"], json!(["light grey", "Black"]));
        assert_eq!(shade["description"], "Colour of the swatch");
    }

    #[test]
    fn test_hand_written_schema_is_normalized() {
        let schema = to_strict_schema(json!({
            "type": "object",
            "properties": {
                "inner": {"type": "object", "properties": {"a": {"type": "string"}}}
            }
        }));

        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["properties"]["inner"]["additionalProperties"], false);
        assert_eq!(required_of(&schema["properties"]["inner"]), vec!["a"]);
    }
}
