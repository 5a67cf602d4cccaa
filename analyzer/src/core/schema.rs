//! Function definitions derived from the structured output types
//!
//! The model is forced to call a single function whose `parameters` are the
//! JSON Schema of the Rust type we want back. schemars emits nested types as
//! `$ref`s into a `definitions` map; those are inlined so the function
//! definition is self-contained.
//!
//! Deserialization stays lenient (missing fields take defaults), but the
//! schema sent to the model lists every property as required.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{ApiFailure, ChemicalComposition, MaterialInfo};

use crate::types::FunctionDefinition;

/// Types the model can be asked to produce through a function call
pub trait FunctionSchema: JsonSchema + DeserializeOwned {
    fn function_description() -> &'static str;

    fn function_name() -> String {
        <Self as JsonSchema>::schema_name()
    }

    fn function_definition() -> FunctionDefinition {
        FunctionDefinition {
            name: Self::function_name(),
            description: Self::function_description().to_string(),
            parameters: required_schema::<Self>(),
        }
    }

    /// Parse the JSON arguments of a function call
    fn from_arguments(arguments: &str) -> Result<Self, ApiFailure> {
        serde_json::from_str(arguments).map_err(|e| {
            ApiFailure::MalformedResponse(format!("{} arguments did not parse: {}", Self::function_name(), e))
        })
    }
}

impl FunctionSchema for ChemicalComposition {
    fn function_description() -> &'static str {
        "Chemical composition of a named product, with CAS numbers and sources"
    }
}

impl FunctionSchema for MaterialInfo {
    fn function_description() -> &'static str {
        "Information to extract."
    }
}

/// JSON Schema for `T` with every `$ref` inlined and root metadata removed
pub fn inlined_schema<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    let definitions = value.get("definitions").cloned();
    if let Some(defs) = definitions {
        inline_refs(&mut value, &defs);
    }

    if let Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
        map.remove("title");
    }
    value
}

/// Inlined schema with every object property required and no defaults advertised
pub fn required_schema<T: JsonSchema>() -> Value {
    let mut value = inlined_schema::<T>();
    require_all_properties(&mut value);
    value
}

fn require_all_properties(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(properties)) = map.get_mut("properties") {
                for property in properties.values_mut() {
                    if let Value::Object(property) = property {
                        property.remove("default");
                    }
                }
                let names: Vec<Value> = properties.keys().cloned().map(Value::String).collect();
                map.insert("required".to_string(), Value::Array(names));
            }
            for (_, v) in map.iter_mut() {
                require_all_properties(v);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                require_all_properties(item);
            }
        }
        _ => {}
    }
}

fn inline_refs(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(path)) = map.get("$ref").cloned() {
                if let Some(name) = path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(name) {
                        *value = def.clone();
                        inline_refs(value, definitions);
                        return;
                    }
                }
            }
            for (_, v) in map.iter_mut() {
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
