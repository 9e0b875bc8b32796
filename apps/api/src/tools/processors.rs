// Schema and request processors applied around every action
//
// The model must justify each call in a `thought` argument; the field is
// stripped again before the request reaches the executor.

use serde_json::{json, Value};

pub const THOUGHT_FIELD: &str = "thought";
pub const THOUGHT_DESCRIPTION: &str =
    "Provide the thought of the agent in a small paragraph in concise way. This is a required field.";

/// Add a required `thought` property to an object schema
pub fn add_thought_to_schema(mut schema: Value) -> Value {
    let Some(obj) = schema.as_object_mut() else {
        return schema;
    };

    let properties = obj
        .entry("properties")
        .or_insert_with(|| json!({}));
    if let Some(props) = properties.as_object_mut() {
        props.insert(
            THOUGHT_FIELD.to_string(),
            json!({"type": "string", "description": THOUGHT_DESCRIPTION}),
        );
    }

    let required = obj.entry("required").or_insert_with(|| json!([]));
    if let Some(list) = required.as_array_mut() {
        if !list.iter().any(|v| v == THOUGHT_FIELD) {
            list.push(Value::String(THOUGHT_FIELD.to_string()));
        }
    }

    schema
}

/// Remove the `thought` argument, returning it for logging
pub fn pop_thought_from_request(params: &mut Value) -> Option<String> {
    params
        .as_object_mut()
        .and_then(|obj| obj.remove(THOUGHT_FIELD))
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_required_thought() {
        let schema = add_thought_to_schema(json!({
            "type": "object",
            "properties": {"file_path": {"type": "string"}},
            "required": ["file_path"]
        }));

        assert_eq!(schema["properties"]["thought"]["type"], "string");
        assert_eq!(schema["properties"]["thought"]["description"], THOUGHT_DESCRIPTION);
        assert_eq!(schema["required"], json!(["file_path", "thought"]));
    }

    #[test]
    fn adding_twice_does_not_duplicate() {
        let schema = add_thought_to_schema(add_thought_to_schema(json!({"type": "object"})));
        assert_eq!(schema["required"], json!(["thought"]));
    }

    #[test]
    fn pops_thought() {
        let mut params = json!({"word": "retry", "thought": "look for the retry helper"});

        let thought = pop_thought_from_request(&mut params);

        assert_eq!(thought.as_deref(), Some("look for the retry helper"));
        assert_eq!(params, json!({"word": "retry"}));
    }

    #[test]
    fn pop_without_thought_is_noop() {
        let mut params = json!({"word": "retry"});
        assert!(pop_thought_from_request(&mut params).is_none());
        assert_eq!(params, json!({"word": "retry"}));
    }
}
