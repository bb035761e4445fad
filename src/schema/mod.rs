//! A restricted JSON-Schema subset validator sufficient for tool contracts
//! (spec §4.7). Not a general JSON Schema implementation — `type`,
//! `properties`, `required`, `additionalProperties`, and `items` only.

use serde_json::Value;

#[cfg(test)]
mod tests;

/// Validate `value` against `schema`. Errors are short, path-qualified
/// strings (e.g. `property q: expected string`).
pub fn validate(schema: &Value, value: &Value) -> Result<(), String> {
    validate_at("", schema, value)
}

fn validate_at(path: &str, schema: &Value, value: &Value) -> Result<(), String> {
    let Some(schema_type) = schema.get("type").and_then(Value::as_str) else {
        // No `type` constraint: only recurse into properties/items if present.
        return validate_shape(path, schema, value);
    };

    match schema_type {
        "object" => validate_object(path, schema, value),
        "array" => validate_array(path, schema, value),
        "string" => expect(path, value.is_string(), "expected string"),
        "integer" => expect(
            path,
            value.as_f64().is_some_and(|n| n.fract() == 0.0),
            "expected integer",
        ),
        "number" => expect(path, value.is_number(), "expected number"),
        "boolean" => expect(path, value.is_boolean(), "expected boolean"),
        // Unknown type: accept (forward-compatible).
        _ => Ok(()),
    }
}

fn validate_shape(path: &str, schema: &Value, value: &Value) -> Result<(), String> {
    if schema.get("properties").is_some() {
        return validate_object(path, schema, value);
    }
    if schema.get("items").is_some() {
        return validate_array(path, schema, value);
    }
    Ok(())
}

fn expect(path: &str, ok: bool, message: &str) -> Result<(), String> {
    if ok {
        Ok(())
    } else if path.is_empty() {
        Err(message.to_string())
    } else {
        Err(format!("{path}: {message}"))
    }
}

fn validate_object(path: &str, schema: &Value, value: &Value) -> Result<(), String> {
    let Some(obj) = value.as_object() else {
        return expect(path, false, "expected object");
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required {
            let Some(key) = key.as_str() else { continue };
            if !obj.contains_key(key) {
                return Err(qualify(path, &format!("property {key}"), "required property missing"));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let additional_allowed = schema
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(true);

    for (key, val) in obj {
        match properties.and_then(|p| p.get(key)) {
            Some(prop_schema) => {
                validate_at(&qualify(path, &format!("property {key}"), ""), prop_schema, val)?;
            }
            None if !additional_allowed => {
                return Err(qualify(path, &format!("property {key}"), "unexpected additional property"));
            }
            None => {}
        }
    }
    Ok(())
}

fn validate_array(path: &str, schema: &Value, value: &Value) -> Result<(), String> {
    let Some(arr) = value.as_array() else {
        return expect(path, false, "expected array");
    };
    if let Some(items_schema) = schema.get("items") {
        for (i, item) in arr.iter().enumerate() {
            validate_at(&qualify(path, &format!("item {i}"), ""), items_schema, item)?;
        }
    }
    Ok(())
}

fn qualify(path: &str, segment: &str, message: &str) -> String {
    let full_path = if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    };
    if message.is_empty() {
        full_path
    } else {
        format!("{full_path}: {message}")
    }
}
