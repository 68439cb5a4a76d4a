//! JSON-Schema → surface-type conversion (C4).
//!
//! A pure function over a JSON-Schema fragment. `$defs` entries are hoisted
//! into the caller-owned [`ConvertContext::extracted`] map rather than
//! inlined, matching the design note that cyclic `$defs` are handled via an
//! in-flight `resolving` set: re-entering a definition that's already being
//! resolved stops descent and falls back to the reference name.

use crate::error::CodegenError;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Accumulates hoisted `$defs` declarations across one `convert` call tree.
/// Ownership is the enclosing caller; every nested `convert` call borrows it
/// mutably.
#[derive(Debug, Default)]
pub struct ConvertContext {
    pub extracted: BTreeMap<String, String>,
    resolving: HashSet<String>,
}

impl ConvertContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Converts `schema` (labelled `schema_name` for error reporting) to a
/// surface-type expression, hoisting any `$defs` it contains into `ctx`.
pub fn convert(schema: &Value, schema_name: &str, ctx: &mut ConvertContext) -> Result<String, CodegenError> {
    convert_inner(schema, schema_name, ctx)
}

fn convert_inner(schema: &Value, schema_name: &str, ctx: &mut ConvertContext) -> Result<String, CodegenError> {
    let Some(obj) = schema.as_object() else {
        return Ok("unknown".to_string());
    };

    hoist_defs(obj, schema_name, ctx)?;

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        return resolve_ref(reference, schema_name, ctx);
    }

    if let Some(const_val) = obj.get("const") {
        return Ok(literal(const_val));
    }

    if let Some(variants) = obj.get("enum").and_then(Value::as_array) {
        return Ok(variants.iter().map(literal).collect::<Vec<_>>().join(" | "));
    }

    if let Some(branches) = obj.get("oneOf").and_then(Value::as_array) {
        return convert_union(branches, schema_name, ctx);
    }
    if let Some(branches) = obj.get("anyOf").and_then(Value::as_array) {
        return convert_union(branches, schema_name, ctx);
    }
    if let Some(branches) = obj.get("allOf").and_then(Value::as_array) {
        return convert_intersection(branches, schema_name, ctx);
    }

    if let Some(type_val) = obj.get("type") {
        return convert_typed(type_val, obj, schema_name, ctx);
    }

    if obj.contains_key("properties") || obj.contains_key("additionalProperties") {
        return convert_object(obj, schema_name, ctx);
    }

    Ok("unknown".to_string())
}

fn hoist_defs(
    obj: &serde_json::Map<String, Value>,
    schema_name: &str,
    ctx: &mut ConvertContext,
) -> Result<(), CodegenError> {
    let Some(defs) = obj.get("$defs").and_then(Value::as_object) else {
        return Ok(());
    };

    let mut names: Vec<&String> = defs.keys().collect();
    names.sort();

    for name in names {
        if ctx.extracted.contains_key(name) {
            continue;
        }
        let def_schema = &defs[name];
        ctx.resolving.insert(name.clone());
        let type_expr = convert_inner(def_schema, name, ctx)?;
        ctx.resolving.remove(name);
        ctx.extracted.insert(name.clone(), type_expr);
        let _ = schema_name;
    }
    Ok(())
}

fn resolve_ref(reference: &str, schema_name: &str, ctx: &ConvertContext) -> Result<String, CodegenError> {
    if !reference.starts_with('#') {
        return Err(CodegenError::UnsupportedExternalRef {
            schema: schema_name.to_string(),
            reference: reference.to_string(),
        });
    }
    let name = reference.rsplit('/').next().unwrap_or(reference).to_string();
    // Direct self-recursion: the definition is still being resolved. Stop
    // descent here and use the name as a forward reference; hoist_defs will
    // finish registering it once the recursive call above returns.
    if ctx.resolving.contains(&name) {
        return Ok(name);
    }
    Ok(name)
}

fn convert_union(branches: &[Value], schema_name: &str, ctx: &mut ConvertContext) -> Result<String, CodegenError> {
    let mut parts = Vec::with_capacity(branches.len());
    for branch in branches {
        parts.push(convert_inner(branch, schema_name, ctx)?);
    }
    Ok(parts.join(" | "))
}

fn convert_intersection(branches: &[Value], schema_name: &str, ctx: &mut ConvertContext) -> Result<String, CodegenError> {
    let mut parts = Vec::with_capacity(branches.len());
    for branch in branches {
        parts.push(convert_inner(branch, schema_name, ctx)?);
    }
    Ok(parts.join(" & "))
}

fn convert_typed(
    type_val: &Value,
    obj: &serde_json::Map<String, Value>,
    schema_name: &str,
    ctx: &mut ConvertContext,
) -> Result<String, CodegenError> {
    if let Some(types) = type_val.as_array() {
        let mapped: Vec<String> = types
            .iter()
            .filter_map(Value::as_str)
            .map(map_primitive)
            .collect();
        return Ok(mapped.join(" | "));
    }

    let Some(type_str) = type_val.as_str() else {
        return Ok("unknown".to_string());
    };

    match type_str {
        "array" => convert_array(obj, schema_name, ctx),
        "object" => convert_object(obj, schema_name, ctx),
        other => Ok(map_primitive(other)),
    }
}

fn convert_array(
    obj: &serde_json::Map<String, Value>,
    schema_name: &str,
    ctx: &mut ConvertContext,
) -> Result<String, CodegenError> {
    if let Some(prefix_items) = obj.get("prefixItems").and_then(Value::as_array) {
        let mut parts = Vec::with_capacity(prefix_items.len());
        for item in prefix_items {
            parts.push(convert_inner(item, schema_name, ctx)?);
        }
        return Ok(format!("[{}]", parts.join(", ")));
    }

    if let Some(items) = obj.get("items") {
        let item_type = convert_inner(items, schema_name, ctx)?;
        if item_type.contains(" | ") || item_type.contains(" & ") {
            return Ok(format!("({})[]", item_type));
        }
        return Ok(format!("{}[]", item_type));
    }

    Ok("unknown[]".to_string())
}

fn convert_object(
    obj: &serde_json::Map<String, Value>,
    schema_name: &str,
    ctx: &mut ConvertContext,
) -> Result<String, CodegenError> {
    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        let required: HashSet<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|v| v.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut names: Vec<&String> = properties.keys().collect();
        names.sort();

        let mut fields = Vec::with_capacity(names.len());
        for name in names {
            let field_schema = &properties[name];
            let field_type = convert_inner(field_schema, schema_name, ctx)?;
            let optional = if required.contains(name.as_str()) { "" } else { "?" };
            fields.push(format!("{}{}: {}", name, optional, field_type));
        }
        return Ok(format!("{{ {} }}", fields.join("; ")));
    }

    if let Some(additional) = obj.get("additionalProperties") {
        if let Some(value_schema) = additional.as_object().map(|_| additional) {
            if !matches!(value_schema, Value::Bool(_)) {
                let value_type = convert_inner(value_schema, schema_name, ctx)?;
                return Ok(format!("Record<string, {}>", value_type));
            }
        }
    }

    Ok("Record<string, unknown>".to_string())
}

fn map_primitive(json_type: &str) -> String {
    match json_type {
        "string" => "string".to_string(),
        "number" => "number".to_string(),
        "integer" => "number".to_string(),
        "boolean" => "boolean".to_string(),
        "null" => "null".to_string(),
        _ => "unknown".to_string(),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        other => other.to_string(),
    }
}
