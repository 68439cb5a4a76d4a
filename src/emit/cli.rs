//! CLI/SDK manifest emitter (C8, §4.8).

use super::{GeneratedFile, GENERATED_HEADER};
use crate::config::{CliPublishable, TypescriptPublishable};
use crate::ir::{CgModule, CgOperation, CodegenIr, Slot};
use crate::naming;
use serde_json::{json, Value};

fn ext() -> &'static str {
    "ts"
}

/// Maps a JSON-Schema `type` to the CLI's flattened property type: only
/// `number`/`boolean` survive; everything else (including `array`/`object`)
/// degrades to `string`.
fn cli_property_type(prop: &Value) -> &'static str {
    match prop.get("type").and_then(Value::as_str) {
        Some("integer") | Some("number") => "number",
        Some("boolean") => "boolean",
        _ => "string",
    }
}

/// Flattens a slot's JSON-Schema `properties` into `{name: {type, required,
/// description?, enum?}}`. `params` properties are always required.
fn flatten_slot(schema: &Value, slot: Slot) -> Option<Value> {
    let properties = schema.get("properties")?.as_object()?;
    let required: std::collections::HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut names: Vec<&String> = properties.keys().collect();
    names.sort();

    let mut out = serde_json::Map::new();
    for name in names {
        let prop = &properties[name];
        let mut entry = serde_json::Map::new();
        entry.insert("type".to_string(), json!(cli_property_type(prop)));
        let is_required = matches!(slot, Slot::Params) || required.contains(name.as_str());
        entry.insert("required".to_string(), json!(is_required));
        if let Some(desc) = prop.get("description").and_then(Value::as_str) {
            entry.insert("description".to_string(), json!(desc));
        }
        if let Some(values) = prop.get("enum") {
            entry.insert("enum".to_string(), values.clone());
        }
        out.insert(name.clone(), Value::Object(entry));
    }
    Some(Value::Object(out))
}

fn operation_entry(op: &CgOperation) -> Value {
    let mut entry = serde_json::Map::new();
    entry.insert("method".to_string(), json!(op.method.as_str()));
    entry.insert("path".to_string(), json!(op.path));
    entry.insert("description".to_string(), json!(op.description.clone().unwrap_or_default()));

    for slot in [Slot::Params, Slot::Query, Slot::Body] {
        let key = match slot {
            Slot::Params => "params",
            Slot::Query => "query",
            Slot::Body => "body",
            _ => unreachable!(),
        };
        if let Some(schema) = op.slot_json(slot) {
            if let Some(flattened) = flatten_slot(schema, slot) {
                entry.insert(key.to_string(), flattened);
            }
        }
    }

    Value::Object(entry)
}

fn module_entry(module: &CgModule) -> Value {
    let mut entry = serde_json::Map::new();
    for op in &module.operations {
        entry.insert(naming::kebab(&op.operation_id), operation_entry(op));
    }
    Value::Object(entry)
}

/// Emits `cli/manifest.ts`: one namespace key per module, each holding its
/// operations keyed by `kebab-case(operationId)`. Empty modules render `{}`.
pub fn emit_manifest_file(ir: &CodegenIr) -> GeneratedFile {
    let mut manifest = serde_json::Map::new();
    for module in &ir.modules {
        manifest.insert(module.name.clone(), module_entry(module));
    }

    let body = serde_json::to_string_pretty(&Value::Object(manifest)).unwrap_or_else(|_| "{}".to_string());
    let content = format!("{}\n\nexport const commandManifest = {} as const;\n", GENERATED_HEADER, body);
    GeneratedFile::new(format!("cli/manifest.{}", ext()), content)
}

/// Emits `cli/bin.ts`: a `#!` shebang first line (required for the file to
/// be directly executable), the generated-by marker on the line after, then
/// the runtime wiring.
pub fn emit_bin_file(cli_name: &str) -> GeneratedFile {
    let content = format!(
        "#!/usr/bin/env node\n{header}\n\nimport {{ createCLI }} from '@vertz/cli-runtime';\nimport {{ commandManifest }} from './manifest';\n\nconst cli = createCLI({{ name: '{name}', version: '0.0.0', commands: commandManifest }});\ncli.run(process.argv.slice(2));\n",
        header = GENERATED_HEADER,
        name = cli_name,
    );
    GeneratedFile::new(format!("cli/bin.{}", ext()), content)
}

/// Emits `package.json` for the CLI's publishable package: name, version,
/// `private: true`, a `bin` entry, and runtime dependencies.
pub fn emit_cli_package_manifest(publishable: &CliPublishable) -> GeneratedFile {
    let manifest = json!({
        "name": publishable.name,
        "version": publishable.version.clone().unwrap_or_else(|| "0.0.0".to_string()),
        "private": true,
        "bin": { publishable.bin_name.clone(): format!("./cli/bin.{}", ext()) },
        "dependencies": {
            "@vertz/cli-runtime": "*",
            "@vertz/fetch-runtime": "*",
        },
    });
    GeneratedFile::new("package.json", serde_json::to_string_pretty(&manifest).unwrap_or_default())
}

/// Emits `package.json` for the TypeScript SDK's publishable package.
pub fn emit_typescript_package_manifest(publishable: &TypescriptPublishable) -> GeneratedFile {
    let manifest = json!({
        "name": publishable.name,
        "version": publishable.version.clone().unwrap_or_else(|| "0.0.0".to_string()),
        "private": true,
        "main": "./index.ts",
        "dependencies": {
            "@vertz/fetch-runtime": "*",
        },
    });
    GeneratedFile::new("package.json", serde_json::to_string_pretty(&manifest).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AppHeader, AppIr, AppModule, AppRouter, Method, Route, SchemaRef};
    use crate::ir::adapt;
    use serde_json::json as j;

    #[test]
    fn empty_module_renders_empty_object() {
        let ir = CodegenIr { modules: vec![CgModule { name: "users".to_string(), operations: vec![] }], ..Default::default() };
        let file = emit_manifest_file(&ir);
        assert!(file.content.contains("\"users\": {}"));
    }

    #[test]
    fn params_are_always_required() {
        let route = Route {
            method: Method::Get,
            path: "/api/v1/users/:id".to_string(),
            operation_id: "getUser".to_string(),
            tags: vec![],
            description: None,
            params: Some(SchemaRef::Inline {
                json_schema: j!({"type": "object", "properties": {"id": {"type": "string"}}, "required": []}),
                resolved_fields: None,
            }),
            query: None,
            body: None,
            headers: None,
            response: None,
            streaming: None,
        };
        let app = AppIr {
            app: AppHeader::default(),
            modules: vec![AppModule { name: "users".to_string(), routers: vec![AppRouter { prefix: "".to_string(), routes: vec![route] }] }],
            schemas: vec![],
            entities: vec![],
        };
        let ir = adapt(&app);
        let file = emit_manifest_file(&ir);
        assert!(file.content.contains("\"required\": true"));
    }

    #[test]
    fn bin_file_starts_with_shebang() {
        let file = emit_bin_file("vertz");
        assert!(file.content.starts_with("#!/usr/bin/env node\n"));
        assert!(file.content.contains(GENERATED_HEADER));
    }
}
