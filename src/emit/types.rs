//! Type-declaration emitter (C6, §4.6).

use super::{doc_block, GeneratedFile, GENERATED_HEADER};
use crate::imports::{Import, ImportSet};
use crate::ir::{CgModule, CgOperation, CgSchema, CodegenIr, Slot};
use crate::naming;
use crate::schema_convert::{convert, ConvertContext};
use std::collections::HashSet;

/// Slots that belong on an operation's `Input` declaration, in emission
/// order; `response` is handled separately.
const INPUT_SLOTS: [Slot; 4] = [Slot::Params, Slot::Query, Slot::Body, Slot::Headers];

fn ext() -> &'static str {
    "ts"
}

/// Every schema name referenced by some operation's `schemaRefs`, across
/// every module and slot. Drives shared-vs-per-module placement (§4.6).
fn referenced_schema_names(ir: &CodegenIr) -> HashSet<String> {
    let mut names = HashSet::new();
    for module in &ir.modules {
        for op in &module.operations {
            for slot in Slot::ALL {
                if let Some(name) = op.schema_refs.get(slot) {
                    names.insert(name.to_string());
                }
            }
        }
    }
    names
}

fn emit_schema_decl(schema: &CgSchema) -> String {
    let mut ctx = ConvertContext::new();
    let type_expr = convert(&schema.json_schema, &schema.name, &mut ctx).unwrap_or_else(|_| "unknown".to_string());
    let doc = doc_block(schema.annotations.description.as_deref(), schema.annotations.deprecated);
    let decl = if type_expr.starts_with('{') {
        format!("export interface {} {}", schema.name, type_expr)
    } else {
        format!("export type {} = {};", schema.name, type_expr)
    };
    format!("{}{}", doc, decl)
}

/// Resolves a slot's type text for an Input/Response declaration: a named
/// reference (plus the import it needs) when the slot's origin was `Named`,
/// otherwise the converted structural type inlined directly.
fn slot_type_text(op: &CgOperation, slot: Slot, owner_module: &str, schemas_by_name: &std::collections::HashMap<&str, &CgSchema>) -> (String, Option<Import>) {
    if !op.inline_slots.contains(&slot) {
        if let Some(name) = op.schema_refs.get(slot) {
            let import = schemas_by_name
                .get(name)
                .and_then(|s| s.module.as_deref())
                .filter(|m| *m != owner_module)
                .map(|m| Import::type_import(format!("./{}", m), name));
            return (name.to_string(), import);
        }
    }
    if let Some(json) = op.slot_json(slot) {
        let mut ctx = ConvertContext::new();
        let text = convert(json, &op.operation_id, &mut ctx).unwrap_or_else(|_| "unknown".to_string());
        return (text, None);
    }
    ("unknown".to_string(), None)
}

fn emit_input_decl(
    op: &CgOperation,
    owner_module: &str,
    schemas_by_name: &std::collections::HashMap<&str, &CgSchema>,
    imports: &mut ImportSet,
) -> Option<String> {
    let present: Vec<Slot> = INPUT_SLOTS.into_iter().filter(|s| op.has_slot(*s)).collect();
    if present.is_empty() {
        return None;
    }

    let mut fields = Vec::with_capacity(present.len());
    for slot in present {
        let (type_text, import) = slot_type_text(op, slot, owner_module, schemas_by_name);
        if let Some(import) = import {
            imports.add(import);
        }
        let field_name = match slot {
            Slot::Params => "params",
            Slot::Query => "query",
            Slot::Body => "body",
            Slot::Headers => "headers",
            Slot::Response => unreachable!("response is not an input slot"),
        };
        let optional = matches!(slot, Slot::Query | Slot::Headers);
        fields.push(format!("{}{}: {}", field_name, if optional { "?" } else { "" }, type_text));
    }

    let name = format!("{}Input", naming::pascal(&op.operation_id));
    Some(format!("export interface {} {{ {} }}", name, fields.join("; ")))
}

fn emit_response_decl(
    op: &CgOperation,
    owner_module: &str,
    schemas_by_name: &std::collections::HashMap<&str, &CgSchema>,
    imports: &mut ImportSet,
) -> String {
    let name = format!("{}Response", naming::pascal(&op.operation_id));
    let (type_text, import) = if op.has_slot(Slot::Response) {
        slot_type_text(op, Slot::Response, owner_module, schemas_by_name)
    } else {
        ("void".to_string(), None)
    };
    if let Some(import) = import {
        imports.add(import);
    }
    format!("export type {} = {};", name, type_text)
}

fn emit_event_decl(op: &CgOperation) -> Option<String> {
    let streaming = op.streaming.as_ref()?;
    let name = format!("{}Event", naming::pascal(&op.operation_id));
    let type_text = match &streaming.event_schema {
        Some(schema) => {
            let mut ctx = ConvertContext::new();
            convert(schema, &op.operation_id, &mut ctx).unwrap_or_else(|_| "unknown".to_string())
        }
        None => "unknown".to_string(),
    };
    Some(format!("export type {} = {};", name, type_text))
}

/// Emits `types/{moduleName}.ts`: declarations for schemas owned by (and
/// referenced from) this module, followed by each operation's Input,
/// Response, and (if streaming) Event declarations.
pub fn emit_module_types_file(module: &CgModule, ir: &CodegenIr) -> GeneratedFile {
    let referenced = referenced_schema_names(ir);
    let schemas_by_name: std::collections::HashMap<&str, &CgSchema> =
        ir.schemas.iter().map(|s| (s.name.as_str(), s)).collect();

    let mut imports = ImportSet::new();
    let mut body_sections = Vec::new();

    for schema in ir.schemas.iter().filter(|s| s.module.as_deref() == Some(module.name.as_str()) && referenced.contains(&s.name)) {
        body_sections.push(emit_schema_decl(schema));
    }

    for op in &module.operations {
        if let Some(input_decl) = emit_input_decl(op, &module.name, &schemas_by_name, &mut imports) {
            body_sections.push(input_decl);
        }
        body_sections.push(emit_response_decl(op, &module.name, &schemas_by_name, &mut imports));
        if let Some(event_decl) = emit_event_decl(op) {
            body_sections.push(event_decl);
        }
    }

    let import_lines = imports.render();
    let mut content = String::from(GENERATED_HEADER);
    content.push('\n');
    if !import_lines.is_empty() {
        content.push('\n');
        content.push_str(&import_lines);
        content.push('\n');
    }
    for section in body_sections {
        content.push('\n');
        content.push_str(&section);
        content.push('\n');
    }

    GeneratedFile::new(format!("types/{}.{}", module.name, ext()), content)
}

/// Emits `types/shared.ts` when at least one CGSchema is unreferenced by
/// any operation's `schemaRefs`; otherwise returns `None`.
pub fn emit_shared_types_file(ir: &CodegenIr) -> Option<GeneratedFile> {
    let referenced = referenced_schema_names(ir);
    let shared: Vec<&CgSchema> = ir.schemas.iter().filter(|s| !referenced.contains(&s.name)).collect();
    if shared.is_empty() {
        return None;
    }

    let mut content = String::from(GENERATED_HEADER);
    content.push('\n');
    for schema in shared {
        content.push('\n');
        content.push_str(&emit_schema_decl(schema));
        content.push('\n');
    }

    Some(GeneratedFile::new(format!("types/shared.{}", ext()), content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::adapt;
    use crate::ir::{AppHeader, AppIr, AppModule, AppRouter, CgModule, Method, Route, SchemaRef};
    use serde_json::json;

    fn minimal_get_listing() -> CodegenIr {
        let route = Route {
            method: Method::Get,
            path: "/api/v1/users".to_string(),
            operation_id: "listUsers".to_string(),
            tags: vec![],
            description: None,
            params: None,
            query: Some(SchemaRef::Inline {
                json_schema: json!({"type": "object", "properties": {"page": {"type": "number"}}}),
                resolved_fields: None,
            }),
            body: None,
            headers: None,
            response: None,
            streaming: None,
        };
        let app = AppIr {
            app: AppHeader::default(),
            modules: vec![AppModule {
                name: "users".to_string(),
                routers: vec![AppRouter { prefix: "".to_string(), routes: vec![route] }],
            }],
            schemas: vec![],
            entities: vec![],
        };
        adapt(&app)
    }

    #[test]
    fn seed_scenario_minimal_get_listing() {
        let ir = minimal_get_listing();
        let file = emit_module_types_file(&ir.modules[0], &ir);
        assert!(file.content.starts_with(GENERATED_HEADER));
        assert!(file.content.contains("ListUsersInput"));
        assert!(file.content.contains("query?: { page?: number }"));
        assert!(file.content.contains("ListUsersResponse = void;"));
    }

    #[test]
    fn operation_with_no_slots_emits_no_input() {
        let mut ir = minimal_get_listing();
        ir.modules[0].operations[0].query = None;
        ir.modules[0].operations[0].schema_refs.query = None;
        let file = emit_module_types_file(&ir.modules[0], &ir);
        assert!(!file.content.contains("Input"));
    }

    #[test]
    fn empty_module_still_emits_header_only() {
        let ir = CodegenIr::default();
        let module = CgModule { name: "empty".to_string(), operations: vec![] };
        let file = emit_module_types_file(&module, &ir);
        assert_eq!(file.content.trim(), GENERATED_HEADER);
    }
}
