//! App-IR → Codegen-IR adapter (C5, §4.5).
//!
//! A sequence of purely functional passes: gather named schemas, resolve
//! collisions, flatten routes into operations, synthesize inline-schema
//! names, project entities, then sort. Sort runs last so every rewrite has
//! already landed.

use super::*;
use crate::naming;
use std::collections::HashMap;

/// `adapt(appIR) → codegenIR`.
pub fn adapt(app_ir: &AppIr) -> CodegenIr {
    let named = gather_named_schemas(app_ir);
    let collision_map = resolve_collisions(&named);

    let mut schemas: Vec<CgSchema> = named
        .iter()
        .map(|s| {
            let resolved_name = collision_map
                .get(&(s.module.clone(), s.name.clone()))
                .cloned()
                .unwrap_or_else(|| s.name.clone());
            CgSchema {
                name: resolved_name,
                json_schema: s.json_schema.clone().unwrap_or(serde_json::Value::Null),
                annotations: SchemaAnnotations {
                    description: None,
                    deprecated: false,
                    naming_parts: s.naming_parts.clone(),
                },
                module: Some(s.module.clone()),
            }
        })
        .collect();

    let mut modules: Vec<CgModule> = Vec::with_capacity(app_ir.modules.len());
    for module in &app_ir.modules {
        let mut operations = Vec::new();
        for router in &module.routers {
            for route in &router.routes {
                operations.push(flatten_route(&module.name, route, &collision_map, &mut schemas));
            }
        }
        modules.push(CgModule { name: module.name.clone(), operations });
    }

    for entity in &app_ir.entities {
        let ops = project_entity(entity, &collision_map, &mut schemas);
        let module = modules
            .iter_mut()
            .find(|m| m.name == entity.module)
            .unwrap_or_else(|| {
                modules.push(CgModule { name: entity.module.clone(), operations: Vec::new() });
                modules.last_mut().unwrap()
            });
        module.operations.extend(ops);
    }

    schemas.sort_by(|a, b| a.name.cmp(&b.name));
    modules.sort_by(|a, b| a.name.cmp(&b.name));
    for module in &mut modules {
        module.operations.sort_by(|a, b| a.operation_id.cmp(&b.operation_id));
    }

    CodegenIr {
        base_path: app_ir.app.base_path.clone(),
        version: app_ir.app.version.clone(),
        modules,
        schemas,
        entities: app_ir.entities.clone(),
        auth: AuthConfig::default(),
    }
}

/// Step 1: keep only schemas with `isNamed=true` and a non-null JSON body.
fn gather_named_schemas(app_ir: &AppIr) -> Vec<&AppSchema> {
    app_ir
        .schemas
        .iter()
        .filter(|s| s.is_named && s.json_schema.is_some())
        .collect()
}

/// Step 2: for every name that appears more than once, the resolved name
/// becomes `Pascal(moduleName) + name`. Names that are already unique are
/// preserved verbatim (testable property 6).
fn resolve_collisions(named: &[&AppSchema]) -> HashMap<(String, String), String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for schema in named {
        *counts.entry(schema.name.as_str()).or_default() += 1;
    }

    let mut map = HashMap::new();
    for schema in named {
        if counts[schema.name.as_str()] > 1 {
            let resolved = format!("{}{}", naming::pascal(&schema.module), schema.name);
            map.insert((schema.module.clone(), schema.name.clone()), resolved);
        }
    }
    map
}

/// Step 3 + 4: emit one `CGOperation` per route, resolving `Named` refs via
/// the collision map and promoting `Inline` refs with a JSON body into a
/// synthesized schema registered into `schemas`.
fn flatten_route(
    module_name: &str,
    route: &Route,
    collision_map: &HashMap<(String, String), String>,
    schemas: &mut Vec<CgSchema>,
) -> CgOperation {
    let mut op = CgOperation {
        operation_id: route.operation_id.clone(),
        method: route.method,
        path: route.path.clone(),
        description: route.description.clone(),
        tags: route.tags.clone(),
        params: None,
        query: None,
        body: None,
        headers: None,
        response: None,
        streaming: route.streaming.clone(),
        schema_refs: SchemaRefs::default(),
        inline_slots: std::collections::HashSet::new(),
    };

    for slot in Slot::ALL {
        let Some(schema_ref) = route.slot(slot) else { continue };
        match schema_ref {
            SchemaRef::Named { schema_name, json_schema } => {
                let resolved = collision_map
                    .get(&(module_name.to_string(), schema_name.clone()))
                    .cloned()
                    .unwrap_or_else(|| schema_name.clone());
                op.schema_refs.set(slot, Some(resolved.clone()));
                match json_schema {
                    Some(body) => set_slot_json(&mut op, slot, body.clone()),
                    None => {
                        if let Some(found) = schemas.iter().find(|s| s.name == resolved) {
                            set_slot_json(&mut op, slot, found.json_schema.clone());
                        }
                    }
                }
            }
            SchemaRef::Inline { json_schema, .. } => {
                set_slot_json(&mut op, slot, json_schema.clone());
                let synthesized_name = format!("{}{}", naming::pascal(&op.operation_id), slot.name_suffix());
                schemas.push(CgSchema {
                    name: synthesized_name.clone(),
                    json_schema: json_schema.clone(),
                    annotations: SchemaAnnotations::default(),
                    module: Some(module_name.to_string()),
                });
                op.schema_refs.set(slot, Some(synthesized_name));
                op.inline_slots.insert(slot);
            }
        }
    }

    op
}

fn set_slot_json(op: &mut CgOperation, slot: Slot, value: serde_json::Value) {
    match slot {
        Slot::Params => op.params = Some(value),
        Slot::Query => op.query = Some(value),
        Slot::Body => op.body = Some(value),
        Slot::Headers => op.headers = Some(value),
        Slot::Response => op.response = Some(value),
    }
}

const CRUD_ORDER: [(&str, Method); 5] = [
    ("list", Method::Get),
    ("get", Method::Get),
    ("create", Method::Post),
    ("update", Method::Patch),
    ("delete", Method::Delete),
];

/// Step 5: fixed CRUD operations plus custom actions, skipping any whose
/// access token is the exact string `"false"`. The entity's body/response
/// schema and, where needed, a synthesized `{Entity}IdParams` schema are
/// materialized into `schemas` so every `schemaRefs` entry this pass emits
/// resolves to a real `CgSchema` (testable property 3).
fn project_entity(entity: &AppEntity, collision_map: &HashMap<(String, String), String>, schemas: &mut Vec<CgSchema>) -> Vec<CgOperation> {
    let path_segment = naming::kebab(&entity.name);

    let resolved_schema_name = collision_map
        .get(&(entity.module.clone(), entity.schema_name.clone()))
        .cloned()
        .unwrap_or_else(|| entity.schema_name.clone());
    let entity_json = ensure_entity_schema(entity, &resolved_schema_name, schemas);
    let id_params_name = format!("{}IdParams", naming::pascal(&entity.name));

    let mut ops = Vec::new();

    for (key, method) in CRUD_ORDER {
        if entity.access.get(key).map(String::as_str) == Some("false") {
            continue;
        }
        let path = match key {
            "list" | "create" => format!("/{}", path_segment),
            _ => format!("/{}/:id", path_segment),
        };
        let operation_id = naming::camel(&format!("{}_{}", key, entity.name));
        ops.push(entity_operation(entity, operation_id, method, path, key, false, &resolved_schema_name, &entity_json, &id_params_name));
    }

    for action in &entity.custom_actions {
        if action.access.as_deref() == Some("false") {
            continue;
        }
        let path = format!("/{}/:id/{}", path_segment, naming::kebab(&action.name));
        let operation_id = naming::camel(&format!("{}_{}", action.name, entity.name));
        ops.push(entity_operation(entity, operation_id, Method::Post, path, &action.name, true, &resolved_schema_name, &entity_json, &id_params_name));
    }

    if ops.iter().any(|op| op.schema_refs.params.is_some()) {
        ensure_id_params_schema(&id_params_name, entity, schemas);
    }

    ops
}

/// Reuses an already-registered named schema under `resolved_name` (the
/// entity's model is typically also a source-level named schema gathered in
/// step 1); otherwise synthesizes one from `entity.fields`.
fn ensure_entity_schema(entity: &AppEntity, resolved_name: &str, schemas: &mut Vec<CgSchema>) -> serde_json::Value {
    if let Some(existing) = schemas.iter().find(|s| s.name == resolved_name) {
        return existing.json_schema.clone();
    }
    let json_schema = entity_body_schema(entity);
    schemas.push(CgSchema {
        name: resolved_name.to_string(),
        json_schema: json_schema.clone(),
        annotations: SchemaAnnotations::default(),
        module: Some(entity.module.clone()),
    });
    json_schema
}

/// Builds an object schema from the entity's resolved field list; every
/// field is required. Falls back to a bare `object` schema when no field
/// list is present.
fn entity_body_schema(entity: &AppEntity) -> serde_json::Value {
    match &entity.fields {
        Some(fields) if !fields.is_empty() => {
            let mut properties = serde_json::Map::new();
            for field in fields {
                properties.insert(field.name.clone(), serde_json::json!({"type": field.type_hint}));
            }
            let required: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
            serde_json::json!({"type": "object", "properties": properties, "required": required})
        }
        _ => serde_json::json!({"type": "object"}),
    }
}

fn ensure_id_params_schema(name: &str, entity: &AppEntity, schemas: &mut Vec<CgSchema>) {
    if schemas.iter().any(|s| s.name == name) {
        return;
    }
    schemas.push(CgSchema {
        name: name.to_string(),
        json_schema: serde_json::json!({"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}),
        annotations: SchemaAnnotations::default(),
        module: Some(entity.module.clone()),
    });
}

#[allow(clippy::too_many_arguments)]
fn entity_operation(
    entity: &AppEntity,
    operation_id: String,
    method: Method,
    path: String,
    key: &str,
    is_action: bool,
    resolved_schema_name: &str,
    entity_json: &serde_json::Value,
    id_params_name: &str,
) -> CgOperation {
    let mut schema_refs = SchemaRefs::default();
    let mut body = None;
    let mut response = None;
    let mut params = None;

    if matches!(key, "create" | "update") {
        schema_refs.body = Some(resolved_schema_name.to_string());
        body = Some(entity_json.clone());
    }
    if key != "delete" {
        schema_refs.response = Some(resolved_schema_name.to_string());
        response = Some(entity_json.clone());
    }
    if is_action || matches!(key, "get" | "update" | "delete") {
        schema_refs.params = Some(id_params_name.to_string());
        params = Some(serde_json::json!({"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}));
    }

    CgOperation {
        operation_id,
        method,
        path,
        description: None,
        tags: vec![entity.name.clone()],
        params,
        query: None,
        body,
        headers: None,
        response,
        streaming: None,
        schema_refs,
        inline_slots: std::collections::HashSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named_schema(name: &str, module: &str) -> AppSchema {
        AppSchema {
            name: name.to_string(),
            module: module.to_string(),
            is_named: true,
            json_schema: Some(json!({"type": "object"})),
            naming_parts: NamingParts::default(),
        }
    }

    #[test]
    fn unique_names_preserved_verbatim() {
        let app = AppIr {
            app: AppHeader::default(),
            modules: vec![],
            schemas: vec![named_schema("Widget", "things")],
            entities: vec![],
        };
        let ir = adapt(&app);
        assert_eq!(ir.schemas.len(), 1);
        assert_eq!(ir.schemas[0].name, "Widget");
    }

    #[test]
    fn colliding_names_get_module_prefix() {
        let app = AppIr {
            app: AppHeader::default(),
            modules: vec![],
            schemas: vec![named_schema("CreateBody", "users"), named_schema("CreateBody", "orders")],
            entities: vec![],
        };
        let ir = adapt(&app);
        let names: Vec<&str> = ir.schemas.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"UsersCreateBody"));
        assert!(names.contains(&"OrdersCreateBody"));
        assert!(!names.contains(&"CreateBody"));
    }

    #[test]
    fn inline_query_is_promoted_with_empty_naming_parts() {
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
        let ir = adapt(&app);
        let schema = ir.schemas.iter().find(|s| s.name == "ListUsersQuery").unwrap();
        assert!(schema.annotations.naming_parts.operation.is_none());
        let op = &ir.modules[0].operations[0];
        assert_eq!(op.schema_refs.query.as_deref(), Some("ListUsersQuery"));
    }

    #[test]
    fn every_schema_ref_resolves_to_a_schema() {
        let route = Route {
            method: Method::Post,
            path: "/api/v1/users".to_string(),
            operation_id: "createUser".to_string(),
            tags: vec![],
            description: None,
            params: None,
            query: None,
            body: Some(SchemaRef::Named {
                schema_name: "CreateBody".to_string(),
                json_schema: Some(json!({"type": "object"})),
            }),
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
            schemas: vec![named_schema("CreateBody", "users"), named_schema("CreateBody", "orders")],
            entities: vec![],
        };
        let ir = adapt(&app);
        let op = &ir.modules[0].operations[0];
        let referenced = op.schema_refs.body.as_ref().unwrap();
        assert!(ir.schemas.iter().any(|s| &s.name == referenced));
    }

    #[test]
    fn named_ref_without_embedded_body_materializes_from_resolved_schema() {
        let route = Route {
            method: Method::Post,
            path: "/api/v1/users".to_string(),
            operation_id: "createUser".to_string(),
            tags: vec![],
            description: None,
            params: None,
            query: None,
            body: Some(SchemaRef::Named { schema_name: "CreateBody".to_string(), json_schema: None }),
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
            schemas: vec![named_schema("CreateBody", "users")],
            entities: vec![],
        };
        let ir = adapt(&app);
        let op = &ir.modules[0].operations[0];
        assert_eq!(op.schema_refs.body.as_deref(), Some("CreateBody"));
        assert_eq!(op.body, Some(json!({"type": "object"})));
    }

    #[test]
    fn modules_and_operations_are_sorted() {
        let make_module = |name: &str, op_id: &str| AppModule {
            name: name.to_string(),
            routers: vec![AppRouter {
                prefix: "".to_string(),
                routes: vec![Route {
                    method: Method::Get,
                    path: "/x".to_string(),
                    operation_id: op_id.to_string(),
                    tags: vec![],
                    description: None,
                    params: None,
                    query: None,
                    body: None,
                    headers: None,
                    response: None,
                    streaming: None,
                }],
            }],
        };
        let app = AppIr {
            app: AppHeader::default(),
            modules: vec![make_module("zeta", "zOp"), make_module("alpha", "bOp")],
            schemas: vec![],
            entities: vec![],
        };
        let ir = adapt(&app);
        assert_eq!(ir.modules[0].name, "alpha");
        assert_eq!(ir.modules[1].name, "zeta");
    }

    #[test]
    fn entity_projection_skips_false_access() {
        let mut access = HashMap::new();
        access.insert("delete".to_string(), "false".to_string());
        let entity = AppEntity {
            name: "user".to_string(),
            module: "users".to_string(),
            schema_name: "User".to_string(),
            fields: None,
            access,
            custom_actions: vec![],
        };
        let app = AppIr {
            app: AppHeader::default(),
            modules: vec![],
            schemas: vec![],
            entities: vec![entity],
        };
        let ir = adapt(&app);
        let ops: Vec<&str> = ir.modules[0].operations.iter().map(|o| o.operation_id.as_str()).collect();
        assert!(!ops.iter().any(|id| id.starts_with("delete")));
        assert!(ops.iter().any(|id| id.starts_with("list")));
    }
}
