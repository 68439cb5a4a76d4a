//! App IR (input) and Codegen IR (canonical internal form) data model (§3).

mod adapt;

pub use adapt::adapt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

/// The five schema-carrying positions on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Params,
    Query,
    Body,
    Headers,
    Response,
}

impl Slot {
    pub const ALL: [Slot; 5] = [Slot::Params, Slot::Query, Slot::Body, Slot::Headers, Slot::Response];

    /// The suffix used when synthesizing a name for a promoted inline
    /// schema: `Pascal(operationId) + SuffixOf(slot)`.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            Slot::Params => "Params",
            Slot::Query => "Query",
            Slot::Body => "Body",
            Slot::Headers => "Headers",
            Slot::Response => "Response",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingParts {
    pub operation: Option<String>,
    pub entity: Option<String>,
    pub part: Option<String>,
}

impl Default for NamingParts {
    fn default() -> Self {
        Self { operation: None, entity: None, part: None }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub name: String,
    pub type_hint: String,
}

/// A schema slot on an App-IR route: either a source-level named schema or
/// a JSON-Schema body attached inline, without a reusable name.
#[derive(Debug, Clone)]
pub enum SchemaRef {
    Named { schema_name: String, json_schema: Option<Value> },
    Inline { json_schema: Value, resolved_fields: Option<Vec<ResolvedField>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Sse,
    Ndjson,
}

#[derive(Debug, Clone)]
pub struct StreamingDescriptor {
    pub format: StreamFormat,
    pub event_schema: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub path: String,
    pub operation_id: String,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub params: Option<SchemaRef>,
    pub query: Option<SchemaRef>,
    pub body: Option<SchemaRef>,
    pub headers: Option<SchemaRef>,
    pub response: Option<SchemaRef>,
    pub streaming: Option<StreamingDescriptor>,
}

impl Route {
    pub fn slot(&self, slot: Slot) -> Option<&SchemaRef> {
        match slot {
            Slot::Params => self.params.as_ref(),
            Slot::Query => self.query.as_ref(),
            Slot::Body => self.body.as_ref(),
            Slot::Headers => self.headers.as_ref(),
            Slot::Response => self.response.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppRouter {
    pub prefix: String,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone)]
pub struct AppModule {
    pub name: String,
    pub routers: Vec<AppRouter>,
}

#[derive(Debug, Clone)]
pub struct AppSchema {
    pub name: String,
    pub module: String,
    pub is_named: bool,
    pub json_schema: Option<Value>,
    pub naming_parts: NamingParts,
}

/// Per-action access token. `"false"` suppresses emission of that action;
/// any other value (e.g. `"none"`, a role name) leaves it enabled and is
/// carried through to the emitted operation for the client's auth layer.
pub type AccessToken = String;

#[derive(Debug, Clone)]
pub struct CustomAction {
    pub name: String,
    pub access: Option<AccessToken>,
}

#[derive(Debug, Clone)]
pub struct AppEntity {
    pub name: String,
    pub module: String,
    /// The entity's own named schema, used as the body/response model.
    pub schema_name: String,
    pub fields: Option<Vec<ResolvedField>>,
    /// Per-operation access tokens, keyed by `list`, `get`, `create`,
    /// `update`, `delete`.
    pub access: HashMap<String, AccessToken>,
    pub custom_actions: Vec<CustomAction>,
}

#[derive(Debug, Clone, Default)]
pub struct AppHeader {
    pub base_path: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppIr {
    pub app: AppHeader,
    pub modules: Vec<AppModule>,
    pub schemas: Vec<AppSchema>,
    pub entities: Vec<AppEntity>,
}

// ---------------------------------------------------------------------
// Codegen IR
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SchemaAnnotations {
    pub description: Option<String>,
    pub deprecated: bool,
    pub naming_parts: NamingParts,
}

#[derive(Debug, Clone)]
pub struct CgSchema {
    pub name: String,
    pub json_schema: Value,
    pub annotations: SchemaAnnotations,
    /// Owning module, used to place the schema's declaration in that
    /// module's types file; `None` only for schemas with no single owner.
    pub module: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Header,
    Query,
}

#[derive(Debug, Clone)]
pub enum AuthScheme {
    Bearer { name: String },
    ApiKey { name: String, location: ApiKeyLocation },
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub schemes: Vec<AuthScheme>,
}

/// Resolved type names per slot, present only when the slot materialized
/// into (or was already) a named schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaRefs {
    pub params: Option<String>,
    pub query: Option<String>,
    pub body: Option<String>,
    pub headers: Option<String>,
    pub response: Option<String>,
}

impl SchemaRefs {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Params => self.params.as_deref(),
            Slot::Query => self.query.as_deref(),
            Slot::Body => self.body.as_deref(),
            Slot::Headers => self.headers.as_deref(),
            Slot::Response => self.response.as_deref(),
        }
    }

    pub fn set(&mut self, slot: Slot, name: Option<String>) {
        match slot {
            Slot::Params => self.params = name,
            Slot::Query => self.query = name,
            Slot::Body => self.body = name,
            Slot::Headers => self.headers = name,
            Slot::Response => self.response = name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CgOperation {
    pub operation_id: String,
    pub method: Method,
    pub path: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
    pub headers: Option<Value>,
    pub response: Option<Value>,
    pub streaming: Option<StreamingDescriptor>,
    pub schema_refs: SchemaRefs,
    /// Slots whose source was an `Inline` ref rather than `Named`. C6/C7
    /// use this to decide whether to inline the slot's structural type or
    /// reference the resolved name via an import — see DESIGN.md's
    /// resolution of the §3/§4.5 ambiguity around promoted-inline slots.
    pub inline_slots: std::collections::HashSet<Slot>,
}

impl CgOperation {
    pub fn slot_json(&self, slot: Slot) -> Option<&Value> {
        match slot {
            Slot::Params => self.params.as_ref(),
            Slot::Query => self.query.as_ref(),
            Slot::Body => self.body.as_ref(),
            Slot::Headers => self.headers.as_ref(),
            Slot::Response => self.response.as_ref(),
        }
    }

    /// True when `slot` carries either a materialized JSON-Schema body or a
    /// resolved schema reference — a `Named` slot with no embedded body is
    /// still present.
    pub fn has_slot(&self, slot: Slot) -> bool {
        self.slot_json(slot).is_some() || self.schema_refs.get(slot).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct CgModule {
    pub name: String,
    pub operations: Vec<CgOperation>,
}

#[derive(Debug, Clone, Default)]
pub struct CodegenIr {
    pub base_path: String,
    pub version: Option<String>,
    pub modules: Vec<CgModule>,
    pub schemas: Vec<CgSchema>,
    pub entities: Vec<AppEntity>,
    pub auth: AuthConfig,
}
