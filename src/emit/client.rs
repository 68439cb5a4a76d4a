//! HTTP-client emitter (C7, §4.7).

use super::{GeneratedFile, GENERATED_HEADER};
use crate::ir::{AuthScheme, CgModule, CgOperation, CgSchema, CodegenIr, Method, Slot};
use crate::naming;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn ext() -> &'static str {
    "ts"
}

const INPUT_SLOTS: [Slot; 4] = [Slot::Params, Slot::Query, Slot::Body, Slot::Headers];

fn path_param_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

/// `convertPath`: interpolates exactly the `:name` occurrences in `path`; a
/// path with no `:` is the literal `'path'`.
fn convert_path(path: &str) -> String {
    if !path.contains(':') {
        return format!("'{}'", path);
    }
    let interpolated = path_param_pattern().replace_all(path, "${input.params.$1}");
    format!("`{}`", interpolated)
}

fn has_any_input_slot(op: &CgOperation) -> bool {
    INPUT_SLOTS.iter().any(|s| op.has_slot(*s))
}

fn input_is_required(op: &CgOperation) -> bool {
    op.has_slot(Slot::Params) || op.has_slot(Slot::Body)
}

fn opts_expression(op: &CgOperation) -> Option<String> {
    let mut fields = Vec::new();
    if op.has_slot(Slot::Query) {
        fields.push("query: input?.query".to_string());
    }
    if op.has_slot(Slot::Body) {
        fields.push("body: input.body".to_string());
    }
    if op.has_slot(Slot::Headers) {
        fields.push("headers: input?.headers".to_string());
    }
    if fields.is_empty() {
        None
    } else {
        Some(format!("{{ {} }}", fields.join(", ")))
    }
}

fn input_param_signature(op: &CgOperation) -> Option<String> {
    if !has_any_input_slot(op) {
        return None;
    }
    let input_type = format!("{}Input", naming::pascal(&op.operation_id));
    let optional = if input_is_required(op) { "" } else { "?" };
    Some(format!("input{}: {}", optional, input_type))
}

fn emit_operation_method(op: &CgOperation) -> String {
    let method_name = naming::camel(&op.operation_id);
    let path_expr = convert_path(&op.path);
    let param_sig = input_param_signature(op).unwrap_or_default();
    let method = op.method.as_str();

    if let Some(streaming) = &op.streaming {
        let event_type = format!("{}Event", naming::pascal(&op.operation_id));
        let opts = opts_expression(op);
        let request_opts = match opts {
            Some(opts) => format!("{{ format: '{}', ...{} }}", format_name(streaming.format), opts),
            None => format!("{{ format: '{}' }}", format_name(streaming.format)),
        };
        return format!(
            "async *{name}({params}): AsyncIterable<{event}> {{\n  yield* client.requestStream('{method}', {path}, {opts});\n}}",
            name = method_name,
            params = param_sig,
            event = event_type,
            method = method,
            path = path_expr,
            opts = request_opts,
        );
    }

    let response_type = format!("{}Response", naming::pascal(&op.operation_id));
    let call = match opts_expression(op) {
        Some(opts) => format!("client.request('{}', {}, {})", method, path_expr, opts),
        None => format!("client.request('{}', {})", method, path_expr),
    };
    format!(
        "async {name}({params}): Promise<SDKResult<{response}>> {{\n  return {call};\n}}",
        name = method_name,
        params = param_sig,
        response = response_type,
        call = call,
    )
}

fn format_name(format: crate::ir::StreamFormat) -> &'static str {
    match format {
        crate::ir::StreamFormat::Sse => "sse",
        crate::ir::StreamFormat::Ndjson => "ndjson",
    }
}

/// Emits `modules/{moduleName}.ts`: a factory returning an object literal of
/// method-shorthand operation methods.
pub fn emit_module_factory_file(module: &CgModule) -> GeneratedFile {
    let factory_name = format!("create{}Module", naming::pascal(&module.name));
    let methods: Vec<String> = module.operations.iter().map(emit_operation_method).collect();

    let mut content = String::from(GENERATED_HEADER);
    content.push('\n');
    content.push_str(&format!("\nexport function {}(client: FetchClient) {{\n  return {{\n", factory_name));
    for method in &methods {
        let indented: Vec<String> = method.lines().map(|l| format!("    {}", l)).collect();
        content.push_str(&indented.join("\n"));
        content.push_str(",\n");
    }
    content.push_str("  };\n}\n");

    GeneratedFile::new(format!("modules/{}.{}", module.name, ext()), content)
}

fn has_bearer(ir: &CodegenIr) -> bool {
    ir.auth.schemes.iter().any(|s| matches!(s, AuthScheme::Bearer { .. }))
}

fn api_key_schemes(ir: &CodegenIr) -> Vec<&AuthScheme> {
    ir.auth.schemes.iter().filter(|s| matches!(s, AuthScheme::ApiKey { .. })).collect()
}

/// Config declaration: a record extending `FetchClientConfig`, with
/// `token`/`apiKey` fields added per the auth scheme list.
fn emit_config_decl(ir: &CodegenIr) -> String {
    let mut fields = Vec::new();
    if has_bearer(ir) {
        fields.push("token?: string | (() => string | Promise<string>);".to_string());
    }
    if !api_key_schemes(ir).is_empty() {
        fields.push("apiKey?: string | (() => string | Promise<string>);".to_string());
    }
    if fields.is_empty() {
        "export interface ClientConfig extends FetchClientConfig {}".to_string()
    } else {
        format!("export interface ClientConfig extends FetchClientConfig {{\n  {}\n}}", fields.join("\n  "))
    }
}

/// Auth-strategy builder: seeds from `config.authStrategies`, then appends
/// one entry per scheme whose corresponding config field is non-empty.
fn emit_auth_builder(ir: &CodegenIr) -> String {
    let mut lines = vec!["function buildAuthStrategies(config: ClientConfig) {".to_string(), "  const authStrategies = [...(config.authStrategies ?? [])];".to_string()];
    if has_bearer(ir) {
        lines.push("  if (config.token) {".to_string());
        lines.push("    authStrategies.push({ type: 'bearer', token: config.token });".to_string());
        lines.push("  }".to_string());
    }
    for scheme in api_key_schemes(ir) {
        if let AuthScheme::ApiKey { name, location } = scheme {
            let location_str = match location {
                crate::ir::ApiKeyLocation::Header => "header",
                crate::ir::ApiKeyLocation::Query => "query",
            };
            lines.push("  if (config.apiKey) {".to_string());
            lines.push(format!(
                "    authStrategies.push({{ type: 'apiKey', key: config.apiKey, location: '{}', name: '{}' }});",
                location_str, name
            ));
            lines.push("  }".to_string());
        }
    }
    lines.push("  return authStrategies;".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

/// Emits `client.ts`: imports every module factory, the Config declaration,
/// the auth builder, and `createClient`.
pub fn emit_client_entry_file(ir: &CodegenIr) -> GeneratedFile {
    let mut content = String::from(GENERATED_HEADER);
    content.push('\n');

    for module in &ir.modules {
        content.push_str(&format!(
            "\nimport {{ create{pascal}Module }} from './modules/{name}';",
            pascal = naming::pascal(&module.name),
            name = module.name,
        ));
    }
    content.push('\n');
    content.push_str(&format!("\n{}\n", emit_config_decl(ir)));
    content.push_str(&format!("\n{}\n", emit_auth_builder(ir)));

    content.push_str("\nexport function createClient(config: ClientConfig) {\n");
    content.push_str("  const authStrategies = buildAuthStrategies(config);\n");
    content.push_str("  const client = new FetchClient({ ...config, authStrategies });\n");
    content.push_str("  return {\n");
    for module in &ir.modules {
        content.push_str(&format!(
            "    {camel}: create{pascal}Module(client),\n",
            camel = naming::camel(&module.name),
            pascal = naming::pascal(&module.name),
        ));
    }
    content.push_str("  };\n}\n");

    GeneratedFile::new(format!("client.{}", ext()), content)
}

#[allow(dead_code)]
fn schemas_by_name(ir: &CodegenIr) -> HashMap<&str, &CgSchema> {
    ir.schemas.iter().map(|s| (s.name.as_str(), s)).collect()
}
