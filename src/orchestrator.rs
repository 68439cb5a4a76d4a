//! Orchestrator (C9, §4.9): runs the selected emitters and assembles the
//! file list in the fixed order that is itself part of the contract.

use crate::config::{GeneratorName, PipelineConfig};
use crate::emit::{cli, client, types, GeneratedFile, GENERATED_HEADER};
use crate::ir::CodegenIr;

fn emit_schemas_reexport_file(ir: &CodegenIr) -> Option<GeneratedFile> {
    if ir.schemas.is_empty() {
        return None;
    }
    let mut modules: Vec<&str> = ir.modules.iter().map(|m| m.name.as_str()).collect();
    modules.sort();
    modules.dedup();

    let mut content = String::from(GENERATED_HEADER);
    content.push('\n');
    for module in &modules {
        content.push_str(&format!("\nexport * from './types/{}';", module));
    }
    if types::emit_shared_types_file(ir).is_some() {
        content.push_str("\nexport * from './types/shared';");
    }
    content.push('\n');
    Some(GeneratedFile::new("schemas.ts", content))
}

fn emit_barrel_index_file(ir: &CodegenIr) -> GeneratedFile {
    let mut content = String::from(GENERATED_HEADER);
    content.push('\n');
    content.push_str("\nexport * from './client';");
    for module in &ir.modules {
        content.push_str(&format!("\nexport * from './types/{}';", module.name));
    }
    content.push('\n');
    GeneratedFile::new("index.ts", content)
}

/// Runs every generator named in `config.generators` against `ir`, in the
/// fixed assembly order: module types, optional shared types, module
/// factories, client entry, optional schema re-exports, barrel index,
/// optional typescript package manifest, then CLI files.
pub fn run(ir: &CodegenIr, config: &PipelineConfig) -> Vec<GeneratedFile> {
    let mut files = Vec::new();
    let run_typescript = config.generators.contains(&GeneratorName::Typescript);
    let run_cli = config.generators.contains(&GeneratorName::Cli)
        && config.cli.as_ref().map(|c| c.enabled).unwrap_or(false);

    if run_typescript {
        for module in &ir.modules {
            files.push(types::emit_module_types_file(module, ir));
        }
        if let Some(shared) = types::emit_shared_types_file(ir) {
            files.push(shared);
        }
        for module in &ir.modules {
            files.push(client::emit_module_factory_file(module));
        }
        files.push(client::emit_client_entry_file(ir));

        let include_schemas = config.typescript.as_ref().map(|t| t.schemas).unwrap_or(false);
        if include_schemas {
            if let Some(schemas_file) = emit_schemas_reexport_file(ir) {
                files.push(schemas_file);
            }
        }
        files.push(emit_barrel_index_file(ir));

        if let Some(publishable) = config.typescript.as_ref().and_then(|t| t.publishable.as_ref()) {
            files.push(cli::emit_typescript_package_manifest(publishable));
        }
    } else {
        // The CLI manifest still needs module type declarations to reference.
        for module in &ir.modules {
            files.push(types::emit_module_types_file(module, ir));
        }
        if let Some(shared) = types::emit_shared_types_file(ir) {
            files.push(shared);
        }
    }

    if run_cli {
        files.push(cli::emit_manifest_file(ir));
        let bin_name = config
            .cli
            .as_ref()
            .and_then(|c| c.publishable.as_ref())
            .map(|p| p.bin_name.as_str())
            .unwrap_or("cli");
        files.push(cli::emit_bin_file(bin_name));
        if let Some(publishable) = config.cli.as_ref().and_then(|c| c.publishable.as_ref()) {
            files.push(cli::emit_cli_package_manifest(publishable));
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorName;
    use crate::ir::adapt;
    use crate::ir::{AppHeader, AppIr, AppModule, AppRouter, Method, Route, SchemaRef};
    use serde_json::json;

    fn minimal_ir() -> CodegenIr {
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
    fn typescript_only_order_is_types_then_factory_then_client_then_index() {
        let ir = minimal_ir();
        let config = PipelineConfig { generators: vec![GeneratorName::Typescript], ..Default::default() };
        let files = run(&ir, &config);
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["types/users.ts", "modules/users.ts", "client.ts", "index.ts"]);
    }

    #[test]
    fn cli_disabled_emits_no_cli_files() {
        let ir = minimal_ir();
        let config = PipelineConfig { generators: vec![GeneratorName::Typescript], ..Default::default() };
        let files = run(&ir, &config);
        assert!(!files.iter().any(|f| f.path.starts_with("cli/")));
    }

    #[test]
    fn cli_enabled_appends_manifest_and_bin() {
        let ir = minimal_ir();
        let config = PipelineConfig {
            generators: vec![GeneratorName::Cli],
            cli: Some(crate::config::CliConfig { enabled: true, publishable: None }),
            ..Default::default()
        };
        let files = run(&ir, &config);
        assert!(files.iter().any(|f| f.path == "cli/manifest.ts"));
        assert!(files.iter().any(|f| f.path == "cli/bin.ts"));
    }
}
