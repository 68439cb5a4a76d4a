//! Minimal end-to-end demonstration of the pipeline: builds a small App IR
//! in-process, resolves a default config, and writes the result to a
//! directory given on the command line (or `./demo-out`).

use anyhow::Context;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vertz_codegen::config::GeneratorName;
use vertz_codegen::ir::{AppHeader, AppIr, AppModule, AppRouter, Method, Route, SchemaRef};
use vertz_codegen::PipelineConfig;

fn demo_app_ir() -> AppIr {
    let listing = Route {
        method: Method::Get,
        path: "/api/v1/users".to_string(),
        operation_id: "listUsers".to_string(),
        tags: vec![],
        description: Some("List users.".to_string()),
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
    let get_one = Route {
        method: Method::Get,
        path: "/api/v1/users/:id".to_string(),
        operation_id: "getUser".to_string(),
        tags: vec![],
        description: Some("Fetch a single user by id.".to_string()),
        params: Some(SchemaRef::Inline {
            json_schema: json!({"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}),
            resolved_fields: None,
        }),
        query: None,
        body: None,
        headers: None,
        response: None,
        streaming: None,
    };
    AppIr {
        app: AppHeader { base_path: "/api/v1".to_string(), version: Some("0.1.0".to_string()) },
        modules: vec![AppModule {
            name: "users".to_string(),
            routers: vec![AppRouter { prefix: "".to_string(), routes: vec![listing, get_one] }],
        }],
        schemas: vec![],
        entities: vec![],
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let output_dir = std::env::args().nth(1).unwrap_or_else(|| "demo-out".to_string());
    let config = PipelineConfig { generators: vec![GeneratorName::Typescript], output_dir, ..Default::default() };

    let errors = vertz_codegen::validate(&config);
    if !errors.is_empty() {
        anyhow::bail!("invalid config: {:?}", errors);
    }

    let app_ir = demo_app_ir();
    let result = vertz_codegen::generate(&app_ir, &config, None).context("pipeline run failed")?;

    println!("wrote {} file(s) to {}", result.file_count, PathBuf::from(&config.output_dir).display());
    if let Some(report) = result.incremental {
        println!("written={} skipped={} removed={}", report.written.len(), report.skipped.len(), report.removed.len());
    }
    Ok(())
}
