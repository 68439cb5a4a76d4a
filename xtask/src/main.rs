use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use vertz_codegen::config::GeneratorName;
use vertz_codegen::ir::{AppHeader, AppIr, AppModule, AppRouter, Method, Route, SchemaRef};
use vertz_codegen::PipelineConfig;

#[derive(Parser)]
#[command(name = "vertz-codegen-xtask")]
#[command(about = "Dev tooling for the code generator crate")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the golden fixtures under tests/fixtures from the
    /// pipeline's current output.
    RegenGolden {
        /// Directory to write golden output into.
        #[arg(short, long, default_value = "tests/fixtures/golden")]
        output: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::RegenGolden { output } => regen_golden(&output),
    }
}

// TODO: load App IR fixtures from tests/fixtures/*.json once AppIr derives
// Deserialize; for now this regenerates against the same seed-scenario IR
// the pipeline's own tests construct in Rust.
fn regen_golden(output: &str) -> anyhow::Result<()> {
    let app_ir = seed_scenario_app_ir();
    let config = PipelineConfig {
        generators: vec![GeneratorName::Typescript],
        output_dir: output.to_string(),
        ..Default::default()
    };

    let errors = vertz_codegen::validate(&config);
    if !errors.is_empty() {
        anyhow::bail!("invalid config: {:?}", errors);
    }

    let result = vertz_codegen::generate(&app_ir, &config, None)?;
    println!("regenerated {} golden file(s) in {}", result.file_count, PathBuf::from(output).display());
    Ok(())
}

fn seed_scenario_app_ir() -> AppIr {
    let listing = Route {
        method: Method::Get,
        path: "/api/v1/users".to_string(),
        operation_id: "listUsers".to_string(),
        tags: vec![],
        description: None,
        params: None,
        query: Some(SchemaRef::Inline { json_schema: json!({"type": "object", "properties": {"page": {"type": "number"}}}), resolved_fields: None }),
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
        description: None,
        params: Some(SchemaRef::Inline { json_schema: json!({"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}), resolved_fields: None }),
        query: None,
        body: None,
        headers: None,
        response: None,
        streaming: None,
    };
    AppIr {
        app: AppHeader::default(),
        modules: vec![AppModule { name: "users".to_string(), routers: vec![AppRouter { prefix: String::new(), routes: vec![listing, get_one] }] }],
        schemas: vec![],
        entities: vec![],
    }
}
