//! Pipeline façade (C12, §4.12): the single entry point embedding binaries
//! call. Validates config, drives the orchestrator, and (optionally) formats
//! and writes to disk.

use crate::config::PipelineConfig;
use crate::emit::GeneratedFile;
use crate::error::{CodegenError, Result};
use crate::format::{format_files, FormatterConfig};
use crate::ir::{adapt, AppIr, CodegenIr};
use crate::orchestrator;
use crate::write::{self, WriteReport};
use tracing::{info, instrument};

/// `validate(config)`: a list of human-readable problems, empty when the
/// config is directly usable by `generate`.
pub fn validate(config: &PipelineConfig) -> Vec<String> {
    config.validate()
}

/// `resolveOutputDir(config)`.
pub fn resolve_output_dir(config: &PipelineConfig) -> std::path::PathBuf {
    config.resolve_output_dir()
}

#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub files: Vec<GeneratedFile>,
    pub ir: CodegenIr,
    pub file_count: usize,
    pub generators: Vec<String>,
    pub incremental: Option<WriteReport>,
}

/// `generate(appIR, config)`: adapt -> run selected emitters -> optional
/// format -> write (incremental or bulk). The only suspension points are the
/// formatter process and file I/O (§5).
#[instrument(skip_all, name = "generate")]
pub fn generate(app_ir: &AppIr, config: &PipelineConfig, formatter: Option<&FormatterConfig>) -> Result<GenerateResult> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(CodegenError::InvalidConfig(errors));
    }

    let ir = adapt(app_ir);
    info!(
        modules = ir.modules.len(),
        schemas = ir.schemas.len(),
        "adapted app IR into codegen IR"
    );

    let files = orchestrator::run(&ir, config);
    let files = if config.format { format_files(files, formatter) } else { files };

    let output_dir = config.resolve_output_dir();
    let incremental = write::write(&files, &output_dir, false)?;

    Ok(GenerateResult {
        file_count: files.len(),
        files,
        ir,
        generators: config.generators.iter().map(|g| g.as_str().to_string()).collect(),
        incremental: if config.incremental { Some(incremental) } else { None },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorName;
    use crate::ir::{AppHeader, AppIr, AppModule, AppRouter, Method, Route, SchemaRef};
    use serde_json::json;

    fn minimal_app_ir() -> AppIr {
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
        AppIr {
            app: AppHeader::default(),
            modules: vec![AppModule {
                name: "users".to_string(),
                routers: vec![AppRouter { prefix: "".to_string(), routes: vec![route] }],
            }],
            schemas: vec![],
            entities: vec![],
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_adapting() {
        let app_ir = minimal_app_ir();
        let config = PipelineConfig::default();
        let result = generate(&app_ir, &config, None);
        assert!(matches!(result, Err(CodegenError::InvalidConfig(_))));
    }

    #[test]
    fn generate_writes_files_to_a_temp_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app_ir = minimal_app_ir();
        let config = PipelineConfig {
            generators: vec![GeneratorName::Typescript],
            output_dir: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        let result = generate(&app_ir, &config, None).unwrap();
        assert!(result.file_count > 0);
        assert!(dir.path().join("client.ts").exists());
        let report = result.incremental.unwrap();
        assert!(!report.written.is_empty());
    }

    #[test]
    fn second_generate_call_skips_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        let app_ir = minimal_app_ir();
        let config = PipelineConfig {
            generators: vec![GeneratorName::Typescript],
            output_dir: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        generate(&app_ir, &config, None).unwrap();
        let second = generate(&app_ir, &config, None).unwrap();
        let report = second.incremental.unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.skipped.len(), second.file_count);
    }
}
