//! Resolved pipeline configuration (§6) and its layered loader (§12).
//!
//! `generate`/`validate`/`resolveOutputDir` all take an already-resolved
//! [`PipelineConfig`] value; this module's [`load`] function is the only
//! place that touches files or environment variables, keeping the pipeline
//! itself a pure function of its inputs.

use config_crate::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One of the two generators the orchestrator knows how to run (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorName {
    Typescript,
    Cli,
}

impl GeneratorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorName::Typescript => "typescript",
            GeneratorName::Cli => "cli",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypescriptPublishable {
    pub name: String,
    pub output_dir: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypescriptConfig {
    #[serde(default)]
    pub schemas: bool,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub publishable: Option<TypescriptPublishable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliPublishable {
    pub name: String,
    pub output_dir: String,
    pub bin_name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub publishable: Option<CliPublishable>,
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> String {
    ".vertz/generated".to_string()
}

/// The resolved configuration `generate`/`validate`/`resolveOutputDir` take,
/// matching §6's external-interface shape exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub generators: Vec<GeneratorName>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_true")]
    pub format: bool,
    #[serde(default = "default_true")]
    pub incremental: bool,
    #[serde(default)]
    pub typescript: Option<TypescriptConfig>,
    #[serde(default)]
    pub cli: Option<CliConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generators: Vec::new(),
            output_dir: default_output_dir(),
            format: true,
            incremental: true,
            typescript: None,
            cli: None,
        }
    }
}

impl PipelineConfig {
    /// §4.12 `validate`: a non-exhaustive list of human-readable problems,
    /// empty when the config is usable as-is.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.generators.is_empty() {
            errors.push("generators must name at least one generator".to_string());
        }
        if self.generators.contains(&GeneratorName::Cli) {
            match &self.cli {
                Some(cli) if cli.enabled => {
                    if let Some(publishable) = &cli.publishable {
                        if publishable.name.is_empty() {
                            errors.push("cli.publishable.name is required".to_string());
                        }
                        if publishable.bin_name.is_empty() {
                            errors.push("cli.publishable.binName is required".to_string());
                        }
                    }
                }
                _ => errors.push("cli generator selected but cli.enabled is not set".to_string()),
            }
        }
        if self.generators.contains(&GeneratorName::Typescript) {
            if let Some(publishable) = self.typescript.as_ref().and_then(|t| t.publishable.as_ref()) {
                if publishable.name.is_empty() {
                    errors.push("typescript.publishable.name is required".to_string());
                }
            }
        }
        errors
    }

    /// §4.12 `resolveOutputDir`: `outputDir` resolved against the current
    /// working directory, defaulting to `.vertz/generated`.
    pub fn resolve_output_dir(&self) -> PathBuf {
        let dir = Path::new(&self.output_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir().unwrap_or_default().join(dir)
        }
    }
}

/// Layered load: `vertz.toml`/`.vertz.toml` in the current directory, then a
/// user config directory, then an explicit path, then `VERTZ_CODEGEN__`
/// environment overrides (§12).
pub fn load(explicit_path: Option<&Path>) -> Result<PipelineConfig, config_crate::ConfigError> {
    let mut builder = Config::builder();

    for candidate in ["vertz.toml", ".vertz.toml"] {
        if Path::new(candidate).exists() {
            builder = builder.add_source(File::new(candidate, FileFormat::Toml));
        }
    }

    if let Some(dirs) = ProjectDirs::from("dev", "vertz", "codegen") {
        let user_config = dirs.config_dir().join("vertz.toml");
        if user_config.exists() {
            builder = builder.add_source(File::from(user_config));
        }
    }

    if let Some(path) = explicit_path {
        builder = builder.add_source(File::from(path.to_path_buf()));
    }

    builder = builder.add_source(Environment::with_prefix("VERTZ_CODEGEN").separator("__"));

    builder.build()?.try_deserialize()
}
