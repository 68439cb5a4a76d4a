//! Error taxonomy for the codegen pipeline.

use thiserror::Error;

/// Errors produced by the pipeline. Variants map onto the §7 taxonomy:
/// everything but `FormatterFailure` propagates to the caller; a formatter
/// failure is logged and never constructed as this type, since pass-through
/// means the pipeline keeps going with the unformatted files.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// `validate(config)` produced one or more messages and the caller chose
    /// to treat that as fatal rather than inspect the list itself.
    #[error("invalid pipeline configuration: {0:?}")]
    InvalidConfig(Vec<String>),

    /// C4 encountered a `$ref` whose target does not begin with `#`.
    #[error("unsupported external $ref '{reference}' in schema '{schema}'")]
    UnsupportedExternalRef { schema: String, reference: String },

    /// C5 invariant violated: an operation's `schemaRefs[slot]` names a
    /// schema absent from the resolved set. Should be unreachable for a
    /// well-formed App IR; signals a producer bug upstream.
    #[error("operation '{operation}' references unresolved schema '{schema}'")]
    UnresolvedSchemaRef { operation: String, schema: String },

    /// C11 filesystem failure. Fatal; no rollback of files already written.
    #[error("io error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] config_crate::ConfigError),
}

pub type Result<T> = std::result::Result<T, CodegenError>;
