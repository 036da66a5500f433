//! Analysis-time integration between the Error Prone checker ecosystem and
//! the code-quality server.
//!
//! The server's own machinery (project file index, configuration store, rule
//! catalog, issue persistence) sits behind the trait seams in [`host`]; the
//! compiler is a black box behind [`compiler::ErrorProneCompiler`]. What this
//! crate owns is the logic in between: selecting the active checkers,
//! building the compiler invocation, and translating every diagnostic the
//! compiler emits into the server's issue model.

pub mod compiler;
pub mod config;
pub mod deps;
pub mod host;
pub mod listener;
pub mod profile;
pub mod rules_definition;
pub mod sensor;
pub mod test_support;

use std::path::PathBuf;

use thiserror::Error;

use erroraway_rules::RulesError;

#[derive(Debug, Error)]
pub enum PluginError {
    /// Invalid or missing configuration; fails the analysis before any
    /// compiler work happens.
    #[error("{0}")]
    Configuration(String),

    /// The compiler reported its reserved crash diagnostic.
    #[error("compiler crash during code analysis, this is most likely a bug in the ErrorAway plugin, not in Error Prone:\n{0}")]
    CompilerCrash(String),

    /// A plain compiler error: the sources do not compile, so the analysis
    /// cannot continue.
    #[error("compilation error: {0}")]
    CompilationFailed(String),

    /// A checker diagnostic whose message does not follow the
    /// `[<CheckerName>] ...` convention; indicates a version mismatch between
    /// the plugin and the checker libraries.
    #[error("error parsing diagnostic with code {code} and message: {message}")]
    DiagnosticParse { code: String, message: String },

    #[error(transparent)]
    Rules(#[from] RulesError),

    /// A generated descriptor file is missing or malformed; the server must
    /// not start with a half-registered rule catalog.
    #[error("error loading rule metadata from {path}")]
    MetadataLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("error resolving {coordinates} from [{repositories}]")]
    DependencyResolution {
        coordinates: String,
        repositories: String,
    },

    /// IO failure while setting up or driving the compiler.
    #[error("error analyzing project")]
    Analysis(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;
