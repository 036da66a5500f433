//! Checker → rule-repository mapping shared by the metadata generator and
//! the analysis plugin.
//!
//! Every checker class belongs to exactly one rule repository, keyed by the
//! package prefix of the library that ships it. This crate owns that mapping,
//! the checker catalog (built-in Error Prone checkers plus plugin checkers),
//! and the descriptor file formats written at packaging time and read back at
//! server startup.

mod checker;
pub mod descriptor;
pub mod registry;
pub mod repository;

pub use checker::{CheckerInfo, CheckerSeverity, RuleKey};
pub use registry::{BuiltInCheckers, BundledPluginCheckers, CheckerRegistry, PluginCheckerProvider};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("could not find rules repository for class {0}")]
    UnknownRepository(String),

    #[error("invalid rule key `{0}`, expected `<repository>:<rule>`")]
    InvalidRuleKey(String),
}

pub type Result<T> = std::result::Result<T, RulesError>;
