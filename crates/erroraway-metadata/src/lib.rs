//! Build-time generation of the rule catalog descriptors.
//!
//! For every discovered checker this crate derives a rule descriptor
//! (severity, tags, status) and an HTML description, and writes one file pair
//! per rule plus one aggregate file per repository. The analysis plugin reads
//! these files back at server startup; nothing here runs at analysis time.

mod descriptions;
mod generator;

pub use descriptions::DescriptionStore;
pub use generator::RuleMetadataGenerator;

use erroraway_rules::{CheckerSeverity, RulesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("unexpected severity {severity:?} for rule {rule}")]
    UnexpectedSeverity {
        rule: String,
        severity: CheckerSeverity,
    },

    #[error("tag `{tag}` of rule {rule} contains characters the rule catalog rejects")]
    InvalidTag { rule: String, tag: String },

    #[error("error reading description for rule {rule}")]
    Description {
        rule: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing descriptor for rule {rule}")]
    WriteRule {
        rule: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing repository descriptor for {repository}")]
    WriteRepository {
        repository: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
