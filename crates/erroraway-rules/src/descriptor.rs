//! On-disk descriptor formats shared by the metadata generator and the rule
//! definition loader.
//!
//! The generator writes these files at packaging time and the loader reads
//! them back at server startup; keeping one serde model for both sides is
//! what guarantees they agree on file naming and JSON shape.

use serde::{Deserialize, Serialize};

/// File name of the per-repository aggregate descriptor.
pub const REPOSITORY_FILE_NAME: &str = "repository.json";

/// Host severity values used in rule descriptors.
pub const SEVERITY_MAJOR: &str = "MAJOR";
pub const SEVERITY_MINOR: &str = "MINOR";
pub const SEVERITY_INFO: &str = "INFO";

pub const RULE_TYPE_CODE_SMELL: &str = "CODE_SMELL";
pub const RULE_STATUS_READY: &str = "READY";

/// Per-rule metadata descriptor, stored as `<repository>/<ruleKey>.json`.
///
/// The rendered HTML description lives next to it as `<ruleKey>.html`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    pub title: String,
    pub default_severity: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub status: String,
    pub tags: Vec<String>,
}

/// Aggregate repository descriptor, stored as `<repository>/repository.json`.
///
/// `rules` is ordered; the loader registers rules in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub rules: Vec<String>,
}

/// File name of a rule's JSON metadata descriptor.
pub fn rule_json_file_name(rule_key: &str) -> String {
    format!("{rule_key}.json")
}

/// File name of a rule's rendered HTML description.
pub fn rule_html_file_name(rule_key: &str) -> String {
    format!("{rule_key}.html")
}
