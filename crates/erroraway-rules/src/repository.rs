//! Rule repositories and the checker-class → repository classifier.
//!
//! Each checker-supplying library owns one fixed package prefix. The prefixes
//! are disjoint package roots, so lookup order does not affect the result.

use crate::{Result, RulesError};

pub const ERRORPRONE_REPOSITORY: &str = "errorprone";
pub const NULLAWAY_REPOSITORY: &str = "nullaway";
pub const ERRORPRONE_SLF4J_REPOSITORY: &str = "errorprone-slf4j";
pub const AUTODISPOSE2_REPOSITORY: &str = "autodispose2";
pub const PICNIC_REPOSITORY: &str = "picnic-errorprone";

/// Every rule repository, in registration order.
pub const REPOSITORIES: [&str; 5] = [
    ERRORPRONE_REPOSITORY,
    NULLAWAY_REPOSITORY,
    ERRORPRONE_SLF4J_REPOSITORY,
    AUTODISPOSE2_REPOSITORY,
    PICNIC_REPOSITORY,
];

/// Adding a new checker source means adding exactly one row here.
const CLASS_PREFIXES: [(&str, &str); 5] = [
    ("com.google.errorprone.", ERRORPRONE_REPOSITORY),
    ("com.uber.nullaway.", NULLAWAY_REPOSITORY),
    ("jp.skypencil.errorprone.slf4j.", ERRORPRONE_SLF4J_REPOSITORY),
    ("autodispose2.", AUTODISPOSE2_REPOSITORY),
    ("tech.picnic.errorprone.", PICNIC_REPOSITORY),
];

/// Maps a checker's fully qualified class name to its rule repository.
///
/// Fails on classes outside the configured package roots: an unclassifiable
/// checker indicates a library-version mismatch, not a data problem.
pub fn repository_for_class(class_name: &str) -> Result<&'static str> {
    CLASS_PREFIXES
        .iter()
        .find(|(prefix, _)| class_name.starts_with(prefix))
        .map(|(_, repository)| *repository)
        .ok_or_else(|| RulesError::UnknownRepository(class_name.to_string()))
}

/// Human-readable repository name, as shown in the server's rule catalog.
pub fn display_name(repository: &str) -> &'static str {
    match repository {
        ERRORPRONE_REPOSITORY => "Error Prone",
        NULLAWAY_REPOSITORY => "Null Away",
        ERRORPRONE_SLF4J_REPOSITORY => "Error Prone SLF4J",
        AUTODISPOSE2_REPOSITORY => "AutoDispose",
        PICNIC_REPOSITORY => "Picnic Error Prone Support",
        other => panic!("unknown repository key {other}"),
    }
}
