//! Writes the per-rule and per-repository descriptor files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use erroraway_rules::descriptor::{
    rule_html_file_name, rule_json_file_name, RepositoryDescriptor, RuleDescriptor,
    REPOSITORY_FILE_NAME, RULE_STATUS_READY, RULE_TYPE_CODE_SMELL, SEVERITY_INFO, SEVERITY_MAJOR,
    SEVERITY_MINOR,
};
use erroraway_rules::repository::{display_name, ERRORPRONE_REPOSITORY};
use erroraway_rules::{CheckerInfo, CheckerRegistry, CheckerSeverity};

use crate::descriptions::DescriptionStore;
use crate::{MetadataError, Result};

/// Generates the descriptor tree consumed by the rule definition loader:
/// `<output>/<repository>/<ruleKey>.json`, `<ruleKey>.html` and
/// `repository.json`.
pub struct RuleMetadataGenerator<'a> {
    output_dir: &'a Path,
    descriptions: &'a DescriptionStore,
}

impl<'a> RuleMetadataGenerator<'a> {
    pub fn new(output_dir: &'a Path, descriptions: &'a DescriptionStore) -> Self {
        Self {
            output_dir,
            descriptions,
        }
    }

    /// Generates descriptors for every repository: the built-in checkers all
    /// land in the core repository, plugin checkers in their classified ones.
    pub fn generate_all(&self, registry: &CheckerRegistry) -> Result<()> {
        let builtin: Vec<&CheckerInfo> = registry.builtin().all().collect();
        self.process_checkers(ERRORPRONE_REPOSITORY, &builtin)?;

        for (repository, checkers) in registry.plugin_checkers_by_repository()? {
            self.process_checkers(repository, &checkers)?;
        }

        Ok(())
    }

    /// Writes one descriptor pair per checker plus the repository aggregate.
    pub fn process_checkers(&self, repository: &str, checkers: &[&CheckerInfo]) -> Result<()> {
        let repository_dir = self.output_dir.join(repository);
        fs::create_dir_all(&repository_dir).map_err(|source| MetadataError::WriteRepository {
            repository: repository.to_string(),
            source,
        })?;

        let mut rule_keys = Vec::with_capacity(checkers.len());
        for checker in checkers {
            let rule_key = checker.canonical_name.clone();
            debug!("generating metadata for {repository}:{rule_key}");

            self.write_rule_metadata(&repository_dir, checker)?;
            self.write_rule_description(&repository_dir, repository, checker)?;

            rule_keys.push(rule_key);
        }

        self.write_repository_metadata(repository, &repository_dir, rule_keys)?;
        info!("generated {} rule descriptors for {repository}", checkers.len());
        Ok(())
    }

    fn write_rule_metadata(&self, directory: &Path, checker: &CheckerInfo) -> Result<()> {
        let rule = &checker.canonical_name;
        let descriptor = RuleDescriptor {
            title: rule.clone(),
            default_severity: severity(checker)?.to_string(),
            rule_type: RULE_TYPE_CODE_SMELL.to_string(),
            status: RULE_STATUS_READY.to_string(),
            tags: checker
                .tags
                .iter()
                .map(|tag| normalize_tag(rule, tag))
                .collect::<Result<Vec<_>>>()?,
        };

        let json = serde_json::to_string(&descriptor)?;
        write_rule_file(directory.join(rule_json_file_name(rule)), rule, &json)
    }

    fn write_rule_description(
        &self,
        directory: &Path,
        repository: &str,
        checker: &CheckerInfo,
    ) -> Result<()> {
        let rule = &checker.canonical_name;
        let html = self.descriptions.render(repository, checker)?;
        write_rule_file(directory.join(rule_html_file_name(rule)), rule, &html)
    }

    fn write_repository_metadata(
        &self,
        repository: &str,
        directory: &Path,
        rule_keys: Vec<String>,
    ) -> Result<()> {
        let descriptor = RepositoryDescriptor {
            name: display_name(repository).to_string(),
            rules: rule_keys,
        };

        let json = serde_json::to_string(&descriptor)?;
        fs::write(directory.join(REPOSITORY_FILE_NAME), json).map_err(|source| {
            MetadataError::WriteRepository {
                repository: repository.to_string(),
                source,
            }
        })
    }
}

fn write_rule_file(path: PathBuf, rule: &str, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| MetadataError::WriteRule {
        rule: rule.to_string(),
        source,
    })
}

/// Maps a checker-declared severity onto the host's scale. HIDDEN checkers
/// are never part of an enabled set, so hitting one is a configuration
/// defect and fails the build.
pub fn severity(checker: &CheckerInfo) -> Result<&'static str> {
    match checker.severity {
        CheckerSeverity::Error => Ok(SEVERITY_MAJOR),
        CheckerSeverity::Warning => Ok(SEVERITY_MINOR),
        CheckerSeverity::Suggestion => Ok(SEVERITY_INFO),
        severity => Err(MetadataError::UnexpectedSeverity {
            rule: checker.canonical_name.clone(),
            severity,
        }),
    }
}

/// Rule tags accept only the characters: a-z, 0-9, '+', '-', '#', '.'
pub fn normalize_tag(rule: &str, tag: &str) -> Result<String> {
    let tag = tag.to_lowercase();
    let valid = tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '#' | '.'));
    if valid {
        Ok(tag)
    } else {
        Err(MetadataError::InvalidTag {
            rule: rule.to_string(),
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(severity: CheckerSeverity) -> CheckerInfo {
        CheckerInfo {
            class_name: "com.google.errorprone.bugpatterns.BadImport".to_string(),
            canonical_name: "BadImport".to_string(),
            severity,
            tags: vec!["Style".to_string()],
            message: "Importing nested classes can make code harder to read".to_string(),
            link_url: Some("https://errorprone.info/bugpattern/BadImport".to_string()),
        }
    }

    #[test]
    fn severity_mapping() {
        assert_eq!(severity(&checker(CheckerSeverity::Error)).unwrap(), "MAJOR");
        assert_eq!(severity(&checker(CheckerSeverity::Warning)).unwrap(), "MINOR");
        assert_eq!(severity(&checker(CheckerSeverity::Suggestion)).unwrap(), "INFO");
    }

    #[test]
    fn hidden_severity_is_a_fatal_generation_error() {
        let err = severity(&checker(CheckerSeverity::Hidden)).unwrap_err();
        assert!(matches!(err, MetadataError::UnexpectedSeverity { .. }));
    }

    #[test]
    fn tags_are_lower_cased() {
        assert_eq!(normalize_tag("BadImport", "FragileCode").unwrap(), "fragilecode");
        assert_eq!(normalize_tag("BadImport", "c#").unwrap(), "c#");
        assert_eq!(normalize_tag("BadImport", "java-8").unwrap(), "java-8");
    }

    #[test]
    fn tags_outside_the_catalog_charset_fail_generation() {
        let err = normalize_tag("BadImport", "bad tag").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidTag { .. }));
        assert!(normalize_tag("BadImport", "tag_with_underscore").is_err());
    }
}
