//! Loads the generated rule descriptors into the host's rule catalog at
//! server startup.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use erroraway_rules::descriptor::{
    rule_html_file_name, rule_json_file_name, RepositoryDescriptor, RuleDescriptor,
    REPOSITORY_FILE_NAME,
};
use erroraway_rules::repository::{display_name, REPOSITORIES};

use crate::host::{CatalogRule, RuleCatalog, RuleRepository};
use crate::{PluginError, Result};

/// Registers every rule repository from the descriptor tree generated at
/// packaging time. Any missing or malformed descriptor is fatal: the server
/// must not start with a half-registered rule catalog.
pub struct ErrorAwayRulesDefinition {
    resources_dir: PathBuf,
}

impl ErrorAwayRulesDefinition {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
        }
    }

    pub fn define(&self, catalog: &mut RuleCatalog) -> Result<()> {
        for repository in REPOSITORIES {
            self.load_repository(catalog, repository, display_name(repository))?;
        }
        Ok(())
    }

    pub fn load_repository(
        &self,
        catalog: &mut RuleCatalog,
        repository: &str,
        repository_name: &str,
    ) -> Result<()> {
        let folder = self.resources_dir.join(repository);
        let descriptor: RepositoryDescriptor = read_json(&folder.join(REPOSITORY_FILE_NAME))?;

        debug!("loading {} rules into repository {repository}", descriptor.rules.len());

        let mut rules = Vec::with_capacity(descriptor.rules.len());
        for rule_key in &descriptor.rules {
            let metadata: RuleDescriptor = read_json(&folder.join(rule_json_file_name(rule_key)))?;
            let html_path = folder.join(rule_html_file_name(rule_key));
            let html_description = fs::read_to_string(&html_path).map_err(|source| {
                PluginError::MetadataLoad {
                    path: html_path,
                    source: Box::new(source),
                }
            })?;

            rules.push(CatalogRule {
                key: rule_key.clone(),
                name: metadata.title,
                severity: metadata.default_severity,
                tags: metadata.tags,
                html_description,
            });
        }

        catalog.add_repository(RuleRepository {
            key: repository.to_string(),
            language: "java".to_string(),
            name: repository_name.to_string(),
            rules,
        });

        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| PluginError::MetadataLoad {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;

    serde_json::from_str(&data).map_err(|source| PluginError::MetadataLoad {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_repository_descriptor_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let definition = ErrorAwayRulesDefinition::new(tmp.path());

        let mut catalog = RuleCatalog::default();
        let err = definition.define(&mut catalog).unwrap_err();
        assert!(matches!(err, PluginError::MetadataLoad { .. }));
        assert!(catalog.repositories().is_empty());
    }

    #[test]
    fn malformed_repository_descriptor_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("errorprone");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(REPOSITORY_FILE_NAME), "{\"rules\": 12}").unwrap();

        let definition = ErrorAwayRulesDefinition::new(tmp.path());
        let mut catalog = RuleCatalog::default();
        assert!(definition
            .load_repository(&mut catalog, "errorprone", "Error Prone")
            .is_err());
    }

    #[test]
    fn referenced_rule_file_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("errorprone");
        fs::create_dir_all(&folder).unwrap();
        fs::write(
            folder.join(REPOSITORY_FILE_NAME),
            "{\"name\": \"Error Prone\", \"rules\": [\"BadImport\"]}",
        )
        .unwrap();

        let definition = ErrorAwayRulesDefinition::new(tmp.path());
        let mut catalog = RuleCatalog::default();
        let err = definition
            .load_repository(&mut catalog, "errorprone", "Error Prone")
            .unwrap_err();
        assert!(matches!(err, PluginError::MetadataLoad { .. }));
    }
}
