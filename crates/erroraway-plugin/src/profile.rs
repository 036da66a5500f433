//! Built-in quality profile definitions.
//!
//! One profile per rule repository plus the aggregate profile activating
//! every rule from every repository. Activations come from the rule catalog
//! the definition loader filled, never recomputed from the checker sets.

use erroraway_rules::repository::{
    AUTODISPOSE2_REPOSITORY, ERRORPRONE_REPOSITORY, ERRORPRONE_SLF4J_REPOSITORY,
    NULLAWAY_REPOSITORY, PICNIC_REPOSITORY, REPOSITORIES,
};
use erroraway_rules::RuleKey;

use crate::host::RuleCatalog;

pub const ERROR_PRONE_PROFILE_NAME: &str = "Error Prone";
pub const NULL_AWAY_PROFILE_NAME: &str = "Null Away";
pub const ERROR_PRONE_SLF4J_PROFILE_NAME: &str = "Error Prone SLF4J";
pub const AUTODISPOSE2_PROFILE_NAME: &str = "Autodispose2";
pub const PICNIC_PROFILE_NAME: &str = "Picnic Error Prone Support";
pub const ERROR_PRONE_AND_PLUGINS_PROFILE_NAME: &str = "Error Prone and plugins";

/// A built-in quality profile and its activated rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInProfile {
    pub name: String,
    pub language: String,
    pub activations: Vec<RuleKey>,
}

/// Query seam over the registered rule catalog.
pub trait RuleFinder {
    /// The keys of every rule registered under `repository`.
    fn rule_keys(&self, repository: &str) -> Vec<String>;
}

impl RuleFinder for RuleCatalog {
    fn rule_keys(&self, repository: &str) -> Vec<String> {
        self.repository(repository)
            .map(|r| r.rules.iter().map(|rule| rule.key.clone()).collect())
            .unwrap_or_default()
    }
}

pub struct ErrorAwayQualityProfile<'a> {
    rule_finder: &'a dyn RuleFinder,
}

impl<'a> ErrorAwayQualityProfile<'a> {
    pub fn new(rule_finder: &'a dyn RuleFinder) -> Self {
        Self { rule_finder }
    }

    /// Builds all built-in profiles.
    pub fn define(&self) -> Vec<BuiltInProfile> {
        let mut aggregate = BuiltInProfile {
            name: ERROR_PRONE_AND_PLUGINS_PROFILE_NAME.to_string(),
            language: "java".to_string(),
            activations: Vec::new(),
        };

        let mut profiles = Vec::new();
        for repository in REPOSITORIES {
            let mut profile = BuiltInProfile {
                name: profile_name(repository).to_string(),
                language: "java".to_string(),
                activations: Vec::new(),
            };

            for rule in self.rule_finder.rule_keys(repository) {
                profile.activations.push(RuleKey::new(repository, &rule));
                aggregate.activations.push(RuleKey::new(repository, &rule));
            }

            profiles.push(profile);
        }

        profiles.push(aggregate);
        profiles
    }
}

fn profile_name(repository: &str) -> &'static str {
    match repository {
        ERRORPRONE_REPOSITORY => ERROR_PRONE_PROFILE_NAME,
        NULLAWAY_REPOSITORY => NULL_AWAY_PROFILE_NAME,
        ERRORPRONE_SLF4J_REPOSITORY => ERROR_PRONE_SLF4J_PROFILE_NAME,
        AUTODISPOSE2_REPOSITORY => AUTODISPOSE2_PROFILE_NAME,
        PICNIC_REPOSITORY => PICNIC_PROFILE_NAME,
        other => panic!("unknown repository key {other}"),
    }
}
