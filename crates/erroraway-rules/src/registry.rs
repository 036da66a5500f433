//! Built-in checker catalog and plugin checker discovery.
//!
//! The built-in Error Prone checker sets are a constant input: the compiler
//! library enables them by default, and this crate bundles their metadata as
//! an embedded catalog. Plugin checkers (NullAway, SLF4J, AutoDispose,
//! Picnic) are discovered at runtime in the original design; here the
//! embedding server passes every provider explicitly and the registry never
//! touches the class-loading context itself.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::{repository, CheckerInfo, Result};

const BUILTIN_CATALOG: &str = include_str!("../catalog/builtin-checkers.json");
const BUNDLED_PLUGIN_CATALOG: &str = include_str!("../catalog/plugin-checkers.json");

/// The two checker sets Error Prone enables by default.
#[derive(Debug, Clone, Deserialize)]
pub struct BuiltInCheckers {
    pub enabled_warnings: Vec<CheckerInfo>,
    pub enabled_errors: Vec<CheckerInfo>,
}

impl BuiltInCheckers {
    /// All built-in checkers, warnings first.
    pub fn all(&self) -> impl Iterator<Item = &CheckerInfo> {
        self.enabled_warnings.iter().chain(self.enabled_errors.iter())
    }
}

/// The built-in checker sets, parsed once from the embedded catalog.
pub fn builtin() -> &'static BuiltInCheckers {
    static BUILTIN: OnceLock<BuiltInCheckers> = OnceLock::new();
    BUILTIN.get_or_init(|| {
        serde_json::from_str(BUILTIN_CATALOG).expect("embedded built-in checker catalog is valid")
    })
}

/// A source of plugin checkers.
///
/// Stands in for classpath service discovery: the embedding server constructs
/// the registry with every provider it knows about, and the core logic only
/// ever sees the resulting sequence of checker descriptors.
pub trait PluginCheckerProvider: Send + Sync {
    fn checkers(&self) -> Vec<CheckerInfo>;
}

/// The plugin checker catalogs shipped alongside the analyzer.
pub struct BundledPluginCheckers;

impl PluginCheckerProvider for BundledPluginCheckers {
    fn checkers(&self) -> Vec<CheckerInfo> {
        static BUNDLED: OnceLock<Vec<CheckerInfo>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| {
                serde_json::from_str(BUNDLED_PLUGIN_CATALOG)
                    .expect("embedded plugin checker catalog is valid")
            })
            .clone()
    }
}

/// All checkers known for one analysis setup: the built-in sets plus the
/// plugin checkers collected from the configured providers.
pub struct CheckerRegistry {
    plugins: Vec<CheckerInfo>,
}

impl CheckerRegistry {
    pub fn new(providers: &[&dyn PluginCheckerProvider]) -> Self {
        let plugins = providers.iter().flat_map(|p| p.checkers()).collect();
        Self { plugins }
    }

    /// Registry backed by the bundled plugin catalogs.
    pub fn with_bundled_plugins() -> Self {
        Self::new(&[&BundledPluginCheckers])
    }

    pub fn builtin(&self) -> &'static BuiltInCheckers {
        builtin()
    }

    pub fn plugin_checkers(&self) -> &[CheckerInfo] {
        &self.plugins
    }

    /// Buckets every plugin checker by rule repository.
    ///
    /// Fails with the classifier's error on the first checker that does not
    /// belong to a known package root: one bad plugin checker must not
    /// silently disappear from the catalog.
    pub fn plugin_checkers_by_repository(&self) -> Result<BTreeMap<&'static str, Vec<&CheckerInfo>>> {
        let mut buckets: BTreeMap<&'static str, Vec<&CheckerInfo>> = BTreeMap::new();
        for checker in &self.plugins {
            let repository = repository::repository_for_class(&checker.class_name)?;
            buckets.entry(repository).or_default().push(checker);
        }
        Ok(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{
        AUTODISPOSE2_REPOSITORY, ERRORPRONE_SLF4J_REPOSITORY, NULLAWAY_REPOSITORY,
        PICNIC_REPOSITORY,
    };
    use crate::CheckerSeverity;

    // Version-pinned counts for the bundled catalogs. These are regression
    // tripwires, not runtime constants: production code always recomputes
    // from the catalog itself.
    const ERRORPRONE_RULES_COUNT: usize = 38;
    const NULLAWAY_RULES_COUNT: usize = 1;
    const ERRORPRONE_SLF4J_RULES_COUNT: usize = 8;
    const AUTODISPOSE2_RULES_COUNT: usize = 1;
    const PICNIC_RULES_COUNT: usize = 14;

    #[test]
    fn builtin_catalog_parses_and_matches_pinned_counts() {
        let builtin = builtin();
        assert!(!builtin.enabled_warnings.is_empty());
        assert!(!builtin.enabled_errors.is_empty());
        assert_eq!(builtin.all().count(), ERRORPRONE_RULES_COUNT);
    }

    #[test]
    fn builtin_checkers_all_classify_into_the_core_repository() {
        for checker in builtin().all() {
            assert_eq!(
                repository::repository_for_class(&checker.class_name).unwrap(),
                repository::ERRORPRONE_REPOSITORY,
                "{} is not an Error Prone built-in",
                checker.class_name
            );
        }
    }

    #[test]
    fn builtin_severities_are_mappable() {
        // HIDDEN checkers are never part of the enabled sets.
        for checker in builtin().all() {
            assert_ne!(checker.severity, CheckerSeverity::Hidden, "{}", checker.canonical_name);
        }
    }

    #[test]
    fn bundled_plugins_group_by_repository() {
        let registry = CheckerRegistry::with_bundled_plugins();
        let buckets = registry.plugin_checkers_by_repository().unwrap();

        assert_eq!(buckets[NULLAWAY_REPOSITORY].len(), NULLAWAY_RULES_COUNT);
        assert_eq!(buckets[ERRORPRONE_SLF4J_REPOSITORY].len(), ERRORPRONE_SLF4J_RULES_COUNT);
        assert_eq!(buckets[AUTODISPOSE2_REPOSITORY].len(), AUTODISPOSE2_RULES_COUNT);
        assert_eq!(buckets[PICNIC_REPOSITORY].len(), PICNIC_RULES_COUNT);

        let plugin_total: usize = buckets.values().map(Vec::len).sum();
        assert_eq!(plugin_total, registry.plugin_checkers().len());
    }

    #[test]
    fn unclassifiable_plugin_checker_aborts_grouping() {
        struct BadProvider;
        impl PluginCheckerProvider for BadProvider {
            fn checkers(&self) -> Vec<CheckerInfo> {
                vec![CheckerInfo {
                    class_name: "org.acme.RogueChecker".to_string(),
                    canonical_name: "RogueChecker".to_string(),
                    severity: CheckerSeverity::Warning,
                    tags: Vec::new(),
                    message: "rogue".to_string(),
                    link_url: None,
                }]
            }
        }

        let registry = CheckerRegistry::new(&[&BadProvider]);
        assert!(registry.plugin_checkers_by_repository().is_err());
    }

    #[test]
    fn canonical_names_unique_within_each_repository() {
        let registry = CheckerRegistry::with_bundled_plugins();

        let mut seen = std::collections::HashSet::new();
        for checker in builtin().all() {
            assert!(seen.insert(checker.canonical_name.clone()), "{}", checker.canonical_name);
        }

        for (_, checkers) in registry.plugin_checkers_by_repository().unwrap() {
            let mut seen = std::collections::HashSet::new();
            for checker in checkers {
                assert!(seen.insert(&checker.canonical_name), "{}", checker.canonical_name);
            }
        }
    }
}
