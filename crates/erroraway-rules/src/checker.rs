use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{repository, Result, RulesError};

/// Checker-declared default severity, as found on the `@BugPattern`
/// annotation of the checker class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckerSeverity {
    Error,
    Warning,
    Suggestion,
    /// Disabled-by-default checkers; never mapped to a host severity.
    Hidden,
}

/// Metadata for a single checker, as reported by the checker library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerInfo {
    /// Fully qualified name of the checker class.
    pub class_name: String,
    /// The checker's self-reported canonical name; doubles as the rule key
    /// within its repository.
    pub canonical_name: String,
    pub severity: CheckerSeverity,
    #[serde(default)]
    pub tags: Vec<String>,
    /// The checker's one-line description.
    pub message: String,
    /// Documentation URL declared by the checker, when it declares one.
    #[serde(default)]
    pub link_url: Option<String>,
}

impl CheckerInfo {
    /// The rule repository this checker belongs to, derived from its class name.
    pub fn repository(&self) -> Result<&'static str> {
        repository::repository_for_class(&self.class_name)
    }

    /// The fully qualified rule key for this checker.
    pub fn rule_key(&self) -> Result<RuleKey> {
        Ok(RuleKey::new(self.repository()?, &self.canonical_name))
    }
}

/// Addresses one rule: `(repository, canonical checker name)`.
///
/// The wire format consumed and produced by the host issue API is
/// `<repositoryKey>:<canonicalRuleName>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    repository: String,
    rule: String,
}

impl RuleKey {
    pub fn new(repository: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            rule: rule.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.rule)
    }
}

impl FromStr for RuleKey {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((repository, rule)) if !repository.is_empty() && !rule.is_empty() => {
                Ok(RuleKey::new(repository, rule))
            }
            _ => Err(RulesError::InvalidRuleKey(s.to_string())),
        }
    }
}
