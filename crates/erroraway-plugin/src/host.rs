//! Trait seams for the host server's collaborators.
//!
//! Everything the sensor needs from the server (configuration, the project
//! file index, the active-rule set, issue persistence, scratch directories)
//! is consumed through these traits so the core logic never depends on the
//! server's own types. The `test_support` module provides recording fakes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use erroraway_rules::RuleKey;

/// Project configuration lookup.
pub trait Configuration {
    fn get(&self, key: &str) -> Option<String>;

    /// Multi-valued properties; empty when the key is absent.
    fn get_string_array(&self, key: &str) -> Vec<String>;

    fn get_bool(&self, key: &str) -> Option<bool>;

    fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some() || !self.get_string_array(key).is_empty()
    }
}

/// A 1-based position inside an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPointer {
    pub line: u32,
    pub column: u32,
}

/// A half-open range between two pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: TextPointer,
    pub end: TextPointer,
}

#[derive(Debug, Error)]
#[error("line {line} is out of range 1..={line_count} for {file}")]
pub struct LocationError {
    pub file: String,
    pub line: u32,
    pub line_count: u32,
}

/// A source file tracked by the host's project index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    /// The URI the compiler reports for this file.
    pub uri: String,
    pub line_count: u32,
}

impl InputFile {
    /// Selects the whole of line `line` (1-based).
    pub fn select_line(&self, line: u32) -> std::result::Result<TextRange, LocationError> {
        let start = self.new_pointer(line, 0)?;
        Ok(TextRange {
            start,
            end: TextPointer {
                line: line + 1,
                column: 0,
            },
        })
    }

    pub fn new_pointer(
        &self,
        line: u32,
        column: u32,
    ) -> std::result::Result<TextPointer, LocationError> {
        if line == 0 || line > self.line_count {
            return Err(LocationError {
                file: self.path.display().to_string(),
                line,
                line_count: self.line_count,
            });
        }
        Ok(TextPointer { line, column })
    }
}

/// The host's project file index.
pub trait FileSystem {
    fn base_dir(&self) -> &Path;

    fn encoding(&self) -> &str;

    /// Resolves a compiler-reported source URI to a tracked input file.
    fn input_file_by_uri(&self, uri: &str) -> Option<InputFile>;

    /// The project's MAIN-scope Java sources. Test sources are deliberately
    /// excluded: dependency resolution for test scope is not guaranteed.
    fn main_java_files(&self) -> Vec<InputFile>;
}

/// The rules enabled by the project's quality profile.
pub trait ActiveRules {
    fn is_active(&self, rule: &RuleKey) -> bool;
}

/// A checker finding recorded against a project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub rule_key: RuleKey,
    pub file: PathBuf,
    pub range: TextRange,
    pub message: String,
}

/// A compiler problem not attributable to any rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisError {
    pub message: String,
    pub file: Option<PathBuf>,
    pub location: Option<TextPointer>,
}

/// One project analysis: configuration, file index, active rules and the
/// result sinks.
pub trait SensorContext {
    fn config(&self) -> &dyn Configuration;

    fn file_system(&self) -> &dyn FileSystem;

    fn active_rules(&self) -> &dyn ActiveRules;

    /// Classpath entries the host already resolved for the project.
    fn project_classpath(&self) -> Vec<PathBuf>;

    fn save_issue(&mut self, issue: Issue);

    fn save_analysis_error(&mut self, error: AnalysisError);
}

/// Scratch directory provider scoped to one analysis run.
pub trait TempFolder {
    fn new_dir(&self, name: &str) -> std::io::Result<PathBuf>;
}

/// [`TempFolder`] backed by the system temp directory.
#[derive(Debug, Default)]
pub struct SystemTempFolder;

static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

impl TempFolder for SystemTempFolder {
    fn new_dir(&self, name: &str) -> std::io::Result<PathBuf> {
        let base = std::env::temp_dir().join("erroraway");
        std::fs::create_dir_all(&base)?;
        let id = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = base.join(format!("{name}-{}-{id}", std::process::id()));
        std::fs::create_dir(&dir)?;
        Ok(dir)
    }
}

/// In-memory model of the host's rule catalog, filled at server startup by
/// the rule definition loader.
#[derive(Debug, Default)]
pub struct RuleCatalog {
    repositories: Vec<RuleRepository>,
}

#[derive(Debug)]
pub struct RuleRepository {
    pub key: String,
    pub language: String,
    pub name: String,
    pub rules: Vec<CatalogRule>,
}

#[derive(Debug)]
pub struct CatalogRule {
    pub key: String,
    pub name: String,
    pub severity: String,
    pub tags: Vec<String>,
    pub html_description: String,
}

impl RuleCatalog {
    pub fn add_repository(&mut self, repository: RuleRepository) {
        self.repositories.push(repository);
    }

    pub fn repositories(&self) -> &[RuleRepository] {
        &self.repositories
    }

    pub fn repository(&self, key: &str) -> Option<&RuleRepository> {
        self.repositories.iter().find(|r| r.key == key)
    }
}
