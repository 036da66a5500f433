//! Recording fakes for the host seams, used by this crate's tests and by
//! embedders writing their own.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use erroraway_rules::RuleKey;

use crate::compiler::{CompilationRequest, ErrorProneCompiler};
use crate::host::{
    ActiveRules, AnalysisError, Configuration, FileSystem, InputFile, Issue, SensorContext,
};
use crate::listener::Diagnostic;
use crate::Result;

/// [`Configuration`] backed by a map. Multi-valued properties are stored
/// comma-separated, matching the host's own convention.
#[derive(Debug, Default)]
pub struct MapConfiguration {
    values: HashMap<String, String>,
}

impl MapConfiguration {
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl Configuration for MapConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn get_string_array(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(value) => value.split(',').map(|s| s.trim().to_string()).collect(),
            None => Vec::new(),
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.parse().ok())
    }
}

#[derive(Debug, Clone)]
pub struct TestFile {
    pub uri: String,
    pub path: PathBuf,
    pub line_count: u32,
}

/// [`FileSystem`] over a fixed file list.
#[derive(Debug)]
pub struct TestFileSystem {
    pub base_dir: PathBuf,
    pub encoding: String,
    files: Vec<TestFile>,
}

impl Default for TestFileSystem {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("/project"),
            encoding: "UTF-8".to_string(),
            files: Vec::new(),
        }
    }
}

impl TestFileSystem {
    pub fn add_file(&mut self, file: TestFile) -> &mut Self {
        self.files.push(file);
        self
    }
}

impl FileSystem for TestFileSystem {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn encoding(&self) -> &str {
        &self.encoding
    }

    fn input_file_by_uri(&self, uri: &str) -> Option<InputFile> {
        self.files.iter().find(|f| f.uri == uri).map(|f| InputFile {
            path: f.path.clone(),
            uri: f.uri.clone(),
            line_count: f.line_count,
        })
    }

    fn main_java_files(&self) -> Vec<InputFile> {
        self.files
            .iter()
            .map(|f| InputFile {
                path: f.path.clone(),
                uri: f.uri.clone(),
                line_count: f.line_count,
            })
            .collect()
    }
}

/// [`ActiveRules`] over an explicit rule-key set.
#[derive(Debug, Default)]
pub struct TestActiveRules {
    active: HashSet<String>,
}

impl TestActiveRules {
    pub fn activate(&mut self, rule_key: &str) -> &mut Self {
        self.active.insert(rule_key.to_string());
        self
    }
}

impl ActiveRules for TestActiveRules {
    fn is_active(&self, rule: &RuleKey) -> bool {
        self.active.contains(&rule.to_string())
    }
}

/// Recording [`SensorContext`].
#[derive(Debug, Default)]
pub struct TestSensorContext {
    pub config: MapConfiguration,
    pub file_system: TestFileSystem,
    pub active_rules: TestActiveRules,
    pub classpath: Vec<PathBuf>,
    pub issues: Vec<Issue>,
    pub analysis_errors: Vec<AnalysisError>,
}

impl SensorContext for TestSensorContext {
    fn config(&self) -> &dyn Configuration {
        &self.config
    }

    fn file_system(&self) -> &dyn FileSystem {
        &self.file_system
    }

    fn active_rules(&self) -> &dyn ActiveRules {
        &self.active_rules
    }

    fn project_classpath(&self) -> Vec<PathBuf> {
        self.classpath.clone()
    }

    fn save_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    fn save_analysis_error(&mut self, error: AnalysisError) {
        self.analysis_errors.push(error);
    }
}

/// [`ErrorProneCompiler`] that replays a scripted diagnostic stream and
/// records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedCompiler {
    pub diagnostics: Vec<Diagnostic>,
    invocations: AtomicUsize,
    requests: std::sync::Mutex<Vec<CompilationRequest>>,
}

impl ScriptedCompiler {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompilationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ErrorProneCompiler for ScriptedCompiler {
    fn compile(
        &self,
        request: &CompilationRequest,
        listener: &mut dyn FnMut(&Diagnostic) -> Result<()>,
    ) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        for diagnostic in &self.diagnostics {
            listener(diagnostic)?;
        }

        Ok(())
    }
}
