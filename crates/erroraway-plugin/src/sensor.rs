//! The analysis sensor: selects the active checkers, assembles the compiler
//! invocation and drives one compilation per analyzed project.

use std::path::PathBuf;

use tracing::info;

use erroraway_rules::repository::{ERRORPRONE_REPOSITORY, NULLAWAY_REPOSITORY, REPOSITORIES};
use erroraway_rules::{CheckerRegistry, RuleKey};

use crate::compiler::{CompilationRequest, ErrorProneCompiler};
use crate::config::{
    NullAwayOption, ANNOTATION_PROCESSORS_MAVEN_COORDINATES, CLASS_PATH_MAVEN_COORDINATES,
};
use crate::deps::DependencyManager;
use crate::host::{Configuration, SensorContext, TempFolder};
use crate::listener::DiagnosticListener;
use crate::{PluginError, Result};

/// Static capability declaration for the host: which repositories this
/// sensor can produce issues for, and on which language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub name: &'static str,
    pub languages: Vec<&'static str>,
    pub rule_repositories: Vec<&'static str>,
}

pub struct ErrorAwaySensor<'a> {
    registry: CheckerRegistry,
    dependency_manager: &'a mut DependencyManager,
    temp_folder: &'a dyn TempFolder,
    compiler: &'a dyn ErrorProneCompiler,
}

impl<'a> ErrorAwaySensor<'a> {
    pub fn new(
        registry: CheckerRegistry,
        dependency_manager: &'a mut DependencyManager,
        temp_folder: &'a dyn TempFolder,
        compiler: &'a dyn ErrorProneCompiler,
    ) -> Self {
        Self {
            registry,
            dependency_manager,
            temp_folder,
            compiler,
        }
    }

    pub fn describe(&self) -> SensorDescriptor {
        SensorDescriptor {
            name: "Errorprone sensor",
            languages: vec!["java"],
            rule_repositories: REPOSITORIES.to_vec(),
        }
    }

    /// Runs one analysis. Every failure here is fatal for the whole run.
    pub fn execute(&mut self, context: &mut dyn SensorContext) -> Result<()> {
        let checkers = self.active_checkers(context)?;

        // Checked before anything touches the compiler, so a missing
        // mandatory option produces one clear message instead of a checker
        // stack trace.
        let errorprone_options = build_errorprone_options(context)?;

        let fs = context.file_system();
        info!(
            "starting project analysis with encoding {} and base dir {}",
            fs.encoding(),
            fs.base_dir().display()
        );

        let compilation_units: Vec<PathBuf> = fs
            .main_java_files()
            .into_iter()
            .map(|file| file.path)
            .collect();

        let classpath = self.configure_classpath(context)?;
        let annotation_processor_path = self.configure_annotation_processors(context.config())?;

        let request = CompilationRequest {
            checkers,
            errorprone_options,
            javac_options: javac_options(),
            classpath,
            annotation_processor_path,
            compilation_units,
            source_output_dir: self.temp_folder.new_dir("sourceOutput").map_err(PluginError::Analysis)?,
            class_output_dir: self.temp_folder.new_dir("classOutput").map_err(PluginError::Analysis)?,
            encoding: context.file_system().encoding().to_string(),
        };

        let mut listener = DiagnosticListener::new(context);
        self.compiler
            .compile(&request, &mut |diagnostic| listener.report(diagnostic))
    }

    /// Canonical names of the built-in and plugin checkers whose rule is
    /// active in the project's quality profile.
    fn active_checkers(&self, context: &dyn SensorContext) -> Result<Vec<String>> {
        let active_rules = context.active_rules();
        let mut checkers = Vec::new();

        for checker in self.registry.builtin().all() {
            let rule_key = RuleKey::new(ERRORPRONE_REPOSITORY, &checker.canonical_name);
            if active_rules.is_active(&rule_key) {
                checkers.push(checker.canonical_name.clone());
            }
        }

        for checker in self.registry.plugin_checkers() {
            if active_rules.is_active(&checker.rule_key()?) {
                checkers.push(checker.canonical_name.clone());
            }
        }

        Ok(checkers)
    }

    fn configure_classpath(&mut self, context: &dyn SensorContext) -> Result<Vec<PathBuf>> {
        let mut classpath = context.project_classpath();

        let coordinates = context.config().get_string_array(CLASS_PATH_MAVEN_COORDINATES);
        if !coordinates.is_empty() {
            classpath.extend(self.dependency_manager.download_dependencies(&coordinates)?);
        }

        Ok(classpath)
    }

    fn configure_annotation_processors(
        &mut self,
        configuration: &dyn Configuration,
    ) -> Result<Vec<PathBuf>> {
        let coordinates = configuration.get_string_array(ANNOTATION_PROCESSORS_MAVEN_COORDINATES);
        if coordinates.is_empty() {
            return Ok(Vec::new());
        }

        self.dependency_manager.download_dependencies(&coordinates)
    }
}

/// Translates the configured NullAway options into `-XepOpt:` flags.
///
/// Fails when the mandatory annotated-packages option is missing while the
/// NullAway rule is active; NullAway itself would crash with an opaque stack
/// trace in that case.
fn build_errorprone_options(context: &dyn SensorContext) -> Result<Vec<String>> {
    let configuration = context.config();
    let mut options = Vec::new();

    if !configuration.has_key(NullAwayOption::AnnotatedPackages.key()) {
        if context.active_rules().is_active(&RuleKey::new(NULLAWAY_REPOSITORY, "NullAway")) {
            return Err(PluginError::Configuration(format!(
                "The {} option must be set when the NullAway rule is enabled",
                NullAwayOption::AnnotatedPackages.key()
            )));
        }

        // Configured annotation processors turn on compiler plugin scanning,
        // which instantiates NullAway even when its rule is inactive; give it
        // a throwaway package list so it can initialize.
        if configuration.has_key(ANNOTATION_PROCESSORS_MAVEN_COORDINATES) {
            options.push(format!(
                "-XepOpt:NullAway:{}=foo.bar",
                NullAwayOption::AnnotatedPackages.errorprone_option()
            ));
        }
    }

    for option in NullAwayOption::ALL {
        if configuration.has_key(option.key()) {
            let values = configuration.get_string_array(option.key());
            options.push(format!(
                "-XepOpt:NullAway:{}={}",
                option.errorprone_option(),
                values.join(",")
            ));
        }
    }

    Ok(options)
}

/// javac gives up after 100 errors by default; never give up early.
fn javac_options() -> Vec<String> {
    vec![
        "-Xmaxerrs".to_string(),
        i32::MAX.to_string(),
        "-Xmaxwarns".to_string(),
        i32::MAX.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SystemTempFolder;
    use crate::listener::{Diagnostic, DiagnosticKind, DiagnosticSource};
    use crate::test_support::{ScriptedCompiler, TestFile, TestSensorContext};

    fn dependency_manager() -> DependencyManager {
        let context = TestSensorContext::default();
        DependencyManager::new(&SystemTempFolder, context.config()).unwrap()
    }

    fn context() -> TestSensorContext {
        let mut context = TestSensorContext::default();
        context.file_system.add_file(TestFile {
            uri: "file:///project/src/main/java/Simple.java".to_string(),
            path: "src/main/java/Simple.java".into(),
            line_count: 50,
        });
        context
    }

    #[test]
    fn describe_declares_every_repository_and_java_only() {
        let mut deps = dependency_manager();
        let compiler = ScriptedCompiler::default();
        let sensor = ErrorAwaySensor::new(
            CheckerRegistry::with_bundled_plugins(),
            &mut deps,
            &SystemTempFolder,
            &compiler,
        );

        let descriptor = sensor.describe();
        assert_eq!(descriptor.languages, vec!["java"]);
        assert_eq!(descriptor.rule_repositories, REPOSITORIES.to_vec());
    }

    #[test]
    fn missing_annotated_packages_with_active_nullaway_fails_before_compiling() {
        let mut context = context();
        context.active_rules.activate("nullaway:NullAway");

        let mut deps = dependency_manager();
        let compiler = ScriptedCompiler::default();
        let mut sensor = ErrorAwaySensor::new(
            CheckerRegistry::with_bundled_plugins(),
            &mut deps,
            &SystemTempFolder,
            &compiler,
        );

        let err = sensor.execute(&mut context).unwrap_err();
        assert!(matches!(err, PluginError::Configuration(_)));
        assert!(err.to_string().contains("nullaway.annotated.packages"));
        assert_eq!(compiler.invocations(), 0);
    }

    #[test]
    fn only_active_checkers_are_passed_to_the_compiler() {
        let mut context = context();
        context.active_rules.activate("errorprone:BadImport");
        context.active_rules.activate("errorprone-slf4j:Slf4jPlaceholderMismatch");

        let mut deps = dependency_manager();
        let compiler = ScriptedCompiler::default();
        let mut sensor = ErrorAwaySensor::new(
            CheckerRegistry::with_bundled_plugins(),
            &mut deps,
            &SystemTempFolder,
            &compiler,
        );

        sensor.execute(&mut context).unwrap();

        let requests = compiler.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].checkers,
            vec!["BadImport".to_string(), "Slf4jPlaceholderMismatch".to_string()]
        );
        assert_eq!(
            requests[0].compilation_units,
            vec![PathBuf::from("src/main/java/Simple.java")]
        );
    }

    #[test]
    fn nullaway_options_are_translated_to_errorprone_flags() {
        let mut context = context();
        context.active_rules.activate("nullaway:NullAway");
        context.config.set("nullaway.annotated.packages", "com.acme,com.acme.api");
        context.config.set("nullaway.known.initializers", "com.acme.Init.init");

        let mut deps = dependency_manager();
        let compiler = ScriptedCompiler::default();
        let mut sensor = ErrorAwaySensor::new(
            CheckerRegistry::with_bundled_plugins(),
            &mut deps,
            &SystemTempFolder,
            &compiler,
        );

        sensor.execute(&mut context).unwrap();

        let request = &compiler.requests()[0];
        assert!(request
            .errorprone_options
            .contains(&"-XepOpt:NullAway:AnnotatedPackages=com.acme,com.acme.api".to_string()));
        assert!(request
            .errorprone_options
            .contains(&"-XepOpt:NullAway:KnownInitializers=com.acme.Init.init".to_string()));
        assert!(request.javac_options.contains(&"-Xmaxerrs".to_string()));
        assert!(request.javac_options.contains(&i32::MAX.to_string()));
    }

    #[test]
    fn annotation_processors_without_nullaway_add_the_dummy_override() {
        let mut context = context();
        // No NullAway rule active, no annotated packages configured, but
        // processors present: plugin scanning will instantiate NullAway.
        context.config.set(
            ANNOTATION_PROCESSORS_MAVEN_COORDINATES,
            "com.google.auto.value:auto-value:1.9",
        );

        let options = build_errorprone_options(&context).unwrap();
        assert_eq!(options, vec!["-XepOpt:NullAway:AnnotatedPackages=foo.bar".to_string()]);
    }

    #[test]
    fn diagnostics_from_the_compiler_flow_into_the_context() {
        let mut context = context();
        context.active_rules.activate("errorprone:BadImport");

        let diagnostic = Diagnostic {
            code: "compiler.warn.error.prone".to_string(),
            kind: DiagnosticKind::Warning,
            message: "[BadImport] Importing nested classes".to_string(),
            source: Some(DiagnosticSource {
                uri: "file:///project/src/main/java/Simple.java".to_string(),
                name: "Simple.java".to_string(),
            }),
            line: 3,
            column: 1,
        };

        let mut deps = dependency_manager();
        let compiler = ScriptedCompiler::new(vec![diagnostic]);
        let mut sensor = ErrorAwaySensor::new(
            CheckerRegistry::with_bundled_plugins(),
            &mut deps,
            &SystemTempFolder,
            &compiler,
        );

        sensor.execute(&mut context).unwrap();
        assert_eq!(context.issues.len(), 1);
        assert_eq!(context.issues[0].rule_key.to_string(), "errorprone:BadImport");
    }

    #[test]
    fn compiler_crash_aborts_the_run() {
        let mut context = context();

        let crash = Diagnostic {
            code: crate::listener::ERROR_PRONE_COMPILER_CRASH_CODE.to_string(),
            kind: DiagnosticKind::Error,
            message: "boom".to_string(),
            source: None,
            line: 1,
            column: 1,
        };

        let mut deps = dependency_manager();
        let compiler = ScriptedCompiler::new(vec![crash]);
        let mut sensor = ErrorAwaySensor::new(
            CheckerRegistry::with_bundled_plugins(),
            &mut deps,
            &SystemTempFolder,
            &compiler,
        );

        let err = sensor.execute(&mut context).unwrap_err();
        assert!(matches!(err, PluginError::CompilerCrash(_)));
        assert_eq!(context.issues.len(), 0);
    }
}
