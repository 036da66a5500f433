//! Diagnostic classification and issue translation.
//!
//! Each diagnostic is classified independently, in emission order:
//!
//! * the reserved crash code fails the whole analysis, first check wins;
//! * codes other than the known checker codes are plain compiler
//!   diagnostics; they become analysis errors, and an ERROR-kind one also
//!   fails the analysis (a source file that does not compile cannot be
//!   analyzed further);
//! * the known checker codes carry `[<CheckerName>] ...` messages that are
//!   parsed, remapped to their rule repository and recorded as issues.
//!
//! The classification result is an ordinary `Result`; the caller decides to
//! abort by propagating the error.

use tracing::{error, warn};

use erroraway_rules::repository::{
    AUTODISPOSE2_REPOSITORY, ERRORPRONE_REPOSITORY, ERRORPRONE_SLF4J_REPOSITORY,
    NULLAWAY_REPOSITORY, PICNIC_REPOSITORY,
};
use erroraway_rules::RuleKey;

use crate::host::{AnalysisError, InputFile, Issue, SensorContext};
use crate::{PluginError, Result};

/// Reserved code the compiler uses when a checker itself crashed.
pub const ERROR_PRONE_COMPILER_CRASH_CODE: &str = "compiler.err.error.prone.crash";

const ERROR_PRONE_DIAGNOSTIC_CODES: [&str; 3] = [
    "compiler.warn.error.prone",
    "compiler.err.error.prone",
    "compiler.note.error.prone",
];

/// Picnic's checkers do not use a dedicated package-derived name prefix, but
/// their messages always carry the support-site URL.
const PICNIC_DOCUMENTATION_URL: &str = "see https://error-prone.picnic.tech/bugpatterns/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Note,
    Other,
}

/// Where the compiler says a diagnostic came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSource {
    /// URI matched against the host's file index.
    pub uri: String,
    /// Display name used in logs.
    pub name: String,
}

/// One compiler-emitted diagnostic. Consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: String,
    pub kind: DiagnosticKind,
    pub message: String,
    pub source: Option<DiagnosticSource>,
    /// 1-based; synthetic diagnostics may report 0 or negative values.
    pub line: i64,
    pub column: i64,
}

/// Outcome of classifying one diagnostic.
enum Disposition {
    /// A checker finding; the message carries the checker name.
    CheckerFinding,
    /// Already dealt with (analysis error recorded); nothing further to do.
    Handled,
}

/// Translates compiler diagnostics into the host's issue model.
pub struct DiagnosticListener<'a> {
    context: &'a mut dyn SensorContext,
}

impl<'a> DiagnosticListener<'a> {
    pub fn new(context: &'a mut dyn SensorContext) -> Self {
        Self { context }
    }

    /// Handles one diagnostic. A fatal result aborts the whole analysis.
    pub fn report(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        match self.classify(diagnostic)? {
            Disposition::Handled => Ok(()),
            Disposition::CheckerFinding => self.handle_finding(diagnostic),
        }
    }

    fn classify(&mut self, diagnostic: &Diagnostic) -> Result<Disposition> {
        if diagnostic.code == ERROR_PRONE_COMPILER_CRASH_CODE {
            return Err(PluginError::CompilerCrash(diagnostic.message.clone()));
        }

        if ERROR_PRONE_DIAGNOSTIC_CODES.contains(&diagnostic.code.as_str()) {
            return Ok(Disposition::CheckerFinding);
        }

        // A plain compiler diagnostic is not a checker finding and must not
        // be misreported as a rule violation; surface it as an analysis
        // error instead of dropping it.
        let mut analysis_error = AnalysisError {
            message: diagnostic.message.clone(),
            file: None,
            location: None,
        };

        if let Some(input_file) = self.input_file(diagnostic) {
            analysis_error.file = Some(input_file.path.clone());

            let line = clamp_line(diagnostic.line);
            match input_file.new_pointer(line, 0) {
                Ok(pointer) => analysis_error.location = Some(pointer),
                Err(e) => error!(
                    "error setting pointer on file {} for diagnostic {}: {e}",
                    input_file.path.display(),
                    diagnostic.code
                ),
            }
        }

        self.context.save_analysis_error(analysis_error);

        if diagnostic.kind == DiagnosticKind::Error {
            return Err(PluginError::CompilationFailed(diagnostic.message.clone()));
        }

        Ok(Disposition::Handled)
    }

    fn handle_finding(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        let message = &diagnostic.message;
        let rule = parse_rule(diagnostic)?;
        let repository = finding_repository(&rule, message);
        let rule_key = RuleKey::new(repository, rule);

        let Some(input_file) = self.input_file(diagnostic) else {
            // Expected for generated or synthetic sources; already logged.
            return Ok(());
        };

        let line = clamp_line(diagnostic.line);
        match input_file.select_line(line) {
            Ok(range) => self.context.save_issue(Issue {
                rule_key,
                file: input_file.path,
                range,
                message: message.clone(),
            }),
            Err(e) => error!("error creating issue for {message}: {e}"),
        }

        Ok(())
    }

    fn input_file(&self, diagnostic: &Diagnostic) -> Option<InputFile> {
        let source = diagnostic.source.as_ref()?;
        let input_file = self.context.file_system().input_file_by_uri(&source.uri);

        if input_file.is_none() {
            warn!("could not find input file for source {}", source.name);
        }

        input_file
    }
}

fn clamp_line(line: i64) -> u32 {
    line.max(1).try_into().unwrap_or(u32::MAX)
}

/// Extracts the checker name from the first message line, conventionally
/// `[<CheckerName>] <rest>`. An unparsable checker diagnostic indicates a
/// version or format mismatch and must surface, not be skipped.
fn parse_rule(diagnostic: &Diagnostic) -> Result<String> {
    let first_line = diagnostic.message.lines().next().unwrap_or_default();

    let parsed = first_line
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .map(|(name, _)| name.to_string());

    parsed.ok_or_else(|| PluginError::DiagnosticParse {
        code: diagnostic.code.clone(),
        message: diagnostic.message.clone(),
    })
}

/// Maps a checker name (plus its message, for Picnic's URL marker) back to a
/// rule repository. Distinct from the class-name classifier: at analysis
/// time only the checker's canonical name is available.
fn finding_repository(rule: &str, message: &str) -> &'static str {
    if rule.starts_with("Slf4j") {
        return ERRORPRONE_SLF4J_REPOSITORY;
    }

    if message.contains(PICNIC_DOCUMENTATION_URL) {
        return PICNIC_REPOSITORY;
    }

    match rule {
        "NullAway" => NULLAWAY_REPOSITORY,
        "UseAutoDispose" => AUTODISPOSE2_REPOSITORY,
        _ => ERRORPRONE_REPOSITORY,
    }
}
