//! The compiler seam.
//!
//! The sensor only ever sees [`ErrorProneCompiler`]: something that takes a
//! compilation request and feeds every diagnostic it produces to a listener
//! callback. [`JavacErrorProneCompiler`] is the production implementation,
//! driving an external `javac` with the Error Prone plugin attached and
//! parsing its raw diagnostic stream.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::listener::{Diagnostic, DiagnosticKind, DiagnosticSource};
use crate::{PluginError, Result};

/// One compiler invocation, fully assembled by the sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationRequest {
    /// Canonical names of the checkers to enable.
    pub checkers: Vec<String>,
    /// `-XepOpt:` flags passed through to Error Prone.
    pub errorprone_options: Vec<String>,
    pub javac_options: Vec<String>,
    pub classpath: Vec<PathBuf>,
    pub annotation_processor_path: Vec<PathBuf>,
    pub compilation_units: Vec<PathBuf>,
    pub source_output_dir: PathBuf,
    pub class_output_dir: PathBuf,
    pub encoding: String,
}

/// Black-box compiler: accepts a checker-class list and emits a diagnostic
/// stream. A fatal listener result aborts the run.
pub trait ErrorProneCompiler {
    fn compile(
        &self,
        request: &CompilationRequest,
        listener: &mut dyn FnMut(&Diagnostic) -> Result<()>,
    ) -> Result<()>;
}

/// Drives an external `javac` with the Error Prone plugin on the processor
/// path and `-XDrawDiagnostics` output.
#[derive(Debug)]
pub struct JavacErrorProneCompiler {
    pub javac: PathBuf,
    /// Jars placed on the processor path to make the Error Prone plugin and
    /// the checker libraries visible to the compiler.
    pub plugin_jars: Vec<PathBuf>,
}

impl JavacErrorProneCompiler {
    pub fn new(javac: impl Into<PathBuf>, plugin_jars: Vec<PathBuf>) -> Self {
        Self {
            javac: javac.into(),
            plugin_jars,
        }
    }

    fn build_args(&self, request: &CompilationRequest) -> Vec<String> {
        let mut args = Vec::new();

        // Machine-readable diagnostics: `file:line:col: code: message`.
        args.push("-XDrawDiagnostics".to_string());
        args.push("-encoding".to_string());
        args.push(request.encoding.clone());
        args.push("-d".to_string());
        args.push(request.class_output_dir.display().to_string());
        args.push("-s".to_string());
        args.push(request.source_output_dir.display().to_string());

        if !request.classpath.is_empty() {
            args.push("-classpath".to_string());
            args.push(join_paths(&request.classpath));
        }

        let mut processor_path = self.plugin_jars.clone();
        processor_path.extend(request.annotation_processor_path.iter().cloned());
        if !processor_path.is_empty() {
            args.push("-processorpath".to_string());
            args.push(join_paths(&processor_path));
        }

        args.extend(request.javac_options.iter().cloned());

        let mut plugin = String::from("ErrorProne -XepDisableAllChecks");
        for checker in &request.checkers {
            plugin.push_str(&format!(" -Xep:{checker}"));
        }
        for option in &request.errorprone_options {
            plugin.push(' ');
            plugin.push_str(option);
        }
        args.push(format!("-Xplugin:{plugin}"));

        for unit in &request.compilation_units {
            args.push(unit.display().to_string());
        }

        args
    }
}

impl ErrorProneCompiler for JavacErrorProneCompiler {
    fn compile(
        &self,
        request: &CompilationRequest,
        listener: &mut dyn FnMut(&Diagnostic) -> Result<()>,
    ) -> Result<()> {
        let args = self.build_args(request);
        debug!("invoking {} with {} compilation units", self.javac.display(), request.compilation_units.len());

        let mut child = Command::new(&self.javac)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(PluginError::Analysis)?;

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_string(&mut stderr).map_err(PluginError::Analysis)?;
        }

        // The exit status itself carries no signal beyond the diagnostics:
        // classification of the stream decides whether the run failed.
        let _ = child.wait().map_err(PluginError::Analysis)?;

        for diagnostic in parse_raw_diagnostics(&stderr) {
            listener(&diagnostic)?;
        }

        Ok(())
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    let separator = if cfg!(windows) { ";" } else { ":" };
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Parses javac's `-XDrawDiagnostics` stream. Each diagnostic starts with a
/// `<file>:<line>:<col>: <code>: <message>` line; indented continuation
/// lines belong to the previous diagnostic's message.
pub fn parse_raw_diagnostics(output: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(line.trim_start());
            }
            continue;
        }

        match parse_raw_diagnostic_line(line) {
            Some(diagnostic) => diagnostics.push(diagnostic),
            None => debug!("skipping unrecognized compiler output line: {line}"),
        }
    }

    diagnostics
}

fn parse_raw_diagnostic_line(line: &str) -> Option<Diagnostic> {
    // `<file>:<line>:<col>: <code>: <message>`; the file part may itself
    // contain `:` on Windows, so parse around the numeric fields.
    let (code_start, code, message) = {
        let mut found = None;
        for (idx, _) in line.match_indices(": ") {
            let candidate = &line[idx + 2..];
            if let Some((code, rest)) = candidate.split_once(": ") {
                if code.starts_with("compiler.") {
                    found = Some((idx, code.to_string(), rest.to_string()));
                    break;
                }
            } else if candidate.starts_with("compiler.") {
                found = Some((idx, candidate.to_string(), String::new()));
                break;
            }
        }
        found?
    };

    let location = &line[..code_start];
    let mut parts = location.rsplitn(3, ':');
    let column: i64 = parts.next()?.parse().ok()?;
    let line_number: i64 = parts.next()?.parse().ok()?;
    let file = parts.next()?.to_string();

    Some(Diagnostic {
        kind: kind_for_code(&code),
        code,
        message,
        source: Some(DiagnosticSource {
            uri: file_uri(Path::new(&file)),
            name: file,
        }),
        line: line_number,
        column,
    })
}

fn kind_for_code(code: &str) -> DiagnosticKind {
    if code.starts_with("compiler.err") {
        DiagnosticKind::Error
    } else if code.starts_with("compiler.warn") {
        DiagnosticKind::Warning
    } else if code.starts_with("compiler.note") {
        DiagnosticKind::Note
    } else {
        DiagnosticKind::Other
    }
}

/// The URI matched against the host file index.
pub fn file_uri(path: &Path) -> String {
    let display = path.display().to_string().replace('\\', "/");
    if display.starts_with('/') {
        format!("file://{display}")
    } else {
        format!("file:///{display}")
    }
}
