use std::fs::File;
use std::io::{BufRead, BufReader};

use colored::Colorize;

use crate::source::SourceManager;
use crate::token::Span;

/// Zero-sized proof that a diagnostic has been recorded. Fatal checks
/// return `Err(Reported)` and unwind to the top of the current phase; the
/// driver consults the error count before running the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reported;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl DiagnosticLevel {
    pub fn literal(self) -> &'static str {
        match self {
            DiagnosticLevel::Warning => "WARNING",
            DiagnosticLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub location: Span,
    pub message: String,
    pub level: DiagnosticLevel,
}

/// Ordered per-level buffers of diagnostics. Nothing is printed at report
/// time; rendering happens once a phase finishes, re-reading the offending
/// source line from disk.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    warnings: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_error(&mut self, location: Span, message: impl Into<String>) -> Reported {
        self.errors.push(Diagnostic {
            location,
            message: message.into(),
            level: DiagnosticLevel::Error,
        });
        Reported
    }

    pub fn report_warning(&mut self, location: Span, message: impl Into<String>) {
        self.warnings.push(Diagnostic {
            location,
            message: message.into(),
            level: DiagnosticLevel::Warning,
        });
    }

    pub fn level_count(&self, level: DiagnosticLevel) -> usize {
        self.buffer(level).len()
    }

    pub fn diagnostics(&self, level: DiagnosticLevel) -> &[Diagnostic] {
        self.buffer(level)
    }

    /// Print every diagnostic of `level` in report order.
    pub fn report_diagnostics(&self, level: DiagnosticLevel, source_manager: &SourceManager) {
        for diagnostic in self.buffer(level) {
            render_diagnostic(diagnostic, source_manager);
        }
    }

    fn buffer(&self, level: DiagnosticLevel) -> &[Diagnostic] {
        match level {
            DiagnosticLevel::Warning => &self.warnings,
            DiagnosticLevel::Error => &self.errors,
        }
    }
}

/// `LEVEL in path:line:col`, the source line, then a caret underline
/// pointing at the start column.
fn render_diagnostic(diagnostic: &Diagnostic, source_manager: &SourceManager) {
    let location = diagnostic.location;
    let path = source_manager.resolve_source_path(location.file_id);
    let source_line = read_file_line(path, location.line).unwrap_or_default();

    let level = match diagnostic.level {
        DiagnosticLevel::Warning => diagnostic.level.literal().yellow(),
        DiagnosticLevel::Error => diagnostic.level.literal().red(),
    };

    println!(
        "{} in {}:{}:{}",
        level, path, location.line, location.column_start
    );

    let line_number_header = format!("{} | ", location.line);
    println!("{line_number_header}{source_line}");

    let underline_width = line_number_header.len() + location.column_start as usize;
    println!("{}^ {}", "~".repeat(underline_width), diagnostic.message);
    println!();
}

fn read_file_line(path: &str, line: u32) -> Option<String> {
    let file = File::open(path).ok()?;
    BufReader::new(file)
        .lines()
        .nth(line.saturating_sub(1) as usize)?
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_per_level() {
        let mut engine = DiagnosticEngine::new();
        assert_eq!(engine.level_count(DiagnosticLevel::Error), 0);

        engine.report_warning(Span::default(), "looks odd");
        let reported = engine.report_error(Span::default(), "is wrong");
        assert_eq!(reported, Reported);

        assert_eq!(engine.level_count(DiagnosticLevel::Warning), 1);
        assert_eq!(engine.level_count(DiagnosticLevel::Error), 1);
        assert_eq!(
            engine.diagnostics(DiagnosticLevel::Error)[0].message,
            "is wrong"
        );
    }
}
