use std::fs;
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::ast::CompilationUnit;
use crate::backend::Backend;
use crate::checker::TypeChecker;
use crate::context::{CompilerOptions, Context};
use crate::diagnostics::DiagnosticLevel;
use crate::parser::Parser;
use crate::tokenizer::Tokenizer;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("path {0} not exists")]
    MissingSource(String),
    #[error("can't read {path}: {reason}")]
    UnreadableSource { path: String, reason: String },
    #[error("compilation stopped with {errors} errors")]
    FrontEndFailure { errors: usize },
    #[error("warnings treated as errors, {warnings} emitted")]
    WarningsAsErrors { warnings: usize },
}

/// Wires source → parser → checker → backend and surfaces diagnostics in
/// between. Each phase runs only when the previous one left the error
/// count at zero.
pub struct Compiler {
    context: Context,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            context: Context::new(options),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Full front-end run feeding the typed tree into `backend`.
    pub fn compile_source_code(
        &mut self,
        source_file: &str,
        backend: &mut dyn Backend,
    ) -> Result<(), CompilerError> {
        let mut compilation_unit = self.parse_source_code(source_file)?;

        let mut type_checker = TypeChecker::new(&mut self.context);
        type_checker.check_compilation_unit(&mut compilation_unit);
        let instantiations = type_checker.instantiations().clone();
        debug!(
            "type checking finished with {} generic instantiations",
            instantiations.len()
        );

        self.report_front_end_diagnostics()?;

        backend.visit_unit(&compilation_unit, &instantiations);
        info!("successfully compiled {source_file}");
        Ok(())
    }

    /// Parse and type check only.
    pub fn check_source_code(&mut self, source_file: &str) -> Result<(), CompilerError> {
        let mut compilation_unit = self.parse_source_code(source_file)?;

        let mut type_checker = TypeChecker::new(&mut self.context);
        type_checker.check_compilation_unit(&mut compilation_unit);

        self.report_front_end_diagnostics()?;
        Ok(())
    }

    fn parse_source_code(&mut self, source_file: &str) -> Result<CompilationUnit, CompilerError> {
        if !Path::new(source_file).exists() {
            return Err(CompilerError::MissingSource(source_file.to_owned()));
        }

        let source_content =
            fs::read_to_string(source_file).map_err(|error| CompilerError::UnreadableSource {
                path: source_file.to_owned(),
                reason: error.to_string(),
            })?;

        let file_id = self.context.source_manager.register_source_path(source_file);
        let tokenizer = Tokenizer::new(file_id, source_content);
        let mut parser = Parser::new(&mut self.context, tokenizer, source_file);
        let compilation_unit = parser.parse_compilation_unit();

        let errors = self.context.diagnostics.level_count(DiagnosticLevel::Error);
        if errors > 0 {
            self.context
                .diagnostics
                .report_diagnostics(DiagnosticLevel::Error, &self.context.source_manager);
            return Err(CompilerError::FrontEndFailure { errors });
        }

        Ok(compilation_unit)
    }

    fn report_front_end_diagnostics(&self) -> Result<(), CompilerError> {
        let diagnostics = &self.context.diagnostics;
        let warnings = diagnostics.level_count(DiagnosticLevel::Warning);

        if self.context.options.should_report_warns && warnings > 0 {
            diagnostics.report_diagnostics(DiagnosticLevel::Warning, &self.context.source_manager);
        }

        let errors = diagnostics.level_count(DiagnosticLevel::Error);
        if errors > 0 {
            diagnostics.report_diagnostics(DiagnosticLevel::Error, &self.context.source_manager);
            return Err(CompilerError::FrontEndFailure { errors });
        }

        if self.context.options.convert_warns_to_errors && warnings > 0 {
            return Err(CompilerError::WarningsAsErrors { warnings });
        }

        Ok(())
    }
}
