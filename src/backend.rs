use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{CompilationUnit, Statement};
use crate::types::Type;

/// A consumer which receives the typed tree after checking succeeds.
///
/// The driver walks the compilation unit and hands every top level
/// statement to the backend, followed by the generic instantiations the
/// checker memoized. Code generation, object emission and linking live
/// behind this trait and outside this crate.
pub trait Backend {
    /// Called once per top level statement, in declaration order.
    fn visit_statement(&mut self, statement: &Statement);

    /// Called for each generic instantiation, keyed by its mangled name.
    fn declare_instantiation(&mut self, _mangled_name: &str, _ty: &Type) {}

    /// Walk a whole unit and its instantiation side table.
    fn visit_unit(
        &mut self,
        unit: &CompilationUnit,
        instantiations: &HashMap<String, Rc<Type>>,
    ) {
        for statement in &unit.tree_nodes {
            self.visit_statement(statement);
        }
        for (mangled_name, ty) in instantiations {
            self.declare_instantiation(mangled_name, ty);
        }
    }
}

/// A basic backend that records the symbols a real code generator would
/// have to emit.
#[derive(Debug, Default)]
pub struct SymbolCollector {
    pub symbols: Vec<String>,
}

impl SymbolCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for SymbolCollector {
    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Prototype(prototype) => {
                self.symbols.push(prototype.name.literal.clone());
            }
            Statement::Intrinsic(intrinsic) => {
                self.symbols.push(intrinsic.native_name.clone());
            }
            Statement::Function(function) => {
                if !function.prototype.is_generic {
                    self.symbols.push(function.prototype.name.literal.clone());
                }
            }
            Statement::OperatorFunction(operator_function) => {
                self.symbols
                    .push(operator_function.function.prototype.name.literal.clone());
            }
            Statement::Struct(structure) => {
                self.symbols.push(structure.struct_type.name.clone());
            }
            _ => {}
        }
    }

    fn declare_instantiation(&mut self, mangled_name: &str, _ty: &Type) {
        self.symbols.push(mangled_name.to_owned());
    }
}
