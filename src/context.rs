use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Expression;
use crate::diagnostics::DiagnosticEngine;
use crate::scope::ScopedMap;
use crate::source::SourceManager;
use crate::types::{
    f32_type, f64_type, i16_type, i1_type, i32_type, i64_type, i8_type, u16_type, u32_type,
    u64_type, u8_type, void_type, EnumType, StructType, Type,
};

pub const SOURCE_EXTENSION: &str = ".amun";

/// How a function name may be written at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Normal,
    Prefix,
    Infix,
    Postfix,
}

/// Configuration handed to the driver; the CLI fills it in, the library
/// never reads the process environment.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub output_file_name: String,
    pub should_report_warns: bool,
    pub convert_warns_to_errors: bool,
    /// Directory `import "x"` resolves against.
    pub libraries_prefix: String,
    /// Extra flags forwarded verbatim to the external linker.
    pub linker_extra_flags: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            output_file_name: "output".to_owned(),
            should_report_warns: false,
            convert_warns_to_errors: false,
            libraries_prefix: "lib/".to_owned(),
            linker_extra_flags: Vec::new(),
        }
    }
}

/// Named type aliases, seeded with the primitive spellings.
#[derive(Debug)]
pub struct AliasTable {
    aliases: HashMap<String, Rc<Type>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let mut aliases = HashMap::new();
        let primitives: [(&str, Rc<Type>); 24] = [
            ("int1", i1_type()),
            ("int8", i8_type()),
            ("int16", i16_type()),
            ("int32", i32_type()),
            ("int64", i64_type()),
            ("uint8", u8_type()),
            ("uint16", u16_type()),
            ("uint32", u32_type()),
            ("uint64", u64_type()),
            ("float32", f32_type()),
            ("float64", f64_type()),
            ("i1", i1_type()),
            ("i8", i8_type()),
            ("i16", i16_type()),
            ("i32", i32_type()),
            ("i64", i64_type()),
            ("u8", u8_type()),
            ("u16", u16_type()),
            ("u32", u32_type()),
            ("u64", u64_type()),
            ("f32", f32_type()),
            ("f64", f64_type()),
            ("void", void_type()),
            ("bool", i1_type()),
        ];
        for (spelling, ty) in primitives {
            aliases.insert(spelling.to_owned(), ty);
        }
        Self { aliases }
    }
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_alias(&mut self, alias: &str, ty: Rc<Type>) {
        self.aliases.insert(alias.to_owned(), ty);
    }

    pub fn resolve_alias(&self, alias: &str) -> Option<Rc<Type>> {
        self.aliases.get(alias).cloned()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }
}

/// Shared state of one compilation, owned by the driver and threaded
/// through parser and checker. The parser writes the declaration registries
/// while it goes; both phases append diagnostics.
pub struct Context {
    pub options: CompilerOptions,
    pub diagnostics: DiagnosticEngine,
    pub source_manager: SourceManager,
    pub alias_table: AliasTable,

    pub functions: HashMap<String, FunctionKind>,
    pub structures: HashMap<String, Rc<StructType>>,
    pub enumerations: HashMap<String, Rc<EnumType>>,
    /// `const` bindings, substituted by the parser at use sites.
    pub constants_table: ScopedMap<String, Expression>,
}

impl Context {
    pub fn new(options: CompilerOptions) -> Self {
        let mut constants_table = ScopedMap::new();
        constants_table.push_new_scope();
        Self {
            options,
            diagnostics: DiagnosticEngine::new(),
            source_manager: SourceManager::new(),
            alias_table: AliasTable::new(),
            functions: HashMap::new(),
            structures: HashMap::new(),
            enumerations: HashMap::new(),
            constants_table,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}
