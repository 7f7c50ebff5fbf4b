//! Recursive-descent parser with a three-token window.
//!
//! `import`/`load` are resolved eagerly: the referenced file is tokenized
//! and parsed in place and its statements are spliced into the current
//! compilation unit, deduplicated by absolute path through the source
//! manager.

mod directives;
mod types;

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use log::debug;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ast::*;
use crate::context::{Context, FunctionKind, SOURCE_EXTENSION};
use crate::diagnostics::Reported;
use crate::mangle::mangle_operator_function;
use crate::token::{Span, Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::types::{
    i1_type, i32_ptr_type, i32_type, i64_type, i8_ptr_type, i8_type, none_ptr_type, none_type,
    null_type, void_type, EnumType, NumberKind, StructModifiers, StructType, Type,
};

pub type ParseResult<T> = Result<T, Reported>;

/// Which syntactic region the parser is currently inside; `break`,
/// `continue` and friends are only legal in some of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AstScope {
    Global,
    Function,
    Condition,
}

/// The binary-operator ladder, loosest first. Stepping one level tighter is
/// an integer conversion; `EnumAccess` terminates the ladder and hands over
/// to the unary/postfix chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
enum Precedence {
    LogicalOr,
    LogicalAnd,
    Equality,
    Comparison,
    Shift,
    Term,
    Factor,
    EnumAccess,
}

pub struct Parser<'a> {
    context: &'a mut Context,
    tokenizer: Tokenizer,

    previous: Token,
    current: Token,
    next: Token,

    /// Directory of the file being parsed, `load` resolves against it.
    file_parent_path: String,

    /// One loop-depth counter per enclosing function-like body.
    loop_levels: Vec<u32>,
    current_scope: AstScope,

    current_struct_name: String,
    current_struct_unknown_fields: usize,
    generic_parameter_names: HashSet<String>,
}

fn placeholder_token() -> Token {
    Token {
        kind: TokenKind::EndOfFile,
        span: Span::default(),
        literal: String::new(),
    }
}

impl<'a> Parser<'a> {
    pub fn new(context: &'a mut Context, tokenizer: Tokenizer, source_path: &str) -> Self {
        let file_parent_path = Path::new(source_path)
            .parent()
            .map(|parent| format!("{}/", parent.display()))
            .unwrap_or_default();
        Self {
            context,
            tokenizer,
            previous: placeholder_token(),
            current: placeholder_token(),
            next: placeholder_token(),
            file_parent_path,
            loop_levels: Vec::new(),
            current_scope: AstScope::Global,
            current_struct_name: String::new(),
            current_struct_unknown_fields: 0,
            generic_parameter_names: HashSet::new(),
        }
    }

    /// Parse until end of input. On a fatal diagnostic the partial tree is
    /// returned as-is; the driver checks the error count before going on.
    pub fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let mut tree_nodes = Vec::new();
        let _ = self.parse_tree_nodes(&mut tree_nodes);
        CompilationUnit { tree_nodes }
    }

    fn parse_tree_nodes(&mut self, tree_nodes: &mut Vec<Statement>) -> ParseResult<()> {
        // Prime the token window; the first two tokens may already be invalid.
        self.advance_token()?;
        self.advance_token()?;

        while self.is_source_available() {
            match self.current.kind {
                TokenKind::Import => {
                    let nodes = self.parse_import_declaration()?;
                    tree_nodes.extend(nodes);
                }
                TokenKind::Load => {
                    let nodes = self.parse_load_declaration()?;
                    tree_nodes.extend(nodes);
                }
                TokenKind::Type => self.parse_type_alias_declaration()?,
                _ => tree_nodes.push(self.parse_declaration_statement()?),
            }
        }
        Ok(())
    }

    fn parse_import_declaration(&mut self) -> ParseResult<Vec<Statement>> {
        self.advance_token()?;

        if self.is_current_kind(TokenKind::OpenBrace) {
            // import { "a" "b" }
            self.advance_token()?;
            let mut tree_nodes = Vec::new();
            while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBrace) {
                let name = self.consume_kind(
                    TokenKind::String,
                    "Expect string as library name after import statement",
                )?;
                let nodes = self.parse_import_library(&name)?;
                tree_nodes.extend(nodes);
            }
            self.assert_kind(
                TokenKind::CloseBrace,
                "Expect close brace `}` after import block",
            )?;
            self.check_unnecessary_semicolon_warning()?;
            return Ok(tree_nodes);
        }

        let name = self.consume_kind(
            TokenKind::String,
            "Expect string as library name after import statement",
        )?;
        self.check_unnecessary_semicolon_warning()?;
        self.parse_import_library(&name)
    }

    fn parse_import_library(&mut self, name: &Token) -> ParseResult<Vec<Statement>> {
        let library_path = format!(
            "{}{}{}",
            self.context.options.libraries_prefix, name.literal, SOURCE_EXTENSION
        );

        if self.context.source_manager.is_path_registered(&library_path) {
            return Ok(Vec::new());
        }

        if !Path::new(&library_path).exists() {
            return Err(self.context.diagnostics.report_error(
                name.span,
                format!("No standard library with name {}", name.literal),
            ));
        }

        self.parse_single_source_file(&library_path)
    }

    fn parse_load_declaration(&mut self) -> ParseResult<Vec<Statement>> {
        self.advance_token()?;

        if self.is_current_kind(TokenKind::OpenBrace) {
            // load { "a" "b" }
            self.advance_token()?;
            let mut tree_nodes = Vec::new();
            while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBrace) {
                let name = self.consume_kind(
                    TokenKind::String,
                    "Expect string as file name after load statement",
                )?;
                let nodes = self.parse_loaded_file(&name)?;
                tree_nodes.extend(nodes);
            }
            self.assert_kind(
                TokenKind::CloseBrace,
                "Expect close brace `}` after load block",
            )?;
            self.check_unnecessary_semicolon_warning()?;
            return Ok(tree_nodes);
        }

        let name = self.consume_kind(
            TokenKind::String,
            "Expect string as file name after load statement",
        )?;
        self.check_unnecessary_semicolon_warning()?;
        self.parse_loaded_file(&name)
    }

    fn parse_loaded_file(&mut self, name: &Token) -> ParseResult<Vec<Statement>> {
        let file_path = format!(
            "{}{}{}",
            self.file_parent_path, name.literal, SOURCE_EXTENSION
        );

        if self.context.source_manager.is_path_registered(&file_path) {
            return Ok(Vec::new());
        }

        if !Path::new(&file_path).exists() {
            return Err(self
                .context
                .diagnostics
                .report_error(name.span, format!("Path not exists {file_path}")));
        }

        self.parse_single_source_file(&file_path)
    }

    fn parse_single_source_file(&mut self, path: &str) -> ParseResult<Vec<Statement>> {
        debug!("parsing transitively loaded file {path}");
        let source_content = fs::read_to_string(path).map_err(|error| {
            self.context
                .diagnostics
                .report_error(self.current.span, format!("Can't read {path}: {error}"))
        })?;

        let file_id = self.context.source_manager.register_source_path(path);
        let tokenizer = Tokenizer::new(file_id, source_content);
        let mut parser = Parser::new(&mut *self.context, tokenizer, path);
        let unit = parser.parse_compilation_unit();

        if self
            .context
            .diagnostics
            .level_count(crate::diagnostics::DiagnosticLevel::Error)
            > 0
        {
            return Err(Reported);
        }
        Ok(unit.tree_nodes)
    }

    fn parse_type_alias_declaration(&mut self) -> ParseResult<()> {
        self.consume_kind(TokenKind::Type, "Expect type keyword")?;
        let alias = self.consume_kind(TokenKind::Identifier, "Expect identifier for type alias")?;

        if self.context.alias_table.contains(&alias.literal) {
            return Err(self.context.diagnostics.report_error(
                alias.span,
                format!("There already a type with name {}", alias.literal),
            ));
        }

        self.assert_kind(TokenKind::Equal, "Expect = after alias name")?;
        let actual_type = self.parse_type()?;

        if actual_type.is_enum() {
            return Err(self
                .context
                .diagnostics
                .report_error(alias.span, "You can't use type alias for enum name"));
        }

        if actual_type.is_enum_element() {
            return Err(self
                .context
                .diagnostics
                .report_error(alias.span, "You can't use type alias for enum element"));
        }

        self.assert_kind(TokenKind::Semicolon, "Expect ; after actual type")?;
        self.context
            .alias_table
            .define_alias(&alias.literal, actual_type);
        Ok(())
    }

    fn parse_declaration_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Prefix | TokenKind::Infix | TokenKind::Postfix => {
                let call_kind = match self.current.kind {
                    TokenKind::Infix => FunctionKind::Infix,
                    TokenKind::Postfix => FunctionKind::Postfix,
                    _ => FunctionKind::Prefix,
                };
                let keyword = self.peek_and_advance_token()?;

                if self.is_current_kind(TokenKind::Extern) {
                    let prototype = self.parse_function_prototype(call_kind, true)?;
                    return Ok(Statement::Prototype(prototype));
                }
                if self.is_current_kind(TokenKind::Fun) {
                    return self.parse_function_declaration(call_kind);
                }
                if self.is_current_kind(TokenKind::Operator) {
                    return self.parse_operator_function_declaration(call_kind);
                }

                Err(self.context.diagnostics.report_error(
                    keyword.span,
                    "prefix, infix and postfix keywords are used only with functions and operators",
                ))
            }
            TokenKind::Extern => {
                if self.is_next_kind(TokenKind::Struct) {
                    self.advance_token()?;
                    return self.parse_structure_declaration(StructModifiers::OPAQUE_EXTERN);
                }
                let prototype = self.parse_function_prototype(FunctionKind::Normal, true)?;
                Ok(Statement::Prototype(prototype))
            }
            TokenKind::Intrinsic => self.parse_intrinsic_prototype(),
            TokenKind::Fun => self.parse_function_declaration(FunctionKind::Normal),
            TokenKind::Operator => self.parse_operator_function_declaration(FunctionKind::Infix),
            TokenKind::Var => self.parse_field_declaration(true),
            TokenKind::Const => self.parse_const_declaration(),
            TokenKind::Struct => self.parse_structure_declaration(StructModifiers::empty()),
            TokenKind::Packed => {
                self.advance_token()?;
                self.parse_structure_declaration(StructModifiers::PACKED)
            }
            TokenKind::Enum => self.parse_enum_declaration(),
            _ => Err(self
                .context
                .diagnostics
                .report_error(self.current.span, "Invalid top level declaration statement")),
        }
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current.kind {
            TokenKind::Var => self.parse_field_declaration(false),
            TokenKind::Const => self.parse_const_declaration(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Switch => self.parse_switch_statement(false),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Defer => self.parse_defer_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::OpenBrace => Ok(Statement::Block(self.parse_block_statement()?)),
            TokenKind::At => self.parse_statements_directive(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_field_declaration(&mut self, is_global: bool) -> ParseResult<Statement> {
        self.assert_kind(TokenKind::Var, "Expect var keyword.")?;
        let name =
            self.consume_kind(TokenKind::Identifier, "Expect identifier as variable name.")?;

        if self.is_current_kind(TokenKind::Colon) {
            self.advance_token()?;
            let ty = self.parse_type()?;
            let mut value = None;
            if self.is_current_kind(TokenKind::Equal) {
                self.advance_token()?;
                value = Some(self.parse_expression()?);
            }
            self.assert_kind(
                TokenKind::Semicolon,
                "Expect semicolon `;` after field declaration",
            )?;
            return Ok(Statement::FieldDeclaration(Box::new(FieldDeclaration {
                name,
                ty,
                value,
                is_global,
            })));
        }

        self.assert_kind(
            TokenKind::Equal,
            "Expect `=` or `:` after field declaration name.",
        )?;
        let value = self.parse_expression()?;
        self.assert_kind(
            TokenKind::Semicolon,
            "Expect semicolon `;` after field declaration",
        )?;
        Ok(Statement::FieldDeclaration(Box::new(FieldDeclaration {
            name,
            ty: none_type(),
            value: Some(value),
            is_global,
        })))
    }

    fn parse_const_declaration(&mut self) -> ParseResult<Statement> {
        self.advance_token()?;
        let name = self.consume_kind(TokenKind::Identifier, "Expect const declaration name")?;
        self.assert_kind(TokenKind::Equal, "Expect = after const variable name")?;
        let value = self.parse_expression()?;
        self.check_compile_time_constant_expression(&value, name.span)?;
        self.assert_kind(TokenKind::Semicolon, "Expect ; after const declaration")?;
        self.context
            .constants_table
            .define(name.literal.clone(), value.clone());
        Ok(Statement::ConstDeclaration(Box::new(ConstDeclaration {
            name,
            value,
        })))
    }

    fn parse_intrinsic_prototype(&mut self) -> ParseResult<Statement> {
        self.consume_kind(TokenKind::Intrinsic, "Expect intrinsic keyword")?;

        let mut native_name = String::new();
        if self.is_current_kind(TokenKind::OpenParen) {
            self.advance_token()?;
            let native = self.consume_kind(TokenKind::String, "Expect intrinsic native name.")?;
            if !is_valid_intrinsic_name(&native.literal) {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(native.span, "Intrinsic name can't have space or be empty"));
            }
            native_name = native.literal;
            self.assert_kind(TokenKind::CloseParen, "Expect ) after native intrinsic name.")?;
        }

        self.assert_kind(TokenKind::Fun, "Expect function keyword.")?;
        let name =
            self.consume_kind(TokenKind::Identifier, "Expect identifier as function name.")?;

        if self.is_current_kind(TokenKind::Smaller) {
            return Err(self
                .context
                .diagnostics
                .report_error(name.span, "intrinsic function can't has generic parameter"));
        }

        if native_name.is_empty() {
            native_name = name.literal.clone();
        }

        let (parameters, has_varargs, varargs_type) = self.parse_parameters_list()?;

        self.context
            .functions
            .insert(name.literal.clone(), FunctionKind::Normal);

        let return_type = self.parse_optional_return_type()?;
        self.check_function_return_type(&name, &return_type)?;
        self.assert_kind(
            TokenKind::Semicolon,
            "Expect ; after intrinsic function declaration",
        )?;

        Ok(Statement::Intrinsic(IntrinsicPrototype {
            name,
            native_name,
            parameters,
            return_type,
            has_varargs,
            varargs_type,
        }))
    }

    fn parse_function_prototype(
        &mut self,
        kind: FunctionKind,
        is_external: bool,
    ) -> ParseResult<FunctionPrototype> {
        if is_external {
            self.assert_kind(TokenKind::Extern, "Expect external keyword")?;
        }

        self.assert_kind(TokenKind::Fun, "Expect function keyword.")?;
        let name =
            self.consume_kind(TokenKind::Identifier, "Expect identifier as function name.")?;

        let mut generic_parameters = Vec::new();
        let is_generic = self.is_current_kind(TokenKind::Smaller);
        if is_external && is_generic {
            return Err(self
                .context
                .diagnostics
                .report_error(name.span, "external function can't has generic parameter"));
        }

        if is_generic {
            self.advance_token()?;
            while self.is_source_available() && !self.is_current_kind(TokenKind::Greater) {
                let parameter =
                    self.consume_kind(TokenKind::Identifier, "Expect parameter name")?;
                self.check_generic_parameter_name(&parameter)?;
                generic_parameters.push(parameter.literal);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                }
            }
            self.assert_kind(TokenKind::Greater, "Expect > after generic parameters")?;
        }

        let (parameters, has_varargs, varargs_type) = self.parse_parameters_list()?;

        let parameters_count = parameters.len();
        if kind == FunctionKind::Prefix && parameters_count != 1 {
            return Err(self
                .context
                .diagnostics
                .report_error(name.span, "Prefix function must have exactly one parameter"));
        }
        if kind == FunctionKind::Infix && parameters_count != 2 {
            return Err(self
                .context
                .diagnostics
                .report_error(name.span, "Infix function must have exactly two parameters"));
        }
        if kind == FunctionKind::Postfix && parameters_count != 1 {
            return Err(self.context.diagnostics.report_error(
                name.span,
                "Postfix function must have exactly one parameter",
            ));
        }

        self.context.functions.insert(name.literal.clone(), kind);

        let return_type = self.parse_optional_return_type()?;
        self.check_function_return_type(&name, &return_type)?;

        // External function has no body so must end with ;
        if is_external {
            self.assert_kind(
                TokenKind::Semicolon,
                "Expect ; after external function declaration",
            )?;
        }

        if name.literal == "main" {
            if kind != FunctionKind::Normal {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(name.span, "main can't be prefix, infix or postfix function"));
            }
            if is_external {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(name.span, "main can't be external function"));
            }
            if !(return_type.is_void() || return_type.is_integer32() || return_type.is_integer64())
            {
                return Err(self.context.diagnostics.report_error(
                    name.span,
                    "main has invalid return type expect void, int32 or int64",
                ));
            }
        }

        Ok(FunctionPrototype {
            name,
            parameters,
            return_type,
            is_external,
            has_varargs,
            varargs_type,
            is_generic,
            generic_parameters,
        })
    }

    fn parse_parameters_list(
        &mut self,
    ) -> ParseResult<(Vec<Parameter>, bool, Option<Rc<Type>>)> {
        let mut parameters = Vec::new();
        let mut has_varargs = false;
        let mut varargs_type = None;

        if self.is_current_kind(TokenKind::OpenParen) {
            self.advance_token()?;
            while self.is_source_available() && !self.is_current_kind(TokenKind::CloseParen) {
                if has_varargs {
                    return Err(self.context.diagnostics.report_error(
                        self.previous.span,
                        "Varargs must be the last parameter in the function",
                    ));
                }

                if self.is_current_kind(TokenKind::Varargs) {
                    self.advance_token()?;
                    if self.is_current_kind(TokenKind::Identifier)
                        && self.current.literal == "Any"
                    {
                        self.advance_token()?;
                    } else {
                        varargs_type = Some(self.parse_type()?);
                    }
                    has_varargs = true;
                    continue;
                }

                parameters.push(self.parse_parameter()?);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                }
            }
            self.assert_kind(TokenKind::CloseParen, "Expect ) after function parameters.")?;
        }

        Ok((parameters, has_varargs, varargs_type))
    }

    fn parse_optional_return_type(&mut self) -> ParseResult<Rc<Type>> {
        if self.is_current_kind(TokenKind::Semicolon)
            || self.is_current_kind(TokenKind::OpenBrace)
            || self.is_current_kind(TokenKind::Equal)
        {
            return Ok(void_type());
        }
        self.parse_type()
    }

    fn check_function_return_type(&mut self, name: &Token, return_type: &Type) -> ParseResult<()> {
        // Fixed size arrays are returned through pointers instead.
        if return_type.is_array() {
            return Err(self.context.diagnostics.report_error(
                name.span,
                format!(
                    "Function cannot return array type {}",
                    crate::types::type_literal(return_type)
                ),
            ));
        }
        Ok(())
    }

    fn parse_function_declaration(&mut self, kind: FunctionKind) -> ParseResult<Statement> {
        let parent_scope = self.current_scope;
        self.current_scope = AstScope::Function;
        self.context.constants_table.push_new_scope();

        let result = self.parse_function_declaration_inner(kind);

        self.current_scope = parent_scope;
        self.context.constants_table.pop_current_scope();
        self.generic_parameter_names.clear();
        result
    }

    fn parse_function_declaration_inner(&mut self, kind: FunctionKind) -> ParseResult<Statement> {
        let prototype = self.parse_function_prototype(kind, false)?;
        let body = self.parse_function_body(prototype.return_type.is_void())?;
        Ok(Statement::Function(Box::new(FunctionDeclaration {
            prototype,
            body,
        })))
    }

    /// `= <expression>;` or `{ ... }`. A void block body without a trailing
    /// return gets one appended.
    fn parse_function_body(&mut self, is_void_return: bool) -> ParseResult<Statement> {
        if self.is_current_kind(TokenKind::Equal) {
            let equal = self.peek_and_advance_token()?;
            let value = self.parse_expression()?;
            self.assert_kind(TokenKind::Semicolon, "Expect ; after function value")?;
            return Ok(Statement::Return(Box::new(ReturnStatement {
                position: equal,
                value: Some(value),
            })));
        }

        if self.is_current_kind(TokenKind::OpenBrace) {
            self.loop_levels.push(0);
            let mut block = self.parse_block_statement()?;
            self.loop_levels.pop();

            self.check_unnecessary_semicolon_warning()?;
            let close_brace = self.previous.clone();

            if is_void_return && !ends_with_return_statement(&block) {
                block.statements.push(Statement::Return(Box::new(
                    ReturnStatement {
                        position: close_brace,
                        value: None,
                    },
                )));
            }

            return Ok(Statement::Block(block));
        }

        Err(self.context.diagnostics.report_error(
            self.previous.span,
            "function declaration without a body: `{ <body> }` or `= <value>;`",
        ))
    }

    fn parse_operator_function_declaration(&mut self, kind: FunctionKind) -> ParseResult<Statement> {
        let parent_scope = self.current_scope;
        self.current_scope = AstScope::Function;
        self.context.constants_table.push_new_scope();

        let result = self.parse_operator_function_declaration_inner(kind);

        self.current_scope = parent_scope;
        self.context.constants_table.pop_current_scope();
        result
    }

    fn parse_operator_function_declaration_inner(
        &mut self,
        kind: FunctionKind,
    ) -> ParseResult<Statement> {
        let operator_keyword = self.peek_and_advance_token()?;
        let mut operator_token = self.peek_and_advance_token()?;

        // Two `>` tokens in operator position are one `>>`.
        if operator_token.kind == TokenKind::Greater && self.is_current_kind(TokenKind::Greater) {
            self.advance_token()?;
            operator_token.kind = TokenKind::RightShift;
        }

        let supported = match kind {
            FunctionKind::Prefix => operator_token.kind.is_overloading_prefix_operator(),
            FunctionKind::Postfix => operator_token.kind.is_overloading_postfix_operator(),
            _ => operator_token.kind.is_overloading_infix_operator(),
        };
        if !supported {
            return Err(self.context.diagnostics.report_error(
                operator_keyword.span,
                "Unsupported operator for operator overloading function",
            ));
        }

        let mut parameters = Vec::new();
        if self.is_current_kind(TokenKind::OpenParen) {
            self.advance_token()?;
            while self.is_source_available() && !self.is_current_kind(TokenKind::CloseParen) {
                parameters.push(self.parse_parameter()?);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                }
            }
            self.assert_kind(TokenKind::CloseParen, "Expect ) after function parameters.")?;
        }

        let expected_parameters = if kind == FunctionKind::Prefix || kind == FunctionKind::Postfix {
            1
        } else {
            2
        };
        if parameters.len() != expected_parameters {
            return Err(self.context.diagnostics.report_error(
                operator_keyword.span,
                format!("Invalid number of parameters, expect {expected_parameters}"),
            ));
        }

        let parameters_types: Vec<Rc<Type>> =
            parameters.iter().map(|p| Rc::clone(&p.ty)).collect();
        let mangled = mangle_operator_function(operator_token.kind, &parameters_types);
        let mangled = match kind {
            FunctionKind::Prefix => format!("_prefix{mangled}"),
            FunctionKind::Postfix => format!("_postfix{mangled}"),
            _ => mangled,
        };

        let name = Token {
            kind: TokenKind::Identifier,
            span: operator_token.span,
            literal: mangled,
        };

        let return_type = self.parse_optional_return_type()?;
        let prototype = FunctionPrototype {
            name,
            parameters,
            return_type: Rc::clone(&return_type),
            is_external: false,
            has_varargs: false,
            varargs_type: None,
            is_generic: false,
            generic_parameters: Vec::new(),
        };

        let body = self.parse_function_body(return_type.is_void())?;
        Ok(Statement::OperatorFunction(Box::new(
            OperatorFunctionDeclaration {
                operator: operator_token,
                function: FunctionDeclaration { prototype, body },
            },
        )))
    }

    fn parse_structure_declaration(
        &mut self,
        modifiers: StructModifiers,
    ) -> ParseResult<Statement> {
        let mut modifiers = modifiers;
        self.consume_kind(TokenKind::Struct, "Expect struct keyword")?;
        let struct_name = self.consume_kind(TokenKind::Identifier, "Expect symbol as struct name")?;
        let struct_name_str = struct_name.literal.clone();

        if self.context.structures.contains_key(&struct_name_str) {
            return Err(self.context.diagnostics.report_error(
                struct_name.span,
                format!("There is already struct with name {struct_name_str}"),
            ));
        }

        if self.context.alias_table.contains(&struct_name_str) {
            return Err(self.context.diagnostics.report_error(
                struct_name.span,
                format!("There is already a type with name {struct_name_str}"),
            ));
        }

        // Opaque extern struct has no visible fields.
        if modifiers.contains(StructModifiers::OPAQUE_EXTERN)
            && self.is_current_kind(TokenKind::Semicolon)
        {
            self.advance_token()?;
            let structure = Rc::new(StructType {
                name: struct_name_str.clone(),
                fields_names: Vec::new(),
                fields_types: Vec::new(),
                generic_parameters: Vec::new(),
                generic_parameters_types: Vec::new(),
                modifiers,
            });
            self.context
                .structures
                .insert(struct_name_str.clone(), Rc::clone(&structure));
            self.context
                .alias_table
                .define_alias(&struct_name_str, Rc::new(Type::Struct(Rc::clone(&structure))));
            return Ok(Statement::Struct(StructDeclaration {
                struct_type: structure,
            }));
        }

        self.current_struct_name = struct_name_str.clone();

        let mut generic_parameters = Vec::new();
        if self.is_current_kind(TokenKind::Smaller) {
            modifiers |= StructModifiers::GENERIC;
            self.advance_token()?;
            while self.is_source_available() && !self.is_current_kind(TokenKind::Greater) {
                let parameter =
                    self.consume_kind(TokenKind::Identifier, "Expect parameter name")?;
                self.check_generic_parameter_name(&parameter)?;
                generic_parameters.push(parameter.literal);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                }
            }
            self.assert_kind(TokenKind::Greater, "Expect > after struct type parameters")?;
        }

        let mut fields_names: Vec<String> = Vec::new();
        let mut fields_types: Vec<Rc<Type>> = Vec::new();
        self.assert_kind(TokenKind::OpenBrace, "Expect { after struct name")?;
        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBrace) {
            let field_name =
                self.consume_kind(TokenKind::Identifier, "Expect symbol as struct field name")?;

            if fields_names.contains(&field_name.literal) {
                return Err(self.context.diagnostics.report_error(
                    field_name.span,
                    format!(
                        "There is already struct member with name {}",
                        field_name.literal
                    ),
                ));
            }

            fields_names.push(field_name.literal.clone());
            let field_type = self.parse_type()?;

            if matches!(*field_type, Type::None) {
                return Err(self.context.diagnostics.report_error(
                    field_name.span,
                    format!(
                        "Field type isn't fully defined yet, you can't use it \
                         until it defined but you can use *{struct_name_str}"
                    ),
                ));
            }

            fields_types.push(field_type);
            self.assert_kind(
                TokenKind::Semicolon,
                "Expect ; at the end of struct field declaration",
            )?;
        }

        self.assert_kind(TokenKind::CloseBrace, "Expect } in the end of struct declaration")?;
        self.check_unnecessary_semicolon_warning()?;

        // Rebind pointer-to-self placeholders now that the struct is sealed.
        // The stub carries only the name, which is all nominal equality and
        // mangling consult; consumers that need fields resolve the canonical
        // definition through the structures registry.
        if self.current_struct_unknown_fields > 0 {
            let stub = Rc::new(StructType {
                name: struct_name_str.clone(),
                fields_names: Vec::new(),
                fields_types: Vec::new(),
                generic_parameters: generic_parameters.clone(),
                generic_parameters_types: Vec::new(),
                modifiers,
            });
            let self_pointer = Rc::new(Type::Pointer(Rc::new(Type::Struct(stub))));

            for field_type in &mut fields_types {
                if field_type.is_pointer_of(&Type::None) {
                    *field_type = Rc::clone(&self_pointer);
                    self.current_struct_unknown_fields -= 1;
                    continue;
                }

                if let Type::StaticArray { element, size } = &**field_type {
                    if **element == *none_ptr_type() {
                        *field_type = Rc::new(Type::StaticArray {
                            element: Rc::clone(&self_pointer),
                            size: *size,
                        });
                        self.current_struct_unknown_fields -= 1;
                    }
                }
            }
        }
        debug_assert_eq!(self.current_struct_unknown_fields, 0);
        self.current_struct_unknown_fields = 0;

        let structure = Rc::new(StructType {
            name: struct_name_str.clone(),
            fields_names,
            fields_types,
            generic_parameters,
            generic_parameters_types: Vec::new(),
            modifiers,
        });

        self.context
            .structures
            .insert(struct_name_str.clone(), Rc::clone(&structure));
        self.context
            .alias_table
            .define_alias(&struct_name_str, Rc::new(Type::Struct(Rc::clone(&structure))));

        self.current_struct_name.clear();
        self.generic_parameter_names.clear();
        Ok(Statement::Struct(StructDeclaration {
            struct_type: structure,
        }))
    }

    fn parse_enum_declaration(&mut self) -> ParseResult<Statement> {
        self.consume_kind(TokenKind::Enum, "Expect enum keyword")?;
        let enum_name = self.consume_kind(TokenKind::Identifier, "Expect symbol as enum name")?;

        let element_type = if self.is_current_kind(TokenKind::Colon) {
            self.advance_token()?;
            self.parse_type()?
        } else {
            i32_type()
        };

        self.assert_kind(TokenKind::OpenBrace, "Expect { after enum name")?;

        let mut values = std::collections::HashMap::new();
        let mut explicit_values = HashSet::new();
        let mut index: i64 = 0;
        let mut has_explicit_values = false;

        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBrace) {
            let member = self.consume_kind(TokenKind::Identifier, "Expect symbol as enum value")?;

            if values.contains_key(&member.literal) {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(member.span, "Can't declare 2 elements with the same name"));
            }

            if self.is_current_kind(TokenKind::Equal) {
                self.advance_token()?;
                let field_value = self.parse_expression()?;
                let Expression::Number(number) = &field_value else {
                    return Err(self.context.diagnostics.report_error(
                        member.span,
                        "Enum field explicit value must be integer expression",
                    ));
                };

                if number.value.kind.is_float_literal() {
                    return Err(self.context.diagnostics.report_error(
                        member.span,
                        "Enum field explicit value must be integer value not float",
                    ));
                }

                let explicit_value: i64 = number.value.literal.parse().map_err(|_| {
                    self.context
                        .diagnostics
                        .report_error(member.span, "Enum field explicit value is out of range")
                })?;

                if !explicit_values.insert(explicit_value) {
                    return Err(self.context.diagnostics.report_error(
                        member.span,
                        format!("There is also one enum field with explicit value {explicit_value}"),
                    ));
                }

                values.insert(member.literal, explicit_value);
                has_explicit_values = true;
            } else {
                if has_explicit_values {
                    return Err(self.context.diagnostics.report_error(
                        member.span,
                        "You must add explicit value to all enum fields or to no one",
                    ));
                }
                values.insert(member.literal, index);
                index += 1;
            }

            if self.is_current_kind(TokenKind::Comma) {
                self.advance_token()?;
            }
        }
        self.assert_kind(TokenKind::CloseBrace, "Expect } in the end of enum declaration")?;
        self.check_unnecessary_semicolon_warning()?;

        let enum_type = Rc::new(EnumType {
            name: enum_name.clone(),
            values,
            element_type,
        });
        self.context
            .enumerations
            .insert(enum_name.literal.clone(), Rc::clone(&enum_type));
        Ok(Statement::Enum(EnumDeclaration {
            name: enum_name,
            enum_type,
        }))
    }

    pub(crate) fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let name =
            self.consume_kind(TokenKind::Identifier, "Expect identifier as parameter name.")?;
        let ty = self.parse_type()?;
        Ok(Parameter { name, ty })
    }

    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        self.consume_kind(TokenKind::OpenBrace, "Expect { on the start of block.")?;
        let mut statements = Vec::new();
        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBrace) {
            statements.push(self.parse_statement()?);
        }
        self.consume_kind(TokenKind::CloseBrace, "Expect } on the end of block.")?;
        Ok(BlockStatement { statements })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.consume_kind(TokenKind::Return, "Expect return keyword.")?;
        if self.is_current_kind(TokenKind::Semicolon) {
            self.advance_token()?;
            return Ok(Statement::Return(Box::new(ReturnStatement {
                position: keyword,
                value: None,
            })));
        }
        let value = self.parse_expression()?;
        self.assert_kind(
            TokenKind::Semicolon,
            "Expect semicolon `;` after return statement",
        )?;
        Ok(Statement::Return(Box::new(ReturnStatement {
            position: keyword,
            value: Some(value),
        })))
    }

    fn parse_defer_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.consume_kind(TokenKind::Defer, "Expect defer keyword.")?;
        let expression = self.parse_expression()?;

        if let Expression::Call(call) = expression {
            self.assert_kind(
                TokenKind::Semicolon,
                "Expect semicolon `;` after defer call statement",
            )?;
            return Ok(Statement::Defer(Box::new(DeferStatement {
                position: keyword,
                call: *call,
            })));
        }

        Err(self
            .context
            .diagnostics
            .report_error(keyword.span, "defer keyword expect call expression"))
    }

    fn parse_break_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.consume_kind(TokenKind::Break, "Expect break keyword.")?;
        let times = self.parse_loop_exit_times(&keyword, "break")?;
        Ok(Statement::Break(BreakStatement {
            position: keyword,
            has_times: times.is_some(),
            times: times.unwrap_or(1),
        }))
    }

    fn parse_continue_statement(&mut self) -> ParseResult<Statement> {
        let keyword = self.consume_kind(TokenKind::Continue, "Expect continue keyword.")?;
        let times = self.parse_loop_exit_times(&keyword, "continue")?;
        Ok(Statement::Continue(ContinueStatement {
            position: keyword,
            has_times: times.is_some(),
            times: times.unwrap_or(1),
        }))
    }

    /// Shared validation for `break [N];` and `continue [N];`.
    fn parse_loop_exit_times(&mut self, keyword: &Token, name: &str) -> ParseResult<Option<u32>> {
        let loop_depth = self.loop_levels.last().copied().unwrap_or(0);
        if self.current_scope != AstScope::Condition || loop_depth == 0 {
            return Err(self.context.diagnostics.report_error(
                keyword.span,
                format!("{name} keyword can only be used inside at last one loop"),
            ));
        }

        if self.is_current_kind(TokenKind::Semicolon) {
            self.advance_token()?;
            return Ok(None);
        }

        let times_expression = self.parse_expression()?;
        let Expression::Number(number) = &times_expression else {
            return Err(self
                .context
                .diagnostics
                .report_error(keyword.span, format!("{name} keyword times must be a number")));
        };

        if number.value.kind.is_float_literal() {
            return Err(self.context.diagnostics.report_error(
                keyword.span,
                format!("expect {name} times to be integer but found floating point value"),
            ));
        }

        let times: i64 = number.value.literal.parse().map_err(|_| {
            self.context
                .diagnostics
                .report_error(keyword.span, format!("{name} times is out of range"))
        })?;

        if times < 1 {
            return Err(self.context.diagnostics.report_error(
                keyword.span,
                format!("expect {name} times must be positive value and at last 1"),
            ));
        }

        if times > i64::from(loop_depth) {
            return Err(self.context.diagnostics.report_error(
                keyword.span,
                format!(
                    "{name} times can't be bigger than the number of loops you have, \
                     expect less than or equals {loop_depth}"
                ),
            ));
        }

        self.assert_kind(
            TokenKind::Semicolon,
            "Expect semicolon `;` after statement",
        )?;
        Ok(Some(times as u32))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        let parent_scope = self.current_scope;
        self.current_scope = AstScope::Condition;
        let result = self.parse_if_statement_inner();
        self.current_scope = parent_scope;
        result
    }

    fn parse_if_statement_inner(&mut self) -> ParseResult<Statement> {
        let if_token = self.consume_kind(TokenKind::If, "Expect if keyword.")?;
        self.assert_kind(TokenKind::OpenParen, "Expect ( before if condition")?;
        let condition = self.parse_expression()?;
        self.assert_kind(TokenKind::CloseParen, "Expect ) after if condition")?;
        let body = self.parse_statement()?;

        let mut conditional_blocks = vec![ConditionalBlock {
            position: if_token,
            condition,
            body,
        }];

        let mut has_else = false;
        while self.is_source_available() && self.is_current_kind(TokenKind::Else) {
            let else_token = self.consume_kind(TokenKind::Else, "Expect else keyword.")?;

            if self.is_current_kind(TokenKind::If) {
                self.advance_token()?;
                self.assert_kind(TokenKind::OpenParen, "Expect ( before if condition")?;
                let elif_condition = self.parse_expression()?;
                self.assert_kind(TokenKind::CloseParen, "Expect ) after if condition")?;
                let elif_body = self.parse_statement()?;
                conditional_blocks.push(ConditionalBlock {
                    position: else_token,
                    condition: elif_condition,
                    body: elif_body,
                });
                continue;
            }

            if has_else {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(else_token.span, "You already declared else branch"));
            }

            let mut true_token = else_token.clone();
            true_token.kind = TokenKind::True;
            let true_expression = Expression::Bool(Box::new(BoolExpression {
                value: true_token,
                ty: i1_type(),
            }));
            let else_body = self.parse_statement()?;
            conditional_blocks.push(ConditionalBlock {
                position: else_token,
                condition: true_expression,
                body: else_body,
            });
            has_else = true;
        }

        Ok(Statement::If(IfStatement {
            conditional_blocks,
            has_else,
        }))
    }

    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        let parent_scope = self.current_scope;
        self.current_scope = AstScope::Condition;
        let result = self.parse_for_statement_inner();
        self.current_scope = parent_scope;
        result
    }

    fn parse_for_statement_inner(&mut self) -> ParseResult<Statement> {
        let keyword = self.consume_kind(TokenKind::For, "Expect for keyword.")?;

        // for { } is for-ever.
        if self.is_current_kind(TokenKind::OpenBrace) {
            let body = self.parse_loop_body()?;
            return Ok(Statement::Forever(Box::new(ForeverStatement {
                position: keyword,
                body,
            })));
        }

        self.assert_kind(TokenKind::OpenParen, "Expect ( before for names and collection")?;

        let mut element_name = "it".to_owned();
        let mut index_name = "it_index".to_owned();

        let mut expression = self.parse_expression()?;
        if self.is_current_kind(TokenKind::Colon) || self.is_current_kind(TokenKind::Comma) {
            let Expression::Literal(literal) = &expression else {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(keyword.span, "Optional named variable must be identifier"));
            };

            // for (element[, index] : collection)
            element_name = literal.name.literal.clone();
            if self.is_current_kind(TokenKind::Comma) {
                self.advance_token()?;
                index_name = self
                    .consume_kind(TokenKind::Identifier, "Expect index name")?
                    .literal;
            }

            self.assert_kind(TokenKind::Colon, "Expect `:` after element name in for each")?;
            expression = self.parse_expression()?;
        }

        // for (x .. y [: step]) is an inclusive range.
        if self.is_current_kind(TokenKind::DotDot) {
            self.advance_token()?;
            let range_end = self.parse_expression()?;

            let mut step = None;
            if self.is_current_kind(TokenKind::Colon) {
                self.advance_token()?;
                step = Some(self.parse_expression()?);
            }

            self.assert_kind(TokenKind::CloseParen, "Expect ) after for names and collection")?;
            let body = self.parse_loop_body()?;
            return Ok(Statement::ForRange(Box::new(ForRangeStatement {
                position: keyword,
                element_name,
                range_start: expression,
                range_end,
                step,
                body,
            })));
        }

        self.assert_kind(TokenKind::CloseParen, "Expect ) after for names and collection")?;
        let body = self.parse_loop_body()?;
        Ok(Statement::ForEach(Box::new(ForEachStatement {
            position: keyword,
            element_name,
            index_name,
            collection: expression,
            body,
        })))
    }

    fn parse_loop_body(&mut self) -> ParseResult<Statement> {
        if let Some(depth) = self.loop_levels.last_mut() {
            *depth += 1;
        }
        let body = self.parse_statement();
        if let Some(depth) = self.loop_levels.last_mut() {
            *depth -= 1;
        }
        body
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        let parent_scope = self.current_scope;
        self.current_scope = AstScope::Condition;
        let result = self.parse_while_statement_inner();
        self.current_scope = parent_scope;
        result
    }

    fn parse_while_statement_inner(&mut self) -> ParseResult<Statement> {
        let keyword = self.consume_kind(TokenKind::While, "Expect while keyword.")?;
        self.assert_kind(TokenKind::OpenParen, "Expect ( before while condition")?;
        let condition = self.parse_expression()?;
        self.assert_kind(TokenKind::CloseParen, "Expect ) after while condition")?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(Box::new(WhileStatement {
            position: keyword,
            condition,
            body,
        })))
    }

    pub(crate) fn parse_switch_statement(&mut self, complete_check: bool) -> ParseResult<Statement> {
        let keyword = self.consume_kind(TokenKind::Switch, "Expect switch keyword.")?;

        self.assert_kind(TokenKind::OpenParen, "Expect ( before switch argument")?;
        let argument = self.parse_expression()?;
        self.assert_kind(TokenKind::CloseParen, "Expect ) after switch argument")?;
        self.assert_kind(TokenKind::OpenBrace, "Expect { after switch value")?;

        let mut cases = Vec::new();
        let mut default_case = None;

        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBrace) {
            if self.is_current_kind(TokenKind::Else) {
                if default_case.is_some() {
                    return Err(self.context.diagnostics.report_error(
                        keyword.span,
                        "Switch statement can't has more than one default branch",
                    ));
                }
                let else_keyword = self
                    .consume_kind(TokenKind::Else, "Expect else keyword in switch default branch")?;
                self.consume_kind(
                    TokenKind::RightArrow,
                    "Expect -> after else keyword in switch default branch",
                )?;
                let default_body = self.parse_statement()?;
                default_case = Some(SwitchCase {
                    position: else_keyword,
                    values: Vec::new(),
                    body: default_body,
                });
                continue;
            }

            // All values of this case: V1, V2, ..., Vn ->
            let mut values = Vec::new();
            while self.is_source_available() && !self.is_current_kind(TokenKind::RightArrow) {
                values.push(self.parse_expression()?);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                }
            }
            let right_arrow =
                self.consume_kind(TokenKind::RightArrow, "Expect -> after branch value")?;
            let body = self.parse_statement()?;
            cases.push(SwitchCase {
                position: right_arrow,
                values,
                body,
            });
        }

        self.assert_kind(
            TokenKind::CloseBrace,
            "Expect } after switch statement last branch",
        )?;

        Ok(Statement::Switch(Box::new(SwitchStatement {
            position: keyword,
            argument,
            cases,
            default_case,
            complete_check,
        })))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression()?;
        self.assert_kind(TokenKind::Semicolon, "Expect semicolon `;` after expression")?;
        Ok(Statement::Expression(Box::new(ExpressionStatement {
            expression,
        })))
    }

    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_binary_expression(Precedence::LogicalOr)?;
        if self.current.kind.is_assignment_operator() {
            let mut operator = self.peek_and_advance_token()?;

            if operator.kind == TokenKind::Equal {
                let right = self.parse_assignment_expression()?;
                let ty = right.ty();
                return Ok(Expression::Assign(Box::new(AssignExpression {
                    left: expression,
                    operator,
                    right,
                    ty,
                })));
            }

            // a += b desugars to a = a + b with the operator token rewritten.
            operator.kind = operator
                .kind
                .assignment_binary_operator()
                .expect("compound assignment operator");
            let right_expression = self.parse_assignment_expression()?;
            let binary_ty = right_expression.ty();
            let right = Expression::Binary(Box::new(BinaryExpression {
                left: expression.clone(),
                operator: operator.clone(),
                right: right_expression,
                ty: binary_ty,
            }));
            let ty = right.ty();
            return Ok(Expression::Assign(Box::new(AssignExpression {
                left: expression,
                operator,
                right,
                ty,
            })));
        }
        Ok(expression)
    }

    fn parse_binary_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        if precedence == Precedence::EnumAccess {
            return self.parse_enum_access_expression();
        }

        let tighter = Precedence::try_from(u8::from(precedence) + 1)
            .expect("EnumAccess terminates the ladder");
        let mut expression = self.parse_binary_expression(tighter)?;

        loop {
            let kind = self.current.kind;
            let accepted = match precedence {
                Precedence::LogicalOr => kind == TokenKind::OrOr,
                Precedence::LogicalAnd => kind == TokenKind::AndAnd,
                Precedence::Equality => {
                    matches!(kind, TokenKind::EqualEqual | TokenKind::BangEqual)
                }
                Precedence::Comparison => match kind {
                    TokenKind::GreaterEqual | TokenKind::Smaller | TokenKind::SmallerEqual => true,
                    // Two adjacent `>` belong to the shift level.
                    TokenKind::Greater => !self.is_next_kind(TokenKind::Greater),
                    _ => false,
                },
                Precedence::Shift => {
                    kind == TokenKind::LeftShift
                        || (kind == TokenKind::Greater && self.is_next_kind(TokenKind::Greater))
                }
                Precedence::Term => matches!(kind, TokenKind::Plus | TokenKind::Minus),
                Precedence::Factor => {
                    matches!(kind, TokenKind::Star | TokenKind::Slash | TokenKind::Percent)
                }
                Precedence::EnumAccess => unreachable!(),
            };

            if !accepted {
                return Ok(expression);
            }

            let mut operator = self.peek_and_advance_token()?;
            if precedence == Precedence::Shift && operator.kind == TokenKind::Greater {
                self.advance_token()?;
                operator.kind = TokenKind::RightShift;
            }

            let right = self.parse_binary_expression(tighter)?;
            expression = match precedence {
                Precedence::LogicalOr | Precedence::LogicalAnd => {
                    Expression::Logical(Box::new(LogicalExpression {
                        left: expression,
                        operator,
                        right,
                        ty: i1_type(),
                    }))
                }
                Precedence::Equality | Precedence::Comparison => {
                    Expression::Comparison(Box::new(ComparisonExpression {
                        left: expression,
                        operator,
                        right,
                        ty: i1_type(),
                    }))
                }
                Precedence::Shift => {
                    let ty = right.ty();
                    Expression::Shift(Box::new(ShiftExpression {
                        left: expression,
                        operator,
                        right,
                        ty,
                    }))
                }
                _ => {
                    let ty = right.ty();
                    Expression::Binary(Box::new(BinaryExpression {
                        left: expression,
                        operator,
                        right,
                        ty,
                    }))
                }
            };
        }
    }

    fn parse_enum_access_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_infix_call_expression()?;
        if self.is_current_kind(TokenKind::ColonColon) {
            let colons = self.peek_and_advance_token()?;
            let Expression::Literal(literal) = &expression else {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(colons.span, "Expect identifier as enum name"));
            };

            let enum_name = literal.name.clone();
            let Some(enum_type) = self.context.enumerations.get(&enum_name.literal) else {
                return Err(self.context.diagnostics.report_error(
                    enum_name.span,
                    format!("Can't find enum declaration with name {}", enum_name.literal),
                ));
            };
            let enum_type = Rc::clone(enum_type);

            let element = self
                .consume_kind(TokenKind::Identifier, "Expect identifier as enum field name")?;

            let Some(element_index) = enum_type.values.get(&element.literal).copied() else {
                return Err(self.context.diagnostics.report_error(
                    element.span,
                    format!(
                        "Can't find element with name {} in enum {}",
                        element.literal, enum_name.literal
                    ),
                ));
            };

            let element_type = Rc::new(Type::EnumElement {
                enum_name: enum_name.literal.clone(),
                element: Rc::clone(&enum_type.element_type),
            });
            return Ok(Expression::EnumAccess(Box::new(EnumAccessExpression {
                enum_name,
                element_name: element,
                element_index,
                ty: element_type,
            })));
        }
        Ok(expression)
    }

    fn parse_infix_call_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_prefix_expression()?;

        // A function declared `infix` is callable between its operands.
        if self.is_current_kind(TokenKind::Identifier)
            && self.is_function_declaration_kind(&self.current.literal.clone(), FunctionKind::Infix)
        {
            let symbol = self.current.clone();
            let literal = self.parse_literal_expression()?;
            let right = self.parse_infix_call_expression()?;
            let ty = literal.ty();
            return Ok(Expression::Call(Box::new(CallExpression {
                position: symbol,
                callee: literal,
                arguments: vec![expression, right],
                generic_arguments: Vec::new(),
                ty,
            })));
        }

        Ok(expression)
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        if self.current.kind.is_unary_operator() {
            let operator = self.peek_and_advance_token()?;
            let right = self.parse_prefix_expression()?;
            let ty = right.ty();
            return Ok(Expression::PrefixUnary(Box::new(PrefixUnaryExpression {
                operator,
                right,
                ty,
            })));
        }

        if self.is_current_kind(TokenKind::PlusPlus) || self.is_current_kind(TokenKind::MinusMinus)
        {
            let operator = self.peek_and_advance_token()?;
            let right = self.parse_prefix_expression()?;
            if !matches!(
                right,
                Expression::Literal(_) | Expression::Index(_) | Expression::Dot(_)
            ) {
                return Err(self.context.diagnostics.report_error(
                    operator.span,
                    "Unary ++ or -- expect right expression to be variable or index expression",
                ));
            }
            let ty = right.ty();
            return Ok(Expression::PrefixUnary(Box::new(PrefixUnaryExpression {
                operator,
                right,
                ty,
            })));
        }

        self.parse_prefix_call_expression()
    }

    fn parse_prefix_call_expression(&mut self) -> ParseResult<Expression> {
        if self.is_current_kind(TokenKind::Identifier)
            && self.is_function_declaration_kind(&self.current.literal.clone(), FunctionKind::Prefix)
        {
            let symbol = self.current.clone();
            let literal = self.parse_literal_expression()?;
            let argument = self.parse_prefix_expression()?;
            let ty = literal.ty();
            return Ok(Expression::Call(Box::new(CallExpression {
                position: symbol,
                callee: literal,
                arguments: vec![argument],
                generic_arguments: Vec::new(),
                ty,
            })));
        }
        self.parse_postfix_increment_or_decrement()
    }

    fn parse_postfix_increment_or_decrement(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_call_or_access_expression()?;

        if self.is_current_kind(TokenKind::PlusPlus) || self.is_current_kind(TokenKind::MinusMinus)
        {
            let operator = self.peek_and_advance_token()?;
            if !matches!(
                expression,
                Expression::Literal(_) | Expression::Index(_) | Expression::Dot(_)
            ) {
                return Err(self.context.diagnostics.report_error(
                    operator.span,
                    "Unary ++ or -- expect left expression to be variable or index expression",
                ));
            }
            let ty = expression.ty();
            return Ok(Expression::PostfixUnary(Box::new(PostfixUnaryExpression {
                operator,
                right: expression,
                ty,
            })));
        }

        Ok(expression)
    }

    fn parse_call_or_access_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.parse_enumeration_attribute_expression()?;

        loop {
            // Struct field or tuple member access.
            if self.is_current_kind(TokenKind::Dot) {
                let dot = self.peek_and_advance_token()?;

                if self.is_current_kind(TokenKind::Identifier) {
                    let field_name =
                        self.consume_kind(TokenKind::Identifier, "Expect literal as field name")?;
                    expression = Expression::Dot(Box::new(DotExpression {
                        position: dot,
                        callee: expression,
                        field_name,
                        field_index: 0,
                        is_constant: false,
                        ty: none_type(),
                    }));
                    continue;
                }

                if self.is_current_kind(TokenKind::Int) {
                    let field_name =
                        self.consume_kind(TokenKind::Int, "Expect literal as field name")?;
                    let field_index = field_name.literal.parse().unwrap_or(0);
                    expression = Expression::Dot(Box::new(DotExpression {
                        position: dot,
                        callee: expression,
                        field_name,
                        field_index,
                        is_constant: false,
                        ty: none_type(),
                    }));
                    continue;
                }

                return Err(self.context.diagnostics.report_error(
                    dot.span,
                    "Dot expression `.` must followed by symbol or integer for struct or tuple access",
                ));
            }

            // Call with explicit generic arguments: name<T, ...>(...)
            if self.is_current_kind(TokenKind::Smaller)
                && matches!(expression, Expression::Literal(_))
            {
                let Expression::Literal(literal) = &expression else {
                    unreachable!()
                };
                if !self.context.functions.contains_key(&literal.name.literal) {
                    return Ok(expression);
                }

                let position = self.peek_and_advance_token()?;
                let mut generic_arguments = Vec::new();
                while !self.is_current_kind(TokenKind::Greater) {
                    generic_arguments.push(self.parse_type()?);
                    if self.is_current_kind(TokenKind::Comma) {
                        self.advance_token()?;
                    }
                }
                self.advance_token()?;

                self.assert_kind(TokenKind::OpenParen, "Expect ( in the end of call expression")?;
                let mut arguments = Vec::new();
                while !self.is_current_kind(TokenKind::CloseParen) {
                    arguments.push(self.parse_expression()?);
                    if self.is_current_kind(TokenKind::Comma) {
                        self.advance_token()?;
                    }
                }
                self.assert_kind(TokenKind::CloseParen, "Expect ) in the end of call expression")?;

                if self.is_current_kind(TokenKind::OpenBrace) {
                    arguments.push(self.parse_lambda_expression()?);
                }

                let ty = expression.ty();
                expression = Expression::Call(Box::new(CallExpression {
                    position,
                    callee: expression,
                    arguments,
                    generic_arguments,
                    ty,
                }));
                continue;
            }

            if self.is_current_kind(TokenKind::OpenParen) {
                let position = self.peek_and_advance_token()?;
                let mut arguments = Vec::new();
                while !self.is_current_kind(TokenKind::CloseParen) {
                    arguments.push(self.parse_expression()?);
                    if self.is_current_kind(TokenKind::Comma) {
                        self.advance_token()?;
                    }
                }
                self.assert_kind(TokenKind::CloseParen, "Expect ) in the end of call expression")?;

                // Optional trailing lambda argument.
                if self.is_current_kind(TokenKind::OpenBrace) {
                    arguments.push(self.parse_lambda_expression()?);
                }

                let ty = expression.ty();
                expression = Expression::Call(Box::new(CallExpression {
                    position,
                    callee: expression,
                    arguments,
                    generic_arguments: Vec::new(),
                    ty,
                }));
                continue;
            }

            if self.is_current_kind(TokenKind::OpenBracket) {
                let position = self.peek_and_advance_token()?;
                let index = self.parse_expression()?;
                self.assert_kind(TokenKind::CloseBracket, "Expect ] after index value")?;
                expression = Expression::Index(Box::new(IndexExpression {
                    position,
                    value: expression,
                    index,
                    ty: none_type(),
                }));
                continue;
            }

            return Ok(expression);
        }
    }

    fn parse_enumeration_attribute_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_postfix_call_expression()?;

        if self.is_current_kind(TokenKind::Dot) {
            if let Expression::Literal(literal) = &expression {
                let literal_name = literal.name.literal.clone();
                if self.context.enumerations.contains_key(&literal_name) {
                    self.advance_token()?;
                    let attribute =
                        self.consume_kind(TokenKind::Identifier, "Expect attribute name for enum")?;

                    if attribute.literal == "count" {
                        let count = self.context.enumerations[&literal_name].values.len();
                        let number_token = Token {
                            kind: TokenKind::Int,
                            span: attribute.span,
                            literal: count.to_string(),
                        };
                        return Ok(Expression::Number(Box::new(NumberExpression {
                            value: number_token,
                            ty: i64_type(),
                        })));
                    }

                    return Err(self
                        .context
                        .diagnostics
                        .report_error(attribute.span, "Unsupported attribute for enumeration type"));
                }
            }
        }

        Ok(expression)
    }

    fn parse_postfix_call_expression(&mut self) -> ParseResult<Expression> {
        let expression = self.parse_initializer_expression()?;

        if self.is_current_kind(TokenKind::Identifier)
            && self
                .is_function_declaration_kind(&self.current.literal.clone(), FunctionKind::Postfix)
        {
            let symbol = self.current.clone();
            let literal = self.parse_literal_expression()?;
            let ty = literal.ty();
            return Ok(Expression::Call(Box::new(CallExpression {
                position: symbol,
                callee: literal,
                arguments: vec![expression],
                generic_arguments: Vec::new(),
                ty,
            })));
        }

        Ok(expression)
    }

    fn parse_initializer_expression(&mut self) -> ParseResult<Expression> {
        if self.is_current_kind(TokenKind::Identifier)
            && self.context.alias_table.contains(&self.current.literal)
        {
            let resolved = self
                .context
                .alias_table
                .resolve_alias(&self.current.literal)
                .expect("alias is present");
            let starts_initializer = self.is_next_kind(TokenKind::OpenParen)
                || self.is_next_kind(TokenKind::OpenBrace)
                || self.is_next_kind(TokenKind::Smaller);
            if (resolved.is_struct() || resolved.is_generic_struct()) && starts_initializer {
                let ty = self.parse_type()?;
                let position = self.current.clone();

                let mut arguments = Vec::new();
                if self.is_current_kind(TokenKind::OpenParen) {
                    self.advance_token()?;
                    while !self.is_current_kind(TokenKind::CloseParen) {
                        arguments.push(self.parse_expression()?);
                        if self.is_current_kind(TokenKind::Comma) {
                            self.advance_token()?;
                        } else {
                            break;
                        }
                    }
                    self.assert_kind(TokenKind::CloseParen, "Expect ) at the end of initializer")?;
                }

                if self.is_current_kind(TokenKind::OpenBrace) {
                    arguments.push(self.parse_lambda_expression()?);
                }

                return Ok(Expression::Initialize(Box::new(InitializeExpression {
                    position,
                    ty,
                    arguments,
                })));
            }
        }

        self.parse_function_call_with_lambda_argument()
    }

    fn parse_function_call_with_lambda_argument(&mut self) -> ParseResult<Expression> {
        if self.is_current_kind(TokenKind::Identifier)
            && self.is_next_kind(TokenKind::OpenBrace)
            && self
                .is_function_declaration_kind(&self.current.literal.clone(), FunctionKind::Normal)
        {
            let symbol = self.current.clone();
            let literal = self.parse_literal_expression()?;
            let arguments = vec![self.parse_lambda_expression()?];
            let ty = literal.ty();
            return Ok(Expression::Call(Box::new(CallExpression {
                position: symbol,
                callee: literal,
                arguments,
                generic_arguments: Vec::new(),
                ty,
            })));
        }
        self.parse_primary_expression()
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expression> {
        match self.current.kind {
            kind if kind.is_number_literal() => self.parse_number_expression(),
            TokenKind::Character => {
                let value = self.peek_and_advance_token()?;
                Ok(Expression::Character(Box::new(CharacterExpression {
                    value,
                    ty: i8_type(),
                })))
            }
            TokenKind::String => {
                let value = self.peek_and_advance_token()?;
                Ok(Expression::String(Box::new(StringExpression {
                    value,
                    ty: i8_ptr_type(),
                })))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.peek_and_advance_token()?;
                Ok(Expression::Bool(Box::new(BoolExpression {
                    value,
                    ty: i1_type(),
                })))
            }
            TokenKind::Null => {
                let value = self.peek_and_advance_token()?;
                Ok(Expression::Null(Box::new(NullExpression {
                    value,
                    ty: null_type(),
                    null_base_type: i32_ptr_type(),
                })))
            }
            TokenKind::Undefined => {
                let value = self.peek_and_advance_token()?;
                Ok(Expression::Undefined(Box::new(UndefinedExpression {
                    value,
                    ty: none_type(),
                })))
            }
            TokenKind::Identifier => {
                // const bindings are substituted right here.
                if let Some(constant) = self.context.constants_table.lookup(&self.current.literal) {
                    self.advance_token()?;
                    return Ok(constant);
                }
                self.parse_literal_expression()
            }
            TokenKind::OpenParen => self.parse_group_or_tuple_expression(),
            TokenKind::OpenBracket => self.parse_array_expression(),
            TokenKind::OpenBrace => self.parse_lambda_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Switch => self.parse_switch_expression(),
            TokenKind::Cast => self.parse_cast_expression(),
            TokenKind::TypeSize => self.parse_type_size_expression(),
            TokenKind::ValueSize => self.parse_value_size_expression(),
            TokenKind::Hash => self.parse_hash_directive_expression(),
            TokenKind::At => self.parse_expressions_directive(),
            _ => {
                let current = self.current.clone();
                Err(self.context.diagnostics.report_error(
                    current.span,
                    format!("expected expression, found `{}`", current.kind),
                ))
            }
        }
    }

    pub(crate) fn parse_number_expression(&mut self) -> ParseResult<Expression> {
        let token = self.peek_and_advance_token()?;
        let number_kind = number_kind_of_token(token.kind).ok_or_else(|| {
            self.context
                .diagnostics
                .report_error(token.span, "Token kind is not a number")
        })?;
        Ok(Expression::Number(Box::new(NumberExpression {
            value: token,
            ty: Rc::new(Type::Number(number_kind)),
        })))
    }

    fn parse_literal_expression(&mut self) -> ParseResult<Expression> {
        let name = self.peek_and_advance_token()?;
        Ok(Expression::Literal(Box::new(LiteralExpression {
            name,
            ty: none_type(),
            is_constant: false,
        })))
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        let if_token = self.peek_and_advance_token()?;
        self.assert_kind(TokenKind::OpenParen, "Expect ( before if condition")?;
        let condition = self.parse_expression()?;
        self.assert_kind(TokenKind::CloseParen, "Expect ) after if condition")?;
        let if_value = self.parse_expression()?;
        let else_token =
            self.consume_kind(TokenKind::Else, "Expect `else` keyword after then value.")?;
        let else_value = self.parse_expression()?;
        let ty = if_value.ty();
        Ok(Expression::If(Box::new(IfExpression {
            position: if_token,
            else_position: else_token,
            condition,
            if_value,
            else_value,
            ty,
        })))
    }

    fn parse_switch_expression(&mut self) -> ParseResult<Expression> {
        let keyword = self.consume_kind(TokenKind::Switch, "Expect switch keyword.")?;
        self.assert_kind(TokenKind::OpenParen, "Expect ( before switch argument")?;
        let argument = self.parse_expression()?;
        self.assert_kind(TokenKind::CloseParen, "Expect ) after switch argument")?;
        self.assert_kind(TokenKind::OpenBrace, "Expect { after switch value")?;

        let mut cases: Vec<Expression> = Vec::new();
        let mut values: Vec<Expression> = Vec::new();
        let mut default_value = None;

        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBrace) {
            if self.is_current_kind(TokenKind::Else) {
                if default_value.is_some() {
                    return Err(self.context.diagnostics.report_error(
                        keyword.span,
                        "Switch expression can't has more than one default branch",
                    ));
                }
                self.assert_kind(TokenKind::Else, "Expect else keyword in switch default branch")?;
                self.assert_kind(
                    TokenKind::RightArrow,
                    "Expect -> after else keyword in switch default branch",
                )?;
                default_value = Some(self.parse_expression()?);
                self.assert_kind(
                    TokenKind::Semicolon,
                    "Expect semicolon `;` after switch case value",
                )?;
                continue;
            }

            // Group of case values sharing one right hand side.
            let mut group_size = 0;
            loop {
                let case_expression = self.parse_expression()?;
                if !matches!(
                    case_expression,
                    Expression::Number(_) | Expression::EnumAccess(_)
                ) {
                    return Err(self.context.diagnostics.report_error(
                        keyword.span,
                        "Switch expression case must be integer or enum element",
                    ));
                }
                cases.push(case_expression);
                group_size += 1;

                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                } else {
                    break;
                }
            }

            self.assert_kind(TokenKind::RightArrow, "Expect -> after branch value")?;
            let value = self.parse_expression()?;
            for _ in 0..group_size {
                values.push(value.clone());
            }
            self.assert_kind(
                TokenKind::Semicolon,
                "Expect semicolon `;` after switch case value",
            )?;
        }

        if cases.is_empty() {
            return Err(self.context.diagnostics.report_error(
                keyword.span,
                "Switch expression must has at last one case",
            ));
        }

        self.assert_kind(
            TokenKind::CloseBrace,
            "Expect } after switch expression last branch",
        )?;

        let ty = values[0].ty();
        Ok(Expression::Switch(Box::new(SwitchExpression {
            position: keyword,
            argument,
            cases,
            values,
            default_value,
            ty,
        })))
    }

    pub(crate) fn parse_lambda_expression(&mut self) -> ParseResult<Expression> {
        let open_brace =
            self.consume_kind(TokenKind::OpenBrace, "Expect { at the start of lambda expression")?;

        let mut parameters = Vec::new();
        let return_type;

        if self.is_current_kind(TokenKind::OpenParen) {
            self.advance_token()?;
            while !self.is_current_kind(TokenKind::CloseParen) {
                parameters.push(self.parse_parameter()?);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                } else {
                    break;
                }
            }
            self.assert_kind(TokenKind::CloseParen, "Expect ) after lambda parameters")?;
            return_type = self.parse_type()?;
            self.assert_kind(TokenKind::RightArrow, "Expect -> after lambda return type")?;
        } else {
            return_type = void_type();
        }

        self.loop_levels.push(0);
        let mut statements = Vec::new();
        while !self.is_current_kind(TokenKind::CloseBrace) && self.is_source_available() {
            statements.push(self.parse_statement()?);
        }
        self.loop_levels.pop();

        let close_brace =
            self.consume_kind(TokenKind::CloseBrace, "Expect } at the end of lambda expression")?;

        let mut body = BlockStatement { statements };
        if return_type.is_void() && !ends_with_return_statement(&body) {
            body.statements.push(Statement::Return(Box::new(ReturnStatement {
                position: close_brace,
                value: None,
            })));
        }

        let parameters_types: Vec<Rc<Type>> = parameters.iter().map(|p| Rc::clone(&p.ty)).collect();
        let function_type = crate::types::FunctionType::new(
            open_brace.clone(),
            parameters_types,
            Rc::clone(&return_type),
        );
        let ty = Rc::new(Type::Pointer(Rc::new(Type::Function(function_type))));

        Ok(Expression::Lambda(Box::new(LambdaExpression {
            position: open_brace,
            explicit_parameters: parameters,
            implicit_parameters_names: Vec::new(),
            implicit_parameters_types: Vec::new(),
            return_type,
            body,
            ty,
        })))
    }

    fn parse_group_or_tuple_expression(&mut self) -> ParseResult<Expression> {
        let position = self.peek_and_advance_token()?;
        let expression = self.parse_expression()?;

        if self.is_current_kind(TokenKind::Comma) {
            let comma = self.peek_and_advance_token()?;
            let mut values = vec![expression];
            while !self.is_current_kind(TokenKind::CloseParen) {
                values.push(self.parse_expression()?);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                }
            }
            self.assert_kind(
                TokenKind::CloseParen,
                "Expect ) at the end of tuple values expression",
            )?;
            return Ok(Expression::Tuple(Box::new(TupleExpression {
                position: comma,
                values,
                ty: none_type(),
            })));
        }

        self.assert_kind(TokenKind::CloseParen, "Expect ) at the end of group expression")?;
        Ok(Expression::Group(Box::new(GroupExpression {
            position,
            expression,
        })))
    }

    fn parse_array_expression(&mut self) -> ParseResult<Expression> {
        let position = self.peek_and_advance_token()?;
        let mut values = Vec::new();
        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseBracket) {
            values.push(self.parse_expression()?);
            if self.is_current_kind(TokenKind::Comma) {
                self.advance_token()?;
            }
        }
        self.assert_kind(TokenKind::CloseBracket, "Expect ] at the end of array values")?;

        let element_type = values.first().map(Expression::ty).unwrap_or_else(none_type);
        let is_constant = values.iter().all(Expression::is_constant);
        Ok(Expression::Array(Box::new(ArrayExpression {
            position,
            ty: Rc::new(Type::StaticArray {
                element: element_type,
                size: values.len(),
            }),
            values,
            is_constant,
        })))
    }

    fn parse_cast_expression(&mut self) -> ParseResult<Expression> {
        let keyword = self.consume_kind(TokenKind::Cast, "Expect cast keyword")?;
        self.assert_kind(TokenKind::OpenParen, "Expect `(` after cast keyword")?;
        let target_type = self.parse_type()?;
        self.assert_kind(TokenKind::CloseParen, "Expect `)` after cast type")?;
        let value = self.parse_expression()?;
        Ok(Expression::Cast(Box::new(CastExpression {
            position: keyword,
            ty: target_type,
            value,
        })))
    }

    fn parse_type_size_expression(&mut self) -> ParseResult<Expression> {
        let keyword = self.consume_kind(TokenKind::TypeSize, "Expect type_size keyword")?;
        self.assert_kind(TokenKind::OpenParen, "Expect `(` after type_size keyword")?;
        let of = self.parse_type()?;
        self.assert_kind(TokenKind::CloseParen, "Expect `)` after type_size type")?;
        Ok(Expression::TypeSize(Box::new(TypeSizeExpression {
            position: keyword,
            of,
            ty: i64_type(),
        })))
    }

    fn parse_value_size_expression(&mut self) -> ParseResult<Expression> {
        let keyword = self.consume_kind(TokenKind::ValueSize, "Expect value_size keyword")?;
        self.assert_kind(TokenKind::OpenParen, "Expect `(` after value_size keyword")?;
        let value = self.parse_expression()?;
        self.assert_kind(TokenKind::CloseParen, "Expect `)` after value_size value")?;
        Ok(Expression::ValueSize(Box::new(ValueSizeExpression {
            position: keyword,
            value,
            ty: i64_type(),
        })))
    }

    fn check_generic_parameter_name(&mut self, name: &Token) -> ParseResult<()> {
        let literal = &name.literal;

        if self.context.structures.contains_key(literal) {
            return Err(self.context.diagnostics.report_error(
                name.span,
                format!("Struct name can't be used as generic parameter name {literal}"),
            ));
        }

        if self.context.enumerations.contains_key(literal) {
            return Err(self.context.diagnostics.report_error(
                name.span,
                format!("Enum name can't be used as generic parameter name {literal}"),
            ));
        }

        // The alias table also covers the primitive spellings.
        if self.context.alias_table.contains(literal) {
            return Err(self.context.diagnostics.report_error(
                name.span,
                format!("Type name can't be used as generic parameter name {literal}"),
            ));
        }

        if !self.generic_parameter_names.insert(literal.clone()) {
            return Err(self.context.diagnostics.report_error(
                name.span,
                format!("You already declared generic parameter with name {literal}"),
            ));
        }

        Ok(())
    }

    fn check_compile_time_constant_expression(
        &mut self,
        expression: &Expression,
        position: Span,
    ) -> ParseResult<()> {
        match expression {
            Expression::Character(_)
            | Expression::String(_)
            | Expression::Number(_)
            | Expression::Bool(_) => Ok(()),
            // Allow negative number literals.
            Expression::PrefixUnary(unary)
                if unary.operator.kind == TokenKind::Minus
                    && matches!(unary.right, Expression::Number(_)) =>
            {
                Ok(())
            }
            _ => Err(self
                .context
                .diagnostics
                .report_error(position, "Value must be a compile time constants")),
        }
    }

    fn check_unnecessary_semicolon_warning(&mut self) -> ParseResult<()> {
        if self.is_current_kind(TokenKind::Semicolon) {
            let semicolon = self.peek_and_advance_token()?;
            if self.context.options.should_report_warns {
                self.context
                    .diagnostics
                    .report_warning(semicolon.span, "remove unnecessary semicolon");
            }
        }
        Ok(())
    }

    fn is_function_declaration_kind(&self, name: &str, kind: FunctionKind) -> bool {
        self.context.functions.get(name) == Some(&kind)
    }

    fn advance_token(&mut self) -> ParseResult<()> {
        let scanned = self.tokenizer.scan_next_token();

        if scanned.kind == TokenKind::Invalid {
            return Err(self
                .context
                .diagnostics
                .report_error(scanned.span, scanned.literal));
        }

        self.previous = std::mem::replace(
            &mut self.current,
            std::mem::replace(&mut self.next, scanned),
        );
        Ok(())
    }

    fn peek_and_advance_token(&mut self) -> ParseResult<Token> {
        let current = self.current.clone();
        self.advance_token()?;
        Ok(current)
    }

    pub(crate) fn is_current_kind(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn is_next_kind(&self, kind: TokenKind) -> bool {
        self.next.kind == kind
    }

    pub(crate) fn consume_kind(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.is_current_kind(kind) {
            let token = self.current.clone();
            self.advance_token()?;
            return Ok(token);
        }
        Err(self
            .context
            .diagnostics
            .report_error(self.current.span, message))
    }

    pub(crate) fn assert_kind(&mut self, kind: TokenKind, message: &str) -> ParseResult<()> {
        if self.is_current_kind(kind) {
            self.advance_token()?;
            return Ok(());
        }

        let location = if kind == TokenKind::Semicolon {
            self.previous.span
        } else {
            self.current.span
        };
        Err(self.context.diagnostics.report_error(location, message))
    }

    pub(crate) fn is_source_available(&self) -> bool {
        self.current.kind != TokenKind::EndOfFile
    }
}

fn ends_with_return_statement(block: &BlockStatement) -> bool {
    matches!(block.statements.last(), Some(Statement::Return(_)))
}

fn is_valid_intrinsic_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(' ')
}

pub(crate) fn number_kind_of_token(kind: TokenKind) -> Option<NumberKind> {
    match kind {
        TokenKind::Int => Some(NumberKind::Integer64),
        TokenKind::Int1 => Some(NumberKind::Integer1),
        TokenKind::Int8 => Some(NumberKind::Integer8),
        TokenKind::Int16 => Some(NumberKind::Integer16),
        TokenKind::Int32 => Some(NumberKind::Integer32),
        TokenKind::Int64 => Some(NumberKind::Integer64),
        TokenKind::UInt8 => Some(NumberKind::UInteger8),
        TokenKind::UInt16 => Some(NumberKind::UInteger16),
        TokenKind::UInt32 => Some(NumberKind::UInteger32),
        TokenKind::UInt64 => Some(NumberKind::UInteger64),
        TokenKind::Float => Some(NumberKind::Float64),
        TokenKind::Float32 => Some(NumberKind::Float32),
        TokenKind::Float64 => Some(NumberKind::Float64),
        _ => None,
    }
}

pub(crate) fn token_kind_of_number_kind(kind: NumberKind) -> TokenKind {
    match kind {
        NumberKind::Integer1 => TokenKind::Int1,
        NumberKind::Integer8 => TokenKind::Int8,
        NumberKind::Integer16 => TokenKind::Int16,
        NumberKind::Integer32 => TokenKind::Int32,
        NumberKind::Integer64 => TokenKind::Int64,
        NumberKind::UInteger8 => TokenKind::UInt8,
        NumberKind::UInteger16 => TokenKind::UInt16,
        NumberKind::UInteger32 => TokenKind::UInt32,
        NumberKind::UInteger64 => TokenKind::UInt64,
        NumberKind::Float32 => TokenKind::Float32,
        NumberKind::Float64 => TokenKind::Float64,
    }
}
