//! Name and type resolution over the parsed tree.
//!
//! The checker walks the AST once, mutating nodes in place: every
//! expression's type slot is filled, `null` literals learn the pointer type
//! they flow into, generic calls learn their inferred type arguments, and
//! lambdas grow implicit parameters for their captures. A fatal diagnostic
//! unwinds as `Err(Reported)` to `check_compilation_unit`; the driver then
//! consults the error count.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::ast::*;
use crate::context::Context;
use crate::diagnostics::Reported;
use crate::mangle::{mangle_operator_function, mangle_tuple_fields, mangle_types};
use crate::scope::ScopedMap;
use crate::token::{Span, TokenKind};
use crate::types::{
    i1_type, i64_type, i8_type, type_literal, FunctionType, NumberKind, StructModifiers,
    StructType, Type,
};

pub type CheckResult<T> = Result<T, Reported>;

pub struct TypeChecker<'a> {
    context: &'a mut Context,
    types_table: ScopedMap<String, Rc<Type>>,

    /// Uninstantiated generic function templates by name.
    generic_functions: HashMap<String, FunctionDeclaration>,
    /// Current substitution environment while instantiating.
    generic_types: HashMap<String, Rc<Type>>,
    /// Instantiated generics memoized by mangled name; also the side table
    /// the backend reads.
    instantiations: HashMap<String, Rc<Type>>,

    /// Top is the expected return type of the enclosing function or lambda.
    return_types: Vec<Rc<Type>>,

    is_inside_lambda_body: bool,
    lambda_implicit_parameters: Vec<Vec<(String, Rc<Type>)>>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(context: &'a mut Context) -> Self {
        let mut types_table = ScopedMap::new();
        types_table.push_new_scope();
        Self {
            context,
            types_table,
            generic_functions: HashMap::new(),
            generic_types: HashMap::new(),
            instantiations: HashMap::new(),
            return_types: Vec::new(),
            is_inside_lambda_body: false,
            lambda_implicit_parameters: Vec::new(),
        }
    }

    /// Generic instantiations produced while checking, keyed by mangled
    /// name. Handed to the backend after a clean check.
    pub fn instantiations(&self) -> &HashMap<String, Rc<Type>> {
        &self.instantiations
    }

    pub fn check_compilation_unit(&mut self, compilation_unit: &mut CompilationUnit) {
        for statement in &mut compilation_unit.tree_nodes {
            if self.check_statement(statement).is_err() {
                break;
            }
        }
    }

    fn check_statement(&mut self, statement: &mut Statement) -> CheckResult<()> {
        match statement {
            Statement::Block(block) => self.check_block_statement(block),
            Statement::FieldDeclaration(node) => self.check_field_declaration(node),
            Statement::ConstDeclaration(node) => self.check_const_declaration(node),
            Statement::Prototype(node) => self.check_function_prototype(node, false).map(|_| ()),
            Statement::Intrinsic(node) => self.check_intrinsic_prototype(node),
            Statement::Function(node) => self.check_function_declaration(node),
            Statement::OperatorFunction(node) => self.check_operator_function_declaration(node),
            Statement::Struct(node) => {
                let struct_type = &node.struct_type;
                // Generic structs are templates, instantiated on use.
                if !struct_type.modifiers.contains(StructModifiers::GENERIC) {
                    self.types_table.define(
                        struct_type.name.clone(),
                        Rc::new(Type::Struct(Rc::clone(struct_type))),
                    );
                }
                Ok(())
            }
            Statement::Enum(node) => self.check_enum_declaration(node),
            Statement::If(node) => self.check_if_statement(node),
            Statement::ForRange(node) => self.check_for_range_statement(node),
            Statement::ForEach(node) => self.check_for_each_statement(node),
            Statement::Forever(node) => {
                self.types_table.push_new_scope();
                let result = self.check_statement(&mut node.body);
                self.types_table.pop_current_scope();
                result
            }
            Statement::While(node) => self.check_while_statement(node),
            Statement::Switch(node) => self.check_switch_statement(node),
            Statement::Return(node) => self.check_return_statement(node),
            Statement::Defer(node) => self.check_call_expression(&mut node.call).map(|_| ()),
            Statement::Break(node) => {
                if node.has_times && node.times == 1 {
                    self.context.diagnostics.report_warning(
                        node.position.span,
                        "`break 1;` can implicitly written as `break;`",
                    );
                }
                Ok(())
            }
            Statement::Continue(node) => {
                if node.has_times && node.times == 1 {
                    self.context.diagnostics.report_warning(
                        node.position.span,
                        "`continue 1;` can implicitly written as `continue;`",
                    );
                }
                Ok(())
            }
            Statement::Expression(node) => self.check_expression(&mut node.expression).map(|_| ()),
        }
    }

    fn check_block_statement(&mut self, block: &mut BlockStatement) -> CheckResult<()> {
        self.types_table.push_new_scope();
        let result = self.check_block_statements(block);
        self.types_table.pop_current_scope();
        result
    }

    fn check_block_statements(&mut self, block: &mut BlockStatement) -> CheckResult<()> {
        let statements_count = block.statements.len();
        for (index, statement) in block.statements.iter_mut().enumerate() {
            self.check_statement(statement)?;

            if index + 1 < statements_count {
                if let Statement::Return(node) = statement {
                    self.context
                        .diagnostics
                        .report_warning(node.position.span, "unreachable code after return statement");
                }
            }
        }
        Ok(())
    }

    fn check_field_declaration(&mut self, node: &mut FieldDeclaration) -> CheckResult<()> {
        let mut left_type = self.resolve_generic_type(&node.ty);
        let name = node.name.literal.clone();
        let position = node.name.span;

        let mut should_update_node_type = true;

        if node.value.is_some() {
            let value = node.value.as_mut().expect("value is present");
            let origin_right_value_type = value.ty();
            let mut right_type = self.check_expression_expecting(value, &left_type)?;
            let value_is_constant = value.is_constant();

            if right_type.is_void() {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(position, "Can't declare field with void type"));
            }

            let mut is_type_updated = false;
            if origin_right_value_type.is_generic_struct() {
                node.ty = Rc::clone(&origin_right_value_type);
                right_type = self.resolve_generic_type(&right_type);
                should_update_node_type = false;
                is_type_updated = true;
                if !self.types_table.define(name.clone(), Rc::clone(&right_type)) {
                    return Err(self.context.diagnostics.report_error(
                        position,
                        format!("Field {name} is defined twice in the same scope"),
                    ));
                }
            }

            if left_type.is_generic_struct() {
                left_type = self.resolve_generic_type(&left_type);
            }

            if node.is_global && !value_is_constant {
                return Err(self.context.diagnostics.report_error(
                    position,
                    "Initializer element is not a compile-time constant",
                ));
            }

            let is_left_none_type = left_type.is_none();
            let is_left_pointer_type = left_type.is_pointer();
            let is_right_none_type = right_type.is_none();
            let is_right_null_type = right_type.is_null();

            if is_left_none_type && is_right_none_type {
                return Err(self.context.diagnostics.report_error(
                    position,
                    "Can't resolve field type when both rvalue and lvalue are unknown",
                ));
            }

            if is_left_none_type && is_right_null_type {
                return Err(self.context.diagnostics.report_error(
                    position,
                    "Can't resolve field type rvalue is null, please add type to the variable",
                ));
            }

            if !is_left_pointer_type && is_right_null_type {
                return Err(self.context.diagnostics.report_error(
                    position,
                    "Can't declare non pointer variable with null value",
                ));
            }

            let value = node.value.as_mut().expect("value is present");

            if !is_type_updated && is_left_none_type {
                node.ty = Rc::clone(&right_type);
                left_type = Rc::clone(&right_type);
                is_type_updated = true;
            }

            if !is_type_updated && is_right_none_type {
                value.set_ty(Rc::clone(&left_type));
                right_type = Rc::clone(&left_type);
                is_type_updated = true;
            }

            if is_left_pointer_type && is_right_null_type {
                if let Expression::Null(null_expression) = value {
                    null_expression.null_base_type = Rc::clone(&left_type);
                }
                is_type_updated = true;
            }

            if !is_type_updated && left_type != right_type {
                return Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Type mismatch expect {} but got {}",
                        type_literal(&left_type),
                        type_literal(&right_type)
                    ),
                ));
            }
        }

        if should_update_node_type {
            let is_first_defined = if left_type.is_generic_struct() {
                node.ty = Rc::clone(&left_type);
                let resolved = self.resolve_generic_type(&left_type);
                self.types_table.define(name.clone(), resolved)
            } else {
                self.types_table.define(name.clone(), Rc::clone(&left_type))
            };

            if !is_first_defined {
                return Err(self.context.diagnostics.report_error(
                    position,
                    format!("Field {name} is defined twice in the same scope"),
                ));
            }
        }

        Ok(())
    }

    fn check_const_declaration(&mut self, node: &mut ConstDeclaration) -> CheckResult<()> {
        let name = node.name.literal.clone();
        let ty = self.check_expression_in_place(&mut node.value)?;
        if !self.types_table.define(name.clone(), ty) {
            return Err(self.context.diagnostics.report_error(
                node.name.span,
                format!("Field {name} is defined twice in the same scope"),
            ));
        }
        Ok(())
    }

    fn check_function_prototype(
        &mut self,
        node: &FunctionPrototype,
        is_intrinsic: bool,
    ) -> CheckResult<Rc<Type>> {
        let parameters: Vec<Rc<Type>> =
            node.parameters.iter().map(|p| Rc::clone(&p.ty)).collect();

        let mut function_type = FunctionType::new(
            node.name.clone(),
            parameters,
            Rc::clone(&node.return_type),
        );
        function_type.has_varargs = node.has_varargs;
        function_type.varargs_type = node.varargs_type.clone();
        function_type.is_intrinsic = is_intrinsic;

        let ty = Rc::new(Type::Function(function_type));
        if !self
            .types_table
            .define(node.name.literal.clone(), Rc::clone(&ty))
        {
            return Err(self.context.diagnostics.report_error(
                node.name.span,
                format!(
                    "function {} is defined twice in the same scope",
                    node.name.literal
                ),
            ));
        }
        Ok(ty)
    }

    fn check_intrinsic_prototype(&mut self, node: &IntrinsicPrototype) -> CheckResult<()> {
        let parameters: Vec<Rc<Type>> =
            node.parameters.iter().map(|p| Rc::clone(&p.ty)).collect();

        let mut function_type = FunctionType::new(
            node.name.clone(),
            parameters,
            Rc::clone(&node.return_type),
        );
        function_type.has_varargs = node.has_varargs;
        function_type.varargs_type = node.varargs_type.clone();
        function_type.is_intrinsic = true;

        let ty = Rc::new(Type::Function(function_type));
        if !self.types_table.define(node.name.literal.clone(), ty) {
            return Err(self.context.diagnostics.report_error(
                node.name.span,
                format!(
                    "function {} is defined twice in the same scope",
                    node.name.literal
                ),
            ));
        }
        Ok(())
    }

    fn check_function_declaration(&mut self, node: &mut FunctionDeclaration) -> CheckResult<()> {
        if node.prototype.is_generic {
            self.generic_functions
                .insert(node.prototype.name.literal.clone(), node.clone());
            return Ok(());
        }

        let function_type = self.check_function_prototype(&node.prototype, false)?;
        let Type::Function(function) = &*function_type else {
            unreachable!("prototype check produces a function type");
        };
        let return_type = Rc::clone(&function.return_type);

        self.return_types.push(Rc::clone(&return_type));
        self.types_table.push_new_scope();
        for parameter in &node.prototype.parameters {
            self.types_table
                .define(parameter.name.literal.clone(), Rc::clone(&parameter.ty));
        }

        let body_result = self.check_statement(&mut node.body);

        self.types_table.pop_current_scope();
        self.return_types.pop();
        body_result?;

        if !return_type.is_void() && !check_missing_return_statement(&node.body) {
            return Err(self.context.diagnostics.report_error(
                node.prototype.name.span,
                "A 'return' statement required in a function with a block body ('{...}')",
            ));
        }

        Ok(())
    }

    fn check_operator_function_declaration(
        &mut self,
        node: &mut OperatorFunctionDeclaration,
    ) -> CheckResult<()> {
        let parameters = &node.function.prototype.parameters;
        let has_non_primitive_parameter = parameters
            .iter()
            .any(|parameter| !(parameter.ty.is_number() || parameter.ty.is_enum_element()));

        if !has_non_primitive_parameter {
            return Err(self.context.diagnostics.report_error(
                node.operator.span,
                "overloaded operator must have at least one parameter of struct, tuple, array, enum",
            ));
        }

        self.check_function_declaration(&mut node.function)
    }

    fn check_enum_declaration(&mut self, node: &EnumDeclaration) -> CheckResult<()> {
        let enum_type = &node.enum_type;

        if !enum_type.element_type.is_integer() {
            return Err(self
                .context
                .diagnostics
                .report_error(node.name.span, "Enum element type must be an integer type"));
        }

        if enum_type.values.len() > 2 && enum_type.element_type.is_bool() {
            return Err(self.context.diagnostics.report_error(
                node.name.span,
                "Enum with bool (int1) type can't has more than 2 elements",
            ));
        }

        if !self.types_table.define(
            node.name.literal.clone(),
            Rc::new(Type::Enum(Rc::clone(enum_type))),
        ) {
            return Err(self.context.diagnostics.report_error(
                node.name.span,
                format!(
                    "enumeration {} is defined twice in the same scope",
                    node.name.literal
                ),
            ));
        }
        Ok(())
    }

    fn check_if_statement(&mut self, node: &mut IfStatement) -> CheckResult<()> {
        for conditional_block in &mut node.conditional_blocks {
            let condition = self.check_expression_in_place(&mut conditional_block.condition)?;
            if !condition.is_number() {
                return Err(self.context.diagnostics.report_error(
                    conditional_block.position.span,
                    format!(
                        "if condition must be a number but got {}",
                        type_literal(&condition)
                    ),
                ));
            }
            self.types_table.push_new_scope();
            let result = self.check_statement(&mut conditional_block.body);
            self.types_table.pop_current_scope();
            result?;
        }
        Ok(())
    }

    fn check_for_range_statement(&mut self, node: &mut ForRangeStatement) -> CheckResult<()> {
        let start_type = self.check_expression_in_place(&mut node.range_start)?;
        let end_type = self.check_expression_in_place(&mut node.range_end)?;

        if !(start_type.is_number() && start_type == end_type) {
            return Err(self
                .context
                .diagnostics
                .report_error(node.position.span, "For range start and end must be numbers of the same type"));
        }

        if let Some(step) = &mut node.step {
            let step_type = self.check_expression_in_place(step)?;
            if step_type != start_type {
                return Err(self.context.diagnostics.report_error(
                    node.position.span,
                    "For range declared step must be the same type as range start and end",
                ));
            }
        }

        self.types_table.push_new_scope();
        self.types_table
            .define(node.element_name.clone(), start_type);
        let result = self.check_statement(&mut node.body);
        self.types_table.pop_current_scope();
        result
    }

    fn check_for_each_statement(&mut self, node: &mut ForEachStatement) -> CheckResult<()> {
        let collection_type = self.check_expression_in_place(&mut node.collection)?;
        let is_string_type = collection_type.is_pointer_of(&Type::Number(NumberKind::Integer8));

        let element_type = match &*collection_type {
            Type::StaticArray { element, .. } => Some(Rc::clone(element)),
            Type::StaticVector(array) => match &**array {
                Type::StaticArray { element, .. } => Some(Rc::clone(element)),
                _ => None,
            },
            _ if is_string_type => Some(i8_type()),
            _ => None,
        };

        let Some(element_type) = element_type else {
            return Err(self
                .context
                .diagnostics
                .report_error(node.position.span, "For each expect array or string as parameter"));
        };

        self.types_table.push_new_scope();

        // `_` suppresses either implicit binding.
        if node.element_name != "_" {
            self.types_table
                .define(node.element_name.clone(), element_type);
        }
        if node.index_name != "_" {
            self.types_table.define(node.index_name.clone(), i64_type());
        }

        let result = self.check_statement(&mut node.body);
        self.types_table.pop_current_scope();
        result
    }

    fn check_while_statement(&mut self, node: &mut WhileStatement) -> CheckResult<()> {
        let condition = self.check_expression_in_place(&mut node.condition)?;
        if !condition.is_number() {
            return Err(self.context.diagnostics.report_error(
                node.position.span,
                format!(
                    "While condition must be a number but got {}",
                    type_literal(&condition)
                ),
            ));
        }
        self.types_table.push_new_scope();
        let result = self.check_statement(&mut node.body);
        self.types_table.pop_current_scope();
        result
    }

    fn check_switch_statement(&mut self, node: &mut SwitchStatement) -> CheckResult<()> {
        let argument = self.check_expression_in_place(&mut node.argument)?;
        let position = node.position.span;

        let is_argument_enum_type = argument.is_enum_element();
        let is_argument_number_type = argument.is_integer();
        if !is_argument_number_type && !is_argument_enum_type {
            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "Switch argument type must be integer or enum element but found {}",
                    type_literal(&argument)
                ),
            ));
        }

        let mut cases_values: HashSet<String> = HashSet::new();
        for branch in &mut node.cases {
            let branch_position = branch.position.span;

            for value in &mut branch.values {
                match value {
                    Expression::EnumAccess(enum_access) => {
                        if !is_argument_enum_type {
                            return Err(self.context.diagnostics.report_error(
                                branch_position,
                                "Switch argument is integer type and expect all cases to be the same type",
                            ));
                        }

                        let Type::EnumElement { enum_name, .. } = &*argument else {
                            unreachable!("argument is an enum element");
                        };
                        if enum_access.enum_name.literal != *enum_name {
                            return Err(self.context.diagnostics.report_error(
                                branch_position,
                                format!(
                                    "Switch argument and case are elements of different enums {} and {}",
                                    enum_name, enum_access.enum_name.literal
                                ),
                            ));
                        }

                        if !cases_values.insert(enum_access.element_index.to_string()) {
                            return Err(self.context.diagnostics.report_error(
                                branch_position,
                                "Switch can't has more than case with the same constants value",
                            ));
                        }
                    }
                    Expression::Number(number) => {
                        if !is_argument_number_type {
                            return Err(self.context.diagnostics.report_error(
                                branch_position,
                                "Switch argument is enum type and expect all cases to be the same type",
                            ));
                        }

                        if !number.ty.is_integer() {
                            return Err(self.context.diagnostics.report_error(
                                branch_position,
                                format!(
                                    "Switch case value must be an integer but found {}",
                                    type_literal(&number.ty)
                                ),
                            ));
                        }

                        if !cases_values.insert(number.value.literal.clone()) {
                            return Err(self.context.diagnostics.report_error(
                                branch_position,
                                "Switch can't has more than case with the same constants value",
                            ));
                        }
                    }
                    _ => {
                        return Err(self.context.diagnostics.report_error(
                            branch_position,
                            "Switch case type must be integer or enum element",
                        ));
                    }
                }
            }

            self.types_table.push_new_scope();
            let result = self.check_statement(&mut branch.body);
            self.types_table.pop_current_scope();
            result?;
        }

        let mut has_else_branch = false;
        if let Some(else_branch) = &mut node.default_case {
            self.types_table.push_new_scope();
            let result = self.check_statement(&mut else_branch.body);
            self.types_table.pop_current_scope();
            result?;
            has_else_branch = true;
        }

        // @complete on an enum switch demands full member coverage. An
        // open integer argument can never be covered case by case, so there
        // it demands an else branch.
        if node.complete_check {
            if is_argument_enum_type {
                let Type::EnumElement { enum_name, .. } = &*argument else {
                    unreachable!("argument is an enum element");
                };
                let enum_type = Rc::clone(&self.context.enumerations[enum_name]);
                self.check_complete_switch_cases(
                    &enum_type,
                    &cases_values,
                    has_else_branch,
                    position,
                )?;
            } else if !has_else_branch {
                return Err(self.context.diagnostics.report_error(
                    position,
                    "Switch on integer argument can't be complete without an else branch",
                ));
            }
        }

        Ok(())
    }

    fn check_return_statement(&mut self, node: &mut ReturnStatement) -> CheckResult<()> {
        let expected = self
            .return_types
            .last()
            .cloned()
            .unwrap_or_else(crate::types::void_type);

        let Some(value) = &mut node.value else {
            if !expected.is_void() {
                return Err(self.context.diagnostics.report_error(
                    node.position.span,
                    format!(
                        "Expect return value to be {} but got void",
                        type_literal(&expected)
                    ),
                ));
            }
            return Ok(());
        };

        let function_return_type = self.resolve_generic_type(&expected);
        let return_type = self.check_expression_expecting(value, &function_return_type)?;

        if function_return_type != return_type {
            // Returning null from a pointer function rewrites the base type.
            if function_return_type.is_pointer() && return_type.is_null() {
                if let Expression::Null(null_expression) = value {
                    null_expression.null_base_type = function_return_type;
                }
                return Ok(());
            }

            if !function_return_type.is_pointer() && return_type.is_null() {
                return Err(self.context.diagnostics.report_error(
                    node.position.span,
                    "Can't return null from function that return non pointer type",
                ));
            }

            // A lambda that captured outer values can't escape through a
            // plain function pointer return type.
            if function_return_type.is_function_pointer() && return_type.is_function_pointer() {
                let expected_count = function_pointer_implicit_count(&function_return_type);
                let returned_count = function_pointer_implicit_count(&return_type);
                if expected_count != returned_count {
                    return Err(self.context.diagnostics.report_error(
                        node.position.span,
                        "Can't return lambda that implicit capture values from function",
                    ));
                }
            }

            return Err(self.context.diagnostics.report_error(
                node.position.span,
                format!(
                    "Expect return value to be {} but got {}",
                    type_literal(&function_return_type),
                    type_literal(&return_type)
                ),
            ));
        }

        Ok(())
    }

    /// Check an expression and record the result on the node's type slot.
    fn check_expression_in_place(&mut self, expression: &mut Expression) -> CheckResult<Rc<Type>> {
        let ty = self.check_expression(expression)?;
        expression.set_ty(Rc::clone(&ty));
        Ok(ty)
    }

    /// Rewrite unsuffixed numeric literals in an operator tree to the
    /// expected numeric kind before checking, so `var y : int32 = 1 << 31;`
    /// checks at width 32 instead of the default int64. Literals that do
    /// not fit the expected kind are left alone and fail the regular range
    /// or type checks afterwards.
    fn adapt_number_literals(&mut self, expression: &mut Expression, expected: NumberKind) {
        match expression {
            Expression::Number(node) => {
                let is_untyped_integer =
                    node.value.kind == TokenKind::Int && expected.is_integer();
                let is_untyped_float =
                    node.value.kind == TokenKind::Float && expected.is_float();
                if (is_untyped_integer || is_untyped_float)
                    && check_number_limits(&node.value.literal, expected)
                {
                    node.ty = Rc::new(Type::Number(expected));
                }
            }
            Expression::Binary(node) => {
                self.adapt_number_literals(&mut node.left, expected);
                self.adapt_number_literals(&mut node.right, expected);
            }
            Expression::Shift(node) => {
                self.adapt_number_literals(&mut node.left, expected);
                self.adapt_number_literals(&mut node.right, expected);
            }
            Expression::Group(node) => {
                self.adapt_number_literals(&mut node.expression, expected);
            }
            Expression::PrefixUnary(node) if node.operator.kind == TokenKind::Minus => {
                self.adapt_number_literals(&mut node.right, expected);
            }
            Expression::If(node) => {
                self.adapt_number_literals(&mut node.if_value, expected);
                self.adapt_number_literals(&mut node.else_value, expected);
            }
            _ => {}
        }
    }

    /// Adapt then check, used wherever an expected type is already known.
    fn check_expression_expecting(
        &mut self,
        expression: &mut Expression,
        expected: &Rc<Type>,
    ) -> CheckResult<Rc<Type>> {
        if let Type::Number(expected_kind) = &**expected {
            self.adapt_number_literals(expression, *expected_kind);
        }
        self.check_expression_in_place(expression)
    }

    fn check_expression(&mut self, expression: &mut Expression) -> CheckResult<Rc<Type>> {
        match expression {
            Expression::If(node) => self.check_if_expression(node),
            Expression::Switch(node) => self.check_switch_expression(node),
            Expression::Group(node) => self.check_expression(&mut node.expression),
            Expression::Tuple(node) => self.check_tuple_expression(node),
            Expression::Assign(node) => self.check_assign_expression(node),
            Expression::Binary(node) => self.check_binary_expression(node),
            Expression::Shift(node) => self.check_shift_expression(node),
            Expression::Comparison(node) => self.check_comparison_expression(node),
            Expression::Logical(node) => self.check_logical_expression(node),
            Expression::PrefixUnary(node) => self.check_prefix_unary_expression(node),
            Expression::PostfixUnary(node) => self.check_postfix_unary_expression(node),
            Expression::Call(node) => self.check_call_expression(node),
            Expression::Initialize(node) => self.check_initialize_expression(node),
            Expression::Lambda(node) => self.check_lambda_expression(node),
            Expression::Dot(node) => self.check_dot_expression(node),
            Expression::Cast(node) => self.check_cast_expression(node),
            Expression::TypeSize(node) => {
                node.of = self.resolve_generic_type(&node.of);
                Ok(i64_type())
            }
            Expression::ValueSize(node) => {
                self.check_expression_in_place(&mut node.value)?;
                Ok(i64_type())
            }
            Expression::Index(node) => self.check_index_expression(node),
            Expression::EnumAccess(node) => Ok(Rc::clone(&node.ty)),
            Expression::Array(node) => self.check_array_expression(node),
            Expression::Vector(node) => self.check_vector_expression(node),
            Expression::String(node) => Ok(Rc::clone(&node.ty)),
            Expression::Literal(node) => self.check_literal_expression(node),
            Expression::Number(node) => self.check_number_expression(node),
            Expression::Character(node) => Ok(Rc::clone(&node.ty)),
            Expression::Bool(node) => Ok(Rc::clone(&node.ty)),
            Expression::Null(node) => Ok(Rc::clone(&node.ty)),
            Expression::Undefined(node) => Ok(Rc::clone(&node.ty)),
        }
    }

    fn check_if_expression(&mut self, node: &mut IfExpression) -> CheckResult<Rc<Type>> {
        let condition = self.check_expression_in_place(&mut node.condition)?;
        if !condition.is_number() {
            return Err(self.context.diagnostics.report_error(
                node.position.span,
                format!(
                    "If expression condition must be a number but got {}",
                    type_literal(&condition)
                ),
            ));
        }

        let if_value = self.check_expression_in_place(&mut node.if_value)?;
        let else_value = self.check_expression_in_place(&mut node.else_value)?;
        if if_value != else_value {
            return Err(self.context.diagnostics.report_error(
                node.position.span,
                format!(
                    "If expression type mismatch expect {} but got {}",
                    type_literal(&if_value),
                    type_literal(&else_value)
                ),
            ));
        }
        node.ty = Rc::clone(&if_value);
        Ok(if_value)
    }

    fn check_switch_expression(&mut self, node: &mut SwitchExpression) -> CheckResult<Rc<Type>> {
        let argument = self.check_expression_in_place(&mut node.argument)?;
        let position = node.position.span;
        let cases_count = node.cases.len();

        for (index, case_expression) in node.cases.iter_mut().enumerate() {
            let case_type = self.check_expression(case_expression)?;
            if argument != case_type {
                return Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Switch case type must be the same type of argument type {} but got {} in case number {}",
                        type_literal(&argument),
                        type_literal(&case_type),
                        index + 1
                    ),
                ));
            }
        }

        let expected_type = self.check_expression_in_place(&mut node.values[0])?;
        for index in 1..cases_count {
            let case_value = self.check_expression_in_place(&mut node.values[index])?;
            if expected_type != case_value {
                return Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Switch cases must be the same type but got {} and {}",
                        type_literal(&expected_type),
                        type_literal(&case_value)
                    ),
                ));
            }
        }

        let mut has_else_branch = false;
        if let Some(default_value) = &mut node.default_value {
            let default_type = self.check_expression_in_place(default_value)?;
            has_else_branch = true;
            if expected_type != default_type {
                return Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Switch case default values must be the same type of other cases expect {} but got {}",
                        type_literal(&expected_type),
                        type_literal(&default_type)
                    ),
                ));
            }
        }

        // Without an else branch the switch must be exhaustive, which only
        // an enum argument with full member coverage can be.
        if !has_else_branch {
            let mut is_exhaustive = false;
            if let Type::EnumElement { enum_name, .. } = &*argument {
                let enum_type = &self.context.enumerations[enum_name];
                is_exhaustive = enum_type.values.len() <= cases_count;
            }
            if !is_exhaustive {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(position, "Switch is incomplete and must has else branch"));
            }
        }

        node.ty = Rc::clone(&expected_type);
        Ok(expected_type)
    }

    fn check_tuple_expression(&mut self, node: &mut TupleExpression) -> CheckResult<Rc<Type>> {
        let mut fields = Vec::with_capacity(node.values.len());
        for value in &mut node.values {
            fields.push(self.check_expression_in_place(value)?);
        }
        let name = mangle_tuple_fields(&fields);
        let tuple_type = Rc::new(Type::Tuple { name, fields });
        node.ty = Rc::clone(&tuple_type);
        Ok(tuple_type)
    }

    fn check_assign_expression(&mut self, node: &mut AssignExpression) -> CheckResult<Rc<Type>> {
        let left_type = self.check_expression_in_place(&mut node.left)?;
        self.check_valid_assignment_destination(&node.left, node.operator.span)?;

        let right_type = self.check_expression_expecting(&mut node.right, &left_type)?;

        if left_type.is_pointer() && right_type.is_null() {
            if let Expression::Null(null_expression) = &mut node.right {
                null_expression.null_base_type = Rc::clone(&left_type);
            }
            return Ok(left_type);
        }

        if left_type != right_type {
            return Err(self.context.diagnostics.report_error(
                node.operator.span,
                format!(
                    "Type mismatch expect {} but got {}",
                    type_literal(&left_type),
                    type_literal(&right_type)
                ),
            ));
        }

        Ok(right_type)
    }

    fn check_binary_expression(&mut self, node: &mut BinaryExpression) -> CheckResult<Rc<Type>> {
        let lhs = self.check_expression_in_place(&mut node.left)?;
        let rhs = self.check_expression_in_place(&mut node.right)?;
        let position = node.operator.span;

        if lhs.is_number() && rhs.is_number() {
            if lhs == rhs {
                return Ok(lhs);
            }
            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "Expect numbers types to be the same size but got {} and {}",
                    type_literal(&lhs),
                    type_literal(&rhs)
                ),
            ));
        }

        self.resolve_binary_operator_overload(node.operator.kind, &lhs, &rhs, position)
    }

    fn check_shift_expression(&mut self, node: &mut ShiftExpression) -> CheckResult<Rc<Type>> {
        let lhs = self.check_expression_in_place(&mut node.left)?;
        let rhs = self.check_expression_in_place(&mut node.right)?;
        let position = node.operator.span;

        if lhs.is_number() && rhs.is_number() {
            if lhs != rhs {
                return Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Expect numbers types to be the same size but got {} and {}",
                        type_literal(&lhs),
                        type_literal(&rhs)
                    ),
                ));
            }

            // Compile-time range check when the amount is a literal.
            if let Expression::Number(amount) = &node.right {
                let Type::Number(kind) = &*lhs else {
                    unreachable!("lhs is a number");
                };
                let width = i64::from(kind.bit_width());
                let amount_value: i64 = amount.value.literal.parse().unwrap_or(i64::MAX);
                if amount_value >= width {
                    return Err(self.context.diagnostics.report_error(
                        position,
                        format!(
                            "Shift expressions second operand can't be bigger than or equal first operand bit width ({width})"
                        ),
                    ));
                }
            }

            if let Expression::PrefixUnary(unary) = &node.right {
                if unary.operator.kind == TokenKind::Minus
                    && matches!(unary.right, Expression::Number(_))
                {
                    return Err(self.context.diagnostics.report_error(
                        position,
                        "Shift expressions second operand can't be a negative number",
                    ));
                }
            }

            return Ok(lhs);
        }

        self.resolve_binary_operator_overload(node.operator.kind, &lhs, &rhs, position)
    }

    fn check_comparison_expression(
        &mut self,
        node: &mut ComparisonExpression,
    ) -> CheckResult<Rc<Type>> {
        let lhs = self.check_expression_in_place(&mut node.left)?;
        let rhs = self.check_expression_in_place(&mut node.right)?;
        let are_types_equal = lhs == rhs;
        let position = node.operator.span;

        if lhs.is_number() && rhs.is_number() {
            if are_types_equal {
                return Ok(i1_type());
            }
            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "Expect numbers types to be the same size but got {} and {}",
                    type_literal(&lhs),
                    type_literal(&rhs)
                ),
            ));
        }

        if lhs.is_enum_element() && rhs.is_enum_element() {
            if are_types_equal {
                return Ok(i1_type());
            }
            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "You can't compare elements from different enums {} and {}",
                    type_literal(&lhs),
                    type_literal(&rhs)
                ),
            ));
        }

        if lhs.is_pointer() && rhs.is_pointer() {
            if are_types_equal {
                return Ok(i1_type());
            }
            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "You can't compare pointers to different types {} and {}",
                    type_literal(&lhs),
                    type_literal(&rhs)
                ),
            ));
        }

        if lhs.is_pointer() && rhs.is_null() {
            if let Expression::Null(null_expression) = &mut node.right {
                null_expression.null_base_type = Rc::clone(&lhs);
            }
            return Ok(i1_type());
        }

        if lhs.is_null() && rhs.is_pointer() {
            if let Expression::Null(null_expression) = &mut node.left {
                null_expression.null_base_type = Rc::clone(&rhs);
            }
            return Ok(i1_type());
        }

        if lhs.is_null() && rhs.is_null() {
            return Ok(i1_type());
        }

        if lhs.is_null() || rhs.is_null() {
            return Err(self
                .context
                .diagnostics
                .report_error(position, "Can't compare non pointer type with null value"));
        }

        self.resolve_binary_operator_overload(node.operator.kind, &lhs, &rhs, position)
    }

    fn check_logical_expression(&mut self, node: &mut LogicalExpression) -> CheckResult<Rc<Type>> {
        let lhs = self.check_expression_in_place(&mut node.left)?;
        let rhs = self.check_expression_in_place(&mut node.right)?;

        if lhs.is_bool() && rhs.is_bool() {
            return Ok(lhs);
        }

        self.resolve_binary_operator_overload(node.operator.kind, &lhs, &rhs, node.operator.span)
    }

    /// Operator overload lookup shared by every binary expression form.
    fn resolve_binary_operator_overload(
        &mut self,
        operator: TokenKind,
        lhs: &Rc<Type>,
        rhs: &Rc<Type>,
        position: Span,
    ) -> CheckResult<Rc<Type>> {
        let parameters = [Rc::clone(lhs), Rc::clone(rhs)];
        let function_name = mangle_operator_function(operator, &parameters);
        if let Some(return_type) = self.operator_overload_return_type(&function_name) {
            return Ok(return_type);
        }

        let word = operator.overloading_literal().unwrap_or("?");
        Err(self.context.diagnostics.report_error(
            position,
            format!(
                "Can't find operator overloading operator {}({}, {})",
                word,
                type_literal(lhs),
                type_literal(rhs)
            ),
        ))
    }

    fn operator_overload_return_type(&self, function_name: &str) -> Option<Rc<Type>> {
        let overload = self.types_table.lookup(&function_name.to_owned())?;
        let Type::Function(function) = &*overload else {
            return None;
        };
        Some(Rc::clone(&function.return_type))
    }

    fn check_prefix_unary_expression(
        &mut self,
        node: &mut PrefixUnaryExpression,
    ) -> CheckResult<Rc<Type>> {
        let rhs = self.check_expression_in_place(&mut node.right)?;
        let operator = node.operator.kind;
        let position = node.operator.span;

        match operator {
            TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Not
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => {
                if rhs.is_number() {
                    node.ty = Rc::clone(&rhs);
                    return Ok(rhs);
                }

                let function_name = format!(
                    "_prefix{}",
                    mangle_operator_function(operator, &[Rc::clone(&rhs)])
                );
                if let Some(return_type) = self.operator_overload_return_type(&function_name) {
                    return Ok(return_type);
                }

                Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Prefix operator `{}` expect numbers or to override operators {}",
                        operator,
                        type_literal(&rhs)
                    ),
                ))
            }
            TokenKind::Star => {
                if let Type::Pointer(base) = &*rhs {
                    node.ty = Rc::clone(base);
                    return Ok(Rc::clone(base));
                }
                Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Dereference operator require pointer as an right operand but got {}",
                        type_literal(&rhs)
                    ),
                ))
            }
            TokenKind::And => {
                let pointer_type = Rc::new(Type::Pointer(Rc::clone(&rhs)));
                if let Type::Function(function) = &*rhs {
                    if function.is_intrinsic {
                        return Err(self.context.diagnostics.report_error(
                            function.name.span,
                            "Can't take address of an intrinsic function",
                        ));
                    }
                }
                node.ty = Rc::clone(&pointer_type);
                Ok(pointer_type)
            }
            _ => Err(self.context.diagnostics.report_error(
                position,
                format!("Unsupported unary expression {}", type_literal(&rhs)),
            )),
        }
    }

    fn check_postfix_unary_expression(
        &mut self,
        node: &mut PostfixUnaryExpression,
    ) -> CheckResult<Rc<Type>> {
        let rhs = self.check_expression_in_place(&mut node.right)?;
        let operator = node.operator.kind;
        let position = node.operator.span;

        if operator == TokenKind::PlusPlus || operator == TokenKind::MinusMinus {
            if rhs.is_number() {
                node.ty = Rc::clone(&rhs);
                return Ok(rhs);
            }

            let function_name = format!(
                "_postfix{}",
                mangle_operator_function(operator, &[Rc::clone(&rhs)])
            );
            if let Some(return_type) = self.operator_overload_return_type(&function_name) {
                return Ok(return_type);
            }

            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "Unary ++ or -- expect numbers or to override operators {}",
                    type_literal(&rhs)
                ),
            ));
        }

        Err(self.context.diagnostics.report_error(
            position,
            format!("Unsupported unary expression {}", type_literal(&rhs)),
        ))
    }

    fn check_call_expression(&mut self, node: &mut CallExpression) -> CheckResult<Rc<Type>> {
        let node_span = node.position.span;

        // Call by name: function();
        if let Expression::Literal(literal) = &node.callee {
            let name = literal.name.literal.clone();

            if self.types_table.is_defined(&name) {
                let looked_up = self.types_table.lookup(&name).expect("name is defined");

                // Function pointers are called through one dereference.
                let value = match &*looked_up {
                    Type::Pointer(base) => Rc::clone(base),
                    _ => Rc::clone(&looked_up),
                };

                let Type::Function(function) = &*value else {
                    return Err(self
                        .context
                        .diagnostics
                        .report_error(node_span, "Call expression work only with function"));
                };

                let parameters = function.parameters.clone();
                let return_type = Rc::clone(&function.return_type);
                let has_varargs = function.has_varargs;
                let varargs_type = function.varargs_type.clone();
                let implicit_count = function.implicit_parameters_count;

                self.check_parameters_types(
                    node_span,
                    &mut node.arguments,
                    &parameters,
                    has_varargs,
                    varargs_type,
                    implicit_count,
                )?;
                node.ty = Rc::clone(&return_type);
                return Ok(return_type);
            }

            if self.generic_functions.contains_key(&name) {
                return self.check_generic_function_call(node, &name);
            }

            return Err(self.context.diagnostics.report_error(
                node_span,
                format!("Can't resolve function call with name {name}"),
            ));
        }

        // Call the function pointer produced by another call: f()();
        // or a struct field holding a function pointer, or an immediately
        // invoked lambda.
        let callee_type = match &mut node.callee {
            Expression::Call(call) => self.check_call_expression(call)?,
            Expression::Dot(dot) => self.check_dot_expression(dot)?,
            Expression::Lambda(lambda) => self.check_lambda_expression(lambda)?,
            _ => {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(node_span, "Unexpected callee type for call expression"));
            }
        };
        node.callee.set_ty(Rc::clone(&callee_type));

        let Type::Pointer(base) = &*callee_type else {
            return Err(self
                .context
                .diagnostics
                .report_error(node_span, "Call expression work only with function"));
        };
        let Type::Function(function) = &**base else {
            return Err(self
                .context
                .diagnostics
                .report_error(node_span, "Call expression work only with function"));
        };

        let parameters = function.parameters.clone();
        let return_type = Rc::clone(&function.return_type);
        let has_varargs = function.has_varargs;
        let varargs_type = function.varargs_type.clone();
        let implicit_count = function.implicit_parameters_count;

        self.check_parameters_types(
            node_span,
            &mut node.arguments,
            &parameters,
            has_varargs,
            varargs_type,
            implicit_count,
        )?;
        node.ty = Rc::clone(&return_type);
        Ok(return_type)
    }

    /// Instantiate a generic function for this call: use explicit type
    /// arguments when given, infer the rest from the argument types, then
    /// re-check the template body under the substitution, memoized by the
    /// mangled instantiation name.
    fn check_generic_function_call(
        &mut self,
        node: &mut CallExpression,
        name: &str,
    ) -> CheckResult<Rc<Type>> {
        let declaration = self.generic_functions[name].clone();
        let prototype = &declaration.prototype;
        let node_span = node.position.span;

        if prototype.parameters.len() != node.arguments.len() {
            return Err(self.context.diagnostics.report_error(
                node_span,
                format!(
                    "Invalid number of arguments, expect {} but got {}",
                    prototype.parameters.len(),
                    node.arguments.len()
                ),
            ));
        }

        let generic_names = &prototype.generic_parameters;

        if node.generic_arguments.is_empty() {
            if prototype.parameters.is_empty() {
                return Err(self.context.diagnostics.report_error(
                    node_span,
                    "Not enough information to infer generic types variables",
                ));
            }

            let mut inferred: Vec<Option<Rc<Type>>> = vec![None; generic_names.len()];
            for (index, parameter) in prototype.parameters.iter().enumerate() {
                let argument_type = self.check_expression_in_place(&mut node.arguments[index])?;
                if *parameter.ty == *argument_type {
                    continue;
                }

                if argument_type.is_null() {
                    return Err(self.context.diagnostics.report_error(
                        node_span,
                        "Not enough information to infer generic parameter from null value",
                    ));
                }

                if argument_type.is_void() {
                    return Err(self
                        .context
                        .diagnostics
                        .report_error(node_span, "Can't pass `void` value as argument"));
                }

                let bindings = infer_type_by_other(&parameter.ty, &argument_type);
                for (generic_name, bound_type) in bindings {
                    if let Some(position) =
                        generic_names.iter().position(|n| *n == generic_name)
                    {
                        if inferred[position].is_none() {
                            inferred[position] = Some(bound_type);
                        }
                    }
                }
            }

            if inferred.iter().any(Option::is_none) {
                return Err(self.context.diagnostics.report_error(
                    node_span,
                    "Not enough information to infer all generic types variables",
                ));
            }
            node.generic_arguments = inferred.into_iter().flatten().collect();
        }

        if node.generic_arguments.len() != generic_names.len() {
            return Err(self.context.diagnostics.report_error(
                node_span,
                "Not enough information to infer all generic types variables",
            ));
        }

        for (generic_name, argument) in generic_names.iter().zip(&node.generic_arguments) {
            self.generic_types
                .insert(generic_name.clone(), Rc::clone(argument));
        }

        let return_type = self.resolve_generic_type_with(
            &prototype.return_type,
            generic_names,
            &node.generic_arguments,
        );

        let mut resolved_parameters = Vec::with_capacity(prototype.parameters.len());
        for parameter in &prototype.parameters {
            resolved_parameters.push(self.resolve_generic_type_with(
                &parameter.ty,
                generic_names,
                &node.generic_arguments,
            ));
        }

        let mangled_name = format!("{}{}", name, mangle_types(&node.generic_arguments));
        if !self.instantiations.contains_key(&mangled_name) {
            self.return_types.push(Rc::clone(&return_type));
            self.types_table.push_new_scope();
            for (parameter, resolved) in prototype.parameters.iter().zip(&resolved_parameters) {
                self.types_table
                    .define(parameter.name.literal.clone(), Rc::clone(resolved));
            }

            let mut instantiated_body = declaration.body.clone();
            let body_result = self.check_statement(&mut instantiated_body);

            self.types_table.pop_current_scope();
            self.return_types.pop();
            body_result?;

            let mut instantiated = FunctionType::new(
                prototype.name.clone(),
                resolved_parameters.clone(),
                Rc::clone(&return_type),
            );
            instantiated.has_varargs = prototype.has_varargs;
            instantiated.varargs_type = prototype.varargs_type.clone();
            self.instantiations
                .insert(mangled_name.clone(), Rc::new(Type::Function(instantiated)));
        }

        self.check_parameters_types(
            node_span,
            &mut node.arguments,
            &resolved_parameters,
            prototype.has_varargs,
            prototype.varargs_type.clone(),
            0,
        )?;

        self.generic_types.clear();
        node.ty = Rc::clone(&return_type);
        Ok(return_type)
    }

    fn check_initialize_expression(
        &mut self,
        node: &mut InitializeExpression,
    ) -> CheckResult<Rc<Type>> {
        let ty = self.resolve_generic_type(&node.ty);
        node.ty = Rc::clone(&ty);

        if let Type::Struct(struct_type) = &*ty {
            let parameters = self.canonical_struct(struct_type).fields_types.clone();
            self.check_parameters_types(
                node.position.span,
                &mut node.arguments,
                &parameters,
                false,
                None,
                0,
            )?;
            return Ok(ty);
        }

        Err(self.context.diagnostics.report_error(
            node.position.span,
            "Initialize expression work only with structures",
        ))
    }

    fn check_lambda_expression(&mut self, node: &mut LambdaExpression) -> CheckResult<Rc<Type>> {
        // Re-checking the same node (generic instantiation) starts from a
        // clean capture list.
        node.implicit_parameters_names.clear();
        node.implicit_parameters_types.clear();

        let return_type = self.resolve_generic_type(&node.return_type);
        node.return_type = Rc::clone(&return_type);

        self.return_types.push(Rc::clone(&return_type));
        let was_inside_lambda = self.is_inside_lambda_body;
        self.is_inside_lambda_body = true;
        self.lambda_implicit_parameters.push(Vec::new());

        self.types_table.push_new_scope();

        let mut explicit_parameter_types = Vec::with_capacity(node.explicit_parameters.len());
        for parameter in &mut node.explicit_parameters {
            parameter.ty = self.resolve_generic_type(&parameter.ty);
            self.types_table
                .define(parameter.name.literal.clone(), Rc::clone(&parameter.ty));
            explicit_parameter_types.push(Rc::clone(&parameter.ty));
        }

        let body_result = self.check_block_statement(&mut node.body);

        self.types_table.pop_current_scope();
        self.is_inside_lambda_body = was_inside_lambda;
        let captured = self
            .lambda_implicit_parameters
            .pop()
            .expect("lambda frame was pushed");
        self.return_types.pop();
        body_result?;

        // Captures become implicit parameters, prepended to the declared
        // parameter list.
        for (captured_name, captured_type) in captured {
            node.implicit_parameters_names.push(captured_name);
            node.implicit_parameters_types.push(captured_type);
        }

        let mut parameters = node.implicit_parameters_types.clone();
        parameters.extend(explicit_parameter_types);

        let mut function_type =
            FunctionType::new(node.position.clone(), parameters, return_type);
        function_type.implicit_parameters_count = node.implicit_parameters_names.len();

        let lambda_type = Rc::new(Type::Pointer(Rc::new(Type::Function(function_type))));
        node.ty = Rc::clone(&lambda_type);
        Ok(lambda_type)
    }

    fn check_dot_expression(&mut self, node: &mut DotExpression) -> CheckResult<Rc<Type>> {
        let callee_type = self.check_expression_in_place(&mut node.callee)?;
        let position = node.position.span;

        match &*callee_type {
            Type::Struct(struct_type) => {
                if node.field_name.kind != TokenKind::Identifier {
                    return Err(self.context.diagnostics.report_error(
                        position,
                        "Can't access struct member using index, only tuples can do this",
                    ));
                }
                self.resolve_struct_field(node, &Rc::clone(struct_type), position)
            }
            Type::Tuple { fields, .. } => {
                if node.field_name.kind != TokenKind::Int {
                    return Err(self
                        .context
                        .diagnostics
                        .report_error(position, "Tuple must be accessed using position only"));
                }
                let Some(field_type) = fields.get(node.field_index) else {
                    return Err(self.context.diagnostics.report_error(
                        position,
                        format!("No tuple field with index {}", node.field_index),
                    ));
                };
                node.ty = Rc::clone(field_type);
                Ok(Rc::clone(field_type))
            }
            Type::Pointer(base) => match &**base {
                Type::Struct(struct_type) => {
                    self.resolve_struct_field(node, &Rc::clone(struct_type), position)
                }
                Type::Number(NumberKind::Integer8) => {
                    if node.field_name.literal == "count" {
                        node.is_constant = matches!(node.callee, Expression::String(_));
                        node.ty = i64_type();
                        return Ok(i64_type());
                    }
                    Err(self.context.diagnostics.report_error(
                        position,
                        format!("Unknown String attribute with name {}", node.field_name.literal),
                    ))
                }
                _ => Err(self.context.diagnostics.report_error(
                    position,
                    "Dot expression expect calling member from struct or pointer to struct",
                )),
            },
            Type::StaticArray { .. } | Type::StaticVector(_) => {
                if node.field_name.literal == "count" {
                    node.is_constant = true;
                    node.ty = i64_type();
                    return Ok(i64_type());
                }
                Err(self.context.diagnostics.report_error(
                    position,
                    format!("Unknown Array attribute with name {}", node.field_name.literal),
                ))
            }
            Type::GenericStruct { .. } => {
                let resolved = self.resolve_generic_type(&callee_type);
                let Type::Struct(struct_type) = &*resolved else {
                    return Err(self.context.diagnostics.report_error(
                        position,
                        "Dot expression expect struct or enum type as lvalue",
                    ));
                };
                self.resolve_struct_field(node, &Rc::clone(struct_type), position)
            }
            _ => Err(self.context.diagnostics.report_error(
                position,
                "Dot expression expect struct or enum type as lvalue",
            )),
        }
    }

    fn resolve_struct_field(
        &mut self,
        node: &mut DotExpression,
        struct_type: &Rc<StructType>,
        position: Span,
    ) -> CheckResult<Rc<Type>> {
        let struct_type = self.canonical_struct(struct_type);
        let field_name = &node.field_name.literal;

        let Some(member_index) = struct_type
            .fields_names
            .iter()
            .position(|name| name == field_name)
        else {
            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "Can't find a field with name {field_name} in struct {}",
                    struct_type.name
                ),
            ));
        };

        let field_type = Rc::clone(&struct_type.fields_types[member_index]);
        node.field_index = member_index;
        node.ty = Rc::clone(&field_type);
        Ok(field_type)
    }

    /// Self-referential fields and opaque declarations carry fieldless
    /// stubs; the registry holds the sealed definition under the same name.
    fn canonical_struct(&self, struct_type: &Rc<StructType>) -> Rc<StructType> {
        if struct_type.fields_names.is_empty() {
            if let Some(sealed) = self.context.structures.get(&struct_type.name) {
                return Rc::clone(sealed);
            }
        }
        Rc::clone(struct_type)
    }

    fn check_cast_expression(&mut self, node: &mut CastExpression) -> CheckResult<Rc<Type>> {
        let value_type = self.check_expression_in_place(&mut node.value)?;
        let target_type = self.resolve_generic_type(&node.ty);
        node.ty = Rc::clone(&target_type);
        let position = node.position.span;

        if value_type == target_type {
            self.context
                .diagnostics
                .report_warning(position, "unnecessary cast to the same type");
            return Ok(target_type);
        }

        if !crate::types::can_cast(&value_type, &target_type) {
            return Err(self.context.diagnostics.report_error(
                position,
                format!(
                    "Can't cast from {} to {}",
                    type_literal(&value_type),
                    type_literal(&target_type)
                ),
            ));
        }

        Ok(target_type)
    }

    fn check_index_expression(&mut self, node: &mut IndexExpression) -> CheckResult<Rc<Type>> {
        let index_type = self.check_expression_in_place(&mut node.index)?;
        let position = node.position.span;

        if !index_type.is_integer() {
            return Err(self.context.diagnostics.report_error(
                position,
                format!("Index must be an integer but got {}", type_literal(&index_type)),
            ));
        }

        // Literal indexes are bounds-checked at compile time.
        let constant_index: Option<i64> = match &node.index {
            Expression::Number(number) => number.value.literal.parse().ok(),
            _ => None,
        };

        if let Some(index) = constant_index {
            if index < 0 {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(position, "Index can't be negative number"));
            }
        }

        let callee_type = self.check_expression_in_place(&mut node.value)?;

        let element_type = match &*callee_type {
            Type::StaticArray { element, size } => {
                if let Some(index) = constant_index {
                    if index as usize >= *size {
                        return Err(self.context.diagnostics.report_error(
                            position,
                            "Index can't be bigger than or equal array size",
                        ));
                    }
                }
                Rc::clone(element)
            }
            Type::StaticVector(array) => {
                let Type::StaticArray { element, size } = &**array else {
                    unreachable!("vector wraps a static array");
                };
                if let Some(index) = constant_index {
                    if index as usize >= *size {
                        return Err(self.context.diagnostics.report_error(
                            position,
                            "Index can't be bigger than or equal array size",
                        ));
                    }
                }
                Rc::clone(element)
            }
            Type::Pointer(base) => Rc::clone(base),
            _ => {
                return Err(self.context.diagnostics.report_error(
                    position,
                    format!(
                        "Index expression require array but got {}",
                        type_literal(&callee_type)
                    ),
                ));
            }
        };

        node.ty = Rc::clone(&element_type);
        Ok(element_type)
    }

    fn check_literal_expression(&mut self, node: &mut LiteralExpression) -> CheckResult<Rc<Type>> {
        let name = &node.name.literal;
        if !self.types_table.is_defined(name) {
            return Err(self.context.diagnostics.report_error(
                node.name.span,
                format!("Can't resolve variable with name {name}"),
            ));
        }

        let value = if self.is_inside_lambda_body {
            if let Some(local) = self.types_table.lookup_on_current(name) {
                local
            } else {
                let (outer, level) = self
                    .types_table
                    .lookup_with_level(name)
                    .expect("name is defined");

                // A name resolved from a non-global enclosing scope becomes
                // an implicit capture, defined once in the lambda's scope.
                if level != 0 && level < self.types_table.size() - 2 {
                    self.types_table.define(name.clone(), Rc::clone(&outer));
                    self.lambda_implicit_parameters
                        .last_mut()
                        .expect("lambda frame was pushed")
                        .push((name.clone(), Rc::clone(&outer)));
                }
                outer
            }
        } else {
            self.types_table.lookup(name).expect("name is defined")
        };

        node.ty = Rc::clone(&value);

        if value.is_number() || value.is_enum_element() {
            node.is_constant = true;
        }

        Ok(value)
    }

    fn check_number_expression(&mut self, node: &NumberExpression) -> CheckResult<Rc<Type>> {
        let Type::Number(kind) = &*node.ty else {
            unreachable!("number expression carries a number type");
        };

        if !check_number_limits(&node.value.literal, *kind) {
            return Err(self.context.diagnostics.report_error(
                node.value.span,
                format!(
                    "Number value {} can't be represented using type {}",
                    node.value.literal,
                    type_literal(&node.ty)
                ),
            ));
        }

        Ok(Rc::clone(&node.ty))
    }

    fn check_array_expression(&mut self, node: &mut ArrayExpression) -> CheckResult<Rc<Type>> {
        if node.values.is_empty() {
            return Ok(Rc::clone(&node.ty));
        }

        let mut last_element_type = self.check_expression_in_place(&mut node.values[0])?;
        for index in 1..node.values.len() {
            let current_element_type =
                self.check_expression_in_place(&mut node.values[index])?;
            if current_element_type != last_element_type {
                return Err(self.context.diagnostics.report_error(
                    node.position.span,
                    format!(
                        "Array elements with index {} and {} are not the same types",
                        index - 1,
                        index
                    ),
                ));
            }
            last_element_type = current_element_type;
        }

        let array_type = Rc::new(Type::StaticArray {
            element: last_element_type,
            size: node.values.len(),
        });
        node.ty = Rc::clone(&array_type);
        Ok(array_type)
    }

    fn check_vector_expression(&mut self, node: &mut VectorExpression) -> CheckResult<Rc<Type>> {
        let array_type = self.check_array_expression(&mut node.array)?;
        let Type::StaticArray { element, .. } = &*array_type else {
            unreachable!("array expression produces an array type");
        };

        if !element.is_number() || matches!(&**element, Type::Number(kind) if kind.is_signed_integer())
        {
            return Err(self.context.diagnostics.report_error(
                node.array.position.span,
                "vector type accept only unsigned number or float types",
            ));
        }

        node.ty = Rc::new(Type::StaticVector(Rc::clone(&array_type)));
        Ok(Rc::clone(&node.ty))
    }

    /// Argument/parameter agreement shared by every call form. Checks each
    /// argument exactly once, rewrites `null` arguments against pointer
    /// parameters, and infers empty array literal element types.
    fn check_parameters_types(
        &mut self,
        location: Span,
        arguments: &mut [Expression],
        parameters: &[Rc<Type>],
        has_varargs: bool,
        varargs_type: Option<Rc<Type>>,
        implicit_parameters_count: usize,
    ) -> CheckResult<()> {
        let arguments_count = arguments.len();
        let all_arguments_count = arguments_count + implicit_parameters_count;
        let parameters_count = parameters.len();

        if !has_varargs && all_arguments_count != parameters_count {
            return Err(self.context.diagnostics.report_error(
                location,
                format!(
                    "Invalid number of arguments, expect {parameters_count} but got {all_arguments_count}"
                ),
            ));
        }

        if has_varargs && parameters_count > all_arguments_count {
            return Err(self.context.diagnostics.report_error(
                location,
                format!(
                    "Invalid number of arguments, expect at last {parameters_count} but got {all_arguments_count}"
                ),
            ));
        }

        let mut resolved_parameters = Vec::with_capacity(parameters_count);
        for parameter in parameters {
            if parameter.is_generic_struct() {
                resolved_parameters.push(self.resolve_generic_type(parameter));
            } else {
                resolved_parameters.push(Rc::clone(parameter));
            }
        }

        let mut arguments_types = Vec::with_capacity(arguments_count);
        for (index, argument) in arguments.iter_mut().enumerate() {
            let expected = resolved_parameters.get(index + implicit_parameters_count);
            let argument_type = match expected {
                Some(expected) => self.check_expression_expecting(argument, expected)?,
                None => self.check_expression_in_place(argument)?,
            };
            self.check_lambda_has_invalid_capturing(argument)?;
            if argument_type.is_generic_struct() {
                arguments_types.push(self.resolve_generic_type(&argument_type));
            } else {
                arguments_types.push(argument_type);
            }
        }

        let checked_count = parameters_count.min(arguments_count);
        for index in 0..checked_count {
            let parameter_index = index + implicit_parameters_count;
            if parameter_index >= parameters_count {
                break;
            }
            let parameter = &resolved_parameters[parameter_index];
            let argument_type = &arguments_types[index];

            if parameter == argument_type {
                continue;
            }

            // null against a pointer parameter adopts the parameter type.
            if parameter.is_pointer() && argument_type.is_null() {
                if let Expression::Null(null_expression) = &mut arguments[index] {
                    null_expression.null_base_type = Rc::clone(parameter);
                }
                continue;
            }

            // An empty array literal adopts the parameter's element type.
            if parameter.is_array() {
                if let Expression::Array(array) = &mut arguments[index] {
                    if array.values.is_empty() {
                        array.ty = Rc::clone(parameter);
                        continue;
                    }
                }
            }

            return Err(self.context.diagnostics.report_error(
                location,
                format!(
                    "Argument type didn't match parameter type expect {} got {}",
                    type_literal(parameter),
                    type_literal(argument_type)
                ),
            ));
        }

        // Untyped varargs accept anything.
        let Some(varargs_type) = varargs_type else {
            return Ok(());
        };

        for argument_type in arguments_types.iter().skip(parameters_count) {
            if *argument_type != varargs_type {
                return Err(self.context.diagnostics.report_error(
                    location,
                    format!(
                        "Argument type didn't match varargs type expect {} got {}",
                        type_literal(&varargs_type),
                        type_literal(argument_type)
                    ),
                ));
            }
        }

        Ok(())
    }

    /// A lambda passed directly as an argument must not capture.
    fn check_lambda_has_invalid_capturing(&mut self, expression: &Expression) -> CheckResult<()> {
        if let Expression::Lambda(lambda) = expression {
            if !lambda.implicit_parameters_names.is_empty() {
                let mut message = String::from(
                    "function argument lambda expression can't capture variables \
                     from non global scopes\n\nCaptured variables:\n",
                );
                for name in &lambda.implicit_parameters_names {
                    message.push_str("-> ");
                    message.push_str(name);
                    message.push('\n');
                }
                return Err(self
                    .context
                    .diagnostics
                    .report_error(lambda.position.span, message));
            }
        }
        Ok(())
    }

    fn check_complete_switch_cases(
        &mut self,
        enum_type: &crate::types::EnumType,
        cases_values: &HashSet<String>,
        has_else_branch: bool,
        span: Span,
    ) -> CheckResult<()> {
        let members = &enum_type.values;
        let missing_cases_count = members.len().saturating_sub(cases_values.len());

        if has_else_branch || missing_cases_count == 0 {
            return Ok(());
        }

        let mut message = format!(
            "Incomplete switch, missing {missing_cases_count} cases\n\n\
             You forget to cover the following cases:\n"
        );

        let mut missing: Vec<&String> = members
            .iter()
            .filter(|(_, value)| !cases_values.contains(&value.to_string()))
            .map(|(name, _)| name)
            .collect();
        missing.sort();

        for member_name in missing {
            message.push_str("- ");
            message.push_str(&enum_type.name.literal);
            message.push_str("::");
            message.push_str(member_name);
            message.push('\n');
        }

        Err(self.context.diagnostics.report_error(span, message))
    }

    fn check_valid_assignment_destination(
        &mut self,
        node: &Expression,
        position: Span,
    ) -> CheckResult<()> {
        match node {
            Expression::Literal(_) => Ok(()),
            Expression::Index(index_expression) => {
                // A `*int8` base is a string literal; those are readonly.
                if index_expression
                    .value
                    .ty()
                    .is_pointer_of(&Type::Number(NumberKind::Integer8))
                {
                    return Err(self.context.diagnostics.report_error(
                        index_expression.position.span,
                        "String literal are readonly can't modify it using [i]",
                    ));
                }
                Ok(())
            }
            Expression::Dot(_) => Ok(()),
            Expression::PrefixUnary(prefix_unary) => {
                if prefix_unary.operator.kind == TokenKind::Star {
                    return Ok(());
                }
                Err(self
                    .context
                    .diagnostics
                    .report_error(position, "Invalid left hand side for assignment expression"))
            }
            Expression::Character(_) => Err(self.context.diagnostics.report_error(
                position,
                "char literal is invalid left hand side for assignment expression",
            )),
            Expression::Bool(_) => Err(self.context.diagnostics.report_error(
                position,
                "boolean value is invalid left hand side for assignment expression",
            )),
            Expression::Number(_) => Err(self.context.diagnostics.report_error(
                position,
                "number value is invalid left hand side for assignment expression",
            )),
            Expression::String(_) => Err(self.context.diagnostics.report_error(
                position,
                "string literal is invalid left hand side for assignment expression",
            )),
            Expression::EnumAccess(_) => Err(self.context.diagnostics.report_error(
                position,
                "Enum element is invalid left hand side for assignment expression",
            )),
            Expression::Null(_) => Err(self.context.diagnostics.report_error(
                position,
                "Null literal is invalid left hand side for assignment expression",
            )),
            _ => Err(self
                .context
                .diagnostics
                .report_error(position, "Invalid left hand side for assignment expression")),
        }
    }

    fn resolve_generic_type(&mut self, ty: &Rc<Type>) -> Rc<Type> {
        self.resolve_generic_type_with(ty, &[], &[])
    }

    /// Substitute generic parameters, rebuilding composite types instead of
    /// mutating them. Generic struct instantiations are cached in the type
    /// table and the instantiation side table by mangled name.
    fn resolve_generic_type_with(
        &mut self,
        ty: &Rc<Type>,
        generic_names: &[String],
        generic_bindings: &[Rc<Type>],
    ) -> Rc<Type> {
        match &**ty {
            Type::GenericParameter(name) => {
                if let Some(position) = generic_names.iter().position(|n| n == name) {
                    let resolved = Rc::clone(&generic_bindings[position]);
                    self.generic_types.insert(name.clone(), Rc::clone(&resolved));
                    return resolved;
                }
                self.generic_types
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| Rc::clone(ty))
            }
            Type::Pointer(base) => Rc::new(Type::Pointer(self.resolve_generic_type_with(
                base,
                generic_names,
                generic_bindings,
            ))),
            Type::StaticArray { element, size } => Rc::new(Type::StaticArray {
                element: self.resolve_generic_type_with(element, generic_names, generic_bindings),
                size: *size,
            }),
            Type::StaticVector(array) => Rc::new(Type::StaticVector(
                self.resolve_generic_type_with(array, generic_names, generic_bindings),
            )),
            Type::Function(function) => {
                let mut resolved = function.clone();
                resolved.return_type = self.resolve_generic_type_with(
                    &function.return_type,
                    generic_names,
                    generic_bindings,
                );
                resolved.parameters = function
                    .parameters
                    .iter()
                    .map(|parameter| {
                        self.resolve_generic_type_with(parameter, generic_names, generic_bindings)
                    })
                    .collect();
                Rc::new(Type::Function(resolved))
            }
            Type::GenericStruct {
                template,
                arguments,
            } => {
                let arguments: Vec<Rc<Type>> = arguments
                    .iter()
                    .map(|argument| match &**argument {
                        Type::GenericParameter(name) => self
                            .generic_types
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| Rc::clone(argument)),
                        _ => {
                            self.resolve_generic_type_with(argument, generic_names, generic_bindings)
                        }
                    })
                    .collect();

                let mangled_name = format!("{}{}", template.name, mangle_types(&arguments));
                if let Some(instantiated) = self.types_table.lookup(&mangled_name) {
                    return instantiated;
                }

                let fields_types: Vec<Rc<Type>> = template
                    .fields_types
                    .iter()
                    .map(|field| {
                        self.resolve_generic_type_with(
                            field,
                            &template.generic_parameters,
                            &arguments,
                        )
                    })
                    .collect();

                let instantiated = Rc::new(StructType {
                    name: mangled_name.clone(),
                    fields_names: template.fields_names.clone(),
                    fields_types,
                    generic_parameters: template.generic_parameters.clone(),
                    generic_parameters_types: arguments,
                    modifiers: template.modifiers | StructModifiers::GENERIC,
                });
                let instantiated_type = Rc::new(Type::Struct(instantiated));
                self.types_table
                    .define(mangled_name.clone(), Rc::clone(&instantiated_type));
                self.instantiations
                    .insert(mangled_name, Rc::clone(&instantiated_type));
                instantiated_type
            }
            Type::Tuple { fields, .. } => {
                let fields: Vec<Rc<Type>> = fields
                    .iter()
                    .map(|field| {
                        self.resolve_generic_type_with(field, generic_names, generic_bindings)
                    })
                    .collect();
                let name = mangle_tuple_fields(&fields);
                Rc::new(Type::Tuple { name, fields })
            }
            _ => Rc::clone(ty),
        }
    }
}

/// Structural unification of a (possibly generic) parameter type against a
/// concrete argument type, collecting a binding for each generic parameter
/// encountered.
fn infer_type_by_other(ty: &Rc<Type>, other: &Rc<Type>) -> HashMap<String, Rc<Type>> {
    let mut resolved_types = HashMap::new();

    match (&**ty, &**other) {
        (Type::GenericParameter(name), _) => {
            resolved_types.insert(name.clone(), Rc::clone(other));
        }
        (Type::Pointer(base), Type::Pointer(other_base)) => {
            return infer_type_by_other(base, other_base);
        }
        (
            Type::StaticArray { element, .. },
            Type::StaticArray {
                element: other_element,
                ..
            },
        ) => {
            return infer_type_by_other(element, other_element);
        }
        (
            Type::GenericStruct {
                arguments: generic_arguments,
                ..
            },
            Type::Struct(other_struct),
        ) => {
            for (argument, concrete) in generic_arguments
                .iter()
                .zip(&other_struct.generic_parameters_types)
            {
                for (name, bound) in infer_type_by_other(argument, concrete) {
                    resolved_types.entry(name).or_insert(bound);
                }
            }
        }
        (
            Type::GenericStruct {
                template,
                arguments,
            },
            Type::GenericStruct {
                template: other_template,
                arguments: other_arguments,
            },
        ) => {
            if template.name == other_template.name && arguments.len() == other_arguments.len() {
                for (argument, other_argument) in arguments.iter().zip(other_arguments) {
                    for (name, bound) in infer_type_by_other(argument, other_argument) {
                        resolved_types.entry(name).or_insert(bound);
                    }
                }
            }
        }
        (Type::Tuple { fields, .. }, Type::Tuple { fields: other_fields, .. }) => {
            if fields.len() == other_fields.len() {
                for (field, other_field) in fields.iter().zip(other_fields) {
                    for (name, bound) in infer_type_by_other(field, other_field) {
                        resolved_types.entry(name).or_insert(bound);
                    }
                }
            }
        }
        // Function types descend into parameters and return type, which
        // makes function pointers unify through the pointer case above.
        (Type::Function(function), Type::Function(other_function)) => {
            if function.parameters.len() == other_function.parameters.len() {
                for (name, bound) in
                    infer_type_by_other(&function.return_type, &other_function.return_type)
                {
                    resolved_types.entry(name).or_insert(bound);
                }
                for (parameter, other_parameter) in
                    function.parameters.iter().zip(&other_function.parameters)
                {
                    for (name, bound) in infer_type_by_other(parameter, other_parameter) {
                        resolved_types.entry(name).or_insert(bound);
                    }
                }
            }
        }
        _ => {}
    }

    resolved_types
}

fn function_pointer_implicit_count(ty: &Type) -> usize {
    if let Type::Pointer(base) = ty {
        if let Type::Function(function) = &**base {
            return function.implicit_parameters_count;
        }
    }
    0
}

/// Inclusive range check of a numeric literal against its declared kind.
/// The literal is always non-negative here; a leading minus parses as a
/// prefix unary expression.
fn check_number_limits(literal: &str, kind: NumberKind) -> bool {
    match kind {
        NumberKind::Float32 => literal
            .parse::<f64>()
            .is_ok_and(|value| value.is_finite() && value.abs() <= f64::from(f32::MAX)),
        NumberKind::Float64 => literal.parse::<f64>().is_ok_and(f64::is_finite),
        _ => {
            let Ok(value) = literal.parse::<i128>() else {
                return false;
            };
            let (min, max) = match kind {
                NumberKind::Integer1 => (0, 1),
                NumberKind::Integer8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
                NumberKind::Integer16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
                NumberKind::Integer32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
                NumberKind::Integer64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
                NumberKind::UInteger8 => (0, i128::from(u8::MAX)),
                NumberKind::UInteger16 => (0, i128::from(u16::MAX)),
                NumberKind::UInteger32 => (0, i128::from(u32::MAX)),
                NumberKind::UInteger64 => (0, i128::from(u64::MAX)),
                NumberKind::Float32 | NumberKind::Float64 => unreachable!(),
            };
            value >= min && value <= max
        }
    }
}

/// Coverage: every control-flow path through `node` ends in `return`.
fn check_missing_return_statement(node: &Statement) -> bool {
    match node {
        // Expression-bodied functions desugar to a lone return.
        Statement::Return(_) => true,
        Statement::Block(block) => {
            let statements = &block.statements;
            if statements.is_empty() {
                return false;
            }

            if matches!(statements.last(), Some(Statement::Return(_))) {
                return true;
            }

            for statement in statements.iter().rev() {
                match statement {
                    Statement::Block(_) => {
                        if check_missing_return_statement(statement) {
                            return true;
                        }
                    }
                    Statement::If(if_statement) => {
                        let is_covered = if_statement
                            .conditional_blocks
                            .iter()
                            .all(|branch| check_missing_return_statement(&branch.body));
                        if is_covered && if_statement.has_else {
                            return true;
                        }
                    }
                    Statement::Switch(switch_statement) => {
                        let Some(default_case) = &switch_statement.default_case else {
                            return false;
                        };
                        if !check_missing_return_statement(&default_case.body) {
                            continue;
                        }
                        let is_cases_covered = switch_statement
                            .cases
                            .iter()
                            .all(|case| check_missing_return_statement(&case.body));
                        if is_cases_covered {
                            return true;
                        }
                    }
                    _ => {}
                }
            }

            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_limits_are_inclusive() {
        assert!(check_number_limits("127", NumberKind::Integer8));
        assert!(!check_number_limits("128", NumberKind::Integer8));
        assert!(check_number_limits("255", NumberKind::UInteger8));
        assert!(!check_number_limits("256", NumberKind::UInteger8));
        assert!(check_number_limits("1", NumberKind::Integer1));
        assert!(!check_number_limits("2", NumberKind::Integer1));
        assert!(check_number_limits("2147483647", NumberKind::Integer32));
        assert!(!check_number_limits("2147483648", NumberKind::Integer32));
        assert!(check_number_limits("18446744073709551615", NumberKind::UInteger64));
        assert!(!check_number_limits("18446744073709551616", NumberKind::UInteger64));
        assert!(check_number_limits("3.25", NumberKind::Float32));
    }

    #[test]
    fn infer_binds_through_pointers_and_arrays() {
        let generic: Rc<Type> = Rc::new(Type::Pointer(Rc::new(Type::GenericParameter(
            "T".to_owned(),
        ))));
        let concrete: Rc<Type> = Rc::new(Type::Pointer(crate::types::i32_type()));
        let bindings = infer_type_by_other(&generic, &concrete);
        assert_eq!(bindings.len(), 1);
        assert_eq!(*bindings["T"], *crate::types::i32_type());

        let generic_array: Rc<Type> = Rc::new(Type::StaticArray {
            element: Rc::new(Type::GenericParameter("E".to_owned())),
            size: 4,
        });
        let concrete_array: Rc<Type> = Rc::new(Type::StaticArray {
            element: crate::types::i64_type(),
            size: 4,
        });
        let bindings = infer_type_by_other(&generic_array, &concrete_array);
        assert_eq!(*bindings["E"], *crate::types::i64_type());
    }
}
