//! Type syntax: prefixes (`*`, `(`, `[`), generic struct arguments and the
//! primary identifier types.

use std::rc::Rc;

use crate::ast::Expression;
use crate::mangle::mangle_tuple_fields;
use crate::token::TokenKind;
use crate::types::{none_type, type_literal, FunctionType, StructModifiers, Type};

use super::{ParseResult, Parser};

impl Parser<'_> {
    pub(crate) fn parse_type(&mut self) -> ParseResult<Rc<Type>> {
        if self.is_current_kind(TokenKind::At) {
            return self.parse_types_directive();
        }
        self.parse_type_with_prefix()
    }

    fn parse_type_with_prefix(&mut self) -> ParseResult<Rc<Type>> {
        if self.is_current_kind(TokenKind::Star) {
            return self.parse_pointer_to_type();
        }

        if self.is_current_kind(TokenKind::OpenParen) {
            return self.parse_tuple_type();
        }

        if self.is_current_kind(TokenKind::OpenBracket) {
            return self.parse_fixed_size_array_type();
        }

        self.parse_type_with_postfix()
    }

    fn parse_pointer_to_type(&mut self) -> ParseResult<Rc<Type>> {
        self.consume_kind(TokenKind::Star, "Pointer type must start with *")?;

        // *( starts a function pointer type.
        if self.is_current_kind(TokenKind::OpenParen) {
            let function_type = self.parse_function_type()?;
            return Ok(Rc::new(Type::Pointer(function_type)));
        }

        let base_type = self.parse_type_with_prefix()?;
        Ok(Rc::new(Type::Pointer(base_type)))
    }

    fn parse_function_type(&mut self) -> ParseResult<Rc<Type>> {
        let paren = self.consume_kind(TokenKind::OpenParen, "Function type expect to start with (")?;

        let mut parameters = Vec::new();
        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseParen) {
            parameters.push(self.parse_type()?);
            if self.is_current_kind(TokenKind::Comma) {
                self.advance_token()?;
            }
        }
        self.assert_kind(TokenKind::CloseParen, "Expect ) after function type parameters")?;
        let return_type = self.parse_type()?;
        Ok(Rc::new(Type::Function(FunctionType::new(
            paren,
            parameters,
            return_type,
        ))))
    }

    fn parse_tuple_type(&mut self) -> ParseResult<Rc<Type>> {
        let paren = self.consume_kind(TokenKind::OpenParen, "Tuple type expect to start with (")?;

        let mut fields = Vec::new();
        while self.is_source_available() && !self.is_current_kind(TokenKind::CloseParen) {
            fields.push(self.parse_type()?);
            if self.is_current_kind(TokenKind::Comma) {
                self.advance_token()?;
            }
        }
        self.assert_kind(TokenKind::CloseParen, "Expect ) after tuple fields types")?;

        if fields.len() < 2 {
            return Err(self
                .context
                .diagnostics
                .report_error(paren.span, "Can't create tuple type with less than 2 types"));
        }

        let name = mangle_tuple_fields(&fields);
        Ok(Rc::new(Type::Tuple { name, fields }))
    }

    fn parse_fixed_size_array_type(&mut self) -> ParseResult<Rc<Type>> {
        let bracket =
            self.consume_kind(TokenKind::OpenBracket, "Expect [ for fixed size array type")?;

        if self.is_current_kind(TokenKind::CloseBracket) {
            return Err(self.context.diagnostics.report_error(
                bracket.span,
                "Fixed array type must have implicit size [n]",
            ));
        }

        let size_expression = self.parse_number_expression()?;
        let Expression::Number(size_node) = &size_expression else {
            unreachable!("parse_number_expression produces a number node");
        };
        if !size_node.ty.is_integer() {
            return Err(self
                .context
                .diagnostics
                .report_error(bracket.span, "Array size must be an integer constants"));
        }
        let size: usize = size_node.value.literal.parse().map_err(|_| {
            self.context
                .diagnostics
                .report_error(bracket.span, "Array size is out of range")
        })?;

        self.assert_kind(TokenKind::CloseBracket, "Expect ] after array size.")?;
        let element = self.parse_type()?;

        if element.is_void() {
            return Err(self.context.diagnostics.report_error(
                self.previous.span,
                "Can't declare array with incomplete type 'void'",
            ));
        }

        if matches!(*element, Type::None) {
            return Err(self.context.diagnostics.report_error(
                self.previous.span,
                "Can't declare array with incomplete type",
            ));
        }

        Ok(Rc::new(Type::StaticArray { element, size }))
    }

    fn parse_type_with_postfix(&mut self) -> ParseResult<Rc<Type>> {
        let ty = self.parse_generic_struct_type()?;

        // A C-style postfix `*` deserves a pointed hint.
        if self.is_current_kind(TokenKind::Star) {
            return Err(self.context.diagnostics.report_error(
                self.previous.span,
                format!(
                    "In pointer type `*` must be before the type like *{}",
                    type_literal(&ty)
                ),
            ));
        }

        Ok(ty)
    }

    fn parse_generic_struct_type(&mut self) -> ParseResult<Rc<Type>> {
        let primary = self.parse_primary_type()?;

        if self.is_current_kind(TokenKind::Smaller) {
            let Type::Struct(template) = &*primary else {
                return Err(self.context.diagnostics.report_error(
                    self.previous.span,
                    "Only structures can accept generic parameters",
                ));
            };
            let template = Rc::clone(template);

            let smaller = self.consume_kind(TokenKind::Smaller, "Expect < after struct name")?;
            if !template.modifiers.contains(StructModifiers::GENERIC) {
                return Err(self.context.diagnostics.report_error(
                    smaller.span,
                    "Non generic struct type don't accept any types parameters",
                ));
            }

            let mut arguments = Vec::new();
            while self.is_source_available() && !self.is_current_kind(TokenKind::Greater) {
                arguments.push(self.parse_type()?);
                if self.is_current_kind(TokenKind::Comma) {
                    self.advance_token()?;
                }
            }
            self.assert_kind(TokenKind::Greater, "Expect > after generic types parameters")?;

            if template.generic_parameters.len() != arguments.len() {
                return Err(self.context.diagnostics.report_error(
                    smaller.span,
                    format!(
                        "Invalid number of generic parameters expect {} but got {}",
                        template.generic_parameters.len(),
                        arguments.len()
                    ),
                ));
            }

            return Ok(Rc::new(Type::GenericStruct {
                template,
                arguments,
            }));
        }

        // A generic template never appears bare.
        if let Type::Struct(struct_type) = &*primary {
            if struct_type.modifiers.contains(StructModifiers::GENERIC) {
                let name = self.previous.clone();
                return Err(self.context.diagnostics.report_error(
                    name.span,
                    format!(
                        "Generic struct type must be used with parameters types {}<..>",
                        name.literal
                    ),
                ));
            }
        }

        Ok(primary)
    }

    fn parse_primary_type(&mut self) -> ParseResult<Rc<Type>> {
        if self.is_current_kind(TokenKind::Identifier) {
            return self.parse_identifier_type();
        }

        if self.is_current_kind(TokenKind::Varargs) {
            return Err(self.context.diagnostics.report_error(
                self.current.span,
                "Varargs not supported as function pointer parameter",
            ));
        }

        Err(self
            .context
            .diagnostics
            .report_error(self.current.span, "Expected type name"))
    }

    fn parse_identifier_type(&mut self) -> ParseResult<Rc<Type>> {
        let symbol = self.consume_kind(TokenKind::Identifier, "Expect identifier as type")?;
        let literal = &symbol.literal;

        if let Some(structure) = self.context.structures.get(literal) {
            return Ok(Rc::new(Type::Struct(Rc::clone(structure))));
        }

        if let Some(enumeration) = self.context.enumerations.get(literal) {
            return Ok(Rc::new(Type::EnumElement {
                enum_name: literal.clone(),
                element: Rc::clone(&enumeration.element_type),
            }));
        }

        // A field typed with the struct being parsed; resolved to a pointer
        // placeholder and rebound once the struct is sealed.
        if *literal == self.current_struct_name {
            self.current_struct_unknown_fields += 1;
            return Ok(none_type());
        }

        if self.generic_parameter_names.contains(literal) {
            return Ok(Rc::new(Type::GenericParameter(literal.clone())));
        }

        if let Some(resolved) = self.context.alias_table.resolve_alias(literal) {
            return Ok(resolved);
        }

        Err(self
            .context
            .diagnostics
            .report_error(symbol.span, "Unexpected identifier type"))
    }

    fn parse_types_directive(&mut self) -> ParseResult<Rc<Type>> {
        let at = self.consume_kind(TokenKind::At, "Expect `@` before directive name")?;

        if self.is_current_kind(TokenKind::Identifier) && self.current.literal == "vec" {
            self.advance_token()?;
            let ty = self.parse_type()?;
            if !ty.is_array() {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(at.span, "Expect array type after @vec"));
            }
            return Ok(Rc::new(Type::StaticVector(ty)));
        }

        Err(self
            .context
            .diagnostics
            .report_error(at.span, "Expect identifier as type directive name"))
    }
}
