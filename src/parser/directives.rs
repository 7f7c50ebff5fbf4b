//! `@` statement/expression directives and the `#` location directives.
//! Location directives fold to literals at parse time using the directive
//! token's own span.

use std::rc::Rc;

use crate::ast::{Expression, NumberExpression, Statement, StringExpression, VectorExpression};
use crate::token::{Token, TokenKind};
use crate::types::{i64_type, NumberKind, Type};

use super::{token_kind_of_number_kind, ParseResult, Parser};

impl Parser<'_> {
    /// `@complete` in statement position, marking the following switch.
    pub(crate) fn parse_statements_directive(&mut self) -> ParseResult<Statement> {
        self.consume_kind(TokenKind::At, "Expect `@` before directive name")?;
        let directive =
            self.consume_kind(TokenKind::Identifier, "Expect symbol as directive name")?;

        if directive.literal == "complete" {
            if !self.is_current_kind(TokenKind::Switch) {
                return Err(self
                    .context
                    .diagnostics
                    .report_error(directive.span, "@complete expect switch statement"));
            }
            return self.parse_switch_statement(true);
        }

        Err(self.context.diagnostics.report_error(
            directive.span,
            format!("No statement directive with name {}", directive.literal),
        ))
    }

    /// `@vec`, `@max_value(T)` and `@min_value(T)` in expression position.
    pub(crate) fn parse_expressions_directive(&mut self) -> ParseResult<Expression> {
        self.consume_kind(TokenKind::At, "Expect `@` before directive name")?;
        let directive =
            self.consume_kind(TokenKind::Identifier, "Expect symbol as directive name")?;
        let position = directive.span;

        match directive.literal.as_str() {
            "vec" => {
                let expression = self.parse_expression()?;
                let Expression::Array(array) = expression else {
                    return Err(self
                        .context
                        .diagnostics
                        .report_error(position, "Expect array expression after @vec"));
                };
                let ty = Rc::new(Type::StaticVector(Rc::clone(&array.ty)));
                Ok(Expression::Vector(Box::new(VectorExpression {
                    array: *array,
                    ty,
                })))
            }
            "max_value" => self.parse_number_limit_directive(position, true),
            "min_value" => self.parse_number_limit_directive(position, false),
            _ => Err(self.context.diagnostics.report_error(
                position,
                format!("No expression directive with name {}", directive.literal),
            )),
        }
    }

    fn parse_number_limit_directive(
        &mut self,
        position: crate::token::Span,
        is_max: bool,
    ) -> ParseResult<Expression> {
        let directive_name = if is_max { "@max_value" } else { "@min_value" };
        self.assert_kind(
            TokenKind::OpenParen,
            &format!("Expect `(` after {directive_name}"),
        )?;
        let ty = self.parse_type()?;
        self.assert_kind(
            TokenKind::CloseParen,
            &format!("Expect `)` after {directive_name} type"),
        )?;

        let Type::Number(kind) = *ty else {
            return Err(self.context.diagnostics.report_error(
                position,
                format!("{directive_name} expect only number types"),
            ));
        };

        let literal = if is_max {
            number_kind_max_literal(kind)
        } else {
            number_kind_min_literal(kind)
        };

        let token = Token {
            kind: token_kind_of_number_kind(kind),
            span: position,
            literal,
        };
        Ok(Expression::Number(Box::new(NumberExpression {
            value: token,
            ty,
        })))
    }

    /// `#line`, `#column` and `#filepath`.
    pub(crate) fn parse_hash_directive_expression(&mut self) -> ParseResult<Expression> {
        self.consume_kind(TokenKind::Hash, "Expect `#` before directive name")?;
        let directive =
            self.consume_kind(TokenKind::Identifier, "Expect symbol as directive name")?;
        let position = directive.span;

        match directive.literal.as_str() {
            "line" => {
                let token = Token {
                    kind: TokenKind::Int64,
                    span: position,
                    literal: position.line.to_string(),
                };
                Ok(Expression::Number(Box::new(NumberExpression {
                    value: token,
                    ty: i64_type(),
                })))
            }
            "column" => {
                let token = Token {
                    kind: TokenKind::Int64,
                    span: position,
                    literal: position.column_start.to_string(),
                };
                Ok(Expression::Number(Box::new(NumberExpression {
                    value: token,
                    ty: i64_type(),
                })))
            }
            "filepath" => {
                let path = self
                    .context
                    .source_manager
                    .resolve_source_path(position.file_id)
                    .to_owned();
                let token = Token {
                    kind: TokenKind::String,
                    span: position,
                    literal: path,
                };
                Ok(Expression::String(Box::new(StringExpression {
                    value: token,
                    ty: crate::types::i8_ptr_type(),
                })))
            }
            _ => Err(self.context.diagnostics.report_error(
                position,
                format!("No directive with name {}", directive.literal),
            )),
        }
    }
}

fn number_kind_max_literal(kind: NumberKind) -> String {
    match kind {
        NumberKind::Integer1 => "1".to_owned(),
        NumberKind::Integer8 => i8::MAX.to_string(),
        NumberKind::Integer16 => i16::MAX.to_string(),
        NumberKind::Integer32 => i32::MAX.to_string(),
        NumberKind::Integer64 => i64::MAX.to_string(),
        NumberKind::UInteger8 => u8::MAX.to_string(),
        NumberKind::UInteger16 => u16::MAX.to_string(),
        NumberKind::UInteger32 => u32::MAX.to_string(),
        NumberKind::UInteger64 => u64::MAX.to_string(),
        NumberKind::Float32 => f32::MAX.to_string(),
        NumberKind::Float64 => f64::MAX.to_string(),
    }
}

fn number_kind_min_literal(kind: NumberKind) -> String {
    match kind {
        NumberKind::Integer1 => "0".to_owned(),
        NumberKind::Integer8 => i8::MIN.to_string(),
        NumberKind::Integer16 => i16::MIN.to_string(),
        NumberKind::Integer32 => i32::MIN.to_string(),
        NumberKind::Integer64 => i64::MIN.to_string(),
        NumberKind::UInteger8
        | NumberKind::UInteger16
        | NumberKind::UInteger32
        | NumberKind::UInteger64 => "0".to_owned(),
        NumberKind::Float32 => f32::MIN.to_string(),
        NumberKind::Float64 => f64::MIN.to_string(),
    }
}
