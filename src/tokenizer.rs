use crate::token::{Span, Token, TokenKind};

/// One-pass scanner over a single source file.
///
/// The tokenizer owns the file content and hands out tokens on demand; the
/// parser keeps a three-token window and never asks for a token twice.
/// Invalid input never aborts the scan: it produces a token of kind
/// `Invalid` whose literal is the diagnostic text, and the caller decides
/// how to report it.
pub struct Tokenizer {
    source: Vec<u8>,
    file_id: usize,

    start_position: usize,
    current_position: usize,

    line_number: u32,
    column_start: u32,
    column_current: u32,
}

impl Tokenizer {
    pub fn new(file_id: usize, source: String) -> Self {
        Self {
            source: source.into_bytes(),
            file_id,
            start_position: 0,
            current_position: 0,
            line_number: 1,
            column_start: 0,
            column_current: 0,
        }
    }

    /// Drain the whole source. The result always ends with `EndOfFile`.
    pub fn scan_all_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while self.is_source_available() {
            tokens.push(self.scan_next_token());
        }
        tokens.push(self.build_token(TokenKind::EndOfFile));
        tokens
    }

    pub fn scan_next_token(&mut self) -> Token {
        self.skip_whitespaces();

        self.start_position = self.current_position;
        self.column_start = self.column_current;

        let c = self.advance();

        match c {
            b'(' => self.build_token(TokenKind::OpenParen),
            b')' => self.build_token(TokenKind::CloseParen),
            b'[' => self.build_token(TokenKind::OpenBracket),
            b']' => self.build_token(TokenKind::CloseBracket),
            b'{' => self.build_token(TokenKind::OpenBrace),
            b'}' => self.build_token(TokenKind::CloseBrace),
            b',' => self.build_token(TokenKind::Comma),
            b';' => self.build_token(TokenKind::Semicolon),
            b'~' => self.build_token(TokenKind::Not),
            b'@' => self.build_token(TokenKind::At),
            b'#' => self.build_token(TokenKind::Hash),

            b'.' => {
                if self.match_byte(b'.') {
                    self.build_token(TokenKind::DotDot)
                } else {
                    self.build_token(TokenKind::Dot)
                }
            }
            b':' => {
                if self.match_byte(b':') {
                    self.build_token(TokenKind::ColonColon)
                } else {
                    self.build_token(TokenKind::Colon)
                }
            }
            b'|' => {
                if self.match_byte(b'|') {
                    self.build_token(TokenKind::OrOr)
                } else {
                    self.build_token(TokenKind::Or)
                }
            }
            b'&' => {
                if self.match_byte(b'&') {
                    self.build_token(TokenKind::AndAnd)
                } else {
                    self.build_token(TokenKind::And)
                }
            }
            b'=' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::EqualEqual)
                } else {
                    self.build_token(TokenKind::Equal)
                }
            }
            b'!' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::BangEqual)
                } else {
                    self.build_token(TokenKind::Bang)
                }
            }
            b'*' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::StarEqual)
                } else {
                    self.build_token(TokenKind::Star)
                }
            }
            b'/' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::SlashEqual)
                } else {
                    self.build_token(TokenKind::Slash)
                }
            }
            b'%' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::PercentEqual)
                } else {
                    self.build_token(TokenKind::Percent)
                }
            }

            b'+' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::PlusEqual)
                } else if self.match_byte(b'+') {
                    self.build_token(TokenKind::PlusPlus)
                } else {
                    self.build_token(TokenKind::Plus)
                }
            }

            b'-' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::MinusEqual)
                } else if self.match_byte(b'-') {
                    if self.match_byte(b'-') {
                        self.build_token(TokenKind::Undefined)
                    } else {
                        self.build_token(TokenKind::MinusMinus)
                    }
                } else if self.match_byte(b'>') {
                    self.build_token(TokenKind::RightArrow)
                } else {
                    self.build_token(TokenKind::Minus)
                }
            }

            // `>>` is left for the parser so `F<T<U>>` stays parseable.
            b'>' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::GreaterEqual)
                } else {
                    self.build_token(TokenKind::Greater)
                }
            }

            b'<' => {
                if self.match_byte(b'=') {
                    self.build_token(TokenKind::SmallerEqual)
                } else if self.match_byte(b'<') {
                    self.build_token(TokenKind::LeftShift)
                } else {
                    self.build_token(TokenKind::Smaller)
                }
            }

            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.consume_symbol(),

            b'"' => self.consume_string(),
            b'\'' => self.consume_character(),

            b'0' => {
                if self.match_byte(b'x') {
                    self.consume_hex_number()
                } else if self.match_byte(b'o') {
                    self.consume_octal_number()
                } else {
                    self.consume_number()
                }
            }
            b'1'..=b'9' => self.consume_number(),

            b'\0' => self.build_token(TokenKind::EndOfFile),
            _ => self.build_invalid_token("unexpected character"),
        }
    }

    fn consume_symbol(&mut self) -> Token {
        while is_alpha_num(self.peek()) || self.peek() == b'_' {
            self.advance();
        }
        let literal = self.lexeme(self.start_position, self.current_position);
        let kind = resolve_keyword_kind(&literal);
        self.build_token_with_literal(kind, literal)
    }

    fn consume_number(&mut self) -> Token {
        let mut kind = TokenKind::Int;
        while is_digit(self.peek()) || self.peek() == b'_' {
            self.advance();
        }

        if self.peek() == b'.' && is_digit(self.peek_next()) {
            kind = TokenKind::Float;
            self.advance();
            while is_digit(self.peek()) || self.peek() == b'_' {
                self.advance();
            }
        }

        let number_end_position = self.current_position;

        if self.match_byte(b'i') {
            if self.match_byte(b'1') {
                kind = if self.match_byte(b'6') {
                    TokenKind::Int16
                } else {
                    TokenKind::Int1
                };
            } else if self.match_byte(b'8') {
                kind = TokenKind::Int8;
            } else if self.match_byte(b'3') && self.match_byte(b'2') {
                kind = TokenKind::Int32;
            } else if self.match_byte(b'6') && self.match_byte(b'4') {
                kind = TokenKind::Int64;
            } else {
                return self.build_invalid_token(
                    "invalid width for signed integer literal, expect 1, 8, 16, 32 or 64",
                );
            }
        } else if self.match_byte(b'u') {
            if self.match_byte(b'1') && self.match_byte(b'6') {
                kind = TokenKind::UInt16;
            } else if self.match_byte(b'8') {
                kind = TokenKind::UInt8;
            } else if self.match_byte(b'3') && self.match_byte(b'2') {
                kind = TokenKind::UInt32;
            } else if self.match_byte(b'6') && self.match_byte(b'4') {
                kind = TokenKind::UInt64;
            } else {
                return self.build_invalid_token(
                    "invalid width for unsigned integer literal, expect 8, 16, 32 or 64",
                );
            }
        } else if self.match_byte(b'f') {
            if self.match_byte(b'3') && self.match_byte(b'2') {
                kind = TokenKind::Float32;
            } else if self.match_byte(b'6') && self.match_byte(b'4') {
                kind = TokenKind::Float64;
            } else {
                return self.build_invalid_token(
                    "invalid width for floating point literal, expect 32 or 64",
                );
            }
        } else if is_alpha(self.peek()) {
            return self.build_invalid_token("invalid suffix for number literal, expect i, u or f");
        }

        let mut literal = self.lexeme(self.start_position, number_end_position);
        literal.retain(|c| c != '_');
        self.build_token_with_literal(kind, literal)
    }

    fn consume_hex_number(&mut self) -> Token {
        while is_hex_digit(self.peek()) || self.peek() == b'_' {
            self.advance();
        }

        let mut literal = self.lexeme(self.start_position + 2, self.current_position);
        literal.retain(|c| c != '_');
        match i64::from_str_radix(&literal, 16) {
            Ok(value) => self.build_token_with_literal(TokenKind::Int, value.to_string()),
            Err(_) => self.build_invalid_token("hex integer literal is too large"),
        }
    }

    fn consume_octal_number(&mut self) -> Token {
        while is_octal_digit(self.peek()) || self.peek() == b'_' {
            self.advance();
        }

        let mut literal = self.lexeme(self.start_position + 2, self.current_position);
        literal.retain(|c| c != '_');
        match i64::from_str_radix(&literal, 8) {
            Ok(value) => self.build_token_with_literal(TokenKind::Int, value.to_string()),
            Err(_) => self.build_invalid_token("octal integer literal is too large"),
        }
    }

    fn consume_string(&mut self) -> Token {
        let mut content = Vec::new();
        while self.is_source_available() && self.peek() != b'"' {
            match self.consume_one_character() {
                Some(c) => content.push(c),
                None => return self.build_invalid_token("invalid escape character"),
            }
        }

        if !self.is_source_available() {
            return self.build_invalid_token("unterminated double quote string");
        }

        self.advance();
        let literal = String::from_utf8_lossy(&content).into_owned();
        self.build_token_with_literal(TokenKind::String, literal)
    }

    fn consume_character(&mut self) -> Token {
        let Some(c) = self.consume_one_character() else {
            return self.build_invalid_token("invalid escape character");
        };

        if self.peek() != b'\'' {
            return self.build_invalid_token("unterminated single quote character");
        }

        self.advance();
        self.build_token_with_literal(TokenKind::Character, (c as char).to_string())
    }

    /// One raw or escaped character of a string or char literal. `None`
    /// means an unsupported escape sequence.
    fn consume_one_character(&mut self) -> Option<u8> {
        let c = self.advance();
        if c != b'\\' {
            return Some(c);
        }

        let escaped = match self.peek() {
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0B,
            b'0' => b'\0',
            b'\'' => b'\'',
            b'\\' => b'\\',
            b'"' => b'"',
            b'x' => {
                self.advance();
                let first_digit = self.advance();
                let second_digit = self.advance();
                if is_hex_digit(first_digit) && is_hex_digit(second_digit) {
                    return Some((hex_to_int(first_digit) << 4) + hex_to_int(second_digit));
                }
                return None;
            }
            _ => return None,
        };
        self.advance();
        Some(escaped)
    }

    fn skip_whitespaces(&mut self) {
        while self.is_source_available() {
            match self.peek() {
                b' ' | b'\r' | b'\t' => {
                    self.advance();
                }
                b'\n' => {
                    self.advance();
                    self.line_number += 1;
                    self.column_current = 0;
                }
                b'/' => {
                    if self.peek_next() == b'/' {
                        self.skip_single_line_comment();
                    } else if self.peek_next() == b'*' {
                        self.skip_multi_lines_comment();
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    fn skip_single_line_comment(&mut self) {
        while self.is_source_available() && self.peek() != b'\n' {
            self.advance();
        }
    }

    fn skip_multi_lines_comment(&mut self) {
        self.advance();
        self.advance();
        while self.is_source_available() && !(self.peek() == b'*' && self.peek_next() == b'/') {
            if self.advance() == b'\n' {
                self.line_number += 1;
                self.column_current = 0;
            }
        }
        self.advance();
        self.advance();
    }

    fn build_token(&self, kind: TokenKind) -> Token {
        self.build_token_with_literal(kind, String::new())
    }

    fn build_token_with_literal(&self, kind: TokenKind, literal: String) -> Token {
        Token {
            kind,
            span: self.build_span(),
            literal,
        }
    }

    fn build_invalid_token(&self, message: &str) -> Token {
        self.build_token_with_literal(TokenKind::Invalid, message.to_owned())
    }

    fn build_span(&self) -> Span {
        Span {
            file_id: self.file_id,
            line: self.line_number,
            column_start: self.column_start,
            column_end: self.column_current,
        }
    }

    fn lexeme(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_source_available() || self.peek() != expected {
            return false;
        }
        self.current_position += 1;
        self.column_current += 1;
        true
    }

    fn advance(&mut self) -> u8 {
        if self.is_source_available() {
            self.current_position += 1;
            self.column_current += 1;
            return self.source[self.current_position - 1];
        }
        b'\0'
    }

    fn peek(&self) -> u8 {
        if self.is_source_available() {
            self.source[self.current_position]
        } else {
            b'\0'
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current_position + 1 < self.source.len() {
            self.source[self.current_position + 1]
        } else {
            b'\0'
        }
    }

    fn is_source_available(&self) -> bool {
        self.current_position < self.source.len()
    }
}

fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

fn is_hex_digit(c: u8) -> bool {
    c.is_ascii_hexdigit()
}

fn is_octal_digit(c: u8) -> bool {
    (b'0'..=b'7').contains(&c)
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

fn is_alpha_num(c: u8) -> bool {
    is_alpha(c) || is_digit(c)
}

fn hex_to_int(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'A'..=b'F' => c - b'A' + 10,
        _ => c - b'a' + 10,
    }
}

/// Keyword lookup by lexeme length, then exact comparison. Anything that
/// falls through is an identifier.
fn resolve_keyword_kind(literal: &str) -> TokenKind {
    match literal.len() {
        2 => match literal {
            "if" => TokenKind::If,
            _ => TokenKind::Identifier,
        },
        3 => match literal {
            "fun" => TokenKind::Fun,
            "var" => TokenKind::Var,
            "for" => TokenKind::For,
            _ => TokenKind::Identifier,
        },
        4 => match literal {
            "load" => TokenKind::Load,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "cast" => TokenKind::Cast,
            "else" => TokenKind::Else,
            "enum" => TokenKind::Enum,
            "type" => TokenKind::Type,
            _ => TokenKind::Identifier,
        },
        5 => match literal {
            "while" => TokenKind::While,
            "defer" => TokenKind::Defer,
            "false" => TokenKind::False,
            "break" => TokenKind::Break,
            "const" => TokenKind::Const,
            "infix" => TokenKind::Infix,
            _ => TokenKind::Identifier,
        },
        6 => match literal {
            "import" => TokenKind::Import,
            "struct" => TokenKind::Struct,
            "return" => TokenKind::Return,
            "switch" => TokenKind::Switch,
            "extern" => TokenKind::Extern,
            "packed" => TokenKind::Packed,
            "prefix" => TokenKind::Prefix,
            _ => TokenKind::Identifier,
        },
        7 => match literal {
            "varargs" => TokenKind::Varargs,
            "postfix" => TokenKind::Postfix,
            _ => TokenKind::Identifier,
        },
        8 => match literal {
            "continue" => TokenKind::Continue,
            "operator" => TokenKind::Operator,
            _ => TokenKind::Identifier,
        },
        9 => match literal {
            "type_size" => TokenKind::TypeSize,
            "undefined" => TokenKind::Undefined,
            "intrinsic" => TokenKind::Intrinsic,
            _ => TokenKind::Identifier,
        },
        10 => match literal {
            "value_size" => TokenKind::ValueSize,
            _ => TokenKind::Identifier,
        },
        _ => TokenKind::Identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        Tokenizer::new(0, source.to_owned()).scan_all_tokens()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_with_end_of_file() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfFile]);
        assert_eq!(
            kinds("var x"),
            vec![TokenKind::Var, TokenKind::Identifier, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = scan("fun funky if iffy type_size value_size undefined");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Fun,
                TokenKind::Identifier,
                TokenKind::If,
                TokenKind::Identifier,
                TokenKind::TypeSize,
                TokenKind::ValueSize,
                TokenKind::Undefined,
                TokenKind::EndOfFile,
            ]
        );
        assert_eq!(tokens[1].literal, "funky");
    }

    #[test]
    fn multi_char_operators() {
        assert_eq!(
            kinds("== != <= >= -> .. :: << && || += -= *= /= %= ++ --"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::SmallerEqual,
                TokenKind::GreaterEqual,
                TokenKind::RightArrow,
                TokenKind::DotDot,
                TokenKind::ColonColon,
                TokenKind::LeftShift,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::PlusEqual,
                TokenKind::MinusEqual,
                TokenKind::StarEqual,
                TokenKind::SlashEqual,
                TokenKind::PercentEqual,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn right_shift_is_two_greater_tokens() {
        assert_eq!(
            kinds(">>"),
            vec![TokenKind::Greater, TokenKind::Greater, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn number_literals_and_suffixes() {
        let tokens = scan("42 1_000 3.14 1i8 2u32 7f32 0x2A 0o17 9i64");
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[1].literal, "1000");
        assert_eq!(tokens[2].kind, TokenKind::Float);
        assert_eq!(tokens[3].kind, TokenKind::Int8);
        assert_eq!(tokens[4].kind, TokenKind::UInt32);
        assert_eq!(tokens[5].kind, TokenKind::Float32);
        assert_eq!(tokens[6].kind, TokenKind::Int);
        assert_eq!(tokens[6].literal, "42");
        assert_eq!(tokens[7].kind, TokenKind::Int);
        assert_eq!(tokens[7].literal, "15");
        assert_eq!(tokens[8].kind, TokenKind::Int64);
    }

    #[test]
    fn bad_number_suffix_is_invalid() {
        let tokens = scan("12i7");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
    }

    #[test]
    fn empty_hex_literal_is_invalid() {
        let tokens = scan("0x_");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
    }

    #[test]
    fn string_escapes() {
        let tokens = scan(r#""a\n\t\x41\\""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, "a\n\tA\\");
    }

    #[test]
    fn unterminated_string_is_invalid() {
        let tokens = scan("\"abc");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
        assert_eq!(tokens[0].literal, "unterminated double quote string");
    }

    #[test]
    fn character_literals() {
        let tokens = scan(r"'a' '\n' '\0'");
        assert_eq!(tokens[0].literal, "a");
        assert_eq!(tokens[1].literal, "\n");
        assert_eq!(tokens[2].literal, "\0");
    }

    #[test]
    fn bad_escape_is_invalid() {
        let tokens = scan(r"'\q'");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("var // trailing\nx /* multi\nline */ y"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn spans_track_lines_and_columns() {
        let tokens = scan("var\n  x");
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column_start, 2);
    }

    #[test]
    fn undefined_from_triple_minus() {
        assert_eq!(
            kinds("---"),
            vec![TokenKind::Undefined, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn lexemes_round_trip() {
        let source = "fun main ( ) { return id < int32 > ; }";
        let rendered: Vec<String> = scan(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::EndOfFile)
            .map(|t| {
                if t.literal.is_empty() {
                    t.kind.to_string()
                } else {
                    t.literal
                }
            })
            .collect();
        assert_eq!(rendered.join(" "), source);
    }
}
