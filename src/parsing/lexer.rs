//! Tokenizer and token stream
//!
//! Lexes raw SQL text into a position-tracked token sequence. Keyword-ness
//! is decided at classification time by case-insensitive membership in a
//! fixed keyword set, not by the lexer itself. The stream supports a single
//! token of lookahead and never rewinds.

use crate::error::{Error, Result};
use crate::types::Value;
use regex::Regex;

/// The reserved words of the dialect. Matching is case-insensitive.
const KEYWORDS: &[&str] = &[
    "AND", "AS", "ASC", "BETWEEN", "BY", "CREATE", "DESC", "DESCRIBE", "FALSE", "FROM", "GROUP",
    "IN", "INSERT", "INTO", "IS", "LIKE", "LIMIT", "NOT", "NULL", "OR", "ORDER", "OVERWRITE",
    "SELECT", "TRUE", "VALUES", "VIEW", "WHERE",
];

/// Returns true if the given text is a reserved word.
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(text))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    Str,
    Operator,
    Punctuation,
}

/// A single lexed token. For string tokens `text` holds the unquoted,
/// unescaped content. Immutable once produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

impl Token {
    /// The literal payload this token denotes: numbers parse to integer or
    /// float values, TRUE/FALSE/NULL to their constants, everything else to
    /// its text.
    pub fn value(&self) -> Value {
        match self.kind {
            TokenKind::Number => {
                if let Ok(n) = self.text.parse::<i64>() {
                    Value::Integer(n)
                } else {
                    self.text
                        .parse::<f64>()
                        .map(Value::Float)
                        .unwrap_or_else(|_| Value::Str(self.text.clone()))
                }
            }
            TokenKind::Keyword if self.text.eq_ignore_ascii_case("TRUE") => Value::Bool(true),
            TokenKind::Keyword if self.text.eq_ignore_ascii_case("FALSE") => Value::Bool(false),
            TokenKind::Keyword if self.text.eq_ignore_ascii_case("NULL") => Value::Null,
            _ => Value::Str(self.text.clone()),
        }
    }

    /// Case-insensitive text match. Identifier *values* stay case-sensitive
    /// everywhere; this is only for matching grammar words and punctuation.
    pub fn is(&self, text: &str) -> bool {
        self.text.eq_ignore_ascii_case(text)
    }
}

/// An ordered, finite sequence of tokens with a monotonic cursor.
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    /// Position of the end of input, for errors past the last token.
    end: (u32, u32),
}

impl TokenStream {
    /// Lexes the entire input up front. Whitespace and `--` line comments
    /// are skipped.
    pub fn tokenize(input: &str) -> Result<TokenStream> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        Ok(TokenStream {
            tokens,
            pos: 0,
            end: (lexer.line, lexer.column),
        })
    }

    pub fn has_next(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Peeks the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consumes and returns the next token, or errors at end of input.
    pub fn next(&mut self) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token.clone())
            }
            None => Err(self.error_here("unexpected end of input")),
        }
    }

    /// Consumes the next token iff its text matches (case-insensitively),
    /// returning whether it did. The cursor is unchanged on a mismatch.
    pub fn next_if(&mut self, text: &str) -> bool {
        if self.is(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Whether the next token's text matches, case-insensitively.
    pub fn is(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(text))
    }

    /// Whether the next token's text matches the given pattern.
    pub fn matches(&self, pattern: &Regex) -> bool {
        self.peek().is_some_and(|t| pattern.is_match(&t.text))
    }

    /// Consumes the next token, which must match the given text.
    pub fn expect(&mut self, text: &str) -> Result<Token> {
        match self.peek() {
            Some(token) if token.is(text) => self.next(),
            _ => Err(self.error_here(format!("expected {}", text))),
        }
    }

    /// A syntax error at the current token, carrying its position.
    pub fn error_here(&self, message: impl Into<String>) -> Error {
        match self.peek() {
            Some(token) => Error::Syntax {
                message: message.into(),
                token: Some(token.text.clone()),
                line: token.line,
                column: token.column,
            },
            None => Error::Syntax {
                message: message.into(),
                token: None,
                line: self.end.0,
                column: self.end.1,
            },
        }
    }
}

/// Character-level scanner feeding the token stream.
struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current() {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    while let Some(ch) = self.current() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace_and_comments();
        let (line, column) = (self.line, self.column);
        let token = |text: String, kind| {
            Some(Token {
                text,
                kind,
                line,
                column,
            })
        };

        let ch = match self.current() {
            Some(ch) => ch,
            None => return Ok(None),
        };

        // Identifiers and keywords. Dots are part of identifiers so that
        // qualified names like t.col lex as one token.
        if ch.is_ascii_alphabetic() || ch == '_' {
            let mut text = String::new();
            while let Some(ch) = self.current() {
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            let kind = if is_keyword(&text) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            return Ok(token(text, kind));
        }

        // Numbers: integer, decimal, and exponent forms. Signs belong to
        // the expression parser.
        if ch.is_ascii_digit() {
            return Ok(token(self.read_number(), TokenKind::Number));
        }

        // Strings, single- or double-quoted, with doubled-quote escapes.
        if ch == '\'' || ch == '"' {
            return Ok(token(self.read_string(ch, line, column)?, TokenKind::Str));
        }

        // Operators, longest first.
        for op in ["<=", ">=", "<>", "!="] {
            if self.current() == op.chars().next() && self.peek_at(1) == op.chars().nth(1) {
                self.advance();
                self.advance();
                return Ok(token(op.to_string(), TokenKind::Operator));
            }
        }
        if matches!(ch, '=' | '<' | '>' | '+' | '-' | '*' | '/') {
            self.advance();
            return Ok(token(ch.to_string(), TokenKind::Operator));
        }
        if matches!(ch, ',' | '(' | ')' | ';' | '.') {
            self.advance();
            return Ok(token(ch.to_string(), TokenKind::Punctuation));
        }

        Err(Error::Syntax {
            message: format!("unexpected character '{}'", ch),
            token: Some(ch.to_string()),
            line,
            column,
        })
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();
        let mut seen_dot = false;
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                text.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E')
                && self
                    .peek_at(1)
                    .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
            {
                text.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current() {
                    text.push(sign);
                    self.advance();
                }
                while let Some(d) = self.current() {
                    if d.is_ascii_digit() {
                        text.push(d);
                        self.advance();
                    } else {
                        break;
                    }
                }
                break;
            } else {
                break;
            }
        }
        text
    }

    fn read_string(&mut self, quote: char, line: u32, column: u32) -> Result<String> {
        self.advance(); // opening quote
        let mut text = String::new();
        while let Some(ch) = self.current() {
            self.advance();
            if ch == quote {
                // A doubled quote is an escaped literal quote.
                if self.current() == Some(quote) {
                    text.push(quote);
                    self.advance();
                } else {
                    return Ok(text);
                }
            } else {
                text.push(ch);
            }
        }
        Err(Error::Syntax {
            message: "unterminated string".into(),
            token: Some(text),
            line,
            column,
        })
    }
}
