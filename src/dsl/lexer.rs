//! Lexer (tokenizer) for boolean formulas.

use crate::error::{CircuitError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A variable name
    Identifier,
    /// Literal '0'
    Zero,
    /// Literal '1'
    One,
    /// Negation '~'
    Tilde,
    /// Conjunction '&'
    Ampersand,
    /// Disjunction '|'
    Pipe,
    /// Exclusive or '^'
    Caret,
    /// Open parenthesis '('
    OpenParen,
    /// Close parenthesis ')'
    CloseParen,
    /// End of input
    Eof,
}

/// Lexer for tokenizing a single formula.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let start_column = self.column;
        let Some(&ch) = self.chars.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                column: start_column,
            });
        };

        let kind = match ch {
            '~' => TokenKind::Tilde,
            '&' => TokenKind::Ampersand,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '0' => TokenKind::Zero,
            '1' => TokenKind::One,
            c if c.is_alphabetic() || c == '_' => {
                return Ok(Token {
                    kind: TokenKind::Identifier,
                    text: self.read_identifier(),
                    column: start_column,
                });
            }
            c => {
                return Err(CircuitError::lexer(
                    start_column,
                    format!("unexpected character: {:?}", c),
                ));
            }
        };
        self.advance();
        Ok(Token {
            kind,
            text: ch.to_string(),
            column: start_column,
        })
    }

    /// Tokenize the whole input, ending with [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.column += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}
