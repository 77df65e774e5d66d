//! Source parser
//!
//! Turns program text into a [`Node`] tree. The grammar is small:
//!
//! ```text
//! number  : /-?[0-9]+/
//! symbol  : /[a-zA-Z0-9_+\-*\/\\=<>!&]+/
//! string  : /"(\\.|[^"])*"/
//! comment : /;[^\r\n]*/
//! sexpr   : '(' expr* ')'
//! qexpr   : '{' expr* '}'
//! expr    : number | symbol | string | comment | sexpr | qexpr
//! program : expr*
//! ```
//!
//! Leaf alternatives are tried in that order, so `-5` is a number and `-` is
//! a symbol. Nodes keep their source text verbatim; turning text into values
//! is the reader's job.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::stack::ensure_sufficient_stack;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+").expect("valid regex"));
static SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_+\-*/\\=<>!&]+").expect("valid regex"));
static STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"(\\.|[^"\\])*""#).expect("valid regex"));
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^;[^\r\n]*").expect("valid regex"));

// ============================================================================
// Parse Tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Number(String),
    Symbol(String),
    /// String literal as written, quotes and escapes included
    String(String),
    Comment(String),
    SExpr(Vec<Node>),
    QExpr(Vec<Node>),
    /// The whole input; its children are the top-level forms
    Program(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{line}:{column}: unexpected character '{found}'")]
    UnexpectedChar {
        found: char,
        line: usize,
        column: usize,
    },
    #[error("{line}:{column}: unexpected '{found}' with no matching opener")]
    UnexpectedClose {
        found: char,
        line: usize,
        column: usize,
    },
    #[error("{line}:{column}: expected '{expected}', found '{found}'")]
    MismatchedClose {
        expected: char,
        found: char,
        line: usize,
        column: usize,
    },
    #[error("{line}:{column}: '{open}' is never closed")]
    Unclosed {
        open: char,
        line: usize,
        column: usize,
    },
    #[error("{line}:{column}: unterminated string literal")]
    UnterminatedString { line: usize, column: usize },
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser { input, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// 1-based line and column of byte offset `at`
    fn location(&self, at: usize) -> (usize, usize) {
        let before = &self.input[..at];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |l| l.chars().count())
            + 1;
        (line, column)
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.position = self.input.len() - trimmed.len();
    }

    fn take_match(&mut self, pattern: &Regex) -> Option<String> {
        let m = pattern.find(self.rest())?;
        self.position += m.end();
        Some(m.as_str().to_string())
    }

    fn parse_program(&mut self) -> Result<Node, ParseError> {
        let mut forms = Vec::new();
        loop {
            self.skip_whitespace();
            match self.current_char() {
                None => return Ok(Node::Program(forms)),
                Some(c @ (')' | '}')) => {
                    let (line, column) = self.location(self.position);
                    return Err(ParseError::UnexpectedClose {
                        found: c,
                        line,
                        column,
                    });
                }
                Some(_) => forms.push(self.parse_expr()?),
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Node, ParseError> {
        ensure_sufficient_stack(|| self.parse_expr_inner())
    }

    fn parse_expr_inner(&mut self) -> Result<Node, ParseError> {
        let start = self.position;
        match self.current_char() {
            Some('(') => return self.parse_container(')').map(Node::SExpr),
            Some('{') => return self.parse_container('}').map(Node::QExpr),
            _ => {}
        }

        if let Some(text) = self.take_match(&NUMBER) {
            return Ok(Node::Number(text));
        }
        if let Some(text) = self.take_match(&SYMBOL) {
            return Ok(Node::Symbol(text));
        }
        if let Some(text) = self.take_match(&STRING) {
            return Ok(Node::String(text));
        }
        if let Some(text) = self.take_match(&COMMENT) {
            return Ok(Node::Comment(text));
        }

        let (line, column) = self.location(start);
        match self.current_char() {
            Some('"') => Err(ParseError::UnterminatedString { line, column }),
            Some(found) => Err(ParseError::UnexpectedChar {
                found,
                line,
                column,
            }),
            // parse_expr is only entered with input remaining
            None => Err(ParseError::UnexpectedChar {
                found: '\0',
                line,
                column,
            }),
        }
    }

    /// Parse children up to `close`; the opener is at the current position
    fn parse_container(&mut self, close: char) -> Result<Vec<Node>, ParseError> {
        let open_at = self.position;
        let open = if close == ')' { '(' } else { '{' };
        self.position += 1;

        let mut children = Vec::new();
        loop {
            self.skip_whitespace();
            match self.current_char() {
                None => {
                    let (line, column) = self.location(open_at);
                    return Err(ParseError::Unclosed { open, line, column });
                }
                Some(c) if c == close => {
                    self.position += 1;
                    return Ok(children);
                }
                Some(found @ (')' | '}')) => {
                    let (line, column) = self.location(self.position);
                    return Err(ParseError::MismatchedClose {
                        expected: close,
                        found,
                        line,
                        column,
                    });
                }
                Some(_) => children.push(self.parse_expr()?),
            }
        }
    }
}

/// Parse a whole program into a [`Node::Program`]
pub fn parse(input: &str) -> Result<Node, ParseError> {
    Parser::new(input).parse_program()
}
