//! Reader: parse tree to values
//!
//! Converts the [`Node`] tree produced by the parser into the [`Value`] tree
//! the evaluator works on. Comments vanish here; a number that does not fit
//! in an `i64` becomes an `Invalid number` error value in place.

use crate::language::Value;
use crate::parser::{Node, ParseError, parse};
use crate::stack::ensure_sufficient_stack;

/// Convert one parse-tree node into a value.
///
/// The node is consumed. Comments inside a container or program are dropped;
/// a [`Node::Comment`] handed over on its own reads as the empty
/// S-Expression `()`, the same value an empty program reads as.
pub fn read(node: Node) -> Value {
    ensure_sufficient_stack(|| match node {
        Node::Number(text) => read_integer(&text),
        Node::Symbol(text) => Value::symbol(&text),
        Node::String(raw) => Value::String(unescape(strip_quotes(&raw))),
        Node::Comment(_) => Value::sexpr(),
        Node::SExpr(children) | Node::Program(children) => Value::SExpr(read_children(children)),
        Node::QExpr(children) => Value::QExpr(read_children(children)),
    })
}

/// Parse `input` and read the resulting program as one S-Expression
pub fn read_str(input: &str) -> Result<Value, ParseError> {
    parse(input).map(read)
}

fn read_children(children: Vec<Node>) -> Vec<Value> {
    children
        .into_iter()
        .filter(|child| !matches!(child, Node::Comment(_)))
        .map(read)
        .collect()
}

fn read_integer(text: &str) -> Value {
    text.parse::<i64>()
        .map_or_else(|_| Value::error("Invalid number"), Value::Integer)
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

/// Decode backslash escapes
fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('a') => result.push('\x07'),
            Some('b') => result.push('\x08'),
            Some('f') => result.push('\x0c'),
            Some('v') => result.push('\x0b'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_is_an_implicit_sexpr() {
        assert_eq!(
            read_str("+ 1 2").unwrap(),
            Value::SExpr(vec![Value::symbol("+"), Value::Integer(1), Value::Integer(2)])
        );
    }

    #[test]
    fn containers_keep_their_tag() {
        assert_eq!(
            read_str("{a (b)}").unwrap(),
            Value::SExpr(vec![Value::QExpr(vec![
                Value::symbol("a"),
                Value::SExpr(vec![Value::symbol("b")]),
            ])])
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(
            read_str("; leading\n(list 1 ; inline\n 2)").unwrap(),
            Value::SExpr(vec![Value::SExpr(vec![
                Value::symbol("list"),
                Value::Integer(1),
                Value::Integer(2),
            ])])
        );
    }

    #[test]
    fn lone_comment_reads_as_unit() {
        assert_eq!(read(Node::Comment("; note".to_string())), Value::sexpr());
        assert_eq!(read_str("; only a comment").unwrap(), Value::sexpr());
    }

    #[test]
    fn integer_overflow_reads_as_error() {
        assert_eq!(
            read_str("99999999999999999999").unwrap(),
            Value::SExpr(vec![Value::error("Invalid number")])
        );
        assert_eq!(
            read_str("-9223372036854775808").unwrap(),
            Value::SExpr(vec![Value::Integer(i64::MIN)])
        );
    }

    #[test]
    fn strings_are_unquoted_and_unescaped() {
        assert_eq!(
            read_str(r#""tab\there \"q\" \\ \z""#).unwrap(),
            Value::SExpr(vec![Value::string("tab\there \"q\" \\ z")])
        );
    }

    #[test]
    fn printing_re_escapes_strings() {
        let value = read_str(r#""line\nnext""#).unwrap().take(0);
        assert_eq!(value.to_string(), r#""line\nnext""#);
    }
}
