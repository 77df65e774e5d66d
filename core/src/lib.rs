//! Core language definition for qlisp
//!
//! This crate holds the value model, lexical environments, the source
//! parser and the reader that turns parse trees into values. Evaluation and
//! the builtin operations live in the `qlisp-runtime` crate.

pub mod environment;
pub mod interner;
pub mod language;
pub mod parser;
pub mod reader;
pub mod stack;

// Re-export commonly used items for convenience
pub use environment::Environment;
pub use interner::InternedSymbol;
pub use language::{Builtin, BuiltinFn, Closure, Function, Value};
pub use parser::{Node, ParseError, parse};
pub use reader::{read, read_str};
pub use stack::ensure_sufficient_stack;
