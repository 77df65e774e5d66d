//! qlisp runtime - evaluator, builtins and REPL
//!
//! This crate provides the execution side of qlisp:
//! - The evaluator (symbol lookup, S-Expression reduction, closures)
//! - The builtin operation table
//! - The interactive loop and file runner used by the `qlisp` binary

pub mod config;
pub mod interpreter;
pub mod repl;
pub mod stdlib;

use qlisp::Environment;

// Re-export evaluator entry points
pub use interpreter::{apply, eval};

// Re-export stdlib registration
pub use stdlib::{BUILTINS, register_stdlib};

pub use repl::{ReplError, run_file, run_program, run_repl, run_source};

/// A fresh root environment with every builtin bound
pub fn root_environment() -> Environment {
    let env = Environment::new();
    register_stdlib(&env);
    env
}
