//! Interactive loop and file runner
//!
//! Both share one root environment per process. A line typed at the prompt
//! is evaluated as a single implicit S-Expression, so `+ 1 2` prints `3`;
//! a file is evaluated one top-level form at a time.

use std::fs;
use std::path::{Path, PathBuf};

use qlisp::{Environment, ParseError, Value, read_str};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ReplConfig;
use crate::interpreter::eval;

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("line editor failed: {0}")]
    Readline(#[from] ReadlineError),
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

// ============================================================================
// Evaluation Entry Points
// ============================================================================

/// Evaluate `input` as one line: all top-level forms form a single S-Expression
pub fn run_source(env: &Environment, input: &str) -> Result<Value, ParseError> {
    Ok(eval(env, read_str(input)?))
}

/// Evaluate each top-level form of `input` in order, returning every result
pub fn run_program(env: &Environment, input: &str) -> Result<Vec<Value>, ParseError> {
    let forms = match read_str(input)? {
        Value::SExpr(forms) => forms,
        other => vec![other],
    };
    Ok(forms.into_iter().map(|form| eval(env, form)).collect())
}

// ============================================================================
// File Runner
// ============================================================================

/// Run one source file, printing any Error results
pub fn run_file(env: &Environment, path: &Path) -> Result<(), ReplError> {
    let contents = fs::read_to_string(path).map_err(|source| ReplError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let results = run_program(env, &contents).map_err(|source| ReplError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    for result in results.iter().filter(|r| r.is_error()) {
        println!("{result}");
    }
    debug!(path = %path.display(), forms = results.len(), "file evaluated");
    Ok(())
}

// ============================================================================
// REPL
// ============================================================================

pub fn run_repl(config: &ReplConfig, env: &Environment) -> Result<(), ReplError> {
    let mut editor = DefaultEditor::new()?;

    if let Some(history) = &config.history {
        // A missing history file is normal on first run.
        if let Err(e) = editor.load_history(history) {
            debug!(path = %history.display(), error = %e, "no history loaded");
        }
    }

    if config.banner {
        println!("qlisp {}", env!("CARGO_PKG_VERSION"));
        println!("Type exit or press Ctrl-D to quit");
        println!();
    }

    loop {
        let line = match editor.readline(&config.prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        if input == "exit" {
            break;
        }

        match run_source(env, input) {
            Ok(result) => println!("{result}"),
            Err(e) => eprintln!("<stdin>:{e}"),
        }
    }

    if let Some(history) = &config.history {
        if let Err(e) = editor.save_history(history) {
            warn!(path = %history.display(), error = %e, "failed to save history");
        }
    }

    Ok(())
}
