//! Command-line and environment configuration for the `qlisp` binary
//!
//! Precedence, lowest first: built-in defaults, `QLISP_PROMPT` /
//! `QLISP_HISTORY`, then command-line flags.

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_PROMPT: &str = "qlisp> ";
pub const HISTORY_FILE_NAME: &str = ".qlisp_history";

pub const USAGE: &str = "\
Usage: qlisp [OPTIONS] [FILE]...

Without files, starts an interactive session. With files, evaluates each
top-level form of each file in order.

Options:
  --no-history   Do not load or save line history
  -q, --quiet    Do not print the banner
  -h, --help     Print this help

Environment:
  QLISP_PROMPT   Prompt string (default \"qlisp> \")
  QLISP_HISTORY  History file (default ~/.qlisp_history)
  RUST_LOG       Enable evaluator tracing, e.g. RUST_LOG=qlisp_runtime=trace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    pub prompt: String,
    /// Where line history is kept; `None` disables history
    pub history: Option<PathBuf>,
    pub banner: bool,
    /// Source files to run instead of starting the interactive loop
    pub files: Vec<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: DEFAULT_PROMPT.to_string(),
            history: dirs::home_dir().map(|home| home.join(HISTORY_FILE_NAME)),
            banner: true,
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Run(ReplConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown option '{0}' (try --help)")]
    UnknownOption(String),
}

impl ReplConfig {
    /// Resolve configuration from the process environment and arguments
    pub fn from_env(args: impl IntoIterator<Item = String>) -> Result<Command, ConfigError> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from `args` (program name excluded) and a
    /// variable lookup
    pub fn resolve<F>(args: impl IntoIterator<Item = String>, var: F) -> Result<Command, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ReplConfig::default();

        if let Some(prompt) = var("QLISP_PROMPT") {
            config.prompt = prompt;
        }
        if let Some(history) = var("QLISP_HISTORY").filter(|h| !h.is_empty()) {
            config.history = Some(PathBuf::from(history));
        }

        for arg in args {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Command::Help),
                "-q" | "--quiet" => config.banner = false,
                "--no-history" => config.history = None,
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(ConfigError::UnknownOption(flag.to_string()));
                }
                path => config.files.push(PathBuf::from(path)),
            }
        }

        Ok(Command::Run(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_vars(_: &str) -> Option<String> {
        None
    }

    fn run(command: Command) -> ReplConfig {
        match command {
            Command::Run(config) => config,
            Command::Help => panic!("expected a run command"),
        }
    }

    #[test]
    fn defaults() {
        let config = run(ReplConfig::resolve(args(&[]), no_vars).unwrap());
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert!(config.banner);
        assert!(config.files.is_empty());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = run(ReplConfig::resolve(args(&[]), |key| match key {
            "QLISP_PROMPT" => Some("> ".to_string()),
            "QLISP_HISTORY" => Some("/tmp/hist".to_string()),
            _ => None,
        })
        .unwrap());
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.history, Some(PathBuf::from("/tmp/hist")));
    }

    #[test]
    fn flags_override_environment() {
        let config = run(ReplConfig::resolve(args(&["--no-history", "-q"]), |key| {
            (key == "QLISP_HISTORY").then(|| "/tmp/hist".to_string())
        })
        .unwrap());
        assert_eq!(config.history, None);
        assert!(!config.banner);
    }

    #[test]
    fn positional_arguments_are_files() {
        let config = run(ReplConfig::resolve(args(&["a.ql", "lib/b.ql"]), no_vars).unwrap());
        assert_eq!(
            config.files,
            vec![PathBuf::from("a.ql"), PathBuf::from("lib/b.ql")]
        );
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(
            ReplConfig::resolve(args(&["x.ql", "--help"]), no_vars).unwrap(),
            Command::Help
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert_eq!(
            ReplConfig::resolve(args(&["--bogus"]), no_vars).unwrap_err(),
            ConfigError::UnknownOption("--bogus".to_string())
        );
    }
}
