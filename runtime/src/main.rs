use std::process;
use std::sync::Once;

use qlisp_runtime::config::{Command, ReplConfig, USAGE};
use qlisp_runtime::{root_environment, run_file, run_repl};

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber when `RUST_LOG` is set.
///
/// Enable with `RUST_LOG=qlisp_runtime=debug` or `=trace`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();

    let config = match ReplConfig::from_env(std::env::args().skip(1)) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(e) => {
            eprintln!("qlisp: {e}");
            process::exit(2);
        }
    };

    let env = root_environment();

    if config.files.is_empty() {
        if let Err(e) = run_repl(&config, &env) {
            eprintln!("qlisp: {e}");
            process::exit(1);
        }
        return;
    }

    for path in &config.files {
        if let Err(e) = run_file(&env, path) {
            eprintln!("qlisp: {e}");
            process::exit(1);
        }
    }
}
