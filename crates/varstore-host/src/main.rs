//! varstored entry point.
//!
//! Wires the pieces together and drives the command console:
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML host config (or defaults)
//!  └─ build_registry()       -- declared macros with initial variables
//!  └─ VariableStore::load()  -- startup load; corrupt file is fatal here
//!  └─ bind_on_load()         -- overlay stored sections onto live macros
//!  └─ stdin console loop     -- SAVE_VARIABLE / STATUS / QUIT
//! ```
//!
//! Execution is single-threaded and synchronous throughout: commands are
//! human-triggered and file I/O is small, so every operation runs inline
//! to completion.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use varstore_host::application::binder::bind_on_load;
use varstore_host::application::save_variable::save_variable;
use varstore_host::application::status::status_report;
use varstore_host::infrastructure::console::{parse_command, Command};
use varstore_host::infrastructure::storage::config::{
    build_registry, expand_user, load_config, load_config_from,
};
use varstore_host::infrastructure::storage::store::VariableStore;

fn main() -> anyhow::Result<()> {
    // Optional first argument: an explicit config path.
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => load_config_from(&path),
        None => load_config(),
    }
    .context("loading host configuration")?;

    // Initialise structured logging. Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.host.log_level)),
        )
        .init();

    info!("varstored starting");

    let mut registry =
        build_registry(&config).context("declaring macros from configuration")?;

    let mut store = VariableStore::new(expand_user(&config.store.filename));
    // A corrupt variables file at startup is a configuration-level
    // failure: refuse to run rather than risk clobbering it on first save.
    store.load().context("loading variables file")?;
    bind_on_load(store.sections(), &mut registry);

    info!(
        variables_file = %store.path().display(),
        macros = registry.len(),
        "startup complete"
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading command input")?;
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Status)) => {
                // `{:#}` pretty-prints a serde_json::Value.
                println!("{:#}", status_report(&store));
            }
            Ok(Some(Command::SaveVariable {
                variable,
                value,
                macro_alias,
            })) => match save_variable(
                &mut store,
                &mut registry,
                &variable,
                &value,
                macro_alias.as_deref(),
            ) {
                Ok(()) => println!("ok"),
                Err(e) => {
                    error!(variable = %variable, error = %e, "save rejected");
                    println!("error: {e}");
                }
            },
            Err(e) => {
                warn!(error = %e, "command rejected");
                println!("error: {e}");
            }
        }
    }

    info!("varstored shutting down");
    Ok(())
}
