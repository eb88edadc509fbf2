use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use inistore::config::{default_config_path, ConfigStore, HandlerRegistry};
use inistore::logging::init_tracing;

/// Inspect and edit INI configuration files.
#[derive(Debug, Parser)]
#[command(name = "inistore", version, about)]
struct Cli {
    /// Config file to operate on (defaults to the per-user config file).
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a value.
    Get { section: String, key: String },
    /// Set a value and save the file.
    Set {
        section: String,
        key: String,
        value: String,
    },
    /// Remove a value and save the file.
    Remove { section: String, key: String },
    /// List section names.
    Sections,
    /// List the keys of a section.
    Keys { section: String },
    /// Exit successfully only if the value is exactly "on".
    IsOn { section: String, key: String },
    /// Copy the file on disk to another location.
    Backup { dest: PathBuf },
    /// Print the whole configuration.
    Dump {
        /// Emit JSON instead of INI.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Dump<'a> {
    path: &'a std::path::Path,
    sections: BTreeMap<&'a str, BTreeMap<&'a str, &'a str>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let directive = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    init_tracing(directive);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let path = cli.file.unwrap_or_else(default_config_path);
    let mut store = ConfigStore::with_handlers(&path, HandlerRegistry::new(), false);

    match cli.command {
        Command::Get { section, key } => match store.get(&section, &key) {
            Some(value) => println!("{value}"),
            None => return Ok(not_found(&section, &key)),
        },
        Command::Set {
            section,
            key,
            value,
        } => {
            store.set(&section, &key, &value, false);
            store.try_save(store.path())?;
        }
        Command::Remove { section, key } => {
            if !store.remove(&section, &key) {
                return Ok(not_found(&section, &key));
            }
            store.try_save(store.path())?;
        }
        Command::Sections => {
            let mut sections = store.get_sections();
            sections.sort();
            for section in sections {
                println!("{section}");
            }
        }
        Command::Keys { section } => {
            let mut keys = store.get_keys(&section);
            keys.sort();
            for key in keys {
                println!("{key}");
            }
        }
        Command::IsOn { section, key } => {
            if !store.is_on(&section, &key) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Backup { dest } => {
            store
                .try_backup(&dest)
                .with_context(|| format!("backing up {}", store.path().display()))?;
        }
        Command::Dump { json } => {
            if json {
                let dump = Dump {
                    path: store.path(),
                    sections: store
                        .sections()
                        .iter()
                        .map(|(section, keys)| {
                            let keys = keys
                                .iter()
                                .map(|(k, v)| (k.as_str(), v.as_str()))
                                .collect();
                            (section.as_str(), keys)
                        })
                        .collect(),
                };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                print!("{}", store.to_ini_string());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn not_found(section: &str, key: &str) -> ExitCode {
    eprintln!("Error: [{section}].{key} not found");
    ExitCode::FAILURE
}
