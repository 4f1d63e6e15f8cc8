//! CLI command implementations
//!
//! Every command opens the store, performs one operation and prints one
//! JSON response (or, for `stream`, one JSON line per record).

use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::observability::Logger;
use crate::store::{Store, StoreConfig};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_json, write_response_to};
use super::sample::{sample_users, User, SAMPLE_COLLECTION};

/// Main CLI entry point
///
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let store = open_store(cli.config.as_deref(), &cli.dir)?;
    run_command(&store, cli.command, &mut io::stdout().lock())
}

/// Resolve configuration, apply the log level and open the store
pub fn open_store(config_path: Option<&Path>, dir: &Path) -> CliResult<Store> {
    let config = load_config(config_path, dir)?;
    let severity = config
        .severity()
        .map_err(|e| CliError::config_error(e.to_string()))?;
    Logger::set_min_severity(severity);

    Ok(Store::with_config(config)?)
}

/// `--config` wins over `--dir`
pub fn load_config(config_path: Option<&Path>, dir: &Path) -> CliResult<StoreConfig> {
    match config_path {
        Some(path) => {
            StoreConfig::load(path).map_err(|e| CliError::config_error(e.to_string()))
        }
        None => Ok(StoreConfig::new(dir)),
    }
}

/// Run one command against an open store, writing output to `out`
pub fn run_command<W: Write>(store: &Store, cmd: Command, out: &mut W) -> CliResult<()> {
    match cmd {
        Command::Init => init(store, out),
        Command::Write {
            collection,
            resource,
            value,
        } => write(store, &collection, &resource, value.as_deref(), out),
        Command::Read {
            collection,
            resource,
        } => read(store, &collection, &resource, out),
        Command::Delete {
            collection,
            resource,
        } => delete(store, &collection, &resource, out),
        Command::List { collection } => list(store, &collection, out),
        Command::Stream { collection } => stream(store, &collection, out),
        Command::Seed => seed(store, out),
    }
}

pub fn init<W: Write>(store: &Store, out: &mut W) -> CliResult<()> {
    write_response_to(out, json!({ "root": store.root().display().to_string() }))
}

pub fn write<W: Write>(
    store: &Store,
    collection: &str,
    resource: &str,
    value: Option<&str>,
    out: &mut W,
) -> CliResult<()> {
    let value: Value = match value {
        Some(raw) => serde_json::from_str(raw)?,
        None => read_request()?,
    };

    store.write(collection, resource, &value)?;
    write_response_to(
        out,
        json!({ "collection": collection, "resource": resource }),
    )
}

pub fn read<W: Write>(store: &Store, collection: &str, resource: &str, out: &mut W) -> CliResult<()> {
    let value: Value = store.read(collection, resource)?;
    write_response_to(out, value)
}

pub fn delete<W: Write>(
    store: &Store,
    collection: &str,
    resource: &str,
    out: &mut W,
) -> CliResult<()> {
    store.delete(collection, resource)?;
    write_response_to(
        out,
        json!({ "collection": collection, "resource": resource }),
    )
}

pub fn list<W: Write>(store: &Store, collection: &str, out: &mut W) -> CliResult<()> {
    let records = parse_records(store.read_all(collection)?)?;
    write_response_to(out, Value::Array(records))
}

pub fn stream<W: Write>(store: &Store, collection: &str, out: &mut W) -> CliResult<()> {
    let mut records = store.stream_all::<Value>(collection)?;

    for record in records.by_ref() {
        write_json(out, &record)?;
    }

    match records.take_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Write the sample users, then read the whole collection back
pub fn seed<W: Write>(store: &Store, out: &mut W) -> CliResult<()> {
    for user in sample_users() {
        store.write(SAMPLE_COLLECTION, &user.name, &user)?;
    }

    let users = store
        .read_all(SAMPLE_COLLECTION)?
        .iter()
        .map(|raw| serde_json::from_str::<User>(raw))
        .collect::<Result<Vec<_>, _>>()?;

    write_response_to(out, serde_json::to_value(users)?)
}

fn parse_records(raw: Vec<String>) -> CliResult<Vec<Value>> {
    raw.iter()
        .map(|r| serde_json::from_str(r).map_err(CliError::from))
        .collect()
}
