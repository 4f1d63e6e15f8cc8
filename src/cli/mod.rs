//! CLI for folio
//!
//! A thin caller of the store: every command maps onto one public `Store`
//! operation. `seed` writes the sample users and reads them back.

mod args;
mod commands;
mod errors;
mod io;
mod sample;

pub use args::{Cli, Command};
pub use commands::{
    delete, init, list, load_config, open_store, read, run, run_command, seed, stream, write,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_request_from, write_json, write_response_to};
pub use sample::{sample_users, Address, User, SAMPLE_COLLECTION};
