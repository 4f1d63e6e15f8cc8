//! JSON I/O handling for the CLI
//!
//! - Input: one JSON value on a single stdin line
//! - Output: one JSON object per stdout line

use std::io::{self, BufRead, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON value from the first line of stdin
pub fn read_request() -> CliResult<Value> {
    read_request_from(io::stdin().lock())
}

pub fn read_request_from<R: BufRead>(mut reader: R) -> CliResult<Value> {
    let mut line = String::new();
    reader.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }

    Ok(serde_json::from_str(&line)?)
}

/// Write `{"status":"ok","data":...}` as one line
pub fn write_response_to<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_json(writer, &response)
}

/// One compact JSON line
pub fn write_json<W: Write>(writer: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
