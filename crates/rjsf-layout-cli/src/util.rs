use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

/// Reads a JSON document from a file, or from stdin when the path is `-`.
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let contents = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("error reading from stdin")?;
        buffer
    } else {
        fs::read_to_string(path).with_context(|| format!("error reading {}", path.display()))?
    };
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Parses a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
