/// CLI utilities for consistent output formatting
use anyhow::Result;
use serde::Serialize;
use std::io::IsTerminal;

use clusto::EntityProxy;

/// Get a colored prefix
///
/// Returns bright cyan if stderr is a TTY, plain text otherwise.
pub fn clusto_prefix() -> &'static str {
    if std::io::stderr().is_terminal() {
        "\x1b[96m[clusto]\x1b[0m"
    } else {
        "[clusto]"
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print entity paths one per line, or as a JSON array
pub fn print_entities<'a, I>(entities: I, json: bool) -> Result<()>
where
    I: IntoIterator<Item = &'a EntityProxy>,
{
    let paths: Vec<&str> = entities.into_iter().map(EntityProxy::path).collect();
    if json {
        print_json(&paths)
    } else {
        for path in paths {
            println!("{}", path);
        }
        Ok(())
    }
}
