/// `clusto call` - forward an arbitrary action to an entity
use anyhow::{Context, Result};
use serde_json::Value;

use clusto::config::ClustoConfig;
use clusto::{ActionArgs, ArgValue};

use super::{connect, resolve};
use crate::cli::CallArgs;
use crate::cli_utils::print_json;

pub async fn run(config: &ClustoConfig, args: &CallArgs) -> Result<()> {
    let action_args = parse_args(&args.args)?;

    let client = connect(config)?;
    let entity = resolve(&client, &args.name).await?;

    let result = entity
        .call(&args.action, &action_args)
        .await
        .with_context(|| format!("Action {} failed on {}", args.action, entity.path()))?;

    match result {
        Some(value) => print_json(&value),
        None => Ok(()),
    }
}

/// Parse `key=value` pairs
fn parse_args(raw: &[String]) -> Result<ActionArgs> {
    let mut args = ActionArgs::new();
    for pair in raw {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Invalid argument '{}': expected key=value", pair))?;
        if key.is_empty() {
            anyhow::bail!("Invalid argument '{}': empty key", pair);
        }
        args.set(key, parse_value(value));
    }
    Ok(args)
}

/// `true`/`false` and integers keep their type, `[...]`/`{...}` are JSON,
/// anything else is a string
fn parse_value(raw: &str) -> ArgValue {
    match raw {
        "true" => return ArgValue::Bool(true),
        "false" => return ArgValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return ArgValue::Int(n);
    }
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return ArgValue::Json(value);
        }
    }
    ArgValue::Str(raw.to_string())
}
