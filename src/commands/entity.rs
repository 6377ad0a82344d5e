/// Entity-level commands: show, attrs, parents, contents, siblings, info,
/// delete, add-attr
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use clusto::config::ClustoConfig;
use clusto::{AttrFilter, ClustoError};

use super::{connect, resolve};
use crate::cli::{AddAttrArgs, AttrsArgs, DeleteArgs, EntityArgs, SiblingsArgs};
use crate::cli_utils::{clusto_prefix, print_entities, print_json};

#[derive(Serialize)]
struct InfoOutput {
    path: String,
    name: String,
    entity_type: String,
    role: Option<String>,
    datacenter: Option<String>,
    private_ip: Option<String>,
}

pub async fn show(config: &ClustoConfig, args: &EntityArgs) -> Result<()> {
    let client = connect(config)?;
    let mut entity = resolve(&client, &args.name).await?;
    let descriptor = entity.show(true).await?;

    if args.json {
        return print_json(&descriptor);
    }

    println!("{}", descriptor.object);
    for (key, value) in &descriptor.extra {
        println!("  {}: {}", key, display_value(value));
    }
    if let Some(parents) = &descriptor.parents {
        println!("  parents:");
        for parent in parents {
            println!("    {}", parent);
        }
    }
    if let Some(contents) = &descriptor.contents {
        println!("  contents:");
        for content in contents {
            println!("    {}", content);
        }
    }
    if let Some(attrs) = &descriptor.attrs {
        println!("  attrs:");
        for attr in attrs {
            println!(
                "    {}.{}.{} = {}",
                attr.key,
                attr.subkey.as_deref().unwrap_or("-"),
                attr.number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
                display_value(&attr.value)
            );
        }
    }
    Ok(())
}

pub async fn attrs(config: &ClustoConfig, args: &AttrsArgs) -> Result<()> {
    let client = connect(config)?;
    let mut entity = resolve(&client, &args.name).await?;

    let mut filter = AttrFilter::new();
    filter.key = args.key.clone();
    filter.subkey = args.subkey.clone();
    filter.number = args.number;
    filter.value = args.value.as_deref().map(parse_filter_value);
    filter.merge_container_attrs = args.merged;

    let attrs = entity.attrs(&filter, true).await?;

    if args.json {
        return print_json(&attrs);
    }

    for attr in &attrs {
        println!(
            "{}\t{}\t{}\t{}",
            attr.key,
            attr.subkey.as_deref().unwrap_or(""),
            attr.number.map(|n| n.to_string()).unwrap_or_default(),
            display_value(&attr.value)
        );
    }
    Ok(())
}

pub async fn parents(config: &ClustoConfig, args: &EntityArgs) -> Result<()> {
    let client = connect(config)?;
    let mut entity = resolve(&client, &args.name).await?;
    let parents = entity.parents(true).await?;
    print_entities(&parents, args.json)
}

pub async fn contents(config: &ClustoConfig, args: &EntityArgs) -> Result<()> {
    let client = connect(config)?;
    let mut entity = resolve(&client, &args.name).await?;
    let contents = entity.contents(true).await?;
    print_entities(&contents, args.json)
}

pub async fn siblings(config: &ClustoConfig, args: &SiblingsArgs) -> Result<()> {
    let client = connect(config)?;
    let mut entity = resolve(&client, &args.name).await?;

    let include: Vec<&str> = args.include.iter().map(String::as_str).collect();
    let exclude: Vec<&str> = args.exclude.iter().map(String::as_str).collect();

    let mut siblings: Vec<_> = entity
        .siblings(&include, &exclude, true)
        .await?
        .into_iter()
        .collect();
    siblings.sort();

    print_entities(&siblings, args.json)
}

pub async fn info(config: &ClustoConfig, args: &EntityArgs) -> Result<()> {
    let client = connect(config)?;
    let mut entity = resolve(&client, &args.name).await?;

    let role = entity.role().await?;
    let datacenter = entity.datacenter().await?;
    let private_ip = match entity.private_ip().await {
        Ok(ip) => Some(ip),
        Err(ClustoError::NoPrivateIp(_)) => None,
        Err(e) => return Err(e.into()),
    };

    let output = InfoOutput {
        path: entity.path().to_string(),
        name: entity.name().to_string(),
        entity_type: entity.entity_type().to_string(),
        role,
        datacenter,
        private_ip,
    };

    if args.json {
        return print_json(&output);
    }

    println!("{}", output.path);
    println!("  type:       {}", output.entity_type);
    println!("  role:       {}", output.role.as_deref().unwrap_or("-"));
    println!("  datacenter: {}", output.datacenter.as_deref().unwrap_or("-"));
    println!("  private ip: {}", output.private_ip.as_deref().unwrap_or("-"));
    Ok(())
}

pub async fn delete(config: &ClustoConfig, args: &DeleteArgs) -> Result<()> {
    use std::io::{self, Write};

    let client = connect(config)?;
    let entity = resolve(&client, &args.name).await?;

    if !args.force {
        print!("Delete {}? [y/N]: ", entity.path());
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{} Deletion cancelled.", clusto_prefix());
            return Ok(());
        }
    }

    entity
        .delete()
        .await
        .with_context(|| format!("Failed to delete {}", entity.path()))?;

    println!("{} Deleted: {}", clusto_prefix(), entity.path());
    Ok(())
}

pub async fn add_attr(config: &ClustoConfig, args: &AddAttrArgs) -> Result<()> {
    let client = connect(config)?;
    let mut entity = resolve(&client, &args.name).await?;
    let path = entity.path().to_string();

    let updated = entity
        .add_attr(
            &args.key,
            &args.subkey,
            args.value.as_str(),
            args.datatype.as_deref(),
        )
        .await
        .with_context(|| format!("Failed to add attribute to {}", path))?;

    println!(
        "{} Added {}.{} = {} to {}",
        clusto_prefix(),
        args.key,
        args.subkey,
        args.value,
        updated.path()
    );
    Ok(())
}

/// `12`, `true` and other JSON literals keep their type so they match typed
/// attributes; anything else is a plain string
fn parse_filter_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Strings print bare; everything else as JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
