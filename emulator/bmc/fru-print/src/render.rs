// Licensed under the Apache-2.0 license

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error(
        "{keys:?} is not a valid input for field.\n\
         multiple key values can be provided to the field arg, ex. -f multirecord DC_Load_Record max_V\n\
         If just one value is given, it is assumed the field is under the board area."
    )]
    UnknownField { keys: Vec<String> },
}

/// Renders `value` as pretty JSON or TOML.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let mut text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Toml => toml::to_string_pretty(value)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Walks `keys` through a serialized document. A single key names a board
/// area field; several keys form a path from the document root.
pub fn lookup<T: Serialize>(document: &T, keys: &[String]) -> Result<Value> {
    let root = serde_json::to_value(document)?;
    let path: Vec<&str> = match keys {
        [key] => vec!["board", key.as_str()],
        _ => keys.iter().map(String::as_str).collect(),
    };

    let mut node = &root;
    for key in path {
        node = node.get(key).ok_or_else(|| LookupError::UnknownField {
            keys: keys.to_vec(),
        })?;
    }
    Ok(node.clone())
}

/// Renders a looked-up value. Strings and numbers print bare; tables use
/// `format`.
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    match value {
        Value::String(text) => Ok(format!("{text}\n")),
        Value::Object(_) => render(value, format),
        other => Ok(format!("{other}\n")),
    }
}
