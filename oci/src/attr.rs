//! Helpers for pulling typed attributes out of a resolved configuration

use std::collections::BTreeMap;
use tfacc::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

fn type_error(name: &str, expected: &str, actual: &Dynamic) -> Diagnostic {
    Diagnostic::error(
        format!("Invalid attribute '{name}'"),
        format!("expected {expected}, got {}", actual.type_name()),
    )
    .with_attribute(AttributePath::new(name))
}

pub(crate) fn required_string(config: &DynamicValue, name: &str) -> Result<String, Diagnostic> {
    match config.get(&AttributePath::new(name)) {
        Ok(Dynamic::String(s)) => Ok(s.clone()),
        Ok(Dynamic::Null) | Err(_) => Err(Diagnostic::error(
            format!("Missing required attribute '{name}'"),
            format!("'{name}' must be set in the configuration"),
        )
        .with_attribute(AttributePath::new(name))),
        Ok(other) => Err(type_error(name, "string", other)),
    }
}

pub(crate) fn optional_string(
    config: &DynamicValue,
    name: &str,
) -> Result<Option<String>, Diagnostic> {
    match config.get(&AttributePath::new(name)) {
        Ok(Dynamic::String(s)) => Ok(Some(s.clone())),
        Ok(Dynamic::Null) | Err(_) => Ok(None),
        Ok(other) => Err(type_error(name, "string", other)),
    }
}

pub(crate) fn optional_u32(config: &DynamicValue, name: &str) -> Result<Option<u32>, Diagnostic> {
    match config.get(&AttributePath::new(name)) {
        Ok(Dynamic::Number(n)) => {
            if n.fract() != 0.0 || *n < 0.0 || *n > f64::from(u32::MAX) {
                return Err(Diagnostic::error(
                    format!("Invalid attribute '{name}'"),
                    format!("expected a non-negative integer, got {n}"),
                )
                .with_attribute(AttributePath::new(name)));
            }
            Ok(Some(*n as u32))
        }
        Ok(Dynamic::Null) | Err(_) => Ok(None),
        Ok(other) => Err(type_error(name, "non-negative integer", other)),
    }
}

pub(crate) fn string_list(config: &DynamicValue, name: &str) -> Result<Vec<String>, Diagnostic> {
    match config.get(&AttributePath::new(name)) {
        Ok(Dynamic::List(items)) => items
            .iter()
            .map(|item| match item {
                Dynamic::String(s) => Ok(s.clone()),
                other => Err(type_error(name, "list of string", other)),
            })
            .collect(),
        Ok(Dynamic::Null) | Err(_) => Ok(Vec::new()),
        Ok(other) => Err(type_error(name, "list of string", other)),
    }
}

pub(crate) fn string_map(
    config: &DynamicValue,
    name: &str,
) -> Result<BTreeMap<String, String>, Diagnostic> {
    match config.get(&AttributePath::new(name)) {
        Ok(Dynamic::Map(entries)) => entries
            .iter()
            .map(|(key, item)| match item {
                Dynamic::String(s) => Ok((key.clone(), s.clone())),
                other => Err(type_error(name, "map of string", other)),
            })
            .collect(),
        Ok(Dynamic::Null) | Err(_) => Ok(BTreeMap::new()),
        Ok(other) => Err(type_error(name, "map of string", other)),
    }
}
