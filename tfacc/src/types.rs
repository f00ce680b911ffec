//! Core type system for tfacc
//!
//! This module provides the value model shared by configuration and state,
//! attribute paths for navigating it, and the flat state rendering that
//! attribute assertions run against.

use crate::error::{Result, TfaccError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dynamic represents configuration and state values of any type
/// All numbers are f64 to match Terraform's type system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dynamic {
    /// Explicit null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value
    Number(f64),
    /// String value
    String(String),
    /// List of values (ordered, allows duplicates)
    List(Vec<Dynamic>),
    /// Map of string keys to values (objects are represented as Maps)
    Map(HashMap<String, Dynamic>),
}

impl Dynamic {
    /// String rendering of a scalar value, as it appears in flat state.
    /// Returns None for lists and maps, which only render structurally.
    pub fn render(&self) -> Option<String> {
        match self {
            Dynamic::Null => None,
            Dynamic::Bool(b) => Some(b.to_string()),
            Dynamic::Number(n) => Some(render_number(*n)),
            Dynamic::String(s) => Some(s.clone()),
            Dynamic::List(_) | Dynamic::Map(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
        }
    }
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Dynamic {
    fn from(v: &str) -> Self {
        Dynamic::String(v.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(v: String) -> Self {
        Dynamic::String(v)
    }
}

impl From<bool> for Dynamic {
    fn from(v: bool) -> Self {
        Dynamic::Bool(v)
    }
}

impl From<f64> for Dynamic {
    fn from(v: f64) -> Self {
        Dynamic::Number(v)
    }
}

impl From<i32> for Dynamic {
    fn from(v: i32) -> Self {
        Dynamic::Number(v as f64)
    }
}

impl From<i64> for Dynamic {
    fn from(v: i64) -> Self {
        Dynamic::Number(v as f64)
    }
}

impl From<u32> for Dynamic {
    fn from(v: u32) -> Self {
        Dynamic::Number(v as f64)
    }
}

impl From<Vec<Dynamic>> for Dynamic {
    fn from(v: Vec<Dynamic>) -> Self {
        Dynamic::List(v)
    }
}

impl From<HashMap<String, Dynamic>> for Dynamic {
    fn from(v: HashMap<String, Dynamic>) -> Self {
        Dynamic::Map(v)
    }
}

/// DynamicValue wraps Dynamic and provides type-safe path access
/// This is what flows through configure/create/read/delete requests
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub value: Dynamic,
}

impl DynamicValue {
    pub fn new(value: Dynamic) -> Self {
        Self { value }
    }

    pub fn null() -> Self {
        Self {
            value: Dynamic::Null,
        }
    }

    pub fn empty_map() -> Self {
        Self {
            value: Dynamic::Map(HashMap::new()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Dynamic::Null)
    }

    /// Navigate a path and return the value at it
    pub fn get(&self, path: &AttributePath) -> Result<&Dynamic> {
        let mut current = &self.value;

        for step in &path.steps {
            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => m
                    .get(name)
                    .ok_or_else(|| TfaccError::AttributeNotFound(name.clone()))?,
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(idx)) => {
                    let idx = *idx as usize;
                    l.get(idx).ok_or(TfaccError::IndexOutOfBounds(idx))?
                }
                (other, step) => {
                    return Err(TfaccError::InvalidPath(format!(
                        "cannot apply step {:?} to {} value",
                        step,
                        other.type_name()
                    )))
                }
            };
        }

        Ok(current)
    }

    /// Type-safe accessors - use these instead of matching directly
    pub fn get_string(&self, path: &AttributePath) -> Result<String> {
        match self.get(path)? {
            Dynamic::String(s) => Ok(s.clone()),
            other => Err(TfaccError::TypeMismatch {
                expected: "string".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_number(&self, path: &AttributePath) -> Result<f64> {
        match self.get(path)? {
            Dynamic::Number(n) => Ok(*n),
            other => Err(TfaccError::TypeMismatch {
                expected: "number".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_bool(&self, path: &AttributePath) -> Result<bool> {
        match self.get(path)? {
            Dynamic::Bool(b) => Ok(*b),
            other => Err(TfaccError::TypeMismatch {
                expected: "bool".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_list(&self, path: &AttributePath) -> Result<Vec<Dynamic>> {
        match self.get(path)? {
            Dynamic::List(l) => Ok(l.clone()),
            other => Err(TfaccError::TypeMismatch {
                expected: "list".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    pub fn get_map(&self, path: &AttributePath) -> Result<HashMap<String, Dynamic>> {
        match self.get(path)? {
            Dynamic::Map(m) => Ok(m.clone()),
            other => Err(TfaccError::TypeMismatch {
                expected: "map".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Type-safe setters - use for building state/config objects
    pub fn set_string(&mut self, path: &AttributePath, value: String) -> Result<()> {
        self.set(path, Dynamic::String(value))
    }

    pub fn set_number(&mut self, path: &AttributePath, value: f64) -> Result<()> {
        self.set(path, Dynamic::Number(value))
    }

    pub fn set_bool(&mut self, path: &AttributePath, value: bool) -> Result<()> {
        self.set(path, Dynamic::Bool(value))
    }

    pub fn set_list(&mut self, path: &AttributePath, value: Vec<Dynamic>) -> Result<()> {
        self.set(path, Dynamic::List(value))
    }

    pub fn set_map(&mut self, path: &AttributePath, value: HashMap<String, Dynamic>) -> Result<()> {
        self.set(path, Dynamic::Map(value))
    }

    pub fn set(&mut self, path: &AttributePath, new_value: Dynamic) -> Result<()> {
        if path.steps.is_empty() {
            self.value = new_value;
            return Ok(());
        }

        // Non-empty paths require a map at the root
        if !matches!(self.value, Dynamic::Map(_)) {
            self.value = Dynamic::Map(HashMap::new());
        }

        let mut current = &mut self.value;
        let last_idx = path.steps.len() - 1;

        for (idx, step) in path.steps.iter().enumerate() {
            if idx == last_idx {
                match (current, step) {
                    (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => {
                        m.insert(name.clone(), new_value);
                        return Ok(());
                    }
                    (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                        let i = *i as usize;
                        if i < l.len() {
                            l[i] = new_value;
                            return Ok(());
                        }
                        return Err(TfaccError::IndexOutOfBounds(i));
                    }
                    _ => {
                        return Err(TfaccError::InvalidPath(
                            "cannot set value at path".to_string(),
                        ))
                    }
                }
            }

            current = match (current, step) {
                (Dynamic::Map(m), AttributePathStep::AttributeName(name)) => {
                    m.entry(name.clone()).or_insert_with(|| {
                        match path.steps.get(idx + 1) {
                            Some(AttributePathStep::ElementKeyInt(_)) => Dynamic::List(Vec::new()),
                            _ => Dynamic::Map(HashMap::new()),
                        }
                    })
                }
                (Dynamic::List(l), AttributePathStep::ElementKeyInt(i)) => {
                    let i = *i as usize;
                    if i >= l.len() {
                        return Err(TfaccError::IndexOutOfBounds(i));
                    }
                    &mut l[i]
                }
                _ => {
                    return Err(TfaccError::InvalidPath(
                        "cannot navigate path".to_string(),
                    ))
                }
            };
        }

        Err(TfaccError::InvalidPath("failed to set value".to_string()))
    }

    /// Render this value as the flat attribute-key -> string map that
    /// attribute assertions run against.
    ///
    /// Lists emit `key.#` with the element count plus `key.<i>` entries;
    /// maps emit `key.%` with the entry count plus `key.<name>` entries;
    /// scalars render as their string form. Null values are absent keys.
    pub fn flatten(&self) -> HashMap<String, String> {
        let mut out = HashMap::new();
        if let Dynamic::Map(m) = &self.value {
            for (key, value) in m {
                flatten_into(value, key, &mut out);
            }
        }
        out
    }
}

fn flatten_into(value: &Dynamic, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        Dynamic::Null => {}
        Dynamic::List(l) => {
            out.insert(format!("{}.#", prefix), l.len().to_string());
            for (i, elem) in l.iter().enumerate() {
                flatten_into(elem, &format!("{}.{}", prefix, i), out);
            }
        }
        Dynamic::Map(m) => {
            out.insert(format!("{}.%", prefix), m.len().to_string());
            for (key, elem) in m {
                flatten_into(elem, &format!("{}.{}", prefix, key), out);
            }
        }
        scalar => {
            if let Some(rendered) = scalar.render() {
                out.insert(prefix.to_string(), rendered);
            }
        }
    }
}

/// AttributePath represents a path to an attribute within a DynamicValue
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: i64) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    /// Parse a dotted path like `availability_domains.0.name`
    /// Numeric segments become list indices
    pub fn from_dotted(path: &str) -> Self {
        let mut result = Self::root();
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            result = match segment.parse::<i64>() {
                Ok(idx) => result.index(idx),
                Err(_) => result.attribute(segment),
            };
        }
        result
    }
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePathStep {
    /// Access attribute by name in a map
    AttributeName(String),
    /// Access element by integer index in a list
    ElementKeyInt(i64),
}

/// Diagnostic represents a warning or error from the provider
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<AttributePath>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, path: AttributePath) -> Self {
        self.attribute = Some(path);
        self
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// First error diagnostic in a slice, if any
pub fn first_error(diagnostics: &[Diagnostic]) -> Option<&Diagnostic> {
    diagnostics
        .iter()
        .find(|d| d.severity == DiagnosticSeverity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_value_string_access() {
        let mut dv = DynamicValue::empty_map();
        dv.set_string(&AttributePath::new("name"), "test".to_string())
            .unwrap();

        let result = dv.get_string(&AttributePath::new("name")).unwrap();
        assert_eq!(result, "test");
    }

    #[test]
    fn dynamic_value_nested_access() {
        let mut dv = DynamicValue::empty_map();
        let path = AttributePath::new("config").attribute("endpoint");
        dv.set_string(&path, "https://example.com".to_string())
            .unwrap();

        let result = dv.get_string(&path).unwrap();
        assert_eq!(result, "https://example.com");
    }

    #[test]
    fn get_reports_type_mismatch() {
        let mut dv = DynamicValue::empty_map();
        dv.set_bool(&AttributePath::new("flag"), true).unwrap();

        let err = dv.get_string(&AttributePath::new("flag")).unwrap_err();
        assert!(matches!(err, TfaccError::TypeMismatch { .. }));
    }

    #[test]
    fn flatten_renders_lists_and_maps() {
        let mut dv = DynamicValue::empty_map();
        dv.set_string(&AttributePath::new("availability_domain"), "AD-1".into())
            .unwrap();
        dv.set_list(
            &AttributePath::new("instances"),
            vec![Dynamic::Map(HashMap::from([
                ("id".to_string(), Dynamic::from("ocid1.instance.oc1..a")),
                ("shape".to_string(), Dynamic::from("VM.Standard1.1")),
            ]))],
        )
        .unwrap();
        dv.set_number(&AttributePath::new("limit"), 1.0).unwrap();

        let flat = dv.flatten();
        assert_eq!(flat.get("availability_domain").unwrap(), "AD-1");
        assert_eq!(flat.get("instances.#").unwrap(), "1");
        assert_eq!(flat.get("instances.0.%").unwrap(), "2");
        assert_eq!(flat.get("instances.0.id").unwrap(), "ocid1.instance.oc1..a");
        assert_eq!(flat.get("instances.0.shape").unwrap(), "VM.Standard1.1");
        assert_eq!(flat.get("limit").unwrap(), "1");
    }

    #[test]
    fn flatten_skips_null_values() {
        let mut dv = DynamicValue::empty_map();
        dv.set(&AttributePath::new("gone"), Dynamic::Null).unwrap();
        dv.set_string(&AttributePath::new("kept"), "v".into())
            .unwrap();

        let flat = dv.flatten();
        assert!(!flat.contains_key("gone"));
        assert_eq!(flat.get("kept").unwrap(), "v");
    }

    #[test]
    fn dotted_path_parses_indices() {
        let path = AttributePath::from_dotted("availability_domains.0.name");
        assert_eq!(
            path.steps,
            vec![
                AttributePathStep::AttributeName("availability_domains".to_string()),
                AttributePathStep::ElementKeyInt(0),
                AttributePathStep::AttributeName("name".to_string()),
            ]
        );
    }

    #[test]
    fn dynamic_serializes_as_plain_json() {
        let value = Dynamic::Map(HashMap::from([(
            "cidr_block".to_string(),
            Dynamic::from("10.0.0.0/16"),
        )]));
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"cidr_block":"10.0.0.0/16"}"#);

        let back: Dynamic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
