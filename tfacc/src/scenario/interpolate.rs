//! `${...}` interpolation over block attribute values
//!
//! Supported expressions:
//! - `var.<name>` - scenario variable, optionally with a deeper path
//! - `<type>.<name>.<attr>[.<step>...]` - attribute of an earlier block;
//!   a leading `data.` segment is accepted and ignored, and `[0]` style
//!   indices normalize to dotted steps
//! - `lookup(<reference>, "<key>")` - map key lookup on a resolved reference
//!
//! A string that is exactly one interpolation resolves to the referenced
//! value with its original type; mixed strings splice in the scalar
//! rendering of each expression. Resolution only sees blocks that were
//! applied earlier, so dangling and forward references fail before any
//! provider call is made for the referencing block.

use crate::error::{Result, TfaccError};
use crate::scenario::config::Block;
use crate::scenario::state::RunState;
use crate::types::{AttributePath, Dynamic, DynamicValue};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn interpolation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

fn lookup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"^lookup\(\s*(.+?)\s*,\s*"([^"]+)"\s*\)$"#).unwrap())
}

/// Resolve all attribute values of a block against the state applied so far.
/// Returns the resolved configuration as a map-rooted DynamicValue.
pub(crate) fn resolve_block(
    block: &Block,
    variables: &HashMap<String, Dynamic>,
    state: &RunState,
) -> Result<DynamicValue> {
    let address = block.address();
    let mut resolved = HashMap::new();
    for (name, value) in &block.attributes {
        resolved.insert(
            name.clone(),
            resolve_value(value, variables, state, &address)?,
        );
    }
    Ok(DynamicValue::new(Dynamic::Map(resolved)))
}

fn resolve_value(
    value: &Dynamic,
    variables: &HashMap<String, Dynamic>,
    state: &RunState,
    address: &str,
) -> Result<Dynamic> {
    match value {
        Dynamic::String(s) => resolve_string(s, variables, state, address),
        Dynamic::List(items) => {
            let mut resolved = Vec::with_capacity(items.len());
            for item in items {
                resolved.push(resolve_value(item, variables, state, address)?);
            }
            Ok(Dynamic::List(resolved))
        }
        Dynamic::Map(entries) => {
            let mut resolved = HashMap::new();
            for (key, item) in entries {
                resolved.insert(key.clone(), resolve_value(item, variables, state, address)?);
            }
            Ok(Dynamic::Map(resolved))
        }
        other => Ok(other.clone()),
    }
}

fn resolve_string(
    input: &str,
    variables: &HashMap<String, Dynamic>,
    state: &RunState,
    address: &str,
) -> Result<Dynamic> {
    let pattern = interpolation_pattern();

    // A string that is exactly one interpolation keeps the referenced type
    if let Some(captures) = pattern.captures(input) {
        let full = captures.get(0).map(|m| m.as_str()).unwrap_or_default();
        if full == input {
            let expr = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            return resolve_expression(expr, variables, state, address);
        }
    } else {
        return Ok(Dynamic::String(input.to_string()));
    }

    let mut out = String::new();
    let mut last = 0;
    for captures in pattern.captures_iter(input) {
        let whole = captures.get(0).unwrap_or_else(|| unreachable!());
        let expr = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        out.push_str(&input[last..whole.start()]);

        let value = resolve_expression(expr, variables, state, address)?;
        match value.render() {
            Some(rendered) => out.push_str(&rendered),
            None => {
                return Err(TfaccError::InvalidInterpolation {
                    expression: expr.to_string(),
                    reason: format!("cannot splice a {} into a string", value.type_name()),
                })
            }
        }
        last = whole.end();
    }
    out.push_str(&input[last..]);
    Ok(Dynamic::String(out))
}

fn resolve_expression(
    expr: &str,
    variables: &HashMap<String, Dynamic>,
    state: &RunState,
    address: &str,
) -> Result<Dynamic> {
    let expr = expr.trim();

    if let Some(captures) = lookup_pattern().captures(expr) {
        let reference = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let key = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        let value = resolve_reference(reference, variables, state, address)?;
        return match value {
            Dynamic::Map(m) => m.get(key).cloned().ok_or_else(|| {
                TfaccError::InvalidInterpolation {
                    expression: expr.to_string(),
                    reason: format!("key '{}' not present in map", key),
                }
            }),
            other => Err(TfaccError::InvalidInterpolation {
                expression: expr.to_string(),
                reason: format!("lookup() expects a map, got {}", other.type_name()),
            }),
        };
    }

    resolve_reference(expr, variables, state, address)
}

fn resolve_reference(
    reference: &str,
    variables: &HashMap<String, Dynamic>,
    state: &RunState,
    address: &str,
) -> Result<Dynamic> {
    // Normalize `[0]` style indices into dotted steps
    let normalized = reference.replace('[', ".").replace(']', "");
    let mut segments: Vec<&str> = normalized.split('.').filter(|s| !s.is_empty()).collect();

    if segments.first() == Some(&"var") {
        if segments.len() < 2 {
            return Err(TfaccError::InvalidInterpolation {
                expression: reference.to_string(),
                reason: "variable reference needs a name".to_string(),
            });
        }
        let name = segments[1];
        let value = variables
            .get(name)
            .cloned()
            .ok_or_else(|| TfaccError::InvalidInterpolation {
                expression: reference.to_string(),
                reason: format!("undeclared variable '{}'", name),
            })?;
        return navigate(DynamicValue::new(value), &segments[2..]);
    }

    // Data source references may carry a leading `data.` segment
    if segments.first() == Some(&"data") {
        segments.remove(0);
    }

    if segments.len() < 3 {
        return Err(TfaccError::InvalidInterpolation {
            expression: reference.to_string(),
            reason: "expected <type>.<name>.<attribute>".to_string(),
        });
    }

    let target = format!("{}.{}", segments[0], segments[1]);
    let block = state
        .get(&target)
        .ok_or_else(|| TfaccError::DanglingReference {
            address: address.to_string(),
            reference: target.clone(),
        })?;

    navigate(block.raw.clone(), &segments[2..])
}

fn navigate(value: DynamicValue, segments: &[&str]) -> Result<Dynamic> {
    let mut path = AttributePath::root();
    for segment in segments {
        path = match segment.parse::<i64>() {
            Ok(idx) => path.index(idx),
            Err(_) => path.attribute(segment),
        };
    }
    Ok(value.get(&path)?.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::config::{BlockBuilder, BlockKind, ConfigBuilder};
    use crate::scenario::state::BlockState;

    fn state_with_vcn() -> RunState {
        let mut state = RunState::new();
        let mut raw = DynamicValue::empty_map();
        raw.set_string(&AttributePath::new("id"), "ocid1.vcn.oc1..a".into())
            .unwrap();
        raw.set_list(
            &AttributePath::new("availability_domains"),
            vec![Dynamic::Map(HashMap::from([(
                "name".to_string(),
                Dynamic::from("Uocm:PHX-AD-1"),
            )]))],
        )
        .unwrap();
        state.insert(BlockState::new(
            "oci_core_virtual_network.vn",
            BlockKind::Resource,
            raw,
        ));
        state
    }

    fn variables() -> HashMap<String, Dynamic> {
        HashMap::from([(
            "compartment_id".to_string(),
            Dynamic::from("ocid1.compartment.oc1..test"),
        )])
    }

    #[test]
    fn whole_string_reference_keeps_type() {
        let state = state_with_vcn();
        let value = resolve_string(
            "${oci_core_virtual_network.vn.availability_domains}",
            &variables(),
            &state,
            "oci_core_subnet.sb",
        )
        .unwrap();
        assert!(matches!(value, Dynamic::List(_)));
    }

    #[test]
    fn variable_and_concatenation() {
        let state = state_with_vcn();
        let value = resolve_string(
            "compartment=${var.compartment_id}/vcn=${oci_core_virtual_network.vn.id}",
            &variables(),
            &state,
            "oci_core_subnet.sb",
        )
        .unwrap();
        assert_eq!(
            value,
            Dynamic::from("compartment=ocid1.compartment.oc1..test/vcn=ocid1.vcn.oc1..a")
        );
    }

    #[test]
    fn lookup_with_bracket_index() {
        let state = state_with_vcn();
        let value = resolve_string(
            r#"${lookup(oci_core_virtual_network.vn.availability_domains[0], "name")}"#,
            &variables(),
            &state,
            "oci_core_subnet.sb",
        )
        .unwrap();
        assert_eq!(value, Dynamic::from("Uocm:PHX-AD-1"));
    }

    #[test]
    fn data_prefix_is_accepted() {
        let mut state = RunState::new();
        let mut raw = DynamicValue::empty_map();
        raw.set_string(&AttributePath::new("id"), "img-1".into())
            .unwrap();
        state.insert(BlockState::new(
            "oci_core_images.img",
            BlockKind::Data,
            raw,
        ));

        let value = resolve_string(
            "${data.oci_core_images.img.id}",
            &HashMap::new(),
            &state,
            "oci_core_instance.inst",
        )
        .unwrap();
        assert_eq!(value, Dynamic::from("img-1"));
    }

    #[test]
    fn dangling_reference_is_an_error() {
        let state = RunState::new();
        let err = resolve_string(
            "${oci_core_subnet.sb.id}",
            &HashMap::new(),
            &state,
            "oci_core_instance.inst",
        )
        .unwrap_err();
        match err {
            TfaccError::DanglingReference { address, reference } => {
                assert_eq!(address, "oci_core_instance.inst");
                assert_eq!(reference, "oci_core_subnet.sb");
            }
            other => panic!("expected DanglingReference, got {other:?}"),
        }
    }

    #[test]
    fn resolve_block_walks_nested_values() {
        let state = state_with_vcn();
        let config = ConfigBuilder::new()
            .resource(
                "oci_core_subnet",
                "sb",
                BlockBuilder::new()
                    .attr("vcn_id", "${oci_core_virtual_network.vn.id}")
                    .attr(
                        "security_list_ids",
                        vec![Dynamic::from("${oci_core_virtual_network.vn.id}")],
                    ),
            )
            .build();

        let resolved = resolve_block(&config.blocks[0], &variables(), &state).unwrap();
        assert_eq!(
            resolved.get_string(&AttributePath::new("vcn_id")).unwrap(),
            "ocid1.vcn.oc1..a"
        );
        assert_eq!(
            resolved
                .get_list(&AttributePath::new("security_list_ids"))
                .unwrap(),
            vec![Dynamic::from("ocid1.vcn.oc1..a")]
        );
    }
}
