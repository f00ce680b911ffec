//! Attribute checks run against the flat result state
//!
//! Checks are plain closures over the run state, composed in order on a
//! test step. The first failing check halts the scenario.

use crate::error::{Result, TfaccError};
use crate::scenario::state::RunState;

pub type Check = Box<dyn Fn(&RunState) -> Result<()> + Send + Sync>;

/// Assert that an attribute is present and non-empty on the addressed block
pub fn check_attr_set(address: &str, attribute: &str) -> Check {
    let address = address.to_string();
    let attribute = attribute.to_string();
    Box::new(move |state| {
        if state.get(&address).is_none() {
            return Err(TfaccError::CheckBlockMissing {
                address: address.clone(),
            });
        }
        match state.attr(&address, &attribute) {
            Some(value) if !value.is_empty() => Ok(()),
            _ => Err(TfaccError::CheckAttrNotSet {
                address: address.clone(),
                attribute: attribute.clone(),
            }),
        }
    })
}

/// Assert that an attribute equals an expected literal value
pub fn check_attr(address: &str, attribute: &str, expected: &str) -> Check {
    let address = address.to_string();
    let attribute = attribute.to_string();
    let expected = expected.to_string();
    Box::new(move |state| {
        if state.get(&address).is_none() {
            return Err(TfaccError::CheckBlockMissing {
                address: address.clone(),
            });
        }
        let actual = state.attr(&address, &attribute).unwrap_or_default().to_string();
        if actual == expected {
            Ok(())
        } else {
            Err(TfaccError::CheckAttrMismatch {
                address: address.clone(),
                attribute: attribute.clone(),
                expected: expected.clone(),
                actual,
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::config::BlockKind;
    use crate::scenario::state::BlockState;
    use crate::types::{AttributePath, Dynamic, DynamicValue};
    use std::collections::HashMap;

    fn instances_state() -> RunState {
        let mut raw = DynamicValue::empty_map();
        raw.set_string(&AttributePath::new("availability_domain"), "AD-1".into())
            .unwrap();
        raw.set_list(
            &AttributePath::new("instances"),
            vec![Dynamic::Map(HashMap::from([
                ("id".to_string(), Dynamic::from("ocid1.instance.oc1..a")),
                ("ipxe_script".to_string(), Dynamic::from("")),
            ]))],
        )
        .unwrap();

        let mut state = RunState::new();
        state.insert(BlockState::new(
            "oci_core_instances.inst_read",
            BlockKind::Data,
            raw,
        ));
        state
    }

    #[test]
    fn attr_set_passes_on_non_empty_value() {
        let state = instances_state();
        let check = check_attr_set("oci_core_instances.inst_read", "instances.0.id");
        assert!(check(&state).is_ok());
    }

    #[test]
    fn attr_set_fails_on_empty_value() {
        let state = instances_state();
        let check = check_attr_set("oci_core_instances.inst_read", "instances.0.ipxe_script");
        assert!(matches!(
            check(&state).unwrap_err(),
            TfaccError::CheckAttrNotSet { .. }
        ));
    }

    #[test]
    fn attr_set_fails_on_missing_block() {
        let state = instances_state();
        let check = check_attr_set("oci_core_instances.other", "instances.0.id");
        assert!(matches!(
            check(&state).unwrap_err(),
            TfaccError::CheckBlockMissing { .. }
        ));
    }

    #[test]
    fn attr_equality() {
        let state = instances_state();
        assert!(check_attr("oci_core_instances.inst_read", "instances.#", "1")(&state).is_ok());

        let err = check_attr("oci_core_instances.inst_read", "instances.#", "2")(&state)
            .unwrap_err();
        match err {
            TfaccError::CheckAttrMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, "2");
                assert_eq!(actual, "1");
            }
            other => panic!("expected CheckAttrMismatch, got {other:?}"),
        }
    }
}
