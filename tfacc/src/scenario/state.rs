//! Run state: the applied attribute sets a scenario's checks run against

use crate::scenario::config::BlockKind;
use crate::types::DynamicValue;
use std::collections::HashMap;

/// State of a single applied block
#[derive(Debug, Clone)]
pub struct BlockState {
    pub address: String,
    pub kind: BlockKind,
    /// Structured state as returned by the provider
    pub raw: DynamicValue,
    /// Flat attribute-key -> string rendering used by checks
    pub attributes: HashMap<String, String>,
}

impl BlockState {
    pub fn new(address: impl Into<String>, kind: BlockKind, raw: DynamicValue) -> Self {
        let attributes = raw.flatten();
        Self {
            address: address.into(),
            kind,
            raw,
            attributes,
        }
    }
}

/// The result state of one apply, keyed by block address
#[derive(Debug, Clone, Default)]
pub struct RunState {
    blocks: HashMap<String, BlockState>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block: BlockState) {
        self.blocks.insert(block.address.clone(), block);
    }

    pub fn get(&self, address: &str) -> Option<&BlockState> {
        self.blocks.get(address)
    }

    /// Flat attribute lookup, the primitive all checks build on
    pub fn attr(&self, address: &str, key: &str) -> Option<&str> {
        self.blocks
            .get(address)
            .and_then(|b| b.attributes.get(key))
            .map(|s| s.as_str())
    }
}
