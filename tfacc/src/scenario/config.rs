//! Scenario configuration: an ordered graph of declarative blocks
//!
//! A scenario configuration plays the role of the HCL snippet in a classic
//! acceptance test: `resource` and `data` blocks with attribute values,
//! declared in dependency order. Referential integrity between blocks is
//! expressed with `${...}` interpolations inside string values and resolved
//! by the runner at apply time, not by this module.

use crate::types::Dynamic;
use std::collections::HashMap;

/// Whether a block declares a managed resource or a read-only data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Resource,
    Data,
}

/// A single declared block
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    pub type_name: String,
    pub name: String,
    pub attributes: HashMap<String, Dynamic>,
}

impl Block {
    /// The address other blocks and checks use to refer to this block,
    /// `"<type>.<name>"`. Valid for the duration of one run.
    pub fn address(&self) -> String {
        format!("{}.{}", self.type_name, self.name)
    }
}

/// An ordered list of blocks plus scenario-scoped variables
#[derive(Debug, Clone, Default)]
pub struct ScenarioConfig {
    pub variables: HashMap<String, Dynamic>,
    pub blocks: Vec<Block>,
}

/// Fluent builder for block attributes
#[derive(Debug, Clone, Default)]
pub struct BlockBuilder {
    attributes: HashMap<String, Dynamic>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &str, value: impl Into<Dynamic>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }
}

/// Fluent builder for scenario configurations
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: ScenarioConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(mut self, name: &str, value: impl Into<Dynamic>) -> Self {
        self.config.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn resource(mut self, type_name: &str, name: &str, block: BlockBuilder) -> Self {
        self.config.blocks.push(Block {
            kind: BlockKind::Resource,
            type_name: type_name.to_string(),
            name: name.to_string(),
            attributes: block.attributes,
        });
        self
    }

    pub fn data(mut self, type_name: &str, name: &str, block: BlockBuilder) -> Self {
        self.config.blocks.push(Block {
            kind: BlockKind::Data,
            type_name: type_name.to_string(),
            name: name.to_string(),
            attributes: block.attributes,
        });
        self
    }

    pub fn build(self) -> ScenarioConfig {
        self.config
    }
}
