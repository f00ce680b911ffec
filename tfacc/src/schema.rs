//! Schema types and builders for tfacc
//!
//! Providers, resources, and data sources describe their configuration
//! surface with a Schema; the fluent builders keep definitions declarative.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// AttributeType defines the type system for block attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
}

impl AttributeType {
    fn matches(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem), Dynamic::List(items)) => {
                items.iter().all(|item| elem.matches(item))
            }
            (AttributeType::Map(elem), Dynamic::Map(entries)) => {
                entries.values().all(|item| elem.matches(item))
            }
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Number => "number",
            AttributeType::Bool => "bool",
            AttributeType::List(_) => "list",
            AttributeType::Map(_) => "map",
        }
    }
}

/// Attribute represents a single configuration attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
}

/// Schema is returned by providers, resources, and data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validate a configuration value against this schema: required
    /// attributes must be present, all present attributes must be declared,
    /// and scalar types must match.
    pub fn validate_config(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let entries = match &config.value {
            Dynamic::Map(m) => m,
            Dynamic::Null => {
                for attr in self.attributes.iter().filter(|a| a.required) {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Missing required attribute '{}'", attr.name),
                            "The configuration is empty",
                        )
                        .with_attribute(AttributePath::new(&attr.name)),
                    );
                }
                return diagnostics;
            }
            other => {
                diagnostics.push(Diagnostic::error(
                    "Invalid configuration",
                    format!("Expected an object, got {}", other.type_name()),
                ));
                return diagnostics;
            }
        };

        for attr in &self.attributes {
            match entries.get(&attr.name) {
                Some(value) => {
                    if !attr.r#type.matches(value) {
                        diagnostics.push(
                            Diagnostic::error(
                                format!("Invalid type for attribute '{}'", attr.name),
                                format!(
                                    "Expected {}, got {}",
                                    attr.r#type.name(),
                                    value.type_name()
                                ),
                            )
                            .with_attribute(AttributePath::new(&attr.name)),
                        );
                    }
                }
                None if attr.required => {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Missing required attribute '{}'", attr.name),
                            format!("'{}' must be set in the configuration", attr.name),
                        )
                        .with_attribute(AttributePath::new(&attr.name)),
                    );
                }
                None => {}
            }
        }

        for name in entries.keys() {
            if self.attribute(name).is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Unexpected attribute '{}'", name),
                        "This attribute is not declared in the schema",
                    )
                    .with_attribute(AttributePath::new(name)),
                );
            }
        }

        diagnostics
    }
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                description: String::new(),
                attributes: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributePath;

    fn subnet_schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Test subnet schema")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cidr_block", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("security_list_ids", AttributeType::List(Box::new(AttributeType::String)))
                    .optional()
                    .build(),
            )
            .build()
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn validate_config_accepts_valid_config() {
        let schema = subnet_schema();

        let mut config = DynamicValue::empty_map();
        config
            .set_string(&AttributePath::new("cidr_block"), "10.0.1.0/24".into())
            .unwrap();
        config
            .set_list(
                &AttributePath::new("security_list_ids"),
                vec![Dynamic::from("ocid1.securitylist.oc1..a")],
            )
            .unwrap();

        assert!(schema.validate_config(&config).is_empty());
    }

    #[test]
    fn validate_config_rejects_missing_required() {
        let schema = subnet_schema();
        let config = DynamicValue::empty_map();

        let diags = schema.validate_config(&config);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("cidr_block"));
    }

    #[test]
    fn validate_config_rejects_unknown_attribute() {
        let schema = subnet_schema();

        let mut config = DynamicValue::empty_map();
        config
            .set_string(&AttributePath::new("cidr_block"), "10.0.1.0/24".into())
            .unwrap();
        config
            .set_string(&AttributePath::new("bogus"), "value".into())
            .unwrap();

        let diags = schema.validate_config(&config);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("bogus"));
    }

    #[test]
    fn validate_config_rejects_wrong_type() {
        let schema = subnet_schema();

        let mut config = DynamicValue::empty_map();
        config
            .set_number(&AttributePath::new("cidr_block"), 24.0)
            .unwrap();

        let diags = schema.validate_config(&config);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("Invalid type"));
    }
}
