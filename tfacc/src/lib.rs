//! tfacc - an acceptance test harness for declarative infrastructure providers
//!
//! The crate has two halves:
//!
//! - the provider surface: [`provider::Provider`], [`resource::Resource`] and
//!   [`data_source::DataSource`] traits with request/response structs, a
//!   [`types::DynamicValue`] model, [`schema`] definitions and a
//!   request-scoped [`context::Context`]
//! - the scenario runner: [`scenario::TestCase`] / [`scenario::TestStep`]
//!   built from typed configuration blocks, applied, import-verified,
//!   checked and torn down by [`scenario::run`]
//!
//! ```no_run
//! use tfacc::scenario::{self, check_attr, ConfigBuilder, BlockBuilder, TestCase, TestStep};
//! use tfacc::types::DynamicValue;
//!
//! # async fn example(provider: &mut dyn tfacc::provider::Provider) -> tfacc::error::Result<()> {
//! let config = ConfigBuilder::new()
//!     .resource("mem_object", "a", BlockBuilder::new().attr("name", "alpha"))
//!     .build();
//!
//! let case = TestCase::new()
//!     .step(TestStep::new(config)
//!         .import_state(true)
//!         .check(check_attr("mem_object.a", "name", "alpha")));
//!
//! scenario::run(provider, DynamicValue::empty_map(), case).await
//! # }
//! ```

pub mod context;
pub mod data_source;
pub mod error;
pub mod provider;
pub mod resource;
pub mod scenario;
pub mod schema;
pub mod types;

pub use context::Context;
pub use error::{Result, TfaccError};
pub use schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{
    first_error, AttributePath, AttributePathStep, Diagnostic, DiagnosticSeverity, Dynamic,
    DynamicValue,
};
