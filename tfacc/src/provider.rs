//! Provider trait and related types
//!
//! A Provider owns the connection to the backing service and hands out
//! resources and data sources through factories. The scenario runner
//! configures the provider once per run and injects the resulting
//! provider data into every block it applies, so scenarios never rely on
//! ambient globals.

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

pub type ResourceFactory = Box<dyn Fn() -> Box<dyn ResourceWithConfigure> + Send + Sync>;
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider type name (e.g., "oci")
    fn type_name(&self) -> &str;

    /// Called to get the provider configuration schema
    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once per run to configure the provider
    /// Return provider_data to be passed to resources and data sources
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    /// Factories for the resource types this provider serves
    fn resources(&self) -> HashMap<String, ResourceFactory>;

    /// Factories for the data source types this provider serves
    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}
