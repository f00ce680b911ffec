//! OCI core compute provider
//!
//! Serves the resources and data sources the compute acceptance scenarios
//! exercise: virtual networks, subnets and instances, plus read-only views
//! of availability domains, images and instances.

pub mod api;
mod attr;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfacc::context::Context;
use tfacc::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
};
use tfacc::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfacc::types::Diagnostic;

use provider_data::OciProviderData;

pub struct OciProvider {
    client: Option<api::Client>,
}

impl Default for OciProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OciProvider {
    pub fn new() -> Self {
        Self { client: None }
    }
}

#[async_trait]
impl Provider for OciProvider {
    fn type_name(&self) -> &str {
        "oci"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: SchemaBuilder::new()
                .version(0)
                .description("OCI core compute provider")
                .attribute(
                    AttributeBuilder::new("endpoint", AttributeType::String)
                        .optional()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("auth_token", AttributeType::String)
                        .optional()
                        .sensitive()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("insecure", AttributeType::Bool)
                        .optional()
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let endpoint = match attr::optional_string(&request.config, "endpoint") {
            Ok(value) => value.or_else(|| std::env::var("OCI_ENDPOINT").ok()),
            Err(diagnostic) => {
                return ConfigureProviderResponse {
                    diagnostics: vec![diagnostic],
                    provider_data: None,
                }
            }
        };
        let auth_token = match attr::optional_string(&request.config, "auth_token") {
            Ok(value) => value.or_else(|| std::env::var("OCI_AUTH_TOKEN").ok()),
            Err(diagnostic) => {
                return ConfigureProviderResponse {
                    diagnostics: vec![diagnostic],
                    provider_data: None,
                }
            }
        };
        let insecure = request
            .config
            .get_bool(&tfacc::types::AttributePath::new("insecure"))
            .ok()
            .or_else(|| {
                std::env::var("OCI_INSECURE")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok())
            })
            .unwrap_or(false);

        let mut diagnostics = Vec::new();
        let mut provider_data = None;

        match (endpoint, auth_token) {
            (Some(endpoint), Some(auth_token)) => {
                match api::Client::new(&endpoint, &auth_token, insecure) {
                    Ok(client) => {
                        tracing::info!(endpoint = endpoint.as_str(), "configured OCI provider");
                        provider_data = Some(Arc::new(OciProviderData::new(client.clone()))
                            as Arc<dyn std::any::Any + Send + Sync>);
                        self.client = Some(client);
                    }
                    Err(e) => {
                        diagnostics.push(Diagnostic::error(
                            "Failed to create API client",
                            e.to_string(),
                        ));
                    }
                }
            }
            (None, _) => {
                diagnostics.push(Diagnostic::error(
                    "endpoint is required",
                    "set it in the provider config or via the OCI_ENDPOINT env var",
                ));
            }
            (_, None) => {
                diagnostics.push(Diagnostic::error(
                    "auth_token is required",
                    "set it in the provider config or via the OCI_AUTH_TOKEN env var",
                ));
            }
        }

        ConfigureProviderResponse {
            diagnostics,
            provider_data,
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert(
            "oci_core_virtual_network".to_string(),
            Box::new(|| Box::new(resources::VirtualNetworkResource::new())),
        );
        resources.insert(
            "oci_core_subnet".to_string(),
            Box::new(|| Box::new(resources::SubnetResource::new())),
        );
        resources.insert(
            "oci_core_instance".to_string(),
            Box::new(|| Box::new(resources::InstanceResource::new())),
        );
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();
        data_sources.insert(
            "oci_identity_availability_domains".to_string(),
            Box::new(|| Box::new(data_sources::AvailabilityDomainsDataSource::new())),
        );
        data_sources.insert(
            "oci_core_images".to_string(),
            Box::new(|| Box::new(data_sources::ImagesDataSource::new())),
        );
        data_sources.insert(
            "oci_core_instances".to_string(),
            Box::new(|| Box::new(data_sources::InstancesDataSource::new())),
        );
        data_sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfacc::types::{AttributePath, DynamicValue};

    fn empty_request() -> ConfigureProviderRequest {
        ConfigureProviderRequest {
            terraform_version: "test".to_string(),
            config: DynamicValue::empty_map(),
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        std::env::set_var("OCI_ENDPOINT", "https://localhost:4443");
        std::env::set_var("OCI_AUTH_TOKEN", "test-token");
        std::env::set_var("OCI_INSECURE", "true");

        let mut provider = OciProvider::new();
        let response = provider.configure(Context::new(), empty_request()).await;

        assert!(response.diagnostics.is_empty());
        assert!(response.provider_data.is_some());
        assert!(provider.client.is_some());

        std::env::remove_var("OCI_ENDPOINT");
        std::env::remove_var("OCI_AUTH_TOKEN");
        std::env::remove_var("OCI_INSECURE");
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_endpoint() {
        std::env::remove_var("OCI_ENDPOINT");
        std::env::set_var("OCI_AUTH_TOKEN", "test-token");

        let mut provider = OciProvider::new();
        let response = provider.configure(Context::new(), empty_request()).await;

        assert!(!response.diagnostics.is_empty());
        assert!(response.diagnostics[0]
            .summary
            .contains("endpoint is required"));

        std::env::remove_var("OCI_AUTH_TOKEN");
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_auth_token() {
        std::env::set_var("OCI_ENDPOINT", "https://localhost:4443");
        std::env::remove_var("OCI_AUTH_TOKEN");

        let mut provider = OciProvider::new();
        let response = provider.configure(Context::new(), empty_request()).await;

        assert!(!response.diagnostics.is_empty());
        assert!(response.diagnostics[0]
            .summary
            .contains("auth_token is required"));

        std::env::remove_var("OCI_ENDPOINT");
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_wins_over_env_vars() {
        std::env::set_var("OCI_ENDPOINT", "https://env.invalid:1");
        std::env::set_var("OCI_AUTH_TOKEN", "env-token");

        let mut config = DynamicValue::empty_map();
        config
            .set_string(
                &AttributePath::new("endpoint"),
                "https://config.localhost:4443".to_string(),
            )
            .unwrap();
        config
            .set_string(&AttributePath::new("auth_token"), "config-token".to_string())
            .unwrap();

        let mut provider = OciProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "test".to_string(),
                    config,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(provider.client.is_some());

        std::env::remove_var("OCI_ENDPOINT");
        std::env::remove_var("OCI_AUTH_TOKEN");
    }

    #[tokio::test]
    async fn provider_serves_expected_factories() {
        let provider = OciProvider::new();

        let resources = provider.resources();
        assert!(resources.contains_key("oci_core_virtual_network"));
        assert!(resources.contains_key("oci_core_subnet"));
        assert!(resources.contains_key("oci_core_instance"));

        let data_sources = provider.data_sources();
        assert!(data_sources.contains_key("oci_identity_availability_domains"));
        assert!(data_sources.contains_key("oci_core_images"));
        assert!(data_sources.contains_key("oci_core_instances"));
    }
}
