//! oci_core_virtual_network resource

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfacc::context::Context;
use tfacc::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceSchemaRequest, ResourceSchemaResponse,
    ResourceWithConfigure, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfacc::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfacc::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::core::{CreateVcnDetails, Vcn};
use crate::api::Client;
use crate::attr;
use crate::provider_data::OciProviderData;

pub struct VirtualNetworkResource {
    client: Option<Arc<Client>>,
}

impl Default for VirtualNetworkResource {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualNetworkResource {
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Virtual cloud network")
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
                AttributeBuilder::new("compartment_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("display_name", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("state", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("default_route_table_id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("default_security_list_id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("default_dhcp_options_id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .build()
    }

    fn state_from(vcn: &Vcn) -> DynamicValue {
        let mut entries = HashMap::from([
            ("id".to_string(), Dynamic::from(vcn.id.clone())),
            (
                "cidr_block".to_string(),
                Dynamic::from(vcn.cidr_block.clone()),
            ),
            (
                "compartment_id".to_string(),
                Dynamic::from(vcn.compartment_id.clone()),
            ),
            (
                "state".to_string(),
                Dynamic::from(vcn.lifecycle_state.clone()),
            ),
            (
                "default_route_table_id".to_string(),
                Dynamic::from(vcn.default_route_table_id.clone()),
            ),
            (
                "default_security_list_id".to_string(),
                Dynamic::from(vcn.default_security_list_id.clone()),
            ),
            (
                "default_dhcp_options_id".to_string(),
                Dynamic::from(vcn.default_dhcp_options_id.clone()),
            ),
        ]);
        if let Some(name) = &vcn.display_name {
            entries.insert("display_name".to_string(), Dynamic::from(name.clone()));
        }
        DynamicValue::new(Dynamic::Map(entries))
    }
}

#[async_trait]
impl Resource for VirtualNetworkResource {
    fn type_name(&self) -> &str {
        "oci_core_virtual_network"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: Self::schema_static().validate_config(&request.config),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let failure = |diagnostic| CreateResourceResponse {
            new_state: DynamicValue::null(),
            diagnostics: vec![diagnostic],
        };

        let Some(client) = self.client.as_deref() else {
            return failure(not_configured());
        };

        let details = match parse_details(&request.config) {
            Ok(details) => details,
            Err(diagnostic) => return failure(diagnostic),
        };

        tracing::info!(
            cidr_block = details.cidr_block.as_str(),
            "creating virtual network"
        );
        let mut vcn = match client.core().create_vcn(&details).await {
            Ok(vcn) => vcn,
            Err(e) => return failure(Diagnostic::error("Failed to create VCN", e.to_string())),
        };

        while vcn.lifecycle_state != "AVAILABLE" {
            if ctx.is_cancelled() {
                return failure(Diagnostic::error(
                    "Timed out creating VCN",
                    format!("VCN {} did not become AVAILABLE in time", vcn.id),
                ));
            }
            tokio::time::sleep(super::POLL_INTERVAL).await;
            vcn = match client.core().get_vcn(&vcn.id).await {
                Ok(vcn) => vcn,
                Err(e) => {
                    return failure(Diagnostic::error(
                        "Failed to poll VCN state",
                        e.to_string(),
                    ))
                }
            };
        }

        CreateResourceResponse {
            new_state: Self::state_from(&vcn),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let Some(client) = self.client.as_deref() else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics: vec![not_configured()],
            };
        };

        let id = match request.current_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![Diagnostic::error("Invalid state", e.to_string())],
                }
            }
        };

        match client.core().get_vcn(&id).await {
            Ok(vcn) if vcn.lifecycle_state == "TERMINATED" => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Ok(vcn) => ReadResourceResponse {
                new_state: Some(Self::state_from(&vcn)),
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![Diagnostic::error("Failed to read VCN", e.to_string())],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.prior_state,
            diagnostics: vec![Diagnostic::error(
                "Update not supported",
                "oci_core_virtual_network must be replaced to change its configuration",
            )],
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let Some(client) = self.client.as_deref() else {
            return DeleteResourceResponse {
                diagnostics: vec![not_configured()],
            };
        };

        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return DeleteResourceResponse {
                    diagnostics: vec![Diagnostic::error("Invalid state", e.to_string())],
                }
            }
        };

        tracing::info!(id = id.as_str(), "deleting virtual network");
        match client.core().delete_vcn(&id).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![Diagnostic::error("Failed to delete VCN", e.to_string())],
            },
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for VirtualNetworkResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let diagnostics = match request
            .provider_data
            .and_then(|data| data.downcast::<OciProviderData>().ok())
        {
            Some(data) => {
                self.client = Some(data.client.clone());
                vec![]
            }
            None => vec![not_configured()],
        };
        ConfigureResourceResponse { diagnostics }
    }
}

fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "oci_core_virtual_network requires a configured provider",
    )
}

fn parse_details(config: &DynamicValue) -> Result<CreateVcnDetails, Diagnostic> {
    Ok(CreateVcnDetails {
        cidr_block: attr::required_string(config, "cidr_block")?,
        compartment_id: attr::required_string(config, "compartment_id")?,
        display_name: attr::optional_string(config, "display_name")?,
    })
}
