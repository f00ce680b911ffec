//! oci_core_subnet resource

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

use crate::api::core::{CreateSubnetDetails, Subnet};
use crate::api::Client;
use crate::attr;
use crate::provider_data::OciProviderData;

pub struct SubnetResource {
    client: Option<Arc<Client>>,
}

impl Default for SubnetResource {
    fn default() -> Self {
        Self::new()
    }
}

impl SubnetResource {
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Subnet within a virtual cloud network")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("availability_domain", AttributeType::String)
                    .required()
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
                AttributeBuilder::new("vcn_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("display_name", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("route_table_id", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "security_list_ids",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new("dhcp_options_id", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("state", AttributeType::String)
                    .computed()
                    .build(),
            )
            .build()
    }

    fn state_from(subnet: &Subnet) -> DynamicValue {
        let mut entries = HashMap::from([
            ("id".to_string(), Dynamic::from(subnet.id.clone())),
            (
                "availability_domain".to_string(),
                Dynamic::from(subnet.availability_domain.clone()),
            ),
            (
                "cidr_block".to_string(),
                Dynamic::from(subnet.cidr_block.clone()),
            ),
            (
                "compartment_id".to_string(),
                Dynamic::from(subnet.compartment_id.clone()),
            ),
            ("vcn_id".to_string(), Dynamic::from(subnet.vcn_id.clone())),
            (
                "state".to_string(),
                Dynamic::from(subnet.lifecycle_state.clone()),
            ),
            (
                "route_table_id".to_string(),
                Dynamic::from(subnet.route_table_id.clone()),
            ),
            (
                "security_list_ids".to_string(),
                Dynamic::List(
                    subnet
                        .security_list_ids
                        .iter()
                        .cloned()
                        .map(Dynamic::from)
                        .collect(),
                ),
            ),
            (
                "dhcp_options_id".to_string(),
                Dynamic::from(subnet.dhcp_options_id.clone()),
            ),
        ]);
        if let Some(name) = &subnet.display_name {
            entries.insert("display_name".to_string(), Dynamic::from(name.clone()));
        }
        DynamicValue::new(Dynamic::Map(entries))
    }
}

#[async_trait]
impl Resource for SubnetResource {
    fn type_name(&self) -> &str {
        "oci_core_subnet"
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
            vcn_id = details.vcn_id.as_str(),
            "creating subnet"
        );
        let mut subnet = match client.core().create_subnet(&details).await {
            Ok(subnet) => subnet,
            Err(e) => return failure(Diagnostic::error("Failed to create subnet", e.to_string())),
        };

        while subnet.lifecycle_state != "AVAILABLE" {
            if ctx.is_cancelled() {
                return failure(Diagnostic::error(
                    "Timed out creating subnet",
                    format!("subnet {} did not become AVAILABLE in time", subnet.id),
                ));
            }
            tokio::time::sleep(super::POLL_INTERVAL).await;
            subnet = match client.core().get_subnet(&subnet.id).await {
                Ok(subnet) => subnet,
                Err(e) => {
                    return failure(Diagnostic::error(
                        "Failed to poll subnet state",
                        e.to_string(),
                    ))
                }
            };
        }

        CreateResourceResponse {
            new_state: Self::state_from(&subnet),
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

        match client.core().get_subnet(&id).await {
            Ok(subnet) if subnet.lifecycle_state == "TERMINATED" => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Ok(subnet) => ReadResourceResponse {
                new_state: Some(Self::state_from(&subnet)),
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![Diagnostic::error("Failed to read subnet", e.to_string())],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.prior_state,
            diagnostics: vec![Diagnostic::error(
                "Update not supported",
                "oci_core_subnet must be replaced to change its configuration",
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

        tracing::info!(id = id.as_str(), "deleting subnet");
        match client.core().delete_subnet(&id).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![Diagnostic::error("Failed to delete subnet", e.to_string())],
            },
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for SubnetResource {
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
        "oci_core_subnet requires a configured provider",
    )
}

fn parse_details(config: &DynamicValue) -> Result<CreateSubnetDetails, Diagnostic> {
    Ok(CreateSubnetDetails {
        availability_domain: attr::required_string(config, "availability_domain")?,
        cidr_block: attr::required_string(config, "cidr_block")?,
        compartment_id: attr::required_string(config, "compartment_id")?,
        vcn_id: attr::required_string(config, "vcn_id")?,
        display_name: attr::optional_string(config, "display_name")?,
        route_table_id: attr::optional_string(config, "route_table_id")?,
        security_list_ids: attr::string_list(config, "security_list_ids")?,
        dhcp_options_id: attr::optional_string(config, "dhcp_options_id")?,
    })
}
