//! oci_core_instance resource
//!
//! Launch waits for the instance to reach RUNNING, honoring the deadline of
//! the calling context. Terminate is fire-and-forget: the control plane
//! finishes the termination asynchronously and a later read reports the
//! instance as gone once it is TERMINATED.

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

use crate::api::core::{Instance, LaunchInstanceDetails};
use crate::api::Client;
use crate::attr;
use crate::provider_data::OciProviderData;

pub struct InstanceResource {
    client: Option<Arc<Client>>,
}

impl Default for InstanceResource {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceResource {
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Compute instance")
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
                AttributeBuilder::new("compartment_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("image", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("shape", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("subnet_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("display_name", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "metadata",
                    AttributeType::Map(Box::new(AttributeType::String)),
                )
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new("ipxe_script", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("region", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("state", AttributeType::String)
                    .computed()
                    .build(),
            )
            .build()
    }

    fn state_from(instance: &Instance) -> DynamicValue {
        let mut entries = HashMap::from([
            ("id".to_string(), Dynamic::from(instance.id.clone())),
            (
                "availability_domain".to_string(),
                Dynamic::from(instance.availability_domain.clone()),
            ),
            (
                "compartment_id".to_string(),
                Dynamic::from(instance.compartment_id.clone()),
            ),
            ("image".to_string(), Dynamic::from(instance.image_id.clone())),
            ("shape".to_string(), Dynamic::from(instance.shape.clone())),
            ("region".to_string(), Dynamic::from(instance.region.clone())),
            (
                "state".to_string(),
                Dynamic::from(instance.lifecycle_state.clone()),
            ),
            (
                "metadata".to_string(),
                Dynamic::Map(
                    instance
                        .metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), Dynamic::from(v.clone())))
                        .collect(),
                ),
            ),
        ]);
        if let Some(name) = &instance.display_name {
            entries.insert("display_name".to_string(), Dynamic::from(name.clone()));
        }
        if let Some(script) = &instance.ipxe_script {
            entries.insert("ipxe_script".to_string(), Dynamic::from(script.clone()));
        }
        DynamicValue::new(Dynamic::Map(entries))
    }
}

#[async_trait]
impl Resource for InstanceResource {
    fn type_name(&self) -> &str {
        "oci_core_instance"
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
            shape = details.shape.as_str(),
            availability_domain = details.availability_domain.as_str(),
            "launching instance"
        );
        let mut instance = match client.core().launch_instance(&details).await {
            Ok(instance) => instance,
            Err(e) => {
                return failure(Diagnostic::error(
                    "Failed to launch instance",
                    e.to_string(),
                ))
            }
        };

        while instance.lifecycle_state != "RUNNING" {
            if matches!(
                instance.lifecycle_state.as_str(),
                "TERMINATING" | "TERMINATED"
            ) {
                return failure(Diagnostic::error(
                    "Instance entered a terminal state during launch",
                    format!(
                        "instance {} is {} instead of RUNNING",
                        instance.id, instance.lifecycle_state
                    ),
                ));
            }
            if ctx.is_cancelled() {
                return failure(Diagnostic::error(
                    "Timed out launching instance",
                    format!("instance {} did not reach RUNNING in time", instance.id),
                ));
            }
            tokio::time::sleep(super::POLL_INTERVAL).await;
            instance = match client.core().get_instance(&instance.id).await {
                Ok(instance) => instance,
                Err(e) => {
                    return failure(Diagnostic::error(
                        "Failed to poll instance state",
                        e.to_string(),
                    ))
                }
            };
        }

        CreateResourceResponse {
            new_state: Self::state_from(&instance),
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

        match client.core().get_instance(&id).await {
            Ok(instance) if instance.lifecycle_state == "TERMINATED" => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Ok(instance) => ReadResourceResponse {
                new_state: Some(Self::state_from(&instance)),
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![Diagnostic::error("Failed to read instance", e.to_string())],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.prior_state,
            diagnostics: vec![Diagnostic::error(
                "Update not supported",
                "oci_core_instance must be replaced to change its configuration",
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

        tracing::info!(id = id.as_str(), "terminating instance");
        match client.core().terminate_instance(&id).await {
            Ok(()) => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) if e.is_not_found() => DeleteResourceResponse {
                diagnostics: vec![],
            },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to terminate instance",
                    e.to_string(),
                )],
            },
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for InstanceResource {
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
        "oci_core_instance requires a configured provider",
    )
}

fn parse_details(config: &DynamicValue) -> Result<LaunchInstanceDetails, Diagnostic> {
    Ok(LaunchInstanceDetails {
        availability_domain: attr::required_string(config, "availability_domain")?,
        compartment_id: attr::required_string(config, "compartment_id")?,
        image_id: attr::required_string(config, "image")?,
        shape: attr::required_string(config, "shape")?,
        subnet_id: attr::required_string(config, "subnet_id")?,
        display_name: attr::optional_string(config, "display_name")?,
        ipxe_script: attr::optional_string(config, "ipxe_script")?,
        metadata: attr::string_map(config, "metadata")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn instance_body(lifecycle_state: &str) -> serde_json::Value {
        json!({
            "id": "ocid1.instance.oc1.phx.a",
            "availabilityDomain": "Uocm:PHX-AD-1",
            "compartmentId": "ocid1.compartment.oc1..test",
            "imageId": "ocid1.image.oc1.phx.a",
            "shape": "VM.Standard1.1",
            "region": "phx",
            "lifecycleState": lifecycle_state
        })
    }

    fn launch_config() -> DynamicValue {
        DynamicValue::new(Dynamic::Map(HashMap::from([
            (
                "availability_domain".to_string(),
                Dynamic::from("Uocm:PHX-AD-1"),
            ),
            (
                "compartment_id".to_string(),
                Dynamic::from("ocid1.compartment.oc1..test"),
            ),
            ("image".to_string(), Dynamic::from("ocid1.image.oc1.phx.a")),
            ("shape".to_string(), Dynamic::from("VM.Standard1.1")),
            (
                "subnet_id".to_string(),
                Dynamic::from("ocid1.subnet.oc1.phx.a"),
            ),
        ])))
    }

    async fn configured_resource(url: &str) -> InstanceResource {
        let client = Client::new(url, "test-token", false).unwrap();
        let mut resource = InstanceResource::new();
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(OciProviderData::new(client))
                        as Arc<dyn std::any::Any + Send + Sync>),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        resource
    }

    #[tokio::test]
    async fn create_waits_for_running() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/20160918/instances")
            .with_status(200)
            .with_body(instance_body("PROVISIONING").to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/20160918/instances/ocid1.instance.oc1.phx.a")
            .with_status(200)
            .with_body(instance_body("RUNNING").to_string())
            .create_async()
            .await;

        let resource = configured_resource(&server.url()).await;
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "oci_core_instance".to_string(),
                    config: launch_config(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("state"))
                .unwrap(),
            "RUNNING"
        );
    }

    #[tokio::test]
    async fn create_fails_when_the_deadline_passes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/20160918/instances")
            .with_status(200)
            .with_body(instance_body("PROVISIONING").to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/20160918/instances/ocid1.instance.oc1.phx.a")
            .with_status(200)
            .with_body(instance_body("PROVISIONING").to_string())
            .create_async()
            .await;

        let resource = configured_resource(&server.url()).await;
        let response = resource
            .create(
                Context::new().with_timeout(Duration::from_millis(100)),
                CreateResourceRequest {
                    type_name: "oci_core_instance".to_string(),
                    config: launch_config(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .summary
            .contains("Timed out launching instance"));
    }

    #[tokio::test]
    async fn read_reports_terminated_instances_as_gone() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/20160918/instances/ocid1.instance.oc1.phx.a")
            .with_status(200)
            .with_body(instance_body("TERMINATED").to_string())
            .create_async()
            .await;

        let resource = configured_resource(&server.url()).await;
        let mut current_state = DynamicValue::empty_map();
        current_state
            .set_string(
                &AttributePath::new("id"),
                "ocid1.instance.oc1.phx.a".to_string(),
            )
            .unwrap();

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "oci_core_instance".to_string(),
                    current_state,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.new_state.is_none());
    }
}
