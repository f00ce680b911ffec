//! oci_core_instances data source
//!
//! Each returned row renders the instance metadata as a canonical JSON
//! string, so the whole row flattens to scalar attributes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfacc::context::Context;
use tfacc::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfacc::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfacc::types::{Diagnostic, Dynamic, DynamicValue};

use crate::api::core::{Instance, ListInstancesFilter};
use crate::api::Client;
use crate::attr;
use crate::provider_data::OciProviderData;

pub struct InstancesDataSource {
    client: Option<Arc<Client>>,
}

impl Default for InstancesDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InstancesDataSource {
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Compute instances in a compartment")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("compartment_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("availability_domain", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("limit", AttributeType::Number)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "instances",
                    AttributeType::List(Box::new(AttributeType::Map(Box::new(
                        AttributeType::String,
                    )))),
                )
                .computed()
                .build(),
            )
            .build()
    }

    fn row_from(instance: &Instance) -> Dynamic {
        let mut row = HashMap::from([
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
                // BTreeMap keys serialize in sorted order, so the rendering
                // is stable across reads
                Dynamic::from(serde_json::to_string(&instance.metadata).unwrap_or_default()),
            ),
        ]);
        if let Some(name) = &instance.display_name {
            row.insert("display_name".to_string(), Dynamic::from(name.clone()));
        }
        if let Some(script) = &instance.ipxe_script {
            row.insert("ipxe_script".to_string(), Dynamic::from(script.clone()));
        }
        Dynamic::Map(row)
    }
}

fn parse_filter(config: &DynamicValue) -> Result<ListInstancesFilter, Diagnostic> {
    Ok(ListInstancesFilter {
        compartment_id: attr::required_string(config, "compartment_id")?,
        availability_domain: attr::optional_string(config, "availability_domain")?,
        limit: attr::optional_u32(config, "limit")?,
    })
}

#[async_trait]
impl DataSource for InstancesDataSource {
    fn type_name(&self) -> &str {
        "oci_core_instances"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: Self::schema_static(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: Self::schema_static().validate_config(&request.config),
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let failure = |diagnostic| ReadDataSourceResponse {
            state: DynamicValue::null(),
            diagnostics: vec![diagnostic],
        };

        let Some(client) = self.client.as_deref() else {
            return failure(not_configured());
        };

        let filter = match parse_filter(&request.config) {
            Ok(filter) => filter,
            Err(diagnostic) => return failure(diagnostic),
        };

        let instances = match client.core().list_instances(&filter).await {
            Ok(instances) => instances,
            Err(e) => {
                return failure(Diagnostic::error(
                    "Failed to list instances",
                    e.to_string(),
                ))
            }
        };

        let rows: Vec<Dynamic> = instances.iter().map(Self::row_from).collect();

        let mut entries = HashMap::from([
            (
                "id".to_string(),
                Dynamic::from(format!("oci_core_instances:{}", filter.compartment_id)),
            ),
            (
                "compartment_id".to_string(),
                Dynamic::from(filter.compartment_id.clone()),
            ),
            ("instances".to_string(), Dynamic::List(rows)),
        ]);
        if let Some(domain) = &filter.availability_domain {
            entries.insert(
                "availability_domain".to_string(),
                Dynamic::from(domain.clone()),
            );
        }
        if let Some(limit) = filter.limit {
            entries.insert("limit".to_string(), Dynamic::from(limit as i64));
        }

        ReadDataSourceResponse {
            state: DynamicValue::new(Dynamic::Map(entries)),
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for InstancesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
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
        ConfigureDataSourceResponse { diagnostics }
    }
}

fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "oci_core_instances requires a configured provider",
    )
}
