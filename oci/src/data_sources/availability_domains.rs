//! oci_identity_availability_domains data source

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

use crate::api::Client;
use crate::attr;
use crate::provider_data::OciProviderData;

pub struct AvailabilityDomainsDataSource {
    client: Option<Arc<Client>>,
}

impl Default for AvailabilityDomainsDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityDomainsDataSource {
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Availability domains visible in a compartment")
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
                AttributeBuilder::new(
                    "availability_domains",
                    AttributeType::List(Box::new(AttributeType::Map(Box::new(
                        AttributeType::String,
                    )))),
                )
                .computed()
                .build(),
            )
            .build()
    }
}

#[async_trait]
impl DataSource for AvailabilityDomainsDataSource {
    fn type_name(&self) -> &str {
        "oci_identity_availability_domains"
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

        let compartment_id = match attr::required_string(&request.config, "compartment_id") {
            Ok(id) => id,
            Err(diagnostic) => return failure(diagnostic),
        };

        let domains = match client
            .identity()
            .list_availability_domains(&compartment_id)
            .await
        {
            Ok(domains) => domains,
            Err(e) => {
                return failure(Diagnostic::error(
                    "Failed to list availability domains",
                    e.to_string(),
                ))
            }
        };

        let rows: Vec<Dynamic> = domains
            .iter()
            .map(|domain| {
                Dynamic::Map(HashMap::from([
                    ("name".to_string(), Dynamic::from(domain.name.clone())),
                    (
                        "compartment_id".to_string(),
                        Dynamic::from(domain.compartment_id.clone()),
                    ),
                ]))
            })
            .collect();

        let state = DynamicValue::new(Dynamic::Map(HashMap::from([
            (
                "id".to_string(),
                Dynamic::from(format!(
                    "oci_identity_availability_domains:{compartment_id}"
                )),
            ),
            (
                "compartment_id".to_string(),
                Dynamic::from(compartment_id),
            ),
            ("availability_domains".to_string(), Dynamic::List(rows)),
        ])));

        ReadDataSourceResponse {
            state,
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for AvailabilityDomainsDataSource {
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
        "oci_identity_availability_domains requires a configured provider",
    )
}
