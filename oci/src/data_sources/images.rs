//! oci_core_images data source

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

use crate::api::core::ListImagesFilter;
use crate::api::Client;
use crate::attr;
use crate::provider_data::OciProviderData;

pub struct ImagesDataSource {
    client: Option<Arc<Client>>,
}

impl Default for ImagesDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagesDataSource {
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Platform and custom images available in a compartment")
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
                AttributeBuilder::new("operating_system", AttributeType::String)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("operating_system_version", AttributeType::String)
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
                    "images",
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

fn parse_filter(config: &DynamicValue) -> Result<ListImagesFilter, Diagnostic> {
    Ok(ListImagesFilter {
        compartment_id: attr::required_string(config, "compartment_id")?,
        operating_system: attr::optional_string(config, "operating_system")?,
        operating_system_version: attr::optional_string(config, "operating_system_version")?,
        limit: attr::optional_u32(config, "limit")?,
    })
}

#[async_trait]
impl DataSource for ImagesDataSource {
    fn type_name(&self) -> &str {
        "oci_core_images"
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

        let images = match client.core().list_images(&filter).await {
            Ok(images) => images,
            Err(e) => return failure(Diagnostic::error("Failed to list images", e.to_string())),
        };

        let rows: Vec<Dynamic> = images
            .iter()
            .map(|image| {
                Dynamic::Map(HashMap::from([
                    ("id".to_string(), Dynamic::from(image.id.clone())),
                    (
                        "display_name".to_string(),
                        Dynamic::from(image.display_name.clone()),
                    ),
                    (
                        "operating_system".to_string(),
                        Dynamic::from(image.operating_system.clone()),
                    ),
                    (
                        "operating_system_version".to_string(),
                        Dynamic::from(image.operating_system_version.clone()),
                    ),
                    (
                        "state".to_string(),
                        Dynamic::from(image.lifecycle_state.clone()),
                    ),
                ]))
            })
            .collect();

        let mut entries = HashMap::from([
            (
                "id".to_string(),
                Dynamic::from(format!(
                    "oci_core_images:{}:{}:{}",
                    filter.compartment_id,
                    filter.operating_system.as_deref().unwrap_or(""),
                    filter.operating_system_version.as_deref().unwrap_or("")
                )),
            ),
            (
                "compartment_id".to_string(),
                Dynamic::from(filter.compartment_id.clone()),
            ),
            ("images".to_string(), Dynamic::List(rows)),
        ]);
        if let Some(os) = &filter.operating_system {
            entries.insert("operating_system".to_string(), Dynamic::from(os.clone()));
        }
        if let Some(version) = &filter.operating_system_version {
            entries.insert(
                "operating_system_version".to_string(),
                Dynamic::from(version.clone()),
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
impl DataSourceWithConfigure for ImagesDataSource {
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
        "oci_core_images requires a configured provider",
    )
}
