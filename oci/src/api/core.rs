//! Core service operations: virtual networks, subnets, images and instances

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::client::Client;
use super::common::QueryParams;
use super::error::ApiError;

pub struct CoreApi<'a> {
    client: &'a Client,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vcn {
    pub id: String,
    pub cidr_block: String,
    pub compartment_id: String,
    pub display_name: Option<String>,
    pub lifecycle_state: String,
    pub default_route_table_id: String,
    pub default_security_list_id: String,
    pub default_dhcp_options_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVcnDetails {
    pub cidr_block: String,
    pub compartment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub id: String,
    pub availability_domain: String,
    pub cidr_block: String,
    pub compartment_id: String,
    pub vcn_id: String,
    pub display_name: Option<String>,
    pub lifecycle_state: String,
    pub route_table_id: String,
    pub security_list_ids: Vec<String>,
    pub dhcp_options_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubnetDetails {
    pub availability_domain: String,
    pub cidr_block: String,
    pub compartment_id: String,
    pub vcn_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_table_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_list_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_options_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub display_name: String,
    pub operating_system: String,
    pub operating_system_version: String,
    pub lifecycle_state: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListImagesFilter {
    pub compartment_id: String,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub availability_domain: String,
    pub compartment_id: String,
    pub display_name: Option<String>,
    pub image_id: String,
    pub shape: String,
    pub region: String,
    pub lifecycle_state: String,
    pub ipxe_script: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchInstanceDetails {
    pub availability_domain: String,
    pub compartment_id: String,
    pub image_id: String,
    pub shape: String,
    pub subnet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipxe_script: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListInstancesFilter {
    pub compartment_id: String,
    pub availability_domain: Option<String>,
    pub limit: Option<u32>,
}

impl<'a> CoreApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create_vcn(&self, details: &CreateVcnDetails) -> Result<Vcn, ApiError> {
        self.client.post("/20160918/vcns", details).await
    }

    pub async fn get_vcn(&self, id: &str) -> Result<Vcn, ApiError> {
        self.client.get(&format!("/20160918/vcns/{id}")).await
    }

    pub async fn delete_vcn(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/20160918/vcns/{id}")).await
    }

    pub async fn create_subnet(&self, details: &CreateSubnetDetails) -> Result<Subnet, ApiError> {
        self.client.post("/20160918/subnets", details).await
    }

    pub async fn get_subnet(&self, id: &str) -> Result<Subnet, ApiError> {
        self.client.get(&format!("/20160918/subnets/{id}")).await
    }

    pub async fn delete_subnet(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("/20160918/subnets/{id}")).await
    }

    pub async fn list_images(&self, filter: &ListImagesFilter) -> Result<Vec<Image>, ApiError> {
        let path = format!(
            "/20160918/images{}",
            QueryParams::new()
                .add("compartmentId", &filter.compartment_id)
                .add_optional("operatingSystem", filter.operating_system.as_ref())
                .add_optional(
                    "operatingSystemVersion",
                    filter.operating_system_version.as_ref()
                )
                .add_optional("limit", filter.limit)
                .to_query_string()
        );
        self.client.get(&path).await
    }

    pub async fn launch_instance(
        &self,
        details: &LaunchInstanceDetails,
    ) -> Result<Instance, ApiError> {
        self.client.post("/20160918/instances", details).await
    }

    pub async fn get_instance(&self, id: &str) -> Result<Instance, ApiError> {
        self.client.get(&format!("/20160918/instances/{id}")).await
    }

    /// Terminate an instance. The control plane accepts the request and
    /// completes the termination asynchronously.
    pub async fn terminate_instance(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/20160918/instances/{id}"))
            .await
    }

    pub async fn list_instances(
        &self,
        filter: &ListInstancesFilter,
    ) -> Result<Vec<Instance>, ApiError> {
        let path = format!(
            "/20160918/instances{}",
            QueryParams::new()
                .add("compartmentId", &filter.compartment_id)
                .add_optional("availabilityDomain", filter.availability_domain.as_ref())
                .add_optional("limit", filter.limit)
                .to_query_string()
        );
        self.client.get(&path).await
    }
}
