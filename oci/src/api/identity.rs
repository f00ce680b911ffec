//! Identity service operations

use serde::Deserialize;

use super::client::Client;
use super::common::QueryParams;
use super::error::ApiError;

pub struct IdentityApi<'a> {
    client: &'a Client,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDomain {
    pub name: String,
    pub compartment_id: String,
}

impl<'a> IdentityApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the availability domains visible in a compartment
    pub async fn list_availability_domains(
        &self,
        compartment_id: &str,
    ) -> Result<Vec<AvailabilityDomain>, ApiError> {
        let path = format!(
            "/20160918/availabilityDomains{}",
            QueryParams::new()
                .add("compartmentId", compartment_id)
                .to_query_string()
        );
        self.client.get(&path).await
    }
}
