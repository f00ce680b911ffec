//! Common wire types and helpers shared by the service APIs

use serde::Deserialize;

/// Error body the control plane returns alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Query string builder with deterministic parameter order
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_is_ordered_and_encoded() {
        let params = QueryParams::new()
            .add("compartmentId", "ocid1.compartment.oc1..test")
            .add("availabilityDomain", "Uocm:PHX-AD-1")
            .add_optional("limit", Some(1u32))
            .add_optional("page", None::<u32>);

        assert_eq!(
            params.to_query_string(),
            "?compartmentId=ocid1.compartment.oc1..test&availabilityDomain=Uocm%3APHX-AD-1&limit=1"
        );
    }

    #[test]
    fn empty_params_render_no_query() {
        assert_eq!(QueryParams::new().to_query_string(), "");
    }
}
