//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct OciProviderData {
    pub client: Arc<Client>,
}

impl OciProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
