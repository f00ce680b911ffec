//! Managed resources served by the provider

pub mod instance;
pub mod subnet;
pub mod virtual_network;

pub use instance::InstanceResource;
pub use subnet::SubnetResource;
pub use virtual_network::VirtualNetworkResource;

use std::time::Duration;

/// Interval between lifecycle state polls while waiting for a resource to
/// settle after create
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(500);
