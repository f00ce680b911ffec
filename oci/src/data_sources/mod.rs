//! Read-only data sources served by the provider
//!
//! Data sources have no server-side identity, so each one derives a
//! deterministic id from its filters. Re-reading with the same filters
//! yields the same id, which keeps repeated reads comparable.

pub mod availability_domains;
pub mod images;
pub mod instances;

pub use availability_domains::AvailabilityDomainsDataSource;
pub use images::ImagesDataSource;
pub use instances::InstancesDataSource;
