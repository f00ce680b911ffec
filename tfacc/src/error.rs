//! Error types for tfacc

/// Error type for tfacc operations
///
/// Scenario-level variants mirror the failure taxonomy of an acceptance run:
/// configuration errors abort before apply, apply/validation errors carry the
/// provider's diagnostics, and check/import failures are reported as test
/// failures without retry.
#[derive(Debug, thiserror::Error)]
pub enum TfaccError {
    #[error("attribute '{0}' not found")]
    AttributeNotFound(String),

    #[error("list index {0} out of bounds")]
    IndexOutOfBounds(usize),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("invalid path navigation: {0}")]
    InvalidPath(String),

    #[error("provider configuration failed: {0}")]
    ProviderConfigureFailed(String),

    #[error("resource type not known to provider: {0}")]
    UnknownResourceType(String),

    #[error("data source type not known to provider: {0}")]
    UnknownDataSourceType(String),

    #[error("block '{address}' references undeclared or not-yet-applied block '{reference}'")]
    DanglingReference { address: String, reference: String },

    #[error("invalid interpolation '{expression}': {reason}")]
    InvalidInterpolation { expression: String, reason: String },

    #[error("invalid duration '{0}' in timeouts block")]
    InvalidDuration(String),

    #[error("validation failed for {address}: {summary}")]
    ValidationFailed { address: String, summary: String },

    #[error("apply failed for {address}: {summary}: {detail}")]
    ApplyFailed {
        address: String,
        summary: String,
        detail: String,
    },

    #[error("import read failed for {address}: {summary}")]
    ImportReadFailed { address: String, summary: String },

    #[error("import for {address} returned no state")]
    ImportMissing { address: String },

    #[error(
        "import verification failed for {address}: attribute '{attribute}' diverged \
         (applied '{applied}', imported '{imported}')"
    )]
    ImportVerifyMismatch {
        address: String,
        attribute: String,
        applied: String,
        imported: String,
    },

    #[error("check failed: block '{address}' not found in state")]
    CheckBlockMissing { address: String },

    #[error("check failed: attribute '{attribute}' not set on {address}")]
    CheckAttrNotSet { address: String, attribute: String },

    #[error("check failed: {address}.{attribute} is '{actual}', expected '{expected}'")]
    CheckAttrMismatch {
        address: String,
        attribute: String,
        expected: String,
        actual: String,
    },

    #[error("destroy failed for {address}: {summary}")]
    DestroyFailed { address: String, summary: String },

    #[error("resource {address} still exists after destroy")]
    ResourceStillExists { address: String },
}

/// Result type alias for tfacc operations
pub type Result<T> = std::result::Result<T, TfaccError>;
