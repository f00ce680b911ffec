//! Acceptance scenario harness
//!
//! A [`TestCase`] is a sequence of [`TestStep`]s run against one configured
//! provider. Each step applies its configuration in declaration order,
//! optionally re-reads every applied block and verifies the imported state,
//! runs its checks, and tears everything down in reverse order.

mod check;
mod config;
mod engine;
mod interpolate;
mod state;

pub use check::{check_attr, check_attr_set, Check};
pub use config::{Block, BlockBuilder, BlockKind, ConfigBuilder, ScenarioConfig};
pub use engine::run;
pub use state::{BlockState, RunState};

use crate::error::{Result, TfaccError};
use std::time::Duration;

/// One apply/verify/assert/teardown cycle
pub struct TestStep {
    pub config: ScenarioConfig,
    pub checks: Vec<Check>,
    /// Re-read every applied block after apply
    pub import_state: bool,
    /// Require the re-read state to match the applied state exactly
    pub import_state_verify: bool,
}

impl TestStep {
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            checks: Vec::new(),
            import_state: false,
            import_state_verify: false,
        }
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn import_state(mut self, verify: bool) -> Self {
        self.import_state = true;
        self.import_state_verify = verify;
        self
    }
}

/// A full acceptance scenario
pub struct TestCase {
    pub steps: Vec<TestStep>,
    /// Skip the post-destroy existence refresh during teardown
    pub prevent_post_destroy_refresh: bool,
}

impl TestCase {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            prevent_post_destroy_refresh: false,
        }
    }

    pub fn step(mut self, step: TestStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn prevent_post_destroy_refresh(mut self) -> Self {
        self.prevent_post_destroy_refresh = true;
        self
    }
}

impl Default for TestCase {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a duration literal like `"15m"`, `"30s"`, `"500ms"` or `"1h"`
pub(crate) fn parse_duration(spec: &str) -> Result<Duration> {
    let spec = spec.trim();
    let split = spec
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| TfaccError::InvalidDuration(spec.to_string()))?;
    let (digits, unit) = spec.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| TfaccError::InvalidDuration(spec.to_string()))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 3600)),
        _ => Err(TfaccError::InvalidDuration(spec.to_string())),
    }
}
