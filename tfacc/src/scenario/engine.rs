//! The scenario runner: apply, import/verify, assert, teardown
//!
//! The run is strictly linear. Blocks apply in declaration order, the first
//! failing diagnostic or check halts the scenario, and applied resources are
//! destroyed in reverse order no matter how the scenario ended. There is no
//! retry and no partial-success reporting: acceptance runs create real
//! infrastructure, so a failed step must surface immediately.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::{Result, TfaccError};
use crate::provider::{ConfigureProviderRequest, DataSourceFactory, Provider, ResourceFactory};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest,
    ValidateResourceConfigRequest,
};
use crate::scenario::config::{Block, BlockKind};
use crate::scenario::interpolate;
use crate::scenario::state::{BlockState, RunState};
use crate::scenario::{parse_duration, TestCase, TestStep};
use crate::types::{first_error, Diagnostic, Dynamic, DynamicValue};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

type ProviderData = Option<Arc<dyn Any + Send + Sync>>;

/// A block applied by the current step, with the live handle needed to
/// re-read it for import verification and to tear it down
enum Applied {
    Resource {
        address: String,
        type_name: String,
        resource: Box<dyn crate::resource::ResourceWithConfigure>,
        state: DynamicValue,
    },
    Data {
        address: String,
        type_name: String,
        data_source: Box<dyn crate::data_source::DataSourceWithConfigure>,
        config: DynamicValue,
        state: DynamicValue,
    },
}

/// Run a test case against a provider.
///
/// The provider is configured once; its provider data is injected into every
/// block the steps apply. Any error halts the run, after tearing down what
/// the current step had applied.
pub async fn run(
    provider: &mut dyn Provider,
    provider_config: DynamicValue,
    case: TestCase,
) -> Result<()> {
    tracing::info!(
        provider = provider.type_name(),
        steps = case.steps.len(),
        "starting acceptance scenario"
    );

    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: env!("CARGO_PKG_VERSION").to_string(),
                config: provider_config,
            },
        )
        .await;
    if let Some(diag) = first_error(&response.diagnostics) {
        return Err(TfaccError::ProviderConfigureFailed(diag.summary.clone()));
    }

    let provider_data = response.provider_data;
    let resources = provider.resources();
    let data_sources = provider.data_sources();

    for (index, step) in case.steps.iter().enumerate() {
        tracing::info!(
            step = index,
            blocks = step.config.blocks.len(),
            "running step"
        );
        run_step(
            &resources,
            &data_sources,
            &provider_data,
            step,
            case.prevent_post_destroy_refresh,
        )
        .await?;
    }

    Ok(())
}

async fn run_step(
    resources: &HashMap<String, ResourceFactory>,
    data_sources: &HashMap<String, DataSourceFactory>,
    provider_data: &ProviderData,
    step: &TestStep,
    prevent_post_destroy_refresh: bool,
) -> Result<()> {
    let mut state = RunState::new();
    let mut applied = Vec::new();

    let outcome = apply_and_check(
        resources,
        data_sources,
        provider_data,
        step,
        &mut state,
        &mut applied,
    )
    .await;

    // Teardown runs unconditionally; an apply or check failure wins over a
    // teardown failure when both happen.
    let teardown = destroy(applied, prevent_post_destroy_refresh).await;
    outcome?;
    teardown
}

async fn apply_and_check(
    resources: &HashMap<String, ResourceFactory>,
    data_sources: &HashMap<String, DataSourceFactory>,
    provider_data: &ProviderData,
    step: &TestStep,
    state: &mut RunState,
    applied: &mut Vec<Applied>,
) -> Result<()> {
    for block in &step.config.blocks {
        apply_block(
            resources,
            data_sources,
            provider_data,
            block,
            &step.config.variables,
            state,
            applied,
        )
        .await?;
    }

    if step.import_state {
        import_and_verify(applied, step.import_state_verify).await?;
    }

    for check in &step.checks {
        check(state)?;
    }

    Ok(())
}

async fn apply_block(
    resources: &HashMap<String, ResourceFactory>,
    data_sources: &HashMap<String, DataSourceFactory>,
    provider_data: &ProviderData,
    block: &Block,
    variables: &HashMap<String, Dynamic>,
    state: &mut RunState,
    applied: &mut Vec<Applied>,
) -> Result<()> {
    let address = block.address();

    // Interpolation failures (dangling or forward references included) must
    // surface before any provider call for this block.
    let resolved = interpolate::resolve_block(block, variables, state)?;
    let (config, create_timeout) = split_timeouts(resolved)?;

    tracing::debug!(address = address.as_str(), "applying block");

    match block.kind {
        BlockKind::Data => {
            let factory = data_sources
                .get(&block.type_name)
                .ok_or_else(|| TfaccError::UnknownDataSourceType(block.type_name.clone()))?;
            let mut data_source = factory();

            let response = data_source
                .configure(
                    Context::new(),
                    ConfigureDataSourceRequest {
                        provider_data: provider_data.clone(),
                    },
                )
                .await;
            fail_on_error(&address, &response.diagnostics)?;

            let response = data_source
                .validate(
                    Context::new(),
                    ValidateDataSourceConfigRequest {
                        type_name: block.type_name.clone(),
                        config: config.clone(),
                    },
                )
                .await;
            if let Some(diag) = first_error(&response.diagnostics) {
                return Err(TfaccError::ValidationFailed {
                    address,
                    summary: diag.summary.clone(),
                });
            }

            let response = data_source
                .read(
                    Context::new(),
                    ReadDataSourceRequest {
                        type_name: block.type_name.clone(),
                        config: config.clone(),
                    },
                )
                .await;
            fail_on_error(&address, &response.diagnostics)?;

            state.insert(BlockState::new(
                address.clone(),
                BlockKind::Data,
                response.state.clone(),
            ));
            applied.push(Applied::Data {
                address,
                type_name: block.type_name.clone(),
                data_source,
                config,
                state: response.state,
            });
        }
        BlockKind::Resource => {
            let factory = resources
                .get(&block.type_name)
                .ok_or_else(|| TfaccError::UnknownResourceType(block.type_name.clone()))?;
            let mut resource = factory();

            let response = resource
                .configure(
                    Context::new(),
                    ConfigureResourceRequest {
                        provider_data: provider_data.clone(),
                    },
                )
                .await;
            fail_on_error(&address, &response.diagnostics)?;

            let response = resource
                .validate(
                    Context::new(),
                    ValidateResourceConfigRequest {
                        type_name: block.type_name.clone(),
                        config: config.clone(),
                    },
                )
                .await;
            if let Some(diag) = first_error(&response.diagnostics) {
                return Err(TfaccError::ValidationFailed {
                    address,
                    summary: diag.summary.clone(),
                });
            }

            let ctx = match create_timeout {
                Some(timeout) => Context::new().with_timeout(timeout),
                None => Context::new(),
            };
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name: block.type_name.clone(),
                        config,
                    },
                )
                .await;
            fail_on_error(&address, &response.diagnostics)?;

            state.insert(BlockState::new(
                address.clone(),
                BlockKind::Resource,
                response.new_state.clone(),
            ));
            applied.push(Applied::Resource {
                address,
                type_name: block.type_name.clone(),
                resource,
                state: response.new_state,
            });
        }
    }

    Ok(())
}

/// Re-read every applied block; with verify, the re-read flat attribute map
/// must match the applied one exactly in both directions.
async fn import_and_verify(applied: &[Applied], verify: bool) -> Result<()> {
    for entry in applied {
        match entry {
            Applied::Resource {
                address,
                type_name,
                resource,
                state,
            } => {
                tracing::debug!(address = address.as_str(), "importing resource state");
                let response = resource
                    .read(
                        Context::new(),
                        ReadResourceRequest {
                            type_name: type_name.clone(),
                            current_state: state.clone(),
                        },
                    )
                    .await;
                if let Some(diag) = first_error(&response.diagnostics) {
                    return Err(TfaccError::ImportReadFailed {
                        address: address.clone(),
                        summary: diag.summary.clone(),
                    });
                }
                let imported =
                    response
                        .new_state
                        .ok_or_else(|| TfaccError::ImportMissing {
                            address: address.clone(),
                        })?;
                if verify {
                    compare_flat(address, &state.flatten(), &imported.flatten())?;
                }
            }
            Applied::Data {
                address,
                type_name,
                data_source,
                config,
                state,
            } => {
                tracing::debug!(address = address.as_str(), "re-reading data source");
                let response = data_source
                    .read(
                        Context::new(),
                        ReadDataSourceRequest {
                            type_name: type_name.clone(),
                            config: config.clone(),
                        },
                    )
                    .await;
                if let Some(diag) = first_error(&response.diagnostics) {
                    return Err(TfaccError::ImportReadFailed {
                        address: address.clone(),
                        summary: diag.summary.clone(),
                    });
                }
                if verify {
                    compare_flat(address, &state.flatten(), &response.state.flatten())?;
                }
            }
        }
    }
    Ok(())
}

fn compare_flat(
    address: &str,
    applied: &HashMap<String, String>,
    imported: &HashMap<String, String>,
) -> Result<()> {
    for (key, value) in applied {
        match imported.get(key) {
            Some(other) if other == value => {}
            other => {
                return Err(TfaccError::ImportVerifyMismatch {
                    address: address.to_string(),
                    attribute: key.clone(),
                    applied: value.clone(),
                    imported: other.cloned().unwrap_or_default(),
                })
            }
        }
    }
    for (key, value) in imported {
        if !applied.contains_key(key) {
            return Err(TfaccError::ImportVerifyMismatch {
                address: address.to_string(),
                attribute: key.clone(),
                applied: String::new(),
                imported: value.clone(),
            });
        }
    }
    Ok(())
}

/// Destroy applied resources in reverse order. Destroy continues past
/// failures so later resources still get cleaned up; the first failure is
/// reported. Unless the case prevents it, each destroyed resource is
/// re-read and must be gone.
async fn destroy(mut applied: Vec<Applied>, prevent_post_destroy_refresh: bool) -> Result<()> {
    let mut failure = None;

    while let Some(entry) = applied.pop() {
        let Applied::Resource {
            address,
            type_name,
            resource,
            state,
        } = entry
        else {
            continue;
        };

        tracing::debug!(address = address.as_str(), "destroying resource");
        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: type_name.clone(),
                    prior_state: state.clone(),
                },
            )
            .await;
        if let Some(diag) = first_error(&response.diagnostics) {
            tracing::error!(
                address = address.as_str(),
                summary = diag.summary.as_str(),
                "destroy failed"
            );
            if failure.is_none() {
                failure = Some(TfaccError::DestroyFailed {
                    address: address.clone(),
                    summary: diag.summary.clone(),
                });
            }
            continue;
        }

        if !prevent_post_destroy_refresh {
            let response = resource
                .read(
                    Context::new(),
                    ReadResourceRequest {
                        type_name,
                        current_state: state,
                    },
                )
                .await;
            if response.new_state.is_some() && failure.is_none() {
                failure = Some(TfaccError::ResourceStillExists { address });
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn fail_on_error(address: &str, diagnostics: &[Diagnostic]) -> Result<()> {
    if let Some(diag) = first_error(diagnostics) {
        return Err(TfaccError::ApplyFailed {
            address: address.to_string(),
            summary: diag.summary.clone(),
            detail: diag.detail.clone(),
        });
    }
    Ok(())
}

/// Pull the `timeouts` block out of a resolved configuration so it never
/// reaches the provider; only `timeouts.create` is honored, as a duration
/// like `"15m"`.
fn split_timeouts(mut resolved: DynamicValue) -> Result<(DynamicValue, Option<Duration>)> {
    let mut timeout = None;

    if let Dynamic::Map(entries) = &mut resolved.value {
        if let Some(value) = entries.remove("timeouts") {
            match value {
                Dynamic::Map(timeouts) => {
                    if let Some(Dynamic::String(spec)) = timeouts.get("create") {
                        timeout = Some(parse_duration(spec)?);
                    }
                }
                _ => {
                    return Err(TfaccError::InvalidDuration(
                        "timeouts must be a map".to_string(),
                    ))
                }
            }
        }
    }

    Ok((resolved, timeout))
}
