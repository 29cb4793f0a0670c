//! The end-to-end deployment pipeline: deploy, record, then sync the env file

use tracing::{error, info, warn};

use crate::{
    config::{EnvUpdatePolicy, PipelineConfig},
    constants::{EXIT_FAILURE, EXIT_SUCCESS},
    deployer::ContractDeployer,
    env_file::{update_env_file, UpdateSet},
    errors::ScriptError,
    observer::DeploymentObserver,
    orchestrator::DeploymentOrchestrator,
    record,
    types::{DeploymentRecord, DeploymentStep, EnvBinding},
};

/// The result of a pipeline run that deployed and recorded successfully
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The persisted deployment record
    pub record: DeploymentRecord,
    /// The env file failure that was recovered from, if any
    pub env_error: Option<ScriptError>,
}

/// Deploy the plan, persist the record, then update the env file.
///
/// Deployment and record failures are fatal. An env file failure is fatal only
/// under [`EnvUpdatePolicy::Required`].
pub async fn run_pipeline<D: ContractDeployer, O: DeploymentObserver>(
    config: &PipelineConfig,
    steps: &[DeploymentStep],
    deployer: &D,
    observer: &O,
) -> Result<PipelineOutcome, ScriptError> {
    info!(network = %config.network, steps = steps.len(), "Starting deployment");

    let record = DeploymentOrchestrator::new(deployer, observer, config.network.clone())
        .run(steps)
        .await?;
    record::persist(&record, &config.deployments_path)?;

    let env_error = sync_env(config, &record)?;

    info!("Deployment completed successfully!");
    Ok(PipelineOutcome { record, env_error })
}

/// Write the record's addresses into the env file according to the configured
/// bindings and policy.
///
/// Returns the recovered error under [`EnvUpdatePolicy::BestEffort`].
pub fn sync_env(
    config: &PipelineConfig,
    record: &DeploymentRecord,
) -> Result<Option<ScriptError>, ScriptError> {
    let result = env_updates(record, &config.env_bindings)
        .and_then(|updates| update_env_file(&config.env_path, &updates));

    match (result, config.env_policy) {
        (Ok(()), _) => Ok(None),
        (Err(e), EnvUpdatePolicy::BestEffort) => {
            warn!(path = %config.env_path.display(), "Failed to update .env file: {e}");
            Ok(Some(e))
        }
        (Err(e), EnvUpdatePolicy::Required) => Err(e),
    }
}

/// Build the env updates for a record, one per binding in binding order
pub fn env_updates(
    record: &DeploymentRecord,
    bindings: &[EnvBinding],
) -> Result<UpdateSet, ScriptError> {
    bindings
        .iter()
        .map(|binding| {
            record
                .addresses
                .get(&binding.step)
                .map(|addr| (binding.key.clone(), addr.to_checksum(None)))
                .ok_or_else(|| {
                    ScriptError::EnvReconcile(format!(
                        "{} is bound to `{}`, which was not deployed",
                        binding.key, binding.step
                    ))
                })
        })
        .collect()
}

/// Map the result of a run to the process exit status, logging any failure
pub fn exit_status<T>(result: &Result<T, ScriptError>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            error!("Error during deployment: {e}");
            EXIT_FAILURE
        }
    }
}
