//! Resolved configuration of a pipeline run

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    constants::{DEFAULT_DEPLOYMENTS_PATH, DEFAULT_ENV_PATH},
    errors::ScriptError,
    types::{voting_plan, DeploymentStep, EnvBinding},
};

/// How a failure to update the environment file affects the run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvUpdatePolicy {
    /// The failure is logged and the run still succeeds
    #[default]
    BestEffort,
    /// The failure fails the run
    Required,
}

/// Where a pipeline run writes its outputs, and how
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// The network name recorded in the deployment record
    pub network: String,
    /// The path of the deployment record
    pub deployments_path: PathBuf,
    /// The path of the client environment file
    pub env_path: PathBuf,
    /// The env keys to write, and the steps whose addresses they receive
    pub env_bindings: Vec<EnvBinding>,
    /// Whether env file failures are fatal
    pub env_policy: EnvUpdatePolicy,
}

impl PipelineConfig {
    /// A configuration writing to the default paths with the default bindings
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            deployments_path: PathBuf::from(DEFAULT_DEPLOYMENTS_PATH),
            env_path: PathBuf::from(DEFAULT_ENV_PATH),
            env_bindings: EnvBinding::defaults(),
            env_policy: EnvUpdatePolicy::default(),
        }
    }
}

/// Load the deployment plan from a JSON file, or fall back to the voting plan
pub fn load_plan(path: Option<&Path>) -> Result<Vec<DeploymentStep>, ScriptError> {
    let Some(path) = path else {
        return Ok(voting_plan());
    };

    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::InvalidPlan(format!("{}: {e}", path.display())))?;
    let plan: Vec<DeploymentStep> = serde_json::from_str(&contents)
        .map_err(|e| ScriptError::InvalidPlan(format!("{}: {e}", path.display())))?;

    if plan.is_empty() {
        return Err(ScriptError::InvalidPlan(format!("{} declares no steps", path.display())));
    }

    Ok(plan)
}
