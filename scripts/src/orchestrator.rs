//! Sequences dependent deployment steps, threading each confirmed address into
//! the constructor inputs of the steps after it.
//!
//! Steps run strictly in the order given: no step is submitted before every
//! step ahead of it is confirmed. The orchestrator does not sort the plan, it
//! only checks that every reference points backwards.

use std::collections::{BTreeMap, HashSet};

use alloy::primitives::Address;
use chrono::{SecondsFormat, Utc};

use crate::{
    deployer::ContractDeployer,
    errors::ScriptError,
    observer::DeploymentObserver,
    types::{ConstructorInput, DeployedContract, DeploymentRecord, DeploymentStep},
};

/// Runs a deployment plan against a deploy collaborator
pub struct DeploymentOrchestrator<'a, D, O> {
    /// The collaborator that submits and confirms each deployment
    deployer: &'a D,
    /// The observer notified of step progress
    observer: &'a O,
    /// The name of the network being deployed to
    network: String,
}

impl<'a, D: ContractDeployer, O: DeploymentObserver> DeploymentOrchestrator<'a, D, O> {
    /// Create a new orchestrator
    pub fn new(deployer: &'a D, observer: &'a O, network: impl Into<String>) -> Self {
        Self {
            deployer,
            observer,
            network: network.into(),
        }
    }

    /// Deploy every step in order, returning the record of the completed run.
    ///
    /// Aborts on the first failed step. Contracts deployed by earlier steps
    /// are left in place.
    pub async fn run(&self, steps: &[DeploymentStep]) -> Result<DeploymentRecord, ScriptError> {
        validate_plan(steps)?;

        let mut deployed: Vec<DeployedContract> = Vec::with_capacity(steps.len());
        for step in steps {
            let inputs = resolve_inputs(step, &deployed)?;
            self.observer.step_started(step, &inputs);

            let receipt = self
                .deployer
                .deploy(&step.artifact, &inputs)
                .await
                .map_err(|e| step_failure(step, e))?;

            if !receipt.confirmed {
                return Err(ScriptError::Deployment(format!(
                    "step `{}`: deployment at {} was not confirmed",
                    step.identifier, receipt.address
                )));
            }

            let contract = DeployedContract {
                identifier: step.identifier.clone(),
                address: receipt.address,
                confirmed: receipt.confirmed,
            };
            self.observer.step_completed(&contract, &receipt);
            deployed.push(contract);
        }

        Ok(DeploymentRecord {
            addresses: deployed.into_iter().map(|c| (c.identifier, c.address)).collect(),
            deployment_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            network: self.network.clone(),
            deployer: self.deployer.deployer_address(),
        })
    }
}

/// Attach the failed step to a collaborator error, keeping its kind
fn step_failure(step: &DeploymentStep, err: ScriptError) -> ScriptError {
    err.with_context(&format!("step `{}`", step.identifier))
}

/// Check that identifiers are unique and that every dependency and address
/// reference names an earlier step
pub fn validate_plan(steps: &[DeploymentStep]) -> Result<(), ScriptError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for step in steps {
        for dep in &step.depends_on {
            if !seen.contains(dep.as_str()) {
                return Err(ScriptError::InvalidPlan(format!(
                    "step `{}` depends on `{dep}`, which is not an earlier step",
                    step.identifier
                )));
            }
        }

        for input in &step.constructor_inputs {
            if let ConstructorInput::StepAddress(target) = input {
                if !step.depends_on.contains(target) {
                    return Err(ScriptError::InvalidPlan(format!(
                        "step `{}` takes the address of `{target}` without depending on it",
                        step.identifier
                    )));
                }
            }
        }

        if !seen.insert(step.identifier.as_str()) {
            return Err(ScriptError::InvalidPlan(format!(
                "duplicate step identifier `{}`",
                step.identifier
            )));
        }
    }

    Ok(())
}

/// Substitute the addresses of already-deployed steps into a step's inputs
fn resolve_inputs(
    step: &DeploymentStep,
    deployed: &[DeployedContract],
) -> Result<Vec<String>, ScriptError> {
    let addresses: BTreeMap<&str, Address> =
        deployed.iter().map(|c| (c.identifier.as_str(), c.address)).collect();

    step.constructor_inputs
        .iter()
        .map(|input| match input {
            ConstructorInput::Literal(value) => Ok(value.clone()),
            ConstructorInput::StepAddress(target) => addresses
                .get(target.as_str())
                .map(|addr| addr.to_checksum(None))
                .ok_or_else(|| {
                    ScriptError::Deployment(format!(
                        "step `{}`: address of `{target}` is not resolved",
                        step.identifier
                    ))
                }),
        })
        .collect()
}
