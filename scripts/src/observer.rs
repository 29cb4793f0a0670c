//! Progress notifications emitted by the orchestrator

use tracing::info;

use crate::types::{DeployedContract, DeploymentReceipt, DeploymentStep};

/// Receives one notification when each step starts and one when it completes
pub trait DeploymentObserver: Send + Sync {
    /// Called before the step is submitted, with its resolved constructor inputs
    fn step_started(&self, step: &DeploymentStep, inputs: &[String]);

    /// Called once the step's deployment is confirmed
    fn step_completed(&self, contract: &DeployedContract, receipt: &DeploymentReceipt);
}

/// Forwards progress to `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl DeploymentObserver for TracingObserver {
    fn step_started(&self, step: &DeploymentStep, inputs: &[String]) {
        info!(
            step = %step.identifier,
            artifact = %step.artifact,
            inputs = ?inputs,
            "Deploying {}...",
            step.identifier
        );
    }

    fn step_completed(&self, contract: &DeployedContract, receipt: &DeploymentReceipt) {
        info!(
            step = %contract.identifier,
            address = %contract.address,
            tx_hash = ?receipt.tx_hash,
            "{} deployed to {}",
            contract.identifier,
            contract.address
        );
    }
}
