//! In-memory deploy collaborator and observer used by the tests

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use alloy::primitives::{address, Address};
use async_trait::async_trait;

use crate::{
    deployer::ContractDeployer,
    errors::ScriptError,
    observer::DeploymentObserver,
    types::{DeployedContract, DeploymentReceipt, DeploymentStep},
};

/// A call made to the mock deployer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployCall {
    /// The artifact deployed
    pub artifact: String,
    /// The resolved constructor inputs
    pub inputs: Vec<String>,
}

impl DeployCall {
    /// Create a new call
    pub fn new(artifact: &str, inputs: Vec<String>) -> Self {
        Self {
            artifact: artifact.to_string(),
            inputs,
        }
    }
}

/// A deployer whose results are scripted per artifact
#[derive(Default)]
pub struct MockDeployer {
    /// The address returned for each artifact
    addresses: HashMap<String, Address>,
    /// Artifacts whose deployment fails, with the kind of error raised
    failures: HashMap<String, fn(String) -> ScriptError>,
    /// Artifacts whose deployment is reported but not confirmed
    unconfirmed: HashSet<String>,
    /// Every call made, in order
    calls: Mutex<Vec<DeployCall>>,
}

impl MockDeployer {
    /// The deployer address reported by the mock
    pub const DEPLOYER: Address = address!("00000000000000000000000000000000000000de");
    /// The address returned for artifacts without a scripted address
    pub const DEFAULT_ADDRESS: Address = address!("00000000000000000000000000000000000000aa");

    /// Create a mock that deploys every artifact to [`Self::DEFAULT_ADDRESS`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy `artifact` to `address`
    pub fn with_address(mut self, artifact: &str, address: Address) -> Self {
        self.addresses.insert(artifact.to_string(), address);
        self
    }

    /// Fail any deployment of `artifact`
    pub fn with_failure(self, artifact: &str) -> Self {
        self.with_error(artifact, ScriptError::Deployment)
    }

    /// Fail any deployment of `artifact` with an error of the given kind
    pub fn with_error(mut self, artifact: &str, kind: fn(String) -> ScriptError) -> Self {
        self.failures.insert(artifact.to_string(), kind);
        self
    }

    /// Report deployments of `artifact` as unconfirmed
    pub fn with_unconfirmed(mut self, artifact: &str) -> Self {
        self.unconfirmed.insert(artifact.to_string());
        self
    }

    /// The calls made so far
    pub fn calls(&self) -> Vec<DeployCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContractDeployer for MockDeployer {
    fn deployer_address(&self) -> Address {
        Self::DEPLOYER
    }

    async fn deploy(
        &self,
        artifact: &str,
        inputs: &[String],
    ) -> Result<DeploymentReceipt, ScriptError> {
        self.calls.lock().unwrap().push(DeployCall::new(artifact, inputs.to_vec()));

        if let Some(kind) = self.failures.get(artifact) {
            return Err(kind(format!("{artifact}: transaction reverted")));
        }

        Ok(DeploymentReceipt {
            address: self.addresses.get(artifact).copied().unwrap_or(Self::DEFAULT_ADDRESS),
            tx_hash: None,
            confirmed: !self.unconfirmed.contains(artifact),
        })
    }
}

/// An observer that records every notification as a line of text
#[derive(Default)]
pub struct RecordingObserver {
    /// The recorded notifications
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    /// The notifications received so far
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl DeploymentObserver for RecordingObserver {
    fn step_started(&self, step: &DeploymentStep, inputs: &[String]) {
        self.events.lock().unwrap().push(format!("started {} {:?}", step.identifier, inputs));
    }

    fn step_completed(&self, contract: &DeployedContract, _receipt: &DeploymentReceipt) {
        self.events
            .lock()
            .unwrap()
            .push(format!("completed {} {}", contract.identifier, contract.address));
    }
}
