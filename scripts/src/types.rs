//! Type definitions used throughout the scripts

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
    str::FromStr,
};

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENV_BINDINGS, ENV_KEY_SEPARATOR, VOTING_SYSTEM_ARTIFACT, VOTING_SYSTEM_STEP,
    VOTING_TOKEN_ARTIFACT, VOTING_TOKEN_STEP,
};

/// A single constructor input of a deployment step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructorInput {
    /// A value passed through as-is, coerced to the constructor parameter type at deploy time
    Literal(String),
    /// The address of a prior step, substituted once that step is confirmed
    StepAddress(String),
}

/// One contract deployment unit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStep {
    /// The identifier of the step, used as its key in the deployment record
    pub identifier: String,
    /// The fully qualified artifact name of the contract to deploy
    pub artifact: String,
    /// The constructor inputs, in ABI order
    #[serde(default)]
    pub constructor_inputs: Vec<ConstructorInput>,
    /// The identifiers of the steps that must be confirmed before this one starts
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
}

impl DeploymentStep {
    /// Create a step with no constructor inputs and no dependencies
    pub fn new(identifier: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            artifact: artifact.into(),
            constructor_inputs: Vec::new(),
            depends_on: BTreeSet::new(),
        }
    }

    /// Append a literal constructor input
    pub fn with_literal(mut self, value: impl Into<String>) -> Self {
        self.constructor_inputs.push(ConstructorInput::Literal(value.into()));
        self
    }

    /// Append a constructor input taking the address of `step`, and depend on it
    pub fn with_step_address(mut self, step: impl Into<String>) -> Self {
        let step = step.into();
        self.depends_on.insert(step.clone());
        self.constructor_inputs.push(ConstructorInput::StepAddress(step));
        self
    }
}

/// The deployment plan of the voting application: the token, then the voting
/// system consuming the token's address
pub fn voting_plan() -> Vec<DeploymentStep> {
    vec![
        DeploymentStep::new(VOTING_TOKEN_STEP, VOTING_TOKEN_ARTIFACT),
        DeploymentStep::new(VOTING_SYSTEM_STEP, VOTING_SYSTEM_ARTIFACT)
            .with_step_address(VOTING_TOKEN_STEP),
    ]
}

/// What the deploy collaborator reports for a submitted contract creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentReceipt {
    /// The address of the created contract
    pub address: Address,
    /// The hash of the creation transaction, if the collaborator exposes one
    pub tx_hash: Option<TxHash>,
    /// Whether the ledger reported the creation as successful
    pub confirmed: bool,
}

/// A contract deployed by a successful step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The identifier of the step that deployed the contract
    pub identifier: String,
    /// The address of the contract
    pub address: Address,
    /// Whether the deployment was confirmed
    pub confirmed: bool,
}

/// The persisted summary of a completed deployment run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The deployed addresses, keyed by step identifier
    pub addresses: BTreeMap<String, Address>,
    /// The time the deployment completed, in ISO-8601
    pub deployment_time: String,
    /// The name of the network deployed to
    pub network: String,
    /// The address of the deployer account
    pub deployer: Address,
}

/// Binds an environment file key to the address deployed by a step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvBinding {
    /// The environment file key
    pub key: String,
    /// The identifier of the step whose address is written under `key`
    pub step: String,
}

impl EnvBinding {
    /// Create a new binding
    pub fn new(key: impl Into<String>, step: impl Into<String>) -> Self {
        Self { key: key.into(), step: step.into() }
    }

    /// The bindings written by default, in write order
    pub fn defaults() -> Vec<EnvBinding> {
        DEFAULT_ENV_BINDINGS.iter().map(|(key, step)| EnvBinding::new(*key, *step)).collect()
    }
}

impl FromStr for EnvBinding {
    type Err = String;

    /// Parses a binding of the form `KEY=step`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, step) = s
            .split_once(ENV_KEY_SEPARATOR)
            .ok_or_else(|| format!("expected KEY=step, got `{s}`"))?;

        if key.trim().is_empty() || step.trim().is_empty() {
            return Err(format!("expected KEY=step, got `{s}`"));
        }

        Ok(EnvBinding::new(key.trim(), step.trim()))
    }
}

impl Display for EnvBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.step)
    }
}
