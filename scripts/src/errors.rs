//! Definitions of errors that can occur during the execution of the deployment pipeline

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deployment pipeline
#[derive(Debug)]
pub enum ScriptError {
    /// The declared deployment plan is malformed
    InvalidPlan(String),
    /// Error initializing the RPC client or signer
    ClientInitialization(String),
    /// Error reading or parsing a compiled contract artifact
    ArtifactParsing(String),
    /// Error constructing the constructor calldata for a contract
    CalldataConstruction(String),
    /// A deploy or confirmation step failed
    Deployment(String),
    /// Error writing the deployment record
    RecordWrite(String),
    /// Error reading the deployment record
    ReadDeployments(String),
    /// Error reading or writing the environment file
    EnvReconcile(String),
}

impl ScriptError {
    /// Whether this error was raised by the environment file update
    pub fn is_env_reconcile(&self) -> bool {
        matches!(self, ScriptError::EnvReconcile(_))
    }

    /// Prefix the error message with `context`, keeping the error kind
    pub fn with_context(self, context: &str) -> Self {
        match self {
            ScriptError::InvalidPlan(s) => ScriptError::InvalidPlan(format!("{context}: {s}")),
            ScriptError::ClientInitialization(s) => {
                ScriptError::ClientInitialization(format!("{context}: {s}"))
            }
            ScriptError::ArtifactParsing(s) => {
                ScriptError::ArtifactParsing(format!("{context}: {s}"))
            }
            ScriptError::CalldataConstruction(s) => {
                ScriptError::CalldataConstruction(format!("{context}: {s}"))
            }
            ScriptError::Deployment(s) => ScriptError::Deployment(format!("{context}: {s}")),
            ScriptError::RecordWrite(s) => ScriptError::RecordWrite(format!("{context}: {s}")),
            ScriptError::ReadDeployments(s) => {
                ScriptError::ReadDeployments(format!("{context}: {s}"))
            }
            ScriptError::EnvReconcile(s) => ScriptError::EnvReconcile(format!("{context}: {s}")),
        }
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::InvalidPlan(s) => write!(f, "invalid deployment plan: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::Deployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::RecordWrite(s) => write!(f, "error writing deployment record: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployment record: {}", s),
            ScriptError::EnvReconcile(s) => write!(f, "error updating env file: {}", s),
        }
    }
}

impl Error for ScriptError {}
