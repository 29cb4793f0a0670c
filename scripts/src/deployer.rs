//! The deploy collaborator: submits contract creations and waits for their confirmation

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    hex,
    json_abi::JsonAbi,
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::{
        ARTIFACT_EXTENSION, ARTIFACT_NAME_SEPARATOR, CONTRACTS_SOURCE_DIR, SOLIDITY_EXTENSION,
    },
    errors::ScriptError,
    types::DeploymentReceipt,
};

/// Deploys a single contract and blocks until the ledger confirms it
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// The address of the account submitting the deployments
    fn deployer_address(&self) -> Address;

    /// Deploy `artifact` with the given constructor inputs, returning once the
    /// creation is confirmed or has failed
    async fn deploy(
        &self,
        artifact: &str,
        inputs: &[String],
    ) -> Result<DeploymentReceipt, ScriptError>;
}

/// The parts of a Hardhat compilation artifact needed to deploy a contract
#[derive(Debug, Deserialize)]
pub struct ContractArtifact {
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, in hex
    pub bytecode: String,
}

/// Sets up the provider with which to deploy contracts, signing with the given private key.
///
/// Returns the provider along with the address of the signer.
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<(DynProvider, Address), ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let deployer = signer.address();

    let url = rpc_url.parse::<Url>().map_err(|e| {
        ScriptError::ClientInitialization(format!("invalid RPC URL `{rpc_url}`: {e}"))
    })?;
    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);

    Ok((DynProvider::new(provider), deployer))
}

/// Resolves a fully qualified artifact name to the path of its Hardhat artifact.
///
/// `contracts/Foo.sol:Foo` resolves to `<root>/contracts/Foo.sol/Foo.json`, and a
/// bare `Foo` to the same path.
pub fn artifact_path(artifacts_dir: &Path, artifact: &str) -> PathBuf {
    match artifact.rsplit_once(ARTIFACT_NAME_SEPARATOR) {
        Some((source, name)) => {
            artifacts_dir.join(source).join(name).with_extension(ARTIFACT_EXTENSION)
        }
        None => artifacts_dir
            .join(CONTRACTS_SOURCE_DIR)
            .join(format!("{artifact}.{SOLIDITY_EXTENSION}"))
            .join(artifact)
            .with_extension(ARTIFACT_EXTENSION),
    }
}

/// Reads and parses the artifact at the given path
pub fn load_artifact(path: &Path) -> Result<ContractArtifact, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}

/// Builds the creation code for a contract: its bytecode followed by the
/// ABI-encoded constructor inputs.
///
/// Each input is coerced from its string form to the type of the matching
/// constructor parameter.
pub fn encode_deploy_code(
    artifact: &ContractArtifact,
    inputs: &[String],
) -> Result<Bytes, ScriptError> {
    let mut code =
        hex::decode(&artifact.bytecode).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    if code.is_empty() {
        return Err(ScriptError::ArtifactParsing("artifact has no bytecode".to_string()));
    }

    let params = artifact.abi.constructor.as_ref().map(|c| c.inputs.as_slice()).unwrap_or(&[]);
    if params.len() != inputs.len() {
        return Err(ScriptError::CalldataConstruction(format!(
            "constructor takes {} inputs, got {}",
            params.len(),
            inputs.len()
        )));
    }

    if let Some(constructor) = &artifact.abi.constructor {
        let values = params
            .iter()
            .zip(inputs)
            .map(|(param, input)| {
                let ty = param
                    .resolve()
                    .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
                ty.coerce_str(input).map_err(|e| {
                    ScriptError::CalldataConstruction(format!("input `{}`: {e}", param.name))
                })
            })
            .collect::<Result<Vec<DynSolValue>, ScriptError>>()?;

        let encoded = constructor
            .abi_encode_input(&values)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
        code.extend_from_slice(&encoded);
    }

    Ok(Bytes::from(code))
}

/// Deploys compiled Hardhat artifacts through an alloy provider
pub struct ArtifactDeployer {
    /// The provider, with the deployer's wallet attached
    provider: DynProvider,
    /// The address of the deployer account
    deployer: Address,
    /// The root directory of the compiled artifacts
    artifacts_dir: PathBuf,
    /// The number of confirmations to wait for on each deployment
    confirmations: u64,
}

impl ArtifactDeployer {
    /// Create a new deployer
    pub fn new(
        provider: DynProvider,
        deployer: Address,
        artifacts_dir: PathBuf,
        confirmations: u64,
    ) -> Self {
        Self {
            provider,
            deployer,
            artifacts_dir,
            confirmations,
        }
    }
}

#[async_trait]
impl ContractDeployer for ArtifactDeployer {
    fn deployer_address(&self) -> Address {
        self.deployer
    }

    async fn deploy(
        &self,
        artifact: &str,
        inputs: &[String],
    ) -> Result<DeploymentReceipt, ScriptError> {
        let path = artifact_path(&self.artifacts_dir, artifact);
        debug!(path = %path.display(), "loading artifact");
        let code = encode_deploy_code(&load_artifact(&path)?, inputs)?;

        let tx = TransactionRequest::default().with_from(self.deployer).with_deploy_code(code);
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::Deployment(format!("{artifact}: {e}")))?
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::Deployment(format!("{artifact}: {e}")))?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::Deployment(format!("{artifact}: receipt has no contract address"))
        })?;

        Ok(DeploymentReceipt {
            address,
            tx_hash: Some(receipt.transaction_hash),
            confirmed: receipt.status(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An artifact for a contract whose constructor takes a single address
    const TOKEN_CONSUMER_ARTIFACT: &str = r#"{
        "contractName": "VotingSystem_WithToken",
        "abi": [
            {
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [{ "name": "_token", "type": "address", "internalType": "address" }]
            }
        ],
        "bytecode": "0x6080"
    }"#;

    /// An artifact for a contract without a constructor
    const NO_CONSTRUCTOR_ARTIFACT: &str = r#"{ "abi": [], "bytecode": "0x60806040" }"#;

    #[test]
    fn test_artifact_path_fully_qualified() {
        let path = artifact_path(
            Path::new("artifacts"),
            "contracts/VotingSystem_WithToken.sol:VotingSystem_WithToken",
        );
        assert_eq!(
            path,
            PathBuf::from(
                "artifacts/contracts/VotingSystem_WithToken.sol/VotingSystem_WithToken.json"
            )
        );
    }

    #[test]
    fn test_artifact_path_bare_name() {
        let path = artifact_path(Path::new("artifacts"), "VotingToken");
        assert_eq!(path, PathBuf::from("artifacts/contracts/VotingToken.sol/VotingToken.json"));
    }

    #[test]
    fn test_encode_appends_constructor_inputs() {
        let artifact: ContractArtifact = serde_json::from_str(TOKEN_CONSUMER_ARTIFACT).unwrap();
        let token = Address::repeat_byte(0x11);

        let code = encode_deploy_code(&artifact, &[token.to_string()]).unwrap();

        let mut expected = vec![0x60, 0x80];
        expected.extend_from_slice(&[0u8; 12]);
        expected.extend_from_slice(token.as_slice());
        assert_eq!(code.to_vec(), expected);
    }

    #[test]
    fn test_encode_without_constructor() {
        let artifact: ContractArtifact = serde_json::from_str(NO_CONSTRUCTOR_ARTIFACT).unwrap();
        let code = encode_deploy_code(&artifact, &[]).unwrap();
        assert_eq!(code.to_vec(), vec![0x60, 0x80, 0x60, 0x40]);
    }

    #[test]
    fn test_encode_rejects_input_count_mismatch() {
        let artifact: ContractArtifact = serde_json::from_str(TOKEN_CONSUMER_ARTIFACT).unwrap();
        let err = encode_deploy_code(&artifact, &[]).unwrap_err();
        assert!(matches!(err, ScriptError::CalldataConstruction(_)));

        let artifact: ContractArtifact = serde_json::from_str(NO_CONSTRUCTOR_ARTIFACT).unwrap();
        let err = encode_deploy_code(&artifact, &["1".to_string()]).unwrap_err();
        assert!(matches!(err, ScriptError::CalldataConstruction(_)));
    }

    #[test]
    fn test_encode_rejects_uncoercible_input() {
        let artifact: ContractArtifact = serde_json::from_str(TOKEN_CONSUMER_ARTIFACT).unwrap();
        let err = encode_deploy_code(&artifact, &["not an address".to_string()]).unwrap_err();
        assert!(matches!(err, ScriptError::CalldataConstruction(_)));
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_artifact(&dir.path().join("Missing.json")).unwrap_err();
        assert!(matches!(err, ScriptError::ArtifactParsing(_)));
    }
}
