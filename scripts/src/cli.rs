//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    config::{load_plan, EnvUpdatePolicy, PipelineConfig},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_ENV_PATH, DEFAULT_NETWORK,
        DEFAULT_RPC_URL, NUM_DEPLOY_CONFIRMATIONS,
    },
    deployer::{setup_client, ArtifactDeployer},
    errors::ScriptError,
    observer::TracingObserver,
    pipeline::{run_pipeline, sync_env},
    record,
    types::EnvBinding,
};

/// Deploy the voting contracts and sync their addresses into the client
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the network, recorded in the deployment record
    #[arg(short, long, env = "NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Path to the deployment record
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// Path to the client environment file
    #[arg(short, long, default_value = DEFAULT_ENV_PATH)]
    pub env_path: PathBuf,

    /// Env key to write and the step whose address it receives, as `KEY=step`.
    /// May be repeated; replaces the default bindings when given
    #[arg(long = "env-binding", value_name = "KEY=step")]
    pub env_bindings: Vec<EnvBinding>,

    /// Fail the run if the environment file cannot be updated
    #[arg(long)]
    pub strict_env: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Resolve the options shared by every command
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new(self.network.clone());
        config.deployments_path = self.deployments_path.clone();
        config.env_path = self.env_path.clone();
        if !self.env_bindings.is_empty() {
            config.env_bindings = self.env_bindings.clone();
        }
        if self.strict_env {
            config.env_policy = EnvUpdatePolicy::Required;
        }
        config
    }
}

/// The commands supported by the scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the contracts, write the deployment record, and update the env file
    Deploy(DeployArgs),
    /// Update the env file from an existing deployment record, without deploying.
    /// Fails if the env file cannot be updated, regardless of `--strict-env`
    SyncEnv,
}

impl Command {
    /// Run the command against the resolved configuration
    pub async fn run(self, mut config: PipelineConfig) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy(args, &config).await,
            Command::SyncEnv => {
                // Updating the env file is the whole job here
                config.env_policy = EnvUpdatePolicy::Required;
                let record = record::load(&config.deployments_path)?;
                info!(
                    path = %config.deployments_path.display(),
                    "Syncing env from deployment record"
                );
                sync_env(&config, &record).map(|_| ())
            }
        }
    }
}

/// Arguments of the `deploy` command
#[derive(Args)]
pub struct DeployArgs {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY")]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Number of confirmations to wait for on each deployment
    #[arg(short, long, default_value_t = NUM_DEPLOY_CONFIRMATIONS)]
    pub confirmations: u64,

    /// JSON file declaring the deployment steps, in place of the voting contracts
    #[arg(long)]
    pub plan: Option<PathBuf>,
}

/// Deploy the plan through an alloy provider and run the rest of the pipeline
async fn deploy(args: DeployArgs, config: &PipelineConfig) -> Result<(), ScriptError> {
    let steps = load_plan(args.plan.as_deref())?;
    let (provider, deployer_address) = setup_client(&args.priv_key, &args.rpc_url)?;
    let deployer =
        ArtifactDeployer::new(provider, deployer_address, args.artifacts_dir, args.confirmations);

    run_pipeline(config, &steps, &deployer, &TracingObserver).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs};

    use alloy::primitives::address;
    use clap::CommandFactory;

    use super::*;
    use crate::{constants::VOTING_TOKEN_STEP, types::DeploymentRecord};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pipeline_config_defaults() {
        let cli = Cli::try_parse_from(["voting-deploy", "sync-env"]).unwrap();
        let config = cli.pipeline_config();

        assert_eq!(config.deployments_path, PathBuf::from(DEFAULT_DEPLOYMENTS_PATH));
        assert_eq!(config.env_path, PathBuf::from(DEFAULT_ENV_PATH));
        assert_eq!(config.env_bindings, EnvBinding::defaults());
        assert_eq!(config.env_policy, EnvUpdatePolicy::BestEffort);
    }

    #[test]
    fn test_pipeline_config_overrides() {
        let cli = Cli::try_parse_from([
            "voting-deploy",
            "--network",
            "sepolia",
            "--env-binding",
            "VITE_TOKEN=votingToken",
            "--strict-env",
            "deploy",
            "--priv-key",
            "0x01",
        ])
        .unwrap();
        let config = cli.pipeline_config();

        assert_eq!(config.network, "sepolia");
        assert_eq!(config.env_bindings, vec![EnvBinding::new("VITE_TOKEN", "votingToken")]);
        assert_eq!(config.env_policy, EnvUpdatePolicy::Required);
        assert!(matches!(cli.command, Command::Deploy(ref args) if args.rpc_url == DEFAULT_RPC_URL));
    }

    #[tokio::test]
    async fn test_sync_env_fails_when_env_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::new("localhost");
        config.deployments_path = dir.path().join("deployment-info.json");
        config.env_bindings = vec![EnvBinding::new("REACT_APP_TOKEN_ADDRESS", VOTING_TOKEN_STEP)];

        let record = DeploymentRecord {
            addresses: BTreeMap::from([(
                VOTING_TOKEN_STEP.to_string(),
                address!("1111111111111111111111111111111111111111"),
            )]),
            deployment_time: "2024-01-01T00:00:00.000Z".to_string(),
            network: "localhost".to_string(),
            deployer: address!("00000000000000000000000000000000000000de"),
        };
        record::persist(&record, &config.deployments_path).unwrap();

        // A directory in place of the env file
        config.env_path = dir.path().join("client");
        fs::create_dir_all(&config.env_path).unwrap();
        let err = Command::SyncEnv.run(config.clone()).await.unwrap_err();
        assert!(err.is_env_reconcile());

        config.env_path = dir.path().join(".env");
        Command::SyncEnv.run(config.clone()).await.unwrap();
        assert!(fs::read_to_string(&config.env_path)
            .unwrap()
            .starts_with("REACT_APP_TOKEN_ADDRESS=0x"));
    }
}
