//! Constants used in the deploy scripts

/// The default RPC URL, pointing at a local Hardhat / Anvil node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default network name recorded in the deployment record
pub const DEFAULT_NETWORK: &str = "localhost";

/// The default path of the deployment record
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployment-info.json";

/// The default path of the client environment file
pub const DEFAULT_ENV_PATH: &str = "client/.env";

/// The default directory containing compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The number of confirmations to wait for on each contract deployment transaction
pub const NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

/// The directory, relative to the artifacts root, holding artifacts referenced by bare name
pub const CONTRACTS_SOURCE_DIR: &str = "contracts";

/// The extension of a Solidity source file
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The extension of a compiled artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The separator between the source path and the contract name in a fully qualified artifact name
pub const ARTIFACT_NAME_SEPARATOR: char = ':';

/// The separator between a key and its value in the environment file
pub const ENV_KEY_SEPARATOR: char = '=';

/// The voting token step identifier, also its key in the deployment record
pub const VOTING_TOKEN_STEP: &str = "votingToken";

/// The voting system step identifier, also its key in the deployment record
pub const VOTING_SYSTEM_STEP: &str = "votingSystem";

/// The fully qualified artifact name of the voting token contract
pub const VOTING_TOKEN_ARTIFACT: &str = "contracts/VotingToken.sol:VotingToken";

/// The fully qualified artifact name of the voting system contract
pub const VOTING_SYSTEM_ARTIFACT: &str =
    "contracts/VotingSystem_WithToken.sol:VotingSystem_WithToken";

/// The env key holding the main contract address read by the client
pub const CONTRACT_ADDRESS_ENV_KEY: &str = "REACT_APP_CONTRACT_ADDRESS";

/// The env key holding the token address read by the client
pub const TOKEN_ADDRESS_ENV_KEY: &str = "REACT_APP_TOKEN_ADDRESS";

/// The env key holding the voting contract address read by the client
pub const VOTING_ADDRESS_ENV_KEY: &str = "REACT_APP_VOTING_ADDRESS";

/// The default env bindings, as `(env key, step identifier)` pairs, in write order
pub const DEFAULT_ENV_BINDINGS: [(&str, &str); 3] = [
    (CONTRACT_ADDRESS_ENV_KEY, VOTING_SYSTEM_STEP),
    (TOKEN_ADDRESS_ENV_KEY, VOTING_TOKEN_STEP),
    (VOTING_ADDRESS_ENV_KEY, VOTING_SYSTEM_STEP),
];

/// The default log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// The process exit status for a successful run
pub const EXIT_SUCCESS: u8 = 0;

/// The process exit status for a run that failed with an unrecovered error
pub const EXIT_FAILURE: u8 = 1;
