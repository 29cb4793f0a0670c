//! Scripts for deploying the voting contracts and syncing their addresses into
//! the deployment record and the client environment file.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod deployer;
pub mod env_file;
pub mod errors;
#[cfg(test)]
mod mock;
pub mod observer;
pub mod orchestrator;
pub mod pipeline;
pub mod record;
pub mod types;
pub mod utils;
