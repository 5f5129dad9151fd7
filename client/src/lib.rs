pub mod abi;
pub mod artifact;
pub mod chain;
pub mod client;
pub mod deploy;
pub mod invoke;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use abi::HashFunction;
pub use artifact::{ArtifactStore, Bytecode};
pub use chain::{Chain, Receipt, Transaction};
pub use client::Client;
pub use deploy::{deploy, Deployed, DeploymentDescriptor};
pub use invoke::{Invoker, Outcome};
use ethers::types::{Address, H256, U256};
use sha1bench_types::{codec, Digest};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid artifact {}: {reason}", path.display())]
    InvalidArtifact { path: PathBuf, reason: String },
    #[error("deployment failed: {0}")]
    Deployment(#[from] DeploymentError),
    #[error("invocation failed: {0}")]
    Invocation(#[from] InvocationError),
    #[error("encoding failed: {0}")]
    Encoding(#[from] codec::Error),
    #[error("invalid interface description: {0}")]
    Abi(String),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid URL scheme: {0} (expected http or https)")]
    InvalidScheme(String),
}

/// Failure to turn bytecode into a callable contract.
#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("creation transaction dropped before it was mined")]
    Dropped,
    #[error("creation transaction {tx_hash:?} reverted (gas used: {gas_used:?})")]
    Reverted {
        tx_hash: H256,
        gas_used: Option<U256>,
    },
    #[error("creation transaction {tx_hash:?} yielded no contract address")]
    NoAddress { tx_hash: H256 },
    #[error("creation transaction {tx_hash:?} left no code at {address:?}")]
    NoCode { address: Address, tx_hash: H256 },
}

/// Failure to obtain a digest from a deployed contract.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("call to {address:?} failed: {reason}")]
    CallFailed { address: Address, reason: String },
    #[error("transaction to {address:?} failed: {reason}")]
    SendFailed { address: Address, reason: String },
    #[error("transaction to {address:?} dropped before it was mined")]
    Dropped { address: Address },
    #[error("transaction {tx_hash:?} reverted (gas used: {gas_used:?})")]
    Reverted {
        tx_hash: H256,
        gas_used: Option<U256>,
    },
    #[error("receipt for {tx_hash:?} has no gas used")]
    MissingGasUsed { tx_hash: H256 },
    #[error("gas used {0} does not fit in 64 bits")]
    GasOverflow(U256),
    #[error("receipt for {tx_hash:?} has no block number")]
    MissingBlock { tx_hash: H256 },
    #[error("invalid output: {0}")]
    Decode(String),
    #[error("mined digest 0x{} differs from call digest 0x{}", hex::encode(mined), hex::encode(call))]
    DigestMismatch { call: Digest, mined: Digest },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
