use crate::{
    artifact::Bytecode,
    chain::{Chain, Transaction},
    DeploymentError, Result,
};
use ethers::types::{Address, Bytes, H256, U256};
use tracing::{debug, info};

/// Everything needed to publish one implementation. Built fresh for each
/// deployment and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentDescriptor {
    pub name: String,
    pub code: Bytes,
    pub sender: Address,
    pub gas_limit: U256,
}

impl DeploymentDescriptor {
    pub fn new(bytecode: Bytecode, sender: Address, gas_limit: U256) -> Self {
        Self {
            name: bytecode.name,
            code: bytecode.code,
            sender,
            gas_limit,
        }
    }
}

/// A contract instance created from a [`DeploymentDescriptor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployed {
    pub name: String,
    pub address: Address,
    pub tx_hash: H256,
    pub gas_used: Option<U256>,
}

/// Publish the descriptor's bytecode and wait until the contract is mined.
///
/// A mined creation that reverted, produced no address, or left no code behind
/// is a [`DeploymentError`]; the returned handle always has code at its address.
pub async fn deploy<C: Chain>(chain: &C, descriptor: DeploymentDescriptor) -> Result<Deployed> {
    let DeploymentDescriptor {
        name,
        code,
        sender,
        gas_limit,
    } = descriptor;
    debug!(name = %name, bytes = code.len(), ?sender, %gas_limit, "submitting creation transaction");

    let receipt = chain
        .send(Transaction::create(sender, gas_limit, code))
        .await
        .map_err(|err| DeploymentError::Rpc(err.to_string()))?
        .ok_or(DeploymentError::Dropped)?;
    if !receipt.success {
        return Err(DeploymentError::Reverted {
            tx_hash: receipt.tx_hash,
            gas_used: receipt.gas_used,
        }
        .into());
    }
    let address = receipt.contract_address.ok_or(DeploymentError::NoAddress {
        tx_hash: receipt.tx_hash,
    })?;
    // Nodes without receipt status report failed creations as mined.
    let runtime = chain
        .code_at(address)
        .await
        .map_err(|err| DeploymentError::Rpc(err.to_string()))?;
    if runtime.is_empty() {
        return Err(DeploymentError::NoCode {
            address,
            tx_hash: receipt.tx_hash,
        }
        .into());
    }

    info!(
        name = %name,
        address = %format!("{address:#x}"),
        tx_hash = %format!("{:#x}", receipt.tx_hash),
        gas_used = ?receipt.gas_used,
        "contract deployed"
    );
    Ok(Deployed {
        name,
        address,
        tx_hash: receipt.tx_hash,
        gas_used: receipt.gas_used,
    })
}
