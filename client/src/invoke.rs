use crate::{
    abi::HashFunction,
    chain::{Chain, Transaction},
    deploy::Deployed,
    InvocationError, Result,
};
use ethers::types::{Address, Bytes, H256, U256};
use sha1bench_types::Digest;
use tracing::debug;

/// Digest and cost of hashing one input with a deployed contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub digest: Digest,
    pub gas_used: u64,
    pub tx_hash: H256,
    pub block_number: u64,
}

/// Issues read-only and state-changing calls of the hash function from a fixed
/// sender.
pub struct Invoker<'a, C: Chain> {
    chain: &'a C,
    function: &'a HashFunction,
    sender: Address,
    gas_limit: U256,
}

impl<'a, C: Chain> Invoker<'a, C> {
    pub fn new(chain: &'a C, function: &'a HashFunction, sender: Address, gas_limit: U256) -> Self {
        Self {
            chain,
            function,
            sender,
            gas_limit,
        }
    }

    /// Compute the digest of `message` without recording a transaction.
    pub async fn call(&self, contract: &Deployed, message: &[u8]) -> Result<Digest> {
        let calldata = self.function.encode_input(message)?;
        self.call_at(contract, calldata, None).await
    }

    /// Hash `message` with a read-only call, then again as a mined transaction.
    ///
    /// The mined transaction returns no data, so its digest is recovered by
    /// replaying the call against the block it was mined in. The two digests
    /// must match; gas is taken from the transaction's receipt.
    pub async fn invoke(&self, contract: &Deployed, message: &[u8]) -> Result<Outcome> {
        let address = contract.address;
        let calldata = self.function.encode_input(message)?;
        let digest = self.call_at(contract, calldata.clone(), None).await?;

        let receipt = self
            .chain
            .send(Transaction::call(self.sender, address, self.gas_limit, calldata.clone()))
            .await
            .map_err(|err| InvocationError::SendFailed {
                address,
                reason: err.to_string(),
            })?
            .ok_or(InvocationError::Dropped { address })?;
        if !receipt.success {
            return Err(InvocationError::Reverted {
                tx_hash: receipt.tx_hash,
                gas_used: receipt.gas_used,
            }
            .into());
        }
        let gas_used = receipt.gas_used.ok_or(InvocationError::MissingGasUsed {
            tx_hash: receipt.tx_hash,
        })?;
        if gas_used > U256::from(u64::MAX) {
            return Err(InvocationError::GasOverflow(gas_used).into());
        }
        let block_number = receipt.block_number.ok_or(InvocationError::MissingBlock {
            tx_hash: receipt.tx_hash,
        })?;

        let mined = self.call_at(contract, calldata, Some(block_number)).await?;
        if mined != digest {
            return Err(InvocationError::DigestMismatch {
                call: digest,
                mined,
            }
            .into());
        }

        debug!(
            name = %contract.name,
            tx_hash = %format!("{:#x}", receipt.tx_hash),
            block_number,
            %gas_used,
            "hash transaction mined"
        );
        Ok(Outcome {
            digest,
            gas_used: gas_used.as_u64(),
            tx_hash: receipt.tx_hash,
            block_number,
        })
    }

    async fn call_at(
        &self,
        contract: &Deployed,
        calldata: Bytes,
        block: Option<u64>,
    ) -> Result<Digest> {
        let address = contract.address;
        let output = self
            .chain
            .call(
                Transaction::call(self.sender, address, self.gas_limit, calldata),
                block,
            )
            .await
            .map_err(|err| InvocationError::CallFailed {
                address,
                reason: err.to_string(),
            })?;
        self.function.decode_output(&output)
    }
}
