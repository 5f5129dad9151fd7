use ethers::types::{
    Address, Bytes, TransactionReceipt, TransactionRequest, H256, U256, U64,
};
use std::future::Future;

/// A transaction (or read-only call) from a fixed sender.
///
/// A transaction without a recipient creates a contract from `data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub from: Address,
    pub to: Option<Address>,
    pub gas: Option<U256>,
    pub data: Bytes,
}

impl Transaction {
    pub fn create(from: Address, gas: U256, code: Bytes) -> Self {
        Self {
            from,
            to: None,
            gas: Some(gas),
            data: code,
        }
    }

    pub fn call(from: Address, to: Address, gas: U256, data: Bytes) -> Self {
        Self {
            from,
            to: Some(to),
            gas: Some(gas),
            data,
        }
    }
}

impl From<Transaction> for TransactionRequest {
    fn from(tx: Transaction) -> Self {
        let mut request = TransactionRequest::new().from(tx.from).data(tx.data);
        if let Some(to) = tx.to {
            request = request.to(to);
        }
        if let Some(gas) = tx.gas {
            request = request.gas(gas);
        }
        request
    }
}

/// The parts of a mined transaction's receipt the harness looks at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: H256,
    pub success: bool,
    pub contract_address: Option<Address>,
    pub gas_used: Option<U256>,
    pub block_number: Option<u64>,
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            success: receipt.status != Some(U64::zero()),
            contract_address: receipt.contract_address,
            gas_used: receipt.gas_used,
            block_number: receipt.block_number.map(|number| number.as_u64()),
        }
    }
}

/// Trait for interacting with a chain node on behalf of an unlocked sender.
///
/// Every method resolves only once the node has answered (and, for `send`, once
/// the transaction is mined), so callers that await each call in turn never
/// have more than one transaction in flight.
pub trait Chain {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit a transaction and wait for its receipt.
    ///
    /// Resolves to `None` if the transaction was dropped before being mined.
    fn send(
        &self,
        tx: Transaction,
    ) -> impl Future<Output = Result<Option<Receipt>, Self::Error>> + Send;

    /// Execute `tx` without recording it, at `block` or at the latest block.
    fn call(
        &self,
        tx: Transaction,
        block: Option<u64>,
    ) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;

    /// Runtime code stored at `address` in the latest block.
    fn code_at(&self, address: Address) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
}
