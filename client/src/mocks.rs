//! In-memory chain for exercising deployment and invocation without a node.

use crate::{
    abi::HashFunction,
    chain::{Chain, Receipt, Transaction},
};
use ethers::{
    abi::Token,
    types::{Address, Bytes, H256, U256},
    utils::{get_contract_address, keccak256},
};
use sha1::{Digest as _, Sha1};
use sha1bench_types::{Digest, SHA1_ABI};
use std::{collections::HashMap, sync::Mutex};
use thiserror::Error;

/// How the contract created from a given bytecode behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Behavior {
    /// Returns the SHA-1 of its input.
    #[default]
    Correct,
    /// Returns a digest that is not the SHA-1 of its input.
    WrongDigest,
    /// Every read-only call reverts.
    RevertCalls,
    /// Calls succeed but every transaction reverts.
    RevertSends,
    /// Creation runs out of gas.
    OutOfGas,
    /// Creation is mined successfully but reports no contract address.
    NoAddress,
    /// Creation is mined and reports an address, but no code is stored there.
    NoCode,
    /// Transactions are never mined.
    Dropped,
    /// Calls pinned to a block return a different digest than calls at the latest block.
    Diverge,
}

/// A request observed by [`MockChain`], in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Create { from: Address, code: Vec<u8> },
    Transact { from: Address, to: Address },
    Call { to: Address, block: Option<u64> },
    GetCode { address: Address },
}

#[derive(Error, Debug)]
pub enum MockError {
    #[error("connection refused")]
    Offline,
    #[error("execution reverted")]
    Reverted,
    #[error("unknown block {0}")]
    UnknownBlock(u64),
}

#[derive(Default)]
struct State {
    behaviors: HashMap<Vec<u8>, Behavior>,
    contracts: HashMap<Address, Vec<u8>>,
    nonces: HashMap<Address, u64>,
    block: u64,
    offline: bool,
    operations: Vec<Operation>,
}

impl State {
    fn behavior(&self, code: &[u8]) -> Behavior {
        self.behaviors.get(code).copied().unwrap_or_default()
    }

    fn next_nonce(&mut self, sender: Address) -> u64 {
        let nonce = self.nonces.entry(sender).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }

    fn mine(&mut self) -> u64 {
        self.block += 1;
        self.block
    }
}

/// A single-sender chain that executes hash contracts natively.
pub struct MockChain {
    function: HashFunction,
    state: Mutex<State>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            function: HashFunction::parse(SHA1_ABI).expect("built-in interface is valid"),
            state: Mutex::new(State::default()),
        }
    }

    /// Make contracts created from `code` behave as `behavior`.
    pub fn program(&self, code: &[u8], behavior: Behavior) {
        let mut state = self.state.lock().unwrap();
        state.behaviors.insert(code.to_vec(), behavior);
    }

    /// Fail every subsequent request as if the node were unreachable.
    pub fn go_offline(&self) {
        self.state.lock().unwrap().offline = true;
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().unwrap().block
    }

    fn calldata_gas(data: &[u8]) -> u64 {
        data.iter().map(|byte| if *byte == 0 { 4 } else { 16 }).sum()
    }

    fn creation_gas(code: &[u8]) -> U256 {
        U256::from(53_000 + 200 * code.len() as u64 + Self::calldata_gas(code))
    }

    fn execution_gas(code: &[u8], calldata: &[u8], message: &[u8]) -> U256 {
        // One compression round per 64-byte block, padding included.
        let rounds = (message.len() as u64 + 8) / 64 + 1;
        let per_round = 1_000 + 100 * code.len() as u64;
        U256::from(21_000 + Self::calldata_gas(calldata) + rounds * per_round)
    }
}

fn tx_hash(sender: Address, nonce: u64) -> H256 {
    H256::from(keccak256([sender.as_bytes(), &nonce.to_be_bytes()].concat()))
}

impl Chain for MockChain {
    type Error = MockError;

    async fn send(&self, tx: Transaction) -> Result<Option<Receipt>, MockError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(MockError::Offline);
        }
        let Some(to) = tx.to else {
            state.operations.push(Operation::Create {
                from: tx.from,
                code: tx.data.to_vec(),
            });
            let behavior = state.behavior(&tx.data);
            if behavior == Behavior::Dropped {
                return Ok(None);
            }
            let nonce = state.next_nonce(tx.from);
            let block = state.mine();
            let mut receipt = Receipt {
                tx_hash: tx_hash(tx.from, nonce),
                success: true,
                contract_address: None,
                gas_used: Some(Self::creation_gas(&tx.data)),
                block_number: Some(block),
            };
            match behavior {
                Behavior::OutOfGas => {
                    receipt.success = false;
                    receipt.gas_used = tx.gas;
                }
                Behavior::NoAddress => {}
                Behavior::NoCode => {
                    receipt.contract_address = Some(get_contract_address(tx.from, nonce));
                }
                _ => {
                    let address = get_contract_address(tx.from, nonce);
                    state.contracts.insert(address, tx.data.to_vec());
                    receipt.contract_address = Some(address);
                }
            }
            return Ok(Some(receipt));
        };

        state.operations.push(Operation::Transact { from: tx.from, to });
        let code = state.contracts.get(&to).cloned().unwrap_or_default();
        let behavior = state.behavior(&code);
        if behavior == Behavior::Dropped {
            return Ok(None);
        }
        let nonce = state.next_nonce(tx.from);
        let block = state.mine();
        let message = self.function.decode_input(&tx.data).unwrap_or_default();
        let (success, gas_used) = match behavior {
            Behavior::RevertCalls | Behavior::RevertSends => (false, tx.gas),
            _ => (true, Some(Self::execution_gas(&code, &tx.data, &message))),
        };
        Ok(Some(Receipt {
            tx_hash: tx_hash(tx.from, nonce),
            success,
            contract_address: None,
            gas_used,
            block_number: Some(block),
        }))
    }

    async fn call(&self, tx: Transaction, block: Option<u64>) -> Result<Bytes, MockError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(MockError::Offline);
        }
        let Some(to) = tx.to else {
            return Ok(Bytes::new());
        };
        state.operations.push(Operation::Call { to, block });
        if let Some(number) = block {
            if number > state.block {
                return Err(MockError::UnknownBlock(number));
            }
        }
        let Some(code) = state.contracts.get(&to) else {
            return Ok(Bytes::new());
        };
        let behavior = state.behavior(code);
        let message = self
            .function
            .decode_input(&tx.data)
            .ok_or(MockError::Reverted)?;
        let mut digest: Digest = Sha1::digest(&message).into();
        match behavior {
            Behavior::RevertCalls => return Err(MockError::Reverted),
            Behavior::WrongDigest => digest[0] ^= 0xff,
            Behavior::Diverge if block.is_some() => digest = Digest::default(),
            _ => {}
        }
        Ok(ethers::abi::encode(&[Token::FixedBytes(digest.to_vec())]).into())
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, MockError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(MockError::Offline);
        }
        state.operations.push(Operation::GetCode { address });
        Ok(state
            .contracts
            .get(&address)
            .cloned()
            .map(Bytes::from)
            .unwrap_or_default())
    }
}
