use crate::{
    chain::{Chain, Receipt, Transaction},
    Error, Result,
};
use ethers::{
    providers::{Http, Middleware, Provider, ProviderError},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockId, BlockNumber, Bytes,
        TransactionRequest,
    },
};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default number of blocks a transaction must be buried under before its
/// receipt is returned.
const DEFAULT_CONFIRMATIONS: usize = 1;

/// JSON-RPC client for a development node with an unlocked sender account.
#[derive(Clone, Debug)]
pub struct Client {
    provider: Provider<Http>,
    confirmations: usize,
}

impl Client {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }
        let provider = Provider::new(Http::new(url));
        Ok(Self {
            provider,
            confirmations: DEFAULT_CONFIRMATIONS,
        })
    }

    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// How often to poll for receipts of pending transactions.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.provider = self.provider.interval(interval);
        self
    }

    pub fn confirmations(&self) -> usize {
        self.confirmations
    }
}

impl Chain for Client {
    type Error = ProviderError;

    async fn send(&self, tx: Transaction) -> std::result::Result<Option<Receipt>, ProviderError> {
        let request: TransactionRequest = tx.into();
        let pending = self.provider.send_transaction(request, None).await?;
        debug!(tx_hash = %format!("{:#x}", pending.tx_hash()), "transaction submitted");
        let receipt = pending.confirmations(self.confirmations).await?;
        Ok(receipt.map(Receipt::from))
    }

    async fn call(
        &self,
        tx: Transaction,
        block: Option<u64>,
    ) -> std::result::Result<Bytes, ProviderError> {
        let request = typed_request(tx);
        let block = block.map(|number| BlockId::Number(BlockNumber::Number(number.into())));
        self.provider.call(&request, block).await
    }

    async fn code_at(&self, address: Address) -> std::result::Result<Bytes, ProviderError> {
        self.provider.get_code(address, None).await
    }
}

fn typed_request(tx: Transaction) -> TypedTransaction {
    let request: TransactionRequest = tx.into();
    request.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    #[test]
    fn test_client_invalid_scheme() {
        let result = Client::new("ftp://localhost:8545");
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(matches!(err, Error::InvalidScheme(_)));
            assert_eq!(
                err.to_string(),
                "invalid URL scheme: ftp (expected http or https)"
            );
        }

        // Test valid http scheme
        let result = Client::new("http://localhost:8545");
        assert!(result.is_ok());

        // Test valid https scheme
        let result = Client::new("https://localhost:8545");
        assert!(result.is_ok());
    }

    #[test]
    fn test_client_invalid_url() {
        let err = Client::new("not a url").unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_typed_request_keeps_call_fields() {
        let from = Address::repeat_byte(0x90);
        let to = Address::repeat_byte(0x42);
        let gas = U256::from(4_000_000u64);
        let tx = Transaction::call(from, to, gas, Bytes::from(vec![0x16, 0x05]));
        let request = typed_request(tx);
        assert_eq!(request.from(), Some(&from));
        assert_eq!(request.to_addr(), Some(&to));
        assert_eq!(request.gas(), Some(&gas));
        assert_eq!(request.data(), Some(&Bytes::from(vec![0x16, 0x05])));
    }

    #[test]
    fn test_client_confirmations_floor() {
        let client = Client::new("http://localhost:8545").unwrap();
        assert_eq!(client.confirmations(), DEFAULT_CONFIRMATIONS);
        assert_eq!(client.clone().with_confirmations(0).confirmations(), 1);
        assert_eq!(client.with_confirmations(3).confirmations(), 3);
    }
}
