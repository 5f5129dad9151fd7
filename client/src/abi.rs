//! Interface description handling for hash contracts.

use crate::{Error, InvocationError, Result};
use ethers::{
    abi::{Abi, Function, ParamType, Token},
    types::Bytes,
};
use sha1bench_types::{Digest, DIGEST_LENGTH};
use std::{fs, path::Path};

/// The single function a hash contract exposes: `bytes` in, `bytes20` out.
#[derive(Clone, Debug)]
pub struct HashFunction {
    function: Function,
}

impl HashFunction {
    /// Parse a JSON interface description.
    pub fn parse(json: &str) -> Result<Self> {
        let abi: Abi = serde_json::from_str(json).map_err(|err| Error::Abi(err.to_string()))?;
        Self::from_abi(&abi)
    }

    /// Read and parse a JSON interface description from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    pub fn from_abi(abi: &Abi) -> Result<Self> {
        let mut functions = abi.functions();
        let function = functions
            .next()
            .ok_or_else(|| Error::Abi("no function declared".to_string()))?;
        if functions.next().is_some() {
            return Err(Error::Abi("more than one function declared".to_string()));
        }
        if function.inputs.len() != 1 || function.inputs[0].kind != ParamType::Bytes {
            return Err(Error::Abi(format!(
                "{} must take a single bytes argument",
                function.name
            )));
        }
        if function.outputs.len() != 1
            || function.outputs[0].kind != ParamType::FixedBytes(DIGEST_LENGTH)
        {
            return Err(Error::Abi(format!(
                "{} must return a single bytes{DIGEST_LENGTH}",
                function.name
            )));
        }
        Ok(Self {
            function: function.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Calldata invoking the function with `message`.
    pub fn encode_input(&self, message: &[u8]) -> Result<Bytes> {
        self.function
            .encode_input(&[Token::Bytes(message.to_vec())])
            .map(Bytes::from)
            .map_err(|err| Error::Abi(err.to_string()))
    }

    /// Message carried by calldata produced by [`HashFunction::encode_input`].
    #[cfg(any(test, feature = "mocks"))]
    pub fn decode_input(&self, calldata: &[u8]) -> Option<Vec<u8>> {
        if calldata.len() < 4 {
            return None;
        }
        let (selector, args) = calldata.split_at(4);
        if selector != &self.function.short_signature()[..] {
            return None;
        }
        match self.function.decode_input(args).ok()?.as_slice() {
            [Token::Bytes(message)] => Some(message.clone()),
            _ => None,
        }
    }

    /// Digest returned by a call to the function.
    pub fn decode_output(&self, output: &[u8]) -> Result<Digest> {
        let tokens = self
            .function
            .decode_output(output)
            .map_err(|err| InvocationError::Decode(err.to_string()))?;
        match tokens.as_slice() {
            [Token::FixedBytes(bytes)] => Digest::try_from(bytes.as_slice()).map_err(|_| {
                InvocationError::Decode(format!("digest of {} bytes", bytes.len())).into()
            }),
            _ => Err(InvocationError::Decode(format!("unexpected output {tokens:?}")).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha1bench_types::SHA1_ABI;

    #[test]
    fn test_parse_builtin_abi() {
        let function = HashFunction::parse(SHA1_ABI).unwrap();
        assert_eq!(function.name(), "sha1");
    }

    #[test]
    fn test_encode_input_layout() {
        let function = HashFunction::parse(SHA1_ABI).unwrap();
        let calldata = function.encode_input(b"e").unwrap();

        // selector + offset word + length word + one padded data word
        assert_eq!(calldata.len(), 4 + 3 * 32);
        assert_eq!(&calldata[..4], &ethers::utils::id("sha1(bytes)")[..]);
        assert_eq!(calldata[4 + 31], 0x20);
        assert_eq!(calldata[4 + 63], 1);
        assert_eq!(calldata[4 + 64], b'e');

        assert_eq!(function.decode_input(&calldata), Some(b"e".to_vec()));
        assert_eq!(function.decode_input(&calldata[..3]), None);
    }

    #[test]
    fn test_decode_output() {
        let function = HashFunction::parse(SHA1_ABI).unwrap();
        let digest = [0x5au8; DIGEST_LENGTH];
        let output = ethers::abi::encode(&[Token::FixedBytes(digest.to_vec())]);
        assert_eq!(function.decode_output(&output).unwrap(), digest);
    }

    #[test]
    fn test_decode_empty_output() {
        let function = HashFunction::parse(SHA1_ABI).unwrap();
        let err = function.decode_output(&[]).unwrap_err();
        assert!(matches!(err, Error::Invocation(InvocationError::Decode(_))));
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        let cases = [
            ("[]", "no function declared"),
            (
                r#"[{"inputs":[{"name":"m","type":"string"}],"name":"sha1","outputs":[{"name":"r","type":"bytes20"}],"stateMutability":"view","type":"function"}]"#,
                "sha1 must take a single bytes argument",
            ),
            (
                r#"[{"inputs":[{"name":"m","type":"bytes"}],"name":"sha1","outputs":[{"name":"r","type":"bytes32"}],"stateMutability":"view","type":"function"}]"#,
                "sha1 must return a single bytes20",
            ),
            (
                r#"[{"inputs":[{"name":"m","type":"bytes"}],"name":"a","outputs":[{"name":"r","type":"bytes20"}],"stateMutability":"view","type":"function"},{"inputs":[{"name":"m","type":"bytes"}],"name":"b","outputs":[{"name":"r","type":"bytes20"}],"stateMutability":"view","type":"function"}]"#,
                "more than one function declared",
            ),
        ];
        for (json, reason) in cases {
            let err = HashFunction::parse(json).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("invalid interface description: {reason}")
            );
        }
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(HashFunction::parse("{"), Err(Error::Abi(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HashFunction::load(&dir.path().join("sha1.abi")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
