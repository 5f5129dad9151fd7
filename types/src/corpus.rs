//! The fixed inputs shared by every run: which implementations to deploy, what to
//! feed them, and the interface they all expose.

use crate::{codec, matrix::Digest};
use sha1::{Digest as _, Sha1};

/// Artifact file names, in the order they are deployed.
pub const IMPLEMENTATIONS: [&str; 4] = [
    "sha1_lll.hex",
    "sha1_sol.hex",
    "sha1_lll_opt.hex",
    "sha1_sol_opt.hex",
];

/// Interface description shared verbatim by all implementations: a single
/// constant function mapping `bytes` to `bytes20`, in the legacy
/// `constant`/`payable` form the contracts were compiled against.
pub const SHA1_ABI: &str = r#"[{"constant":true,"inputs":[{"name":"message","type":"bytes"}],"name":"sha1","outputs":[{"name":"ret","type":"bytes20"}],"payable":false,"type":"function"}]"#;

/// Name of the function declared in [`SHA1_ABI`].
pub const SHA1_FUNCTION: &str = "sha1";

/// Test inputs, in the order they are run against each deployment.
///
/// Covers a single byte, text spanning one and several SHA-1 blocks, and inputs
/// sitting exactly on the 64-byte block boundary.
pub const VECTORS: [&str; 5] = [
    "e",
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor \
     incididunt ut labore et dolore magna aliqua.",
    "Ethereum is a decentralized platform that runs smart contracts: applications that \
     run exactly as programmed without any possibility of downtime, censorship, fraud or \
     third party interference. These apps run on a custom built blockchain, an enormously \
     powerful shared global infrastructure that can move value around and represent the \
     ownership of property. This enables developers to create markets, store registries \
     of debts or promises, move funds in accordance with instructions given long in the \
     past (like a will or a futures contract) and many other things that have not been \
     invented yet, all without a middle man or counterparty risk. The project was \
     bootstrapped via an ether presale in August 2014 by fans all around the world. It is \
     developed by the Ethereum Foundation, a Swiss nonprofit, with contributions from \
     great minds across the globe.",
    "1234567890123456789012345678901234567890123456789012345678901234",
    "12345678901234567890123456789012345678901234567890123456789012345678901234567890\
     123456789012345678901234567890123456789012345678",
];

/// SHA-1 of the single-byte encoding of `text`, computed locally.
///
/// Returns `None` when `text` cannot be encoded (and therefore never reaches a
/// contract).
pub fn reference_digest(text: &str) -> Option<Digest> {
    let bytes = codec::encode_bytes(text).ok()?;
    Some(Sha1::digest(bytes).into())
}
