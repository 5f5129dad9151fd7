pub mod codec;
pub mod corpus;
pub mod matrix;

pub use corpus::{reference_digest, IMPLEMENTATIONS, SHA1_ABI, SHA1_FUNCTION, VECTORS};
pub use matrix::{Digest, Implementation, Invocation, Stage, StageError, TestVector, DIGEST_LENGTH};
