//! Entities of the implementation x vector test matrix.

use crate::corpus::VECTORS;
use std::fmt;
use thiserror::Error;

/// Size of every digest returned by a hash implementation.
pub const DIGEST_LENGTH: usize = 20;

pub type Digest = [u8; DIGEST_LENGTH];

/// One entry of the fixed input corpus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestVector {
    pub index: usize,
    pub text: &'static str,
}

impl TestVector {
    /// All vectors of the corpus, in declared order.
    pub fn all() -> impl Iterator<Item = TestVector> {
        VECTORS
            .iter()
            .enumerate()
            .map(|(index, text)| TestVector { index, text })
    }

    /// Length of the input once encoded (one byte per character).
    pub fn byte_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Progress of a single implementation through a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    NotLoaded,
    Loaded,
    Deployed,
    Done,
    Failed,
}

impl Stage {
    /// The stage that follows a successful step, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::NotLoaded => Some(Stage::Loaded),
            Stage::Loaded => Some(Stage::Deployed),
            Stage::Deployed => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::NotLoaded => "not_loaded",
            Stage::Loaded => "loaded",
            Stage::Deployed => "deployed",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name}: cannot move from {from} to {to}")]
pub struct StageError {
    pub name: String,
    pub from: Stage,
    pub to: Stage,
}

/// An implementation under test and where it is in its lifecycle.
#[derive(Clone, Debug)]
pub struct Implementation {
    name: String,
    stage: Stage,
}

impl Implementation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: Stage::NotLoaded,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to `to`, which must directly follow the current stage.
    pub fn advance(&mut self, to: Stage) -> Result<(), StageError> {
        if self.stage.next() != Some(to) {
            return Err(StageError {
                name: self.name.clone(),
                from: self.stage,
                to,
            });
        }
        self.stage = to;
        Ok(())
    }

    /// Mark the implementation as failed. A finished implementation cannot fail.
    pub fn fail(&mut self) -> Result<(), StageError> {
        if self.stage.is_terminal() {
            return Err(StageError {
                name: self.name.clone(),
                from: self.stage,
                to: Stage::Failed,
            });
        }
        self.stage = Stage::Failed;
        Ok(())
    }
}

/// Result of running one vector against one deployed implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub vector: usize,
    /// `0x`-prefixed input as passed to the contract.
    pub input: String,
    pub digest: Digest,
    pub gas_used: u64,
}

impl Invocation {
    pub fn digest_hex(&self) -> String {
        format!("0x{}", hex::encode(self.digest))
    }
}
