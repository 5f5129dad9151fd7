use ethers::types::{Address, U256};
use sha1bench_types::{Digest, Invocation};
use std::collections::BTreeMap;

/// Progress record emitted for one (implementation, vector) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub implementation: String,
    pub bytes: usize,
    pub invocation: Invocation,
    /// Whether the digest equals the locally computed SHA-1.
    pub matches_reference: bool,
}

/// Everything measured for one implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplementationRun {
    pub name: String,
    pub address: Address,
    pub deployment_gas: Option<U256>,
    pub records: Vec<Record>,
}

/// A vector for which implementations disagree on the digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inconsistency {
    pub vector: usize,
    pub digests: Vec<(String, Digest)>,
}

/// In-memory outcome of a complete run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub runs: Vec<ImplementationRun>,
}

impl Report {
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.runs.iter().flat_map(|run| run.records.iter())
    }

    pub fn invocations(&self) -> usize {
        self.records().count()
    }

    /// Number of digests that differ from the reference.
    pub fn incorrect(&self) -> usize {
        self.records()
            .filter(|record| !record.matches_reference)
            .count()
    }

    pub fn gas_used(&self, implementation: &str, vector: usize) -> Option<u64> {
        self.records()
            .find(|record| {
                record.implementation == implementation && record.invocation.vector == vector
            })
            .map(|record| record.invocation.gas_used)
    }

    /// Vectors whose digest is not the same across every implementation.
    pub fn inconsistencies(&self) -> Vec<Inconsistency> {
        let mut by_vector: BTreeMap<usize, Vec<(String, Digest)>> = BTreeMap::new();
        for record in self.records() {
            by_vector
                .entry(record.invocation.vector)
                .or_default()
                .push((record.implementation.clone(), record.invocation.digest));
        }
        by_vector
            .into_iter()
            .filter(|(_, digests)| digests.windows(2).any(|pair| pair[0].1 != pair[1].1))
            .map(|(vector, digests)| Inconsistency { vector, digests })
            .collect()
    }
}
