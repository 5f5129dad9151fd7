use crate::report::{ImplementationRun, Record, Report};
use ethers::types::{Address, U256};
use sha1bench_client::{
    deploy, ArtifactStore, Chain, Deployed, DeploymentDescriptor, HashFunction, Invoker,
};
use sha1bench_types::{
    codec, reference_digest, Implementation, Invocation, Stage, StageError, TestVector,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{implementation} failed at stage {stage}: {source}")]
    Aborted {
        implementation: String,
        stage: Stage,
        #[source]
        source: sha1bench_client::Error,
    },
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Validated settings for a run.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub sender: Address,
    pub gas_limit: U256,
    pub implementations: Vec<String>,
    pub artifacts: ArtifactStore,
}

/// Drives the implementation x vector matrix against a chain.
///
/// Every chain operation is awaited before the next one is issued: the sender's
/// nonce is shared by all deployments and transactions.
pub struct Engine<C: Chain> {
    chain: C,
    function: HashFunction,
    config: EngineConfig,
}

impl<C: Chain> Engine<C> {
    pub fn new(chain: C, function: HashFunction, config: EngineConfig) -> Self {
        Self {
            chain,
            function,
            config,
        }
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Test every implementation in declared order, stopping at the first failure.
    pub async fn run(&self) -> Result<Report, Error> {
        let mut report = Report::default();
        for name in &self.config.implementations {
            let run = self.run_implementation(name).await?;
            report.runs.push(run);
        }

        for inconsistency in report.inconsistencies() {
            let digests: Vec<String> = inconsistency
                .digests
                .iter()
                .map(|(name, digest)| format!("{name}=0x{}", hex::encode(digest)))
                .collect();
            warn!(
                vector = inconsistency.vector,
                digests = %digests.join(" "),
                "implementations disagree"
            );
        }
        info!(
            implementations = report.runs.len(),
            invocations = report.invocations(),
            incorrect = report.incorrect(),
            "run complete"
        );
        Ok(report)
    }

    async fn run_implementation(&self, name: &str) -> Result<ImplementationRun, Error> {
        let mut implementation = Implementation::new(name);
        info!(implementation = %name, "testing implementation");

        let bytecode = self
            .config
            .artifacts
            .load(name)
            .map_err(|source| abort(&mut implementation, source))?;
        advance(&mut implementation, Stage::Loaded)?;

        let descriptor =
            DeploymentDescriptor::new(bytecode, self.config.sender, self.config.gas_limit);
        let deployed = deploy(&self.chain, descriptor)
            .await
            .map_err(|source| abort(&mut implementation, source))?;
        advance(&mut implementation, Stage::Deployed)?;

        let invoker = Invoker::new(
            &self.chain,
            &self.function,
            self.config.sender,
            self.config.gas_limit,
        );
        let mut records = Vec::new();
        for vector in TestVector::all() {
            let record = self
                .run_vector(&invoker, &deployed, vector)
                .await
                .map_err(|source| abort(&mut implementation, source))?;
            records.push(record);
        }
        advance(&mut implementation, Stage::Done)?;

        Ok(ImplementationRun {
            name: name.to_string(),
            address: deployed.address,
            deployment_gas: deployed.gas_used,
            records,
        })
    }

    async fn run_vector(
        &self,
        invoker: &Invoker<'_, C>,
        deployed: &Deployed,
        vector: TestVector,
    ) -> sha1bench_client::Result<Record> {
        let bytes = vector.byte_len();
        info!(
            implementation = %deployed.name,
            vector = vector.index,
            bytes,
            "hashing vector"
        );
        let input = codec::encode(vector.text)?;
        let message = codec::decode_bytes(&input)?;
        let outcome = invoker.invoke(deployed, &message).await?;

        let invocation = Invocation {
            vector: vector.index,
            input,
            digest: outcome.digest,
            gas_used: outcome.gas_used,
        };
        let reference = reference_digest(vector.text);
        let matches_reference = reference == Some(invocation.digest);
        info!(
            implementation = %deployed.name,
            vector = vector.index,
            bytes,
            digest = %invocation.digest_hex(),
            gas_used = invocation.gas_used,
            "vector hashed"
        );
        if !matches_reference {
            warn!(
                implementation = %deployed.name,
                vector = vector.index,
                digest = %invocation.digest_hex(),
                expected = ?reference.map(hex::encode),
                "digest differs from reference"
            );
        }

        Ok(Record {
            implementation: deployed.name.clone(),
            bytes,
            invocation,
            matches_reference,
        })
    }
}

fn advance(implementation: &mut Implementation, to: Stage) -> Result<(), StageError> {
    implementation.advance(to)?;
    debug!(implementation = implementation.name(), stage = %to, "stage changed");
    Ok(())
}

fn abort(implementation: &mut Implementation, source: sha1bench_client::Error) -> Error {
    let stage = implementation.stage();
    if let Err(err) = implementation.fail() {
        return err.into();
    }
    error!(
        implementation = implementation.name(),
        %stage,
        error = %source,
        "implementation failed, aborting run"
    );
    Error::Aborted {
        implementation: implementation.name().to_string(),
        stage,
        source,
    }
}
