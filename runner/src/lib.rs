//! Deploy each SHA-1 contract implementation to a development chain, hash every
//! test vector through it and record the gas each invocation consumed.

pub mod config;
pub mod engine;
pub mod report;

pub use config::{Config, ConfigError};
pub use engine::{Engine, EngineConfig, Error};
pub use report::{ImplementationRun, Inconsistency, Record, Report};
