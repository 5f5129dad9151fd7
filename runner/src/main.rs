use anyhow::{anyhow, Context, Result};
use clap::Parser;
use sha1bench_client::{Client, HashFunction};
use sha1bench_runner::{Config, Engine};
use sha1bench_types::SHA1_ABI;
use std::{env, path::PathBuf};
use tracing::info;

const ENV_RPC_URL: &str = "SHA1BENCH_RPC_URL";
const ENV_SENDER: &str = "SHA1BENCH_SENDER";
const ENV_GAS_LIMIT: &str = "SHA1BENCH_GAS_LIMIT";
const ENV_ARTIFACTS_DIR: &str = "SHA1BENCH_ARTIFACTS_DIR";
const ENV_ABI: &str = "SHA1BENCH_ABI";
const ENV_LOG_LEVEL: &str = "SHA1BENCH_LOG_LEVEL";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML config file; flags and environment variables override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the development node.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Unlocked account used for every deployment and transaction.
    #[arg(long)]
    sender: Option<String>,

    #[arg(long)]
    gas_limit: Option<u64>,

    /// Directory holding the compiled bytecode artifacts.
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,

    /// Artifact to test (repeatable). Defaults to all four implementations.
    #[arg(long = "implementation")]
    implementations: Vec<String>,

    /// JSON interface description to use instead of the built-in one.
    #[arg(long)]
    abi: Option<PathBuf>,

    /// Blocks to wait for after a transaction is mined.
    #[arg(long)]
    confirmations: Option<usize>,

    /// Receipt polling interval in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn env_u64(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    env(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| anyhow!("invalid {key}: {value}"))
        })
        .transpose()
}

/// Resolve settings: flags, then environment, then the config file, then defaults.
fn build_config(args: &Args, env: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(rpc_url) = env(ENV_RPC_URL) {
        config.rpc_url = rpc_url;
    }
    if let Some(sender) = env(ENV_SENDER) {
        config.sender = sender;
    }
    if let Some(gas_limit) = env_u64(&env, ENV_GAS_LIMIT)? {
        config.gas_limit = gas_limit;
    }
    if let Some(dir) = env(ENV_ARTIFACTS_DIR) {
        config.artifacts_dir = PathBuf::from(dir);
    }
    if let Some(abi) = env(ENV_ABI) {
        config.abi_path = Some(PathBuf::from(abi));
    }
    if let Some(level) = env(ENV_LOG_LEVEL) {
        config.log_level = level;
    }

    if let Some(rpc_url) = &args.rpc_url {
        config.rpc_url = rpc_url.clone();
    }
    if let Some(sender) = &args.sender {
        config.sender = sender.clone();
    }
    if let Some(gas_limit) = args.gas_limit {
        config.gas_limit = gas_limit;
    }
    if let Some(dir) = &args.artifacts_dir {
        config.artifacts_dir = dir.clone();
    }
    if !args.implementations.is_empty() {
        config.implementations = args.implementations.clone();
    }
    if let Some(abi) = &args.abi {
        config.abi_path = Some(abi.clone());
    }
    if let Some(confirmations) = args.confirmations {
        config.confirmations = confirmations;
    }
    if let Some(poll_interval_ms) = args.poll_interval_ms {
        config.poll_interval_ms = poll_interval_ms;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if args.log_json {
        config.log_json = true;
    }

    // Surface bad values before anything touches the chain.
    config.engine_config()?;
    config.level()?;
    Ok(config)
}

fn init_tracing(config: &Config) -> Result<()> {
    let level = config.level()?;
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .init();
    } else {
        tracing_subscriber::fmt().with_max_level(level).init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args, |key| env::var(key).ok())?;
    init_tracing(&config)?;

    let function = match &config.abi_path {
        Some(path) => HashFunction::load(path)
            .with_context(|| format!("failed to load ABI from {}", path.display()))?,
        None => HashFunction::parse(SHA1_ABI).context("built-in ABI is invalid")?,
    };
    let client = Client::new(&config.rpc_url)
        .context("failed to create client")?
        .with_confirmations(config.confirmations)
        .with_poll_interval(config.poll_interval());

    info!(
        rpc_url = %config.rpc_url,
        sender = %config.sender,
        gas_limit = config.gas_limit,
        implementations = config.implementations.len(),
        artifacts_dir = %config.artifacts_dir.display(),
        "starting SHA-1 benchmark"
    );
    let engine = Engine::new(client, function, config.engine_config()?);
    engine.run().await.context("benchmark aborted")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_flags() {
        let args = Args::parse_from(["sha1bench"]);
        let config = build_config(&args, no_env).expect("config should parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn flags_override_environment() {
        let args = Args::parse_from([
            "sha1bench",
            "--rpc-url",
            "http://node:8545",
            "--gas-limit",
            "5000000",
            "--implementation",
            "sha1_sol.hex",
            "--implementation",
            "sha1_sol_opt.hex",
            "--log-json",
        ]);
        let env = env_from(&[
            (ENV_RPC_URL, "http://other:8545"),
            (ENV_GAS_LIMIT, "6000000"),
            (ENV_ARTIFACTS_DIR, "/tmp/artifacts"),
        ]);
        let config = build_config(&args, env).expect("config should parse");
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.gas_limit, 5_000_000);
        assert_eq!(config.artifacts_dir, PathBuf::from("/tmp/artifacts"));
        assert_eq!(config.implementations, vec!["sha1_sol.hex", "sha1_sol_opt.hex"]);
        assert!(config.log_json);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sha1bench.yaml");
        std::fs::write(&path, "gas_limit: 3000000\nlog_level: debug\nconfirmations: 2\n").unwrap();
        let path = path.to_string_lossy().into_owned();
        let args = Args::parse_from(["sha1bench", "--config", path.as_str()]);

        let config = build_config(&args, env_from(&[(ENV_LOG_LEVEL, "warn")]))
            .expect("config should parse");
        assert_eq!(config.gas_limit, 3_000_000);
        assert_eq!(config.confirmations, 2);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn rejects_bad_checksum() {
        let args = Args::parse_from([
            "sha1bench",
            "--sender",
            "0x90f8bf6A479f320ead074411a4B0e7944Ea8c9C1",
        ]);
        let err = build_config(&args, no_env).unwrap_err();
        assert!(err.to_string().contains("checksum"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_non_http_rpc_url() {
        let args = Args::parse_from(["sha1bench", "--rpc-url", "ws://localhost:8546"]);
        let err = build_config(&args, no_env).unwrap_err();
        assert!(err.to_string().contains("invalid rpc_url"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_zero_gas_limit() {
        let args = Args::parse_from(["sha1bench", "--gas-limit", "0"]);
        let err = build_config(&args, no_env).unwrap_err();
        assert!(err.to_string().contains("gas_limit"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_unparseable_env_gas_limit() {
        let args = Args::parse_from(["sha1bench"]);
        let err = build_config(&args, env_from(&[(ENV_GAS_LIMIT, "lots")])).unwrap_err();
        assert!(err.to_string().contains(ENV_GAS_LIMIT), "unexpected error: {err}");
    }

    #[test]
    fn rejects_unknown_log_level() {
        let args = Args::parse_from(["sha1bench", "--log-level", "chatty"]);
        let err = build_config(&args, no_env).unwrap_err();
        assert!(err.to_string().contains("chatty"), "unexpected error: {err}");
    }
}
