use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use url::Url;

use crate::client::RetryConfig;
use crate::error::ClientError;
use crate::swap::{AssembleOptions, DEFAULT_COMPUTE_UNIT_LIMIT};

pub const CONFIG_PATH_ENV: &str = "VEILSWAP_CONFIG";
pub const RPC_TIMEOUT_ENV: &str = "VEILSWAP_RPC_TIMEOUT_SECS";
const DEFAULT_CONFIG_PATH: &str = "veilswap.toml";
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct RawConfig {
    rpc_url: String,
    program_id: String,
    circuit_dir: String,
    commitment: Option<String>,
    compute_unit_limit: Option<u32>,
    create_output_account: Option<bool>,
    rpc_timeout_secs: Option<u64>,
    #[serde(default)]
    retry: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: Url,
    pub program_id: Pubkey,
    pub circuit_dir: PathBuf,
    pub commitment: CommitmentConfig,
    pub rpc_timeout: Duration,
    pub retry: RetryConfig,
    pub assemble: AssembleOptions,
}

impl ClientConfig {
    /// Loads the file named by `VEILSWAP_CONFIG`, or `veilswap.toml`.
    pub fn from_env() -> Result<Self, ClientError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = load_config(&path)?;
        if let Ok(value) = std::env::var(RPC_TIMEOUT_ENV) {
            config.rpc_timeout = Duration::from_secs(parse_timeout_secs(&value)?);
        }
        Ok(config)
    }
}

/// Reads and validates a config file. Relative `circuit_dir` paths are taken
/// from the file's own directory.
pub fn load_config(path: &Path) -> Result<ClientConfig, ClientError> {
    let contents = fs::read_to_string(path)
        .map_err(|err| ClientError::Config(format!("{}: {err}", path.display())))?;
    let raw: RawConfig = toml::from_str(&contents)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    finalize_config(raw, &base_dir)
}

fn finalize_config(raw: RawConfig, base_dir: &Path) -> Result<ClientConfig, ClientError> {
    let rpc_url =
        Url::parse(&raw.rpc_url).map_err(|err| ClientError::Config(format!("rpc_url: {err}")))?;
    let program_id = Pubkey::from_str(&raw.program_id)
        .map_err(|err| ClientError::Config(format!("program_id: {err}")))?;
    let commitment = match raw.commitment.as_deref() {
        Some(value) => parse_commitment(value)?,
        None => CommitmentConfig::confirmed(),
    };
    let compute_unit_limit = raw.compute_unit_limit.unwrap_or(DEFAULT_COMPUTE_UNIT_LIMIT);
    if compute_unit_limit == 0 {
        return Err(ClientError::Config(
            "compute_unit_limit must be >= 1".to_string(),
        ));
    }
    let rpc_timeout_secs = raw.rpc_timeout_secs.unwrap_or(DEFAULT_RPC_TIMEOUT_SECS);
    if rpc_timeout_secs == 0 {
        return Err(ClientError::Config(
            "rpc_timeout_secs must be >= 1".to_string(),
        ));
    }
    if raw.retry.max_attempts == 0 {
        return Err(ClientError::Config(
            "retry.max_attempts must be >= 1".to_string(),
        ));
    }

    Ok(ClientConfig {
        rpc_url,
        program_id,
        circuit_dir: resolve_path(base_dir, &raw.circuit_dir),
        commitment,
        rpc_timeout: Duration::from_secs(rpc_timeout_secs),
        retry: raw.retry,
        assemble: AssembleOptions {
            compute_unit_limit,
            create_output_account: raw.create_output_account.unwrap_or(false),
        },
    })
}

pub fn parse_commitment(value: &str) -> Result<CommitmentConfig, ClientError> {
    match value {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(ClientError::Config(format!("unknown commitment {other}"))),
    }
}

fn parse_timeout_secs(value: &str) -> Result<u64, ClientError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ClientError::Config(format!(
            "{RPC_TIMEOUT_ENV} must be a positive integer, got {value:?}"
        ))),
    }
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PROGRAM_ID: &str = "8pFFKVUUGgBuyiZm5pFnNRhxG9XZ9ufUD6fZa6Q1bHHD";

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("veilswap.toml");
        let mut file = fs::File::create(&path).expect("create config");
        file.write_all(body.as_bytes()).expect("write config");
        path
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            dir.path(),
            &format!(
                "rpc_url = \"http://127.0.0.1:8899\"\nprogram_id = \"{PROGRAM_ID}\"\ncircuit_dir = \"artifacts/swap\"\n"
            ),
        );
        let config = load_config(&path).expect("load");
        assert_eq!(config.circuit_dir, dir.path().join("artifacts/swap"));
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
        assert_eq!(config.rpc_timeout, Duration::from_secs(60));
        assert_eq!(config.assemble, AssembleOptions::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 500);
        assert_eq!(config.program_id.to_string(), PROGRAM_ID);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            dir.path(),
            &format!(
                r#"
rpc_url = "https://api.devnet.solana.com"
program_id = "{PROGRAM_ID}"
circuit_dir = "/opt/circuits/swap"
commitment = "finalized"
compute_unit_limit = 1400000
create_output_account = true
rpc_timeout_secs = 15

[retry]
max_attempts = 5
delay_ms = 100
"#
            ),
        );
        let config = load_config(&path).expect("load");
        assert_eq!(config.circuit_dir, PathBuf::from("/opt/circuits/swap"));
        assert_eq!(config.commitment, CommitmentConfig::finalized());
        assert_eq!(config.assemble.compute_unit_limit, 1_400_000);
        assert!(config.assemble.create_output_account);
        assert_eq!(config.rpc_timeout, Duration::from_secs(15));
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn invalid_fields_are_config_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cases = [
            format!("rpc_url = \"not a url\"\nprogram_id = \"{PROGRAM_ID}\"\ncircuit_dir = \".\"\n"),
            "rpc_url = \"http://localhost:8899\"\nprogram_id = \"xyz\"\ncircuit_dir = \".\"\n"
                .to_string(),
            format!(
                "rpc_url = \"http://localhost:8899\"\nprogram_id = \"{PROGRAM_ID}\"\ncircuit_dir = \".\"\ncommitment = \"max\"\n"
            ),
            format!(
                "rpc_url = \"http://localhost:8899\"\nprogram_id = \"{PROGRAM_ID}\"\ncircuit_dir = \".\"\nrpc_timeout_secs = 0\n"
            ),
            "rpc_url = \"http://localhost:8899\"\n".to_string(),
        ];
        for body in cases {
            let path = write_config(dir.path(), &body);
            match load_config(&path) {
                Err(ClientError::Config(_)) => {}
                other => panic!("expected config error for {body:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = load_config(Path::new("/nonexistent/veilswap.toml")).expect_err("missing");
        match err {
            ClientError::Config(msg) => assert!(msg.contains("/nonexistent/veilswap.toml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn timeout_override_must_be_positive() {
        assert_eq!(parse_timeout_secs("30").expect("valid"), 30);
        assert!(parse_timeout_secs("0").is_err());
        assert!(parse_timeout_secs("soon").is_err());
    }
}
