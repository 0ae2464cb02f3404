//! Snarkjs proof generation wrapper.
//! Requires the `snarkjs` CLI to be available on PATH.

use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use crate::error::ProverError;
use crate::witness::{generate_swap_witness_inputs, SwapWitnessInputs};
use crate::SwapProver;

pub const SWAP_CIRCUIT_NAME: &str = "swap";
const DEFAULT_NODE_OPTIONS: &str = "--max-old-space-size=8192";

fn write_private_file(path: &Path, data: &[u8]) -> Result<(), ProverError> {
    use std::io::Write;
    let mut options = std::fs::OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(data)?;
    Ok(())
}

/// Proof object as written by `snarkjs groth16 prove`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnarkjsProof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    pub protocol: String,
    pub curve: String,
}

#[derive(Debug, Clone)]
pub struct SnarkjsOutput {
    pub proof: SnarkjsProof,
    pub public_signals: Vec<String>,
}

pub async fn generate_proof_snarkjs(
    circuit_name: &str,
    witness_input: &[u8],
    wasm_path: &Path,
    zkey_path: &Path,
) -> Result<SnarkjsOutput, ProverError> {
    if !wasm_path.exists() {
        return Err(ProverError::MissingArtifact(format!(
            "missing wasm at {}",
            wasm_path.display()
        )));
    }
    if !zkey_path.exists() {
        return Err(ProverError::MissingArtifact(format!(
            "missing zkey at {}",
            zkey_path.display()
        )));
    }

    let workdir = create_workdir(circuit_name)?;
    let dir = workdir.path();
    let input_path = dir.join("input.json");
    let witness_path = dir.join("witness.wtns");
    let proof_path = dir.join("proof.json");
    let public_path = dir.join("public.json");

    write_private_file(&input_path, witness_input)?;

    let started = Instant::now();
    run_snarkjs(
        [
            "wtns",
            "calculate",
            &wasm_path.display().to_string(),
            &input_path.display().to_string(),
            &witness_path.display().to_string(),
        ],
        dir,
    )
    .await?;
    debug!(circuit = circuit_name, elapsed_ms = started.elapsed().as_millis() as u64, "witness calculated");

    run_snarkjs(
        [
            "groth16",
            "prove",
            &zkey_path.display().to_string(),
            &witness_path.display().to_string(),
            &proof_path.display().to_string(),
            &public_path.display().to_string(),
        ],
        dir,
    )
    .await?;
    debug!(circuit = circuit_name, elapsed_ms = started.elapsed().as_millis() as u64, "groth16 proof written");

    let proof_bytes = std::fs::read(&proof_path)?;
    let proof: SnarkjsProof = serde_json::from_slice(&proof_bytes)?;
    let public_bytes = std::fs::read(&public_path)?;
    let public_signals: Vec<String> = serde_json::from_slice(&public_bytes)?;
    Ok(SnarkjsOutput {
        proof,
        public_signals,
    })
}

async fn run_snarkjs<I, S>(args: I, workdir: &Path) -> Result<(), ProverError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut command = Command::new("snarkjs");
    if let Ok(options) = std::env::var("VEILSWAP_NODE_OPTIONS") {
        command.env("NODE_OPTIONS", options);
    } else if std::env::var("NODE_OPTIONS").is_err() {
        command.env("NODE_OPTIONS", DEFAULT_NODE_OPTIONS);
    }
    for arg in args {
        command.arg(arg.as_ref());
    }
    command.current_dir(workdir);
    command.kill_on_drop(true);
    let output = command.output().await.map_err(|err| {
        ProverError::Snarkjs(format!("failed to run snarkjs: {err}"))
    })?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProverError::Snarkjs(format!(
            "snarkjs failed ({}): {stdout} {stderr}",
            describe_status(&output.status)
        )));
    }
    Ok(())
}

#[cfg(unix)]
fn describe_status(status: &std::process::ExitStatus) -> String {
    match (status.code(), status.signal()) {
        (Some(code), _) => format!("exit code {code}"),
        (None, Some(signal)) => format!("terminated by signal {signal}"),
        (None, None) => "terminated".to_string(),
    }
}

#[cfg(not(unix))]
fn describe_status(status: &std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated".to_string(),
    }
}

/// Owner-only scratch directory for one proving run, removed on drop.
fn create_workdir(circuit_name: &str) -> Result<TempDir, ProverError> {
    let dir = tempfile::Builder::new()
        .prefix(&format!("veilswap_snarkjs_{circuit_name}_"))
        .tempdir()?;
    Ok(dir)
}

/// [`SwapProver`] backed by the `snarkjs` CLI and compiled swap circuit artifacts.
#[derive(Debug, Clone)]
pub struct SnarkjsProver {
    wasm_path: PathBuf,
    zkey_path: PathBuf,
}

impl SnarkjsProver {
    pub fn new(wasm_path: impl Into<PathBuf>, zkey_path: impl Into<PathBuf>) -> Self {
        Self {
            wasm_path: wasm_path.into(),
            zkey_path: zkey_path.into(),
        }
    }

    /// Expects `swap.wasm` and `swap_final.zkey` inside `circuit_dir`.
    pub fn from_circuit_dir(circuit_dir: &Path) -> Self {
        Self::new(
            circuit_dir.join(format!("{SWAP_CIRCUIT_NAME}.wasm")),
            circuit_dir.join(format!("{SWAP_CIRCUIT_NAME}_final.zkey")),
        )
    }

    pub fn wasm_path(&self) -> &Path {
        &self.wasm_path
    }

    pub fn zkey_path(&self) -> &Path {
        &self.zkey_path
    }
}

#[async_trait]
impl SwapProver for SnarkjsProver {
    async fn prove(&self, inputs: &SwapWitnessInputs) -> Result<SnarkjsOutput, ProverError> {
        let witness = generate_swap_witness_inputs(inputs)?;
        generate_proof_snarkjs(SWAP_CIRCUIT_NAME, &witness, &self.wasm_path, &self.zkey_path).await
    }
}
