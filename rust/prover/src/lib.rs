//! Groth16 proof generation and encoding for the confidential swap verifier.

mod artifact;
mod error;
mod groth16;
mod snarkjs;
mod witness;

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

pub use crate::artifact::{
    signal_hex, ProofArtifact, FIELD_ELEMENT_LEN, G1_LEN, G2_LEN, PUBLIC_SIGNAL_LEN,
};
pub use crate::error::ProverError;
pub use crate::groth16::{
    g1_uncompressed, g2_uncompressed, negate_g1, public_signal_to_bytes, serialize_groth16_proof,
    to_32_byte_buffer,
};
pub use crate::snarkjs::{
    generate_proof_snarkjs, SnarkjsOutput, SnarkjsProof, SnarkjsProver, SWAP_CIRCUIT_NAME,
};
pub use crate::witness::{generate_swap_witness_inputs, SwapWitnessInputs};

/// Proving engine for the swap circuit.
///
/// Given normalized circuit inputs, returns the raw proof and the ordered
/// public signals. Implementations must not retry internally: a failed proof
/// is surfaced to the caller, whose pool snapshot may already be stale.
#[async_trait]
pub trait SwapProver: Send + Sync {
    async fn prove(&self, inputs: &SwapWitnessInputs) -> Result<SnarkjsOutput, ProverError>;
}

#[async_trait]
impl<P: SwapProver + ?Sized> SwapProver for std::sync::Arc<P> {
    async fn prove(&self, inputs: &SwapWitnessInputs) -> Result<SnarkjsOutput, ProverError> {
        (**self).prove(inputs).await
    }
}

/// Runs the prover and encodes its output for the on-chain verifier.
pub async fn prove_swap<P: SwapProver + ?Sized>(
    prover: &P,
    inputs: &SwapWitnessInputs,
) -> Result<ProofArtifact, ProverError> {
    let started = Instant::now();
    let output = prover.prove(inputs).await?;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        public_signals = output.public_signals.len(),
        "swap proof generated"
    );
    let artifact = serialize_groth16_proof(&output)?;
    debug!(signals = ?artifact.public_signals_hex(), "swap proof encoded");
    Ok(artifact)
}
