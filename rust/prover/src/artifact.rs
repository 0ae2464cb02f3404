//! Wire layout of a proof as consumed by the on-chain Groth16 verifier.

/// Width of one BN254 base-field element, big-endian.
pub const FIELD_ELEMENT_LEN: usize = 32;
/// Uncompressed G1 point: `x || y`.
pub const G1_LEN: usize = 64;
/// Uncompressed G2 point: `x.c1 || x.c0 || y.c1 || y.c0`.
pub const G2_LEN: usize = 128;
/// One public signal, zero-padded big-endian.
pub const PUBLIC_SIGNAL_LEN: usize = 32;

/// Encoded proof ready to be placed in the swap instruction. Produced once per
/// swap attempt and moved into the assembler.
#[derive(Debug, PartialEq, Eq)]
pub struct ProofArtifact {
    pub proof_a: [u8; G1_LEN],
    pub proof_b: [u8; G2_LEN],
    pub proof_c: [u8; G1_LEN],
    pub public_signals: Vec<[u8; PUBLIC_SIGNAL_LEN]>,
}

/// `0x`-prefixed hex of one encoded signal, for logs and CLI output.
pub fn signal_hex(signal: &[u8; PUBLIC_SIGNAL_LEN]) -> String {
    format!("0x{}", hex::encode(signal))
}

impl ProofArtifact {
    pub fn public_signals_hex(&self) -> Vec<String> {
        self.public_signals.iter().map(signal_hex).collect()
    }
}
