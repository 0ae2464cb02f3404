//! Groth16 proof encoding for the on-chain BN254 pairing verifier.
//!
//! snarkjs emits points as decimal strings in projective form. The verifier
//! wants fixed-width big-endian coordinates, with `pi_a` already negated so
//! the pairing check reads `e(-A, B) · e(α, β) · e(L, γ) · e(C, δ) = 1`.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::artifact::{ProofArtifact, FIELD_ELEMENT_LEN, G1_LEN, G2_LEN, PUBLIC_SIGNAL_LEN};
use crate::error::ProverError;
use crate::snarkjs::{SnarkjsOutput, SnarkjsProof};

/// BN254 base field modulus (Fq). Curve coordinates live here.
const BN254_BASE_FIELD_MODULUS_DEC: &str =
    "21888242871839275222246405745257275088696311157297823662689037894645226208583";
/// BN254 scalar field modulus (Fr). Public signals live here.
const BN254_SCALAR_FIELD_MODULUS_DEC: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";
const BN254_CURVE_B: u32 = 3;

/// Encodes a snarkjs proof and its public signals into the verifier layout.
pub fn serialize_groth16_proof(output: &SnarkjsOutput) -> Result<ProofArtifact, ProverError> {
    ensure_groth16_bn254(&output.proof)?;
    let proof_a = negate_g1(&g1_uncompressed(&output.proof.pi_a)?)?;
    let proof_b = g2_uncompressed(&output.proof.pi_b)?;
    let proof_c = g1_uncompressed(&output.proof.pi_c)?;
    let public_signals = output
        .public_signals
        .iter()
        .map(|signal| public_signal_to_bytes(signal))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProofArtifact {
        proof_a,
        proof_b,
        proof_c,
        public_signals,
    })
}

/// Serializes a G1 point as `x || y`, each coordinate 32 bytes big-endian.
/// The point at infinity encodes as 64 zero bytes.
pub fn g1_uncompressed(point: &[String]) -> Result<[u8; G1_LEN], ProverError> {
    let (x, y) = match point {
        [x, y] => (x, y),
        [x, y, z] => match z.as_str() {
            "1" => (x, y),
            "0" => return Ok([0u8; G1_LEN]),
            other => {
                return Err(ProverError::Encoding(format!(
                    "g1 point is not affine (z = {other})"
                )))
            }
        },
        _ => {
            return Err(ProverError::Encoding(format!(
                "g1 point has {} coordinates",
                point.len()
            )))
        }
    };
    let x = base_field_element(x)?;
    let y = base_field_element(y)?;
    ensure_on_g1_curve(&x, &y)?;

    let mut out = [0u8; G1_LEN];
    out[..FIELD_ELEMENT_LEN].copy_from_slice(&to_32_byte_buffer(&x)?);
    out[FIELD_ELEMENT_LEN..].copy_from_slice(&to_32_byte_buffer(&y)?);
    Ok(out)
}

/// Serializes a G2 point as `x.c1 || x.c0 || y.c1 || y.c0`.
///
/// snarkjs lists each Fq2 coordinate as `[c0, c1]`; the verifier deserializer
/// reads the imaginary component first.
pub fn g2_uncompressed(point: &[Vec<String>]) -> Result<[u8; G2_LEN], ProverError> {
    let (x, y) = match point {
        [x, y] => (x, y),
        [x, y, z] => match (z.first().map(String::as_str), z.get(1).map(String::as_str)) {
            (Some("1"), Some("0")) => (x, y),
            (Some("0"), Some("0")) => return Ok([0u8; G2_LEN]),
            _ => {
                return Err(ProverError::Encoding(format!(
                    "g2 point is not affine (z = {z:?})"
                )))
            }
        },
        _ => {
            return Err(ProverError::Encoding(format!(
                "g2 point has {} coordinates",
                point.len()
            )))
        }
    };
    let [x_c0, x_c1] = fq2_components(x)?;
    let [y_c0, y_c1] = fq2_components(y)?;

    let mut out = [0u8; G2_LEN];
    for (chunk, component) in out
        .chunks_exact_mut(FIELD_ELEMENT_LEN)
        .zip([x_c1, x_c0, y_c1, y_c0].iter())
    {
        chunk.copy_from_slice(&to_32_byte_buffer(component)?);
    }
    Ok(out)
}

/// Reflects an encoded G1 point across the x-axis: `y := p - y`.
/// Applying it twice returns the original encoding.
pub fn negate_g1(point: &[u8; G1_LEN]) -> Result<[u8; G1_LEN], ProverError> {
    let modulus = base_field_modulus()?;
    let y = BigUint::from_bytes_be(&point[FIELD_ELEMENT_LEN..]);
    if y >= modulus {
        return Err(ProverError::Encoding(
            "g1 y coordinate exceeds base field".to_string(),
        ));
    }
    if y.is_zero() {
        return Ok(*point);
    }
    let negated = &modulus - y;
    let mut out = *point;
    out[FIELD_ELEMENT_LEN..].copy_from_slice(&to_32_byte_buffer(&negated)?);
    Ok(out)
}

/// Right-aligns a decimal public signal into a zero-padded 32-byte buffer.
pub fn public_signal_to_bytes(signal: &str) -> Result<[u8; PUBLIC_SIGNAL_LEN], ProverError> {
    let value = parse_decimal(signal)?;
    let buffer = to_32_byte_buffer(&value)?;
    if value >= scalar_field_modulus()? {
        return Err(ProverError::Encoding(
            "public signal exceeds scalar field".to_string(),
        ));
    }
    Ok(buffer)
}

pub fn to_32_byte_buffer(value: &BigUint) -> Result<[u8; FIELD_ELEMENT_LEN], ProverError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > FIELD_ELEMENT_LEN {
        return Err(ProverError::Encoding(format!(
            "value needs {} bytes, exceeds {FIELD_ELEMENT_LEN}",
            bytes.len()
        )));
    }
    let mut out = [0u8; FIELD_ELEMENT_LEN];
    out[FIELD_ELEMENT_LEN - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

fn ensure_groth16_bn254(proof: &SnarkjsProof) -> Result<(), ProverError> {
    if !proof.protocol.eq_ignore_ascii_case("groth16") {
        return Err(ProverError::Encoding(format!(
            "unsupported proof protocol {}",
            proof.protocol
        )));
    }
    if !proof.curve.eq_ignore_ascii_case("bn128") && !proof.curve.eq_ignore_ascii_case("bn254") {
        return Err(ProverError::Encoding(format!(
            "unsupported proof curve {}",
            proof.curve
        )));
    }
    Ok(())
}

fn fq2_components(coordinate: &[String]) -> Result<[BigUint; 2], ProverError> {
    match coordinate {
        [c0, c1] => Ok([base_field_element(c0)?, base_field_element(c1)?]),
        _ => Err(ProverError::Encoding(format!(
            "fq2 coordinate has {} components",
            coordinate.len()
        ))),
    }
}

fn ensure_on_g1_curve(x: &BigUint, y: &BigUint) -> Result<(), ProverError> {
    let modulus = base_field_modulus()?;
    let lhs = (y * y) % &modulus;
    let rhs = (x * x * x + BigUint::from(BN254_CURVE_B)) % &modulus;
    if lhs != rhs {
        return Err(ProverError::Encoding("g1 point is not on curve".to_string()));
    }
    Ok(())
}

fn base_field_element(value: &str) -> Result<BigUint, ProverError> {
    let element = parse_decimal(value)?;
    if element >= base_field_modulus()? {
        return Err(ProverError::Encoding(
            "coordinate exceeds base field".to_string(),
        ));
    }
    Ok(element)
}

fn parse_decimal(value: &str) -> Result<BigUint, ProverError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProverError::Encoding(format!("invalid decimal {value:?}")));
    }
    BigUint::parse_bytes(value.as_bytes(), 10)
        .ok_or_else(|| ProverError::Encoding(format!("invalid decimal {value:?}")))
}

fn base_field_modulus() -> Result<BigUint, ProverError> {
    BigUint::parse_bytes(BN254_BASE_FIELD_MODULUS_DEC.as_bytes(), 10)
        .ok_or_else(|| ProverError::Encoding("invalid base field modulus".to_string()))
}

fn scalar_field_modulus() -> Result<BigUint, ProverError> {
    BigUint::parse_bytes(BN254_SCALAR_FIELD_MODULUS_DEC.as_bytes(), 10)
        .ok_or_else(|| ProverError::Encoding("invalid scalar field modulus".to_string()))
}
