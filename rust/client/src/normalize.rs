//! Fixed-point rescaling between a token's native precision and the
//! circuit's canonical precision.

use crate::error::ClientError;

/// Fractional digits of every amount fed to the swap circuit.
pub const CANONICAL_DECIMALS: u8 = 9;
/// Largest precision an SPL mint can declare that we still model.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// An amount in a token's native precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub amount: u128,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(amount: u128, decimals: u8) -> Result<Self, ClientError> {
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(ClientError::InvalidInput(format!(
                "token decimals {decimals} exceed {MAX_TOKEN_DECIMALS}"
            )));
        }
        Ok(Self { amount, decimals })
    }

    pub fn normalize(&self) -> Result<NormalizedAmount, ClientError> {
        normalize(self.amount, self.decimals)
    }
}

/// An amount at [`CANONICAL_DECIMALS`] precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct NormalizedAmount(u128);

impl NormalizedAmount {
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    pub fn get(self) -> u128 {
        self.0
    }

    pub fn checked_add(self, other: NormalizedAmount) -> Result<NormalizedAmount, ClientError> {
        self.0
            .checked_add(other.0)
            .map(NormalizedAmount)
            .ok_or_else(|| ClientError::InvalidInput("normalized sum overflow".to_string()))
    }
}

impl std::fmt::Display for NormalizedAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `amount * 10^(9 - decimals)`.
pub fn normalize(amount: u128, decimals: u8) -> Result<NormalizedAmount, ClientError> {
    let factor = scale_factor(decimals)?;
    amount
        .checked_mul(factor)
        .map(NormalizedAmount)
        .ok_or_else(|| ClientError::InvalidInput("normalized amount overflow".to_string()))
}

/// Inverse of [`normalize`]. Fails rather than truncating when the value is
/// not a whole number of native units.
pub fn denormalize(value: NormalizedAmount, decimals: u8) -> Result<u128, ClientError> {
    let factor = scale_factor(decimals)?;
    if value.0 % factor != 0 {
        return Err(ClientError::InvalidInput(format!(
            "{} is not representable at {decimals} decimals",
            value.0
        )));
    }
    Ok(value.0 / factor)
}

fn scale_factor(decimals: u8) -> Result<u128, ClientError> {
    if decimals > CANONICAL_DECIMALS {
        return Err(ClientError::InvalidInput(format!(
            "token decimals {decimals} exceed canonical precision {CANONICAL_DECIMALS}"
        )));
    }
    Ok(10u128.pow(u32::from(CANONICAL_DECIMALS - decimals)))
}
