//! Witness input formatting for the swap circuit.

use serde::{Serialize, Serializer};

use crate::error::ProverError;

/// Inputs to the swap circuit, already normalized to canonical precision.
///
/// Field order matches the circuit's input declaration and is preserved in the
/// emitted json. Every value is rendered as a base-10 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapWitnessInputs {
    #[serde(rename = "privateAmount", serialize_with = "as_decimal")]
    pub private_amount: u128,
    #[serde(rename = "privateMinReceived", serialize_with = "as_decimal")]
    pub private_min_received: u128,
    #[serde(rename = "publicBalanceX", serialize_with = "as_decimal")]
    pub public_balance_x: u128,
    #[serde(rename = "publicBalanceY", serialize_with = "as_decimal")]
    pub public_balance_y: u128,
    #[serde(rename = "isSwapXtoY", serialize_with = "as_flag")]
    pub is_swap_x_to_y: bool,
    #[serde(rename = "totalLiquidity", serialize_with = "as_decimal")]
    pub total_liquidity: u128,
}

impl SwapWitnessInputs {
    /// Builds the public half from pool balances; `totalLiquidity` is their checked sum.
    pub fn new(
        private_amount: u128,
        private_min_received: u128,
        public_balance_x: u128,
        public_balance_y: u128,
        is_swap_x_to_y: bool,
    ) -> Result<Self, ProverError> {
        let total_liquidity = public_balance_x
            .checked_add(public_balance_y)
            .ok_or_else(|| ProverError::InvalidInput("total liquidity overflow".to_string()))?;
        Ok(Self {
            private_amount,
            private_min_received,
            public_balance_x,
            public_balance_y,
            is_swap_x_to_y,
            total_liquidity,
        })
    }
}

pub fn generate_swap_witness_inputs(inputs: &SwapWitnessInputs) -> Result<Vec<u8>, ProverError> {
    if inputs.private_amount == 0 {
        return Err(ProverError::InvalidInput("swap amount is zero".to_string()));
    }
    let expected = inputs
        .public_balance_x
        .checked_add(inputs.public_balance_y)
        .ok_or_else(|| ProverError::InvalidInput("total liquidity overflow".to_string()))?;
    if expected != inputs.total_liquidity {
        return Err(ProverError::InvalidInput(
            "total liquidity does not match balances".to_string(),
        ));
    }
    Ok(serde_json::to_vec_pretty(inputs)?)
}

fn as_decimal<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "1" } else { "0" })
}
