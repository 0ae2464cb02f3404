//! Decoders for the on-chain accounts the swap reads before proving.

use solana_sdk::hash::hash;
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_error::ProgramError;
use spl_token::solana_program::program_pack::Pack;
use spl_token_2022::extension::StateWithExtensions;

use crate::error::ClientError;
use crate::pool::{ResolvedPool, TokenMeta, TokenProgram};

const DISCRIMINATOR_LEN: usize = 8;
const POOL_TOKEN0_OFFSET: usize = DISCRIMINATOR_LEN;
const POOL_TOKEN1_OFFSET: usize = POOL_TOKEN0_OFFSET + 32;
const POOL_RESERVE0_OFFSET: usize = POOL_TOKEN1_OFFSET + 32;
const POOL_RESERVE1_OFFSET: usize = POOL_RESERVE0_OFFSET + 8;
const POOL_MIN_LEN: usize = POOL_RESERVE1_OFFSET + 8;

pub fn account_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("account:{name}");
    let digest = hash(preimage.as_bytes()).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Reserves of a pool in each token's native precision, canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub token0: Pubkey,
    pub token1: Pubkey,
    pub reserve0: u64,
    pub reserve1: u64,
}

impl PoolState {
    pub fn decode(data: &[u8]) -> Result<Self, ClientError> {
        if data.len() < POOL_MIN_LEN {
            return Err(ClientError::Rpc(format!(
                "pool account data too short (len={} need_at_least={POOL_MIN_LEN})",
                data.len()
            )));
        }
        if data[..DISCRIMINATOR_LEN] != account_discriminator("Pool") {
            return Err(ClientError::Rpc("account is not a pool".to_string()));
        }
        Ok(Self {
            token0: read_pubkey(data, POOL_TOKEN0_OFFSET)?,
            token1: read_pubkey(data, POOL_TOKEN1_OFFSET)?,
            reserve0: read_u64(data, POOL_RESERVE0_OFFSET)?,
            reserve1: read_u64(data, POOL_RESERVE1_OFFSET)?,
        })
    }

    /// The pool must hold exactly the resolved pair, in the same order.
    pub fn ensure_matches(&self, resolved: &ResolvedPool) -> Result<(), ClientError> {
        if self.token0 != resolved.token0.mint || self.token1 != resolved.token1.mint {
            return Err(ClientError::InvalidInput(format!(
                "unknown token pair for pool {}",
                resolved.pool
            )));
        }
        Ok(())
    }
}

/// Reads decimals from a mint account and tags it with its owning program.
pub fn decode_mint(mint: &Pubkey, owner: &Pubkey, data: &[u8]) -> Result<TokenMeta, ClientError> {
    let program = TokenProgram::from_owner(owner)?;
    let not_a_mint = |err: ProgramError| {
        ClientError::InvalidInput(format!("unknown token: {mint} is not a mint ({err})"))
    };
    let (decimals, initialized) = match program {
        TokenProgram::Token => {
            let state = spl_token::state::Mint::unpack_unchecked(data).map_err(not_a_mint)?;
            (state.decimals, state.is_initialized)
        }
        TokenProgram::Token2022 => {
            let state =
                StateWithExtensions::<spl_token_2022::state::Mint>::unpack(data).map_err(not_a_mint)?;
            (state.base.decimals, state.base.is_initialized)
        }
    };
    if !initialized {
        return Err(ClientError::InvalidInput(format!(
            "unknown token: mint {mint} is not initialized"
        )));
    }
    Ok(TokenMeta {
        mint: *mint,
        decimals,
        program,
    })
}

fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey, ClientError> {
    let bytes: [u8; 32] = data
        .get(offset..offset + 32)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| ClientError::Rpc("account data truncated".to_string()))?;
    Ok(Pubkey::new_from_array(bytes))
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64, ClientError> {
    let bytes: [u8; 8] = data
        .get(offset..offset + 8)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| ClientError::Rpc("account data truncated".to_string()))?;
    Ok(u64::from_le_bytes(bytes))
}
