//! Veilswap client SDK: prepares and submits confidential swaps.

mod accounts;
mod client;
mod config;
mod error;
mod normalize;
mod pool;
mod swap;

pub use accounts::{account_discriminator, decode_mint, PoolState};
pub use client::{RetryConfig, SimulationReport, SwapClient, SwapRequest};
pub use config::{load_config, parse_commitment, ClientConfig, CONFIG_PATH_ENV, RPC_TIMEOUT_ENV};
pub use error::ClientError;
pub use normalize::{
    denormalize, normalize, NormalizedAmount, TokenAmount, CANONICAL_DECIMALS, MAX_TOKEN_DECIMALS,
};
pub use pool::{
    associated_token_address, derive_pool_address, resolve_pair, resolve_pool, PoolSide,
    ResolvedPool, TokenMeta, TokenProgram, ASSOCIATED_TOKEN_PROGRAM_ID, POOL_SEED,
    TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use swap::{
    anchor_discriminator, assemble_swap, build_witness_inputs, compute_budget_instruction,
    confidential_swap_accounts, confidential_swap_instruction, encode_confidential_swap_data,
    prepare_confidential_swap, AssembleOptions, PreparedSwap, SwapIntent,
    COMPUTE_BUDGET_PROGRAM_ID, CONFIDENTIAL_SWAP_METHOD, DEFAULT_COMPUTE_UNIT_LIMIT,
    PUBLIC_SIGNAL_COUNT,
};
