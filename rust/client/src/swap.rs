use solana_sdk::hash::hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use tracing::{debug, info};

use crate::accounts::PoolState;
use crate::error::ClientError;
use crate::normalize::normalize;
use crate::pool::{resolve_pool, ResolvedPool, TokenMeta, ASSOCIATED_TOKEN_PROGRAM_ID};
use veilswap_prover::{
    prove_swap, ProofArtifact, SwapProver, SwapWitnessInputs, G1_LEN, G2_LEN, PUBLIC_SIGNAL_LEN,
};

pub const CONFIDENTIAL_SWAP_METHOD: &str = "confidential_swap";
/// Pairing verification needs far more than the default per-instruction budget.
pub const DEFAULT_COMPUTE_UNIT_LIMIT: u32 = 2_000_000;
/// The verifier checks the two post-swap balances.
pub const PUBLIC_SIGNAL_COUNT: usize = 2;

// Deprecated in solana-sdk 2.1; the interface crates replacing them need solana 2.2.
#[allow(deprecated)]
pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey = solana_sdk::compute_budget::ID;
#[allow(deprecated)]
const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::system_program::ID;

/// What the caller wants, in source/destination terms and native precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapIntent {
    pub source: TokenMeta,
    pub dest: TokenMeta,
    pub amount: u64,
    pub min_received: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    pub compute_unit_limit: u32,
    /// Prepend an idempotent ATA creation for the user's destination account.
    pub create_output_account: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            compute_unit_limit: DEFAULT_COMPUTE_UNIT_LIMIT,
            create_output_account: false,
        }
    }
}

/// A swap ready for signing.
#[derive(Debug, Clone)]
pub struct PreparedSwap {
    pub payer: Pubkey,
    pub pool: Pubkey,
    pub is_swap_x_to_y: bool,
    pub instructions: Vec<Instruction>,
    pub public_signals: Vec<[u8; PUBLIC_SIGNAL_LEN]>,
}

impl PreparedSwap {
    /// Unsigned transaction; the blockhash is filled in by the submitter.
    pub fn transaction(&self) -> Transaction {
        Transaction::new_with_payer(&self.instructions, Some(&self.payer))
    }
}

/// Normalizes the intent and pool reserves into circuit inputs.
///
/// Reserves are scaled with their own side's decimals, the amount with the
/// source token's and the minimum with the destination token's.
pub fn build_witness_inputs(
    intent: &SwapIntent,
    resolved: &ResolvedPool,
    pool_state: &PoolState,
) -> Result<SwapWitnessInputs, ClientError> {
    if intent.amount == 0 {
        return Err(ClientError::InvalidInput("swap amount is zero".to_string()));
    }
    let amount = normalize(u128::from(intent.amount), intent.source.decimals)?;
    let min_received = normalize(u128::from(intent.min_received), intent.dest.decimals)?;
    let balance_x = normalize(u128::from(pool_state.reserve0), resolved.token0.decimals)?;
    let balance_y = normalize(u128::from(pool_state.reserve1), resolved.token1.decimals)?;
    SwapWitnessInputs::new(
        amount.get(),
        min_received.get(),
        balance_x.get(),
        balance_y.get(),
        resolved.is_swap_x_to_y,
    )
    .map_err(ClientError::from)
}

pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let digest = hash(preimage.as_bytes()).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Instruction data: discriminator, `proof_a`, `proof_b`, `proof_c` as fixed
/// arrays, then the public signals as a length-prefixed vector.
pub fn encode_confidential_swap_data(artifact: &ProofArtifact) -> Result<Vec<u8>, ClientError> {
    if artifact.public_signals.len() != PUBLIC_SIGNAL_COUNT {
        return Err(ClientError::Encoding(format!(
            "expected {PUBLIC_SIGNAL_COUNT} public signals, got {}",
            artifact.public_signals.len()
        )));
    }
    let mut data = Vec::with_capacity(
        8 + G1_LEN + G2_LEN + G1_LEN + 4 + PUBLIC_SIGNAL_COUNT * PUBLIC_SIGNAL_LEN,
    );
    data.extend_from_slice(&anchor_discriminator(CONFIDENTIAL_SWAP_METHOD));
    data.extend_from_slice(&artifact.proof_a);
    data.extend_from_slice(&artifact.proof_b);
    data.extend_from_slice(&artifact.proof_c);
    data.extend_from_slice(&(artifact.public_signals.len() as u32).to_le_bytes());
    for signal in &artifact.public_signals {
        data.extend_from_slice(signal);
    }
    Ok(data)
}

/// Account metas in the program's fixed layout, always token0/token1 order.
pub fn confidential_swap_accounts(resolved: &ResolvedPool) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(resolved.pool, false),
        AccountMeta::new(resolved.token0.user_account, false), // user_token_account_in
        AccountMeta::new(resolved.token1.user_account, false), // user_token_account_out
        AccountMeta::new(resolved.token0.pool_account, false),
        AccountMeta::new(resolved.token1.pool_account, false),
        AccountMeta::new(resolved.token0.mint, false),
        AccountMeta::new(resolved.token1.mint, false),
        AccountMeta::new(resolved.user, true),
        AccountMeta::new_readonly(resolved.token0.program.id(), false),
        AccountMeta::new_readonly(resolved.token1.program.id(), false),
        AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ]
}

pub fn confidential_swap_instruction(
    resolved: &ResolvedPool,
    artifact: ProofArtifact,
) -> Result<Instruction, ClientError> {
    Ok(Instruction {
        program_id: resolved.program_id,
        accounts: confidential_swap_accounts(resolved),
        data: encode_confidential_swap_data(&artifact)?,
    })
}

#[allow(deprecated)]
pub fn compute_budget_instruction(units: u32) -> Instruction {
    solana_sdk::compute_budget::ComputeBudgetInstruction::set_compute_unit_limit(units)
}

/// Pure structural composition: compute budget first, then the optional
/// output-account creation, then the swap itself.
pub fn assemble_swap(
    resolved: &ResolvedPool,
    artifact: ProofArtifact,
    options: &AssembleOptions,
) -> Result<PreparedSwap, ClientError> {
    let public_signals = artifact.public_signals.clone();
    let mut instructions = vec![compute_budget_instruction(options.compute_unit_limit)];
    if options.create_output_account {
        let dest = resolved.destination();
        instructions.push(create_associated_token_account_idempotent(
            &resolved.user,
            &resolved.user,
            &dest.mint,
            &dest.program.id(),
        ));
    }
    instructions.push(confidential_swap_instruction(resolved, artifact)?);
    Ok(PreparedSwap {
        payer: resolved.user,
        pool: resolved.pool,
        is_swap_x_to_y: resolved.is_swap_x_to_y,
        instructions,
        public_signals,
    })
}

/// Runs the whole pipeline against an already fetched pool snapshot.
///
/// Everything that can be rejected locally is rejected before the prover is
/// called. The snapshot is not re-read after proving; if the pool moves in
/// between, the verifier rejects the stale public signals.
pub async fn prepare_confidential_swap<P: SwapProver + ?Sized>(
    program_id: &Pubkey,
    user: &Pubkey,
    intent: &SwapIntent,
    pool_state: &PoolState,
    prover: &P,
    options: &AssembleOptions,
) -> Result<PreparedSwap, ClientError> {
    let resolved = resolve_pool(program_id, user, &intent.source, &intent.dest)?;
    pool_state.ensure_matches(&resolved)?;
    let inputs = build_witness_inputs(intent, &resolved, pool_state)?;
    debug!(
        pool = %resolved.pool,
        is_swap_x_to_y = resolved.is_swap_x_to_y,
        balance_x = inputs.public_balance_x,
        balance_y = inputs.public_balance_y,
        "swap inputs normalized"
    );

    let artifact = prove_swap(prover, &inputs).await?;
    let prepared = assemble_swap(&resolved, artifact, options)?;
    info!(
        pool = %prepared.pool,
        instructions = prepared.instructions.len(),
        "confidential swap assembled"
    );
    Ok(prepared)
}
