use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSimulateTransactionConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::accounts::{decode_mint, PoolState};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::pool::{resolve_pair, resolve_pool, TokenMeta};
use crate::swap::{prepare_confidential_swap, AssembleOptions, PreparedSwap, SwapIntent};
use veilswap_prover::{SnarkjsProver, SwapProver};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 500,
        }
    }
}

/// Retries `f` up to `max_attempts` times. Only used for reads.
pub(crate) async fn with_retry<F, Fut, T>(retry: RetryConfig, mut f: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0usize;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= retry.max_attempts {
                    return Err(err);
                }
                warn!(attempt, error = %err, "rpc read failed, retrying");
                sleep(Duration::from_millis(retry.delay_ms)).await;
            }
        }
    }
}

/// A swap request in the caller's terms: mints and native amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRequest {
    pub source_mint: Pubkey,
    pub dest_mint: Pubkey,
    pub amount: u64,
    pub min_received: u64,
}

/// Outcome of running a prepared swap through RPC simulation.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

impl SimulationReport {
    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

pub struct SwapClient<P: SwapProver> {
    rpc: Arc<RpcClient>,
    prover: P,
    pub program_id: Pubkey,
    pub options: AssembleOptions,
    pub retry: RetryConfig,
}

impl SwapClient<SnarkjsProver> {
    pub fn from_config(config: &ClientConfig) -> Self {
        let rpc = RpcClient::new_with_timeout_and_commitment(
            config.rpc_url.to_string(),
            config.rpc_timeout,
            config.commitment,
        );
        let mut client = SwapClient::new(
            Arc::new(rpc),
            config.program_id,
            SnarkjsProver::from_circuit_dir(&config.circuit_dir),
        );
        client.options = config.assemble;
        client.retry = config.retry.clone();
        client
    }
}

impl<P: SwapProver> SwapClient<P> {
    pub fn new(rpc: Arc<RpcClient>, program_id: Pubkey, prover: P) -> Self {
        Self {
            rpc,
            prover,
            program_id,
            options: AssembleOptions::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Reads a mint's decimals and owning token program.
    pub async fn fetch_token_meta(&self, mint: &Pubkey) -> Result<TokenMeta, ClientError> {
        let rpc = self.rpc.clone();
        let commitment = rpc.commitment();
        let account = with_retry(self.retry.clone(), || async {
            rpc.get_account_with_commitment(mint, commitment)
                .await
                .map(|response| response.value)
                .map_err(|err| ClientError::Rpc(err.to_string()))
        })
        .await?
        .ok_or_else(|| ClientError::InvalidInput(format!("unknown token: mint {mint} not found")))?;
        decode_mint(mint, &account.owner, &account.data)
    }

    pub async fn fetch_pool_state(&self, pool: &Pubkey) -> Result<PoolState, ClientError> {
        let rpc = self.rpc.clone();
        let commitment = rpc.commitment();
        let account = with_retry(self.retry.clone(), || async {
            rpc.get_account_with_commitment(pool, commitment)
                .await
                .map(|response| response.value)
                .map_err(|err| ClientError::Rpc(err.to_string()))
        })
        .await?
        .ok_or_else(|| ClientError::InvalidInput(format!("unknown token pair: pool {pool} not found")))?;
        if account.owner != self.program_id {
            return Err(ClientError::InvalidInput(format!(
                "unknown token pair: {pool} is not owned by the pool program"
            )));
        }
        PoolState::decode(&account.data)
    }

    /// Reads mint metadata and the pool snapshot, then proves and assembles.
    pub async fn prepare_swap(
        &self,
        user: &Pubkey,
        request: &SwapRequest,
    ) -> Result<PreparedSwap, ClientError> {
        resolve_pair(&request.source_mint, &request.dest_mint)?;
        let source = self.fetch_token_meta(&request.source_mint).await?;
        let dest = self.fetch_token_meta(&request.dest_mint).await?;
        let resolved = resolve_pool(&self.program_id, user, &source, &dest)?;
        let pool_state = self.fetch_pool_state(&resolved.pool).await?;
        info!(
            pool = %resolved.pool,
            token0 = %resolved.token0.mint,
            token1 = %resolved.token1.mint,
            "pool resolved"
        );

        let intent = SwapIntent {
            source,
            dest,
            amount: request.amount,
            min_received: request.min_received,
        };
        prepare_confidential_swap(
            &self.program_id,
            user,
            &intent,
            &pool_state,
            &self.prover,
            &self.options,
        )
        .await
    }

    /// Signs against a fresh blockhash and sends. Not retried: a rejected
    /// proof has to be rebuilt from a new pool snapshot.
    pub async fn submit<S: Signer + ?Sized>(
        &self,
        prepared: &PreparedSwap,
        signer: &S,
    ) -> Result<Signature, ClientError> {
        if signer.pubkey() != prepared.payer {
            return Err(ClientError::InvalidInput(format!(
                "signer {} does not match swap payer {}",
                signer.pubkey(),
                prepared.payer
            )));
        }
        let rpc = self.rpc.clone();
        let blockhash = with_retry(self.retry.clone(), || async {
            rpc.get_latest_blockhash()
                .await
                .map_err(|err| ClientError::Rpc(err.to_string()))
        })
        .await?;

        let mut transaction = prepared.transaction();
        transaction
            .try_sign(&[signer], blockhash)
            .map_err(|err| ClientError::Submission(err.to_string()))?;
        let signature = self
            .rpc
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(|err| ClientError::Submission(err.to_string()))?;
        info!(%signature, pool = %prepared.pool, "confidential swap confirmed");
        Ok(signature)
    }

    /// Runs the unsigned transaction through the node's simulator.
    pub async fn simulate(&self, prepared: &PreparedSwap) -> Result<SimulationReport, ClientError> {
        let transaction = prepared.transaction();
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.rpc.commitment()),
            ..RpcSimulateTransactionConfig::default()
        };
        let response = self
            .rpc
            .simulate_transaction_with_config(&transaction, config)
            .await
            .map_err(|err| ClientError::Rpc(err.to_string()))?;
        let result = response.value;
        Ok(SimulationReport {
            err: result.err.map(|err| err.to_string()),
            logs: result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }

    pub async fn swap<S: Signer + ?Sized>(
        &self,
        request: &SwapRequest,
        signer: &S,
    ) -> Result<Signature, ClientError> {
        let prepared = self.prepare_swap(&signer.pubkey(), request).await?;
        self.submit(&prepared, signer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retry_stops_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let retry = RetryConfig {
            max_attempts: 3,
            delay_ms: 1,
        };
        let result: Result<(), ClientError> = with_retry(retry, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Rpc("node unavailable".to_string()))
        })
        .await;
        assert!(matches!(result, Err(ClientError::Rpc(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_returns_first_success() {
        let calls = AtomicUsize::new(0);
        let retry = RetryConfig {
            max_attempts: 5,
            delay_ms: 1,
        };
        let value = with_retry(retry, || async {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            if attempt < 1 {
                Err(ClientError::Rpc("transient".to_string()))
            } else {
                Ok(attempt)
            }
        })
        .await
        .expect("second attempt succeeds");
        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
