use std::path::PathBuf;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;
use solana_sdk::signer::Signer;
use tracing_subscriber::EnvFilter;

use veilswap_client::{
    denormalize, load_config, resolve_pool, ClientConfig, ClientError, NormalizedAmount,
    SwapClient, SwapRequest, TokenAmount, TokenMeta, TokenProgram,
};
use veilswap_prover::signal_hex;

#[derive(Parser)]
#[command(name = "veilswap-cli")]
#[command(about = "confidential swap tooling for solana pools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scale a native amount to the circuit's 9-decimal precision.
    Normalize {
        #[arg(long)]
        amount: u128,
        #[arg(long)]
        decimals: u8,
    },
    Denormalize {
        #[arg(long)]
        value: u128,
        #[arg(long)]
        decimals: u8,
    },
    /// Derive the pool and token accounts for a pair without touching the network.
    Resolve {
        #[arg(long)]
        program_id: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        token_a: String,
        #[arg(long, default_value = "Token")]
        token_a_program: String,
        #[arg(long, default_value_t = 9)]
        token_a_decimals: u8,
        #[arg(long)]
        token_b: String,
        #[arg(long, default_value = "Token")]
        token_b_program: String,
        #[arg(long, default_value_t = 9)]
        token_b_decimals: u8,
    },
    Swap {
        #[arg(long)]
        source_mint: String,
        #[arg(long)]
        dest_mint: String,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        min_received: u64,
        #[arg(long)]
        keypair: PathBuf,
        /// Defaults to `VEILSWAP_CONFIG`, then `veilswap.toml`.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize { amount, decimals } => {
            let normalized = TokenAmount::new(amount, decimals)?.normalize()?;
            println!("normalized={normalized}");
        }
        Commands::Denormalize { value, decimals } => {
            let amount = denormalize(NormalizedAmount::new(value), decimals)?;
            println!("amount={amount}");
        }
        Commands::Resolve {
            program_id,
            user,
            token_a,
            token_a_program,
            token_a_decimals,
            token_b,
            token_b_program,
            token_b_decimals,
        } => {
            let program_id = parse_pubkey("program_id", &program_id)?;
            let user = parse_pubkey("user", &user)?;
            let token_a = TokenMeta {
                mint: parse_pubkey("token_a", &token_a)?,
                decimals: token_a_decimals,
                program: TokenProgram::from_str(&token_a_program)?,
            };
            let token_b = TokenMeta {
                mint: parse_pubkey("token_b", &token_b)?,
                decimals: token_b_decimals,
                program: TokenProgram::from_str(&token_b_program)?,
            };
            let resolved = resolve_pool(&program_id, &user, &token_a, &token_b)?;
            for line in resolved.report_lines() {
                println!("{line}");
            }
        }
        Commands::Swap {
            source_mint,
            dest_mint,
            amount,
            min_received,
            keypair,
            config,
            dry_run,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => ClientConfig::from_env()?,
            };
            let signer = read_keypair_file(&keypair).map_err(|err| {
                ClientError::Config(format!("keypair {}: {err}", keypair.display()))
            })?;
            let request = SwapRequest {
                source_mint: parse_pubkey("source_mint", &source_mint)?,
                dest_mint: parse_pubkey("dest_mint", &dest_mint)?,
                amount,
                min_received,
            };

            let client = SwapClient::from_config(&config);
            let prepared = client.prepare_swap(&signer.pubkey(), &request).await?;
            println!("pool={}", prepared.pool);
            println!("is_swap_x_to_y={}", prepared.is_swap_x_to_y);
            for (index, signal) in prepared.public_signals.iter().enumerate() {
                println!("public_signal_{index}={}", signal_hex(signal));
            }

            if dry_run {
                let encoded = bincode::serialize(&prepared.transaction())
                    .map_err(|err| ClientError::Encoding(err.to_string()))?;
                println!("transaction={}", BASE64.encode(encoded));
                let report = client.simulate(&prepared).await?;
                println!("simulation_ok={}", report.succeeded());
                if let Some(err) = &report.err {
                    println!("simulation_err={err}");
                }
                if let Some(units) = report.units_consumed {
                    println!("units_consumed={units}");
                }
                for line in &report.logs {
                    println!("log={line}");
                }
            } else {
                let signature = client.submit(&prepared, &signer).await?;
                println!("signature={signature}");
            }
        }
    }
    Ok(())
}

fn parse_pubkey(label: &str, value: &str) -> Result<Pubkey, ClientError> {
    Pubkey::from_str(value).map_err(|err| ClientError::InvalidInput(format!("{label}: {err}")))
}
