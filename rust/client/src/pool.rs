//! Canonical ordering of a token pair and the addresses derived from it.
//!
//! Callers think in source/destination terms; the pool program only knows
//! token0/token1. [`resolve_pool`] is the one place where that translation
//! happens, everything downstream receives canonical order.

use std::fmt;
use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::error::ClientError;

pub const POOL_SEED: &[u8] = b"pool";

pub const TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;
pub const TOKEN_2022_PROGRAM_ID: Pubkey = spl_token_2022::ID;
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = spl_associated_token_account::ID;

/// Account program a mint belongs to. The two are not interchangeable: token
/// accounts and ATAs are derived and owned per program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenProgram {
    Token,
    Token2022,
}

impl TokenProgram {
    pub fn id(self) -> Pubkey {
        match self {
            TokenProgram::Token => TOKEN_PROGRAM_ID,
            TokenProgram::Token2022 => TOKEN_2022_PROGRAM_ID,
        }
    }

    /// Identifies the program from the owner of a mint account.
    pub fn from_owner(owner: &Pubkey) -> Result<Self, ClientError> {
        if *owner == TOKEN_PROGRAM_ID {
            Ok(TokenProgram::Token)
        } else if *owner == TOKEN_2022_PROGRAM_ID {
            Ok(TokenProgram::Token2022)
        } else {
            Err(ClientError::InvalidInput(format!(
                "unknown token: mint owned by {owner}"
            )))
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TokenProgram::Token => "Token",
            TokenProgram::Token2022 => "Token-2022",
        }
    }
}

impl fmt::Display for TokenProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TokenProgram {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "token" | "spl-token" => Ok(TokenProgram::Token),
            "token-2022" | "token2022" | "spl-token-2022" => Ok(TokenProgram::Token2022),
            _ => Err(ClientError::InvalidInput(format!(
                "unknown token program {value}"
            ))),
        }
    }
}

/// A mint together with what the pipeline needs to know about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMeta {
    pub mint: Pubkey,
    pub decimals: u8,
    pub program: TokenProgram,
}

/// One side of a pool in canonical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSide {
    pub mint: Pubkey,
    pub decimals: u8,
    pub program: TokenProgram,
    pub user_account: Pubkey,
    pub pool_account: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPool {
    pub program_id: Pubkey,
    pub pool: Pubkey,
    pub bump: u8,
    pub user: Pubkey,
    pub token0: PoolSide,
    pub token1: PoolSide,
    /// True when the caller's source token is token0.
    pub is_swap_x_to_y: bool,
}

impl ResolvedPool {
    pub fn source(&self) -> &PoolSide {
        if self.is_swap_x_to_y {
            &self.token0
        } else {
            &self.token1
        }
    }

    pub fn destination(&self) -> &PoolSide {
        if self.is_swap_x_to_y {
            &self.token1
        } else {
            &self.token0
        }
    }

    /// `key=value` lines describing the pool and the four token accounts.
    pub fn report_lines(&self) -> Vec<String> {
        vec![
            format!("pool={}", self.pool),
            format!("bump={}", self.bump),
            format!("token0={}", self.token0.mint),
            format!("token0_program={}", self.token0.program),
            format!("token1={}", self.token1.mint),
            format!("token1_program={}", self.token1.program),
            format!("is_swap_x_to_y={}", self.is_swap_x_to_y),
            format!("user_token0_account={}", self.token0.user_account),
            format!("user_token1_account={}", self.token1.user_account),
            format!("pool_token0_account={}", self.token0.pool_account),
            format!("pool_token1_account={}", self.token1.pool_account),
        ]
    }
}

/// Orders two mints by their raw bytes. Equal mints cannot form a pool.
pub fn resolve_pair(token_a: &Pubkey, token_b: &Pubkey) -> Result<(Pubkey, Pubkey), ClientError> {
    match token_a.to_bytes().cmp(&token_b.to_bytes()) {
        std::cmp::Ordering::Less => Ok((*token_a, *token_b)),
        std::cmp::Ordering::Greater => Ok((*token_b, *token_a)),
        std::cmp::Ordering::Equal => Err(ClientError::InvalidInput(
            "source and destination token are the same".to_string(),
        )),
    }
}

/// PDA of `["pool", token0, token1]`; the pair must already be canonical.
pub fn derive_pool_address(program_id: &Pubkey, token0: &Pubkey, token1: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_SEED, token0.as_ref(), token1.as_ref()], program_id)
}

pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, program: TokenProgram) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, &program.id())
}

/// Resolves pool identity and the four token accounts for a swap from
/// `source` to `dest` made by `user`.
pub fn resolve_pool(
    program_id: &Pubkey,
    user: &Pubkey,
    source: &TokenMeta,
    dest: &TokenMeta,
) -> Result<ResolvedPool, ClientError> {
    let (token0_mint, _) = resolve_pair(&source.mint, &dest.mint)?;
    let is_swap_x_to_y = source.mint == token0_mint;
    let (meta0, meta1) = if is_swap_x_to_y {
        (source, dest)
    } else {
        (dest, source)
    };
    let (pool, bump) = derive_pool_address(program_id, &meta0.mint, &meta1.mint);
    let side = |meta: &TokenMeta| PoolSide {
        mint: meta.mint,
        decimals: meta.decimals,
        program: meta.program,
        user_account: associated_token_address(user, &meta.mint, meta.program),
        pool_account: associated_token_address(&pool, &meta.mint, meta.program),
    };
    Ok(ResolvedPool {
        program_id: *program_id,
        pool,
        bump,
        user: *user,
        token0: side(meta0),
        token1: side(meta1),
        is_swap_x_to_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn meta(byte: u8, decimals: u8, program: TokenProgram) -> TokenMeta {
        TokenMeta {
            mint: key(byte),
            decimals,
            program,
        }
    }

    #[test]
    fn report_lines_differ_only_in_direction() {
        let program_id = key(200);
        let user = key(50);
        let classic = meta(7, 6, TokenProgram::Token);
        let extended = meta(3, 9, TokenProgram::Token2022);
        let forward = resolve_pool(&program_id, &user, &classic, &extended)
            .expect("resolve")
            .report_lines();
        let backward = resolve_pool(&program_id, &user, &extended, &classic)
            .expect("resolve")
            .report_lines();
        assert_eq!(forward.len(), 11);
        for (index, (a, b)) in forward.iter().zip(&backward).enumerate() {
            if a.starts_with("is_swap_x_to_y=") {
                assert_eq!(a, "is_swap_x_to_y=false");
                assert_eq!(b, "is_swap_x_to_y=true");
            } else {
                assert_eq!(a, b, "line {index}");
            }
        }
        assert!(forward.contains(&format!("token0={}", extended.mint)));
        assert!(forward.contains(&"token0_program=Token-2022".to_string()));
        assert!(forward.contains(&format!(
            "user_token1_account={}",
            associated_token_address(&user, &classic.mint, TokenProgram::Token)
        )));
    }

    #[test]
    fn pair_resolution_is_order_independent() {
        let a = key(9);
        let b = key(3);
        assert_eq!(resolve_pair(&a, &b).expect("resolve"), (b, a));
        assert_eq!(resolve_pair(&b, &a).expect("resolve"), (b, a));
    }

    #[test]
    fn ordering_uses_leading_bytes() {
        let mut low = [0xffu8; 32];
        low[0] = 0x01;
        let mut high = [0u8; 32];
        high[0] = 0x02;
        let low = Pubkey::new_from_array(low);
        let high = Pubkey::new_from_array(high);
        assert_eq!(resolve_pair(&high, &low).expect("resolve"), (low, high));
    }

    #[test]
    fn identical_tokens_fail() {
        let err = resolve_pair(&key(1), &key(1)).expect_err("same token");
        match err {
            ClientError::InvalidInput(msg) => assert!(msg.contains("same")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pool_address_matches_in_both_directions() {
        let program_id = key(200);
        let user = key(50);
        let a = meta(9, 6, TokenProgram::Token);
        let b = meta(3, 9, TokenProgram::Token2022);
        let forward = resolve_pool(&program_id, &user, &a, &b).expect("forward");
        let backward = resolve_pool(&program_id, &user, &b, &a).expect("backward");
        assert_eq!(forward.pool, backward.pool);
        assert_eq!(forward.token0, backward.token0);
        assert_eq!(forward.token1, backward.token1);
        assert_ne!(forward.is_swap_x_to_y, backward.is_swap_x_to_y);
    }

    #[test]
    fn greater_source_resolves_to_token1() {
        let program_id = key(200);
        let user = key(50);
        let source = meta(9, 6, TokenProgram::Token);
        let dest = meta(3, 9, TokenProgram::Token);
        let resolved = resolve_pool(&program_id, &user, &source, &dest).expect("resolve");
        assert_eq!(resolved.token0.mint, dest.mint);
        assert_eq!(resolved.token1.mint, source.mint);
        assert!(!resolved.is_swap_x_to_y);
        assert_eq!(resolved.source().mint, source.mint);
        assert_eq!(resolved.destination().mint, dest.mint);
    }

    #[test]
    fn pool_address_uses_pool_seed_and_sorted_mints() {
        let program_id = key(200);
        let (token0, token1) = (key(1), key(2));
        let (expected, _) = Pubkey::find_program_address(
            &[b"pool", token0.as_ref(), token1.as_ref()],
            &program_id,
        );
        let resolved = resolve_pool(
            &program_id,
            &key(50),
            &meta(2, 9, TokenProgram::Token),
            &meta(1, 9, TokenProgram::Token),
        )
        .expect("resolve");
        assert_eq!(resolved.pool, expected);
    }

    #[test]
    fn each_side_keeps_its_own_token_program() {
        let program_id = key(200);
        let user = key(50);
        let classic = meta(1, 6, TokenProgram::Token);
        let extended = meta(2, 9, TokenProgram::Token2022);
        let resolved = resolve_pool(&program_id, &user, &extended, &classic).expect("resolve");
        assert_eq!(resolved.token0.program, TokenProgram::Token);
        assert_eq!(resolved.token1.program, TokenProgram::Token2022);
        assert_eq!(
            resolved.token1.user_account,
            associated_token_address(&user, &extended.mint, TokenProgram::Token2022)
        );
        assert_ne!(
            resolved.token1.user_account,
            associated_token_address(&user, &extended.mint, TokenProgram::Token)
        );
        assert_eq!(
            resolved.token0.pool_account,
            associated_token_address(&resolved.pool, &classic.mint, TokenProgram::Token)
        );
    }

    #[test]
    fn associated_address_uses_owner_program_mint_seeds() {
        let owner = key(50);
        let mint = key(4);
        for program in [TokenProgram::Token, TokenProgram::Token2022] {
            let (expected, _) = Pubkey::find_program_address(
                &[owner.as_ref(), program.id().as_ref(), mint.as_ref()],
                &ASSOCIATED_TOKEN_PROGRAM_ID,
            );
            assert_eq!(associated_token_address(&owner, &mint, program), expected);
        }
        assert_eq!(
            TOKEN_PROGRAM_ID.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
        assert_eq!(
            TOKEN_2022_PROGRAM_ID.to_string(),
            "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb"
        );
    }

    #[test]
    fn token_program_labels_round_trip() {
        for program in [TokenProgram::Token, TokenProgram::Token2022] {
            assert_eq!(program.label().parse::<TokenProgram>().expect("parse"), program);
            assert_eq!(TokenProgram::from_owner(&program.id()).expect("owner"), program);
        }
        assert!("Token-2023".parse::<TokenProgram>().is_err());
        assert!(TokenProgram::from_owner(&key(7)).is_err());
    }
}
