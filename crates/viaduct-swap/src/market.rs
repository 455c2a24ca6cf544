//! Live market state
//!
//! The in-memory stand-in for on-chain liquidity: per-pool price/reserve
//! state, shared minter balances for stable/crypto pairs, and the account
//! ledger. Execution stages its effects against this state and commits
//! them in one step.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use viaduct_core::constants::MAX_MINTER_COINS;
use viaduct_core::{AccountId, Address, Amount, PoolId, TokenId};

use crate::state::SwapError;

/// Live state backing one registered pool.
///
/// The wire form keeps the variant as an outer key: tag-based
/// representations buffer values through a u64-capped path and cannot
/// carry full-precision u128 amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// Spot reserves in canonical pair order
    ConstantProduct { reserve0: Amount, reserve1: Amount },
    /// Q96 sqrt price (token1 per token0) and active-range liquidity
    Concentrated {
        sqrt_price_x96: u128,
        liquidity: u128,
    },
}

/// Shared state of a stable/crypto minter.
///
/// Several registered pairs may bind to one minter; a swap through any of
/// them moves the balances every bound pair sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinterState {
    Stable {
        balances: Vec<Amount>,
        amp: u64,
        fee_num: u32,
        fee_denom: u32,
    },
    Crypto {
        balances: Vec<Amount>,
        price_scales: Vec<u128>,
        amp: u64,
        fee_num: u32,
        fee_denom: u32,
    },
}

impl MinterState {
    pub fn balances(&self) -> &[Amount] {
        match self {
            Self::Stable { balances, .. } | Self::Crypto { balances, .. } => balances,
        }
    }

    pub fn coin_count(&self) -> usize {
        self.balances().len()
    }

    fn validate(&self) -> Result<(), SwapError> {
        let (amp, fee_denom) = match self {
            Self::Stable { amp, fee_denom, .. } => (*amp, *fee_denom),
            Self::Crypto {
                amp,
                fee_denom,
                balances,
                price_scales,
                ..
            } => {
                if price_scales.len() != balances.len() {
                    return Err(SwapError::InvalidPool(
                        "crypto minter needs one price scale per coin".into(),
                    ));
                }
                (*amp, *fee_denom)
            }
        };
        let n = self.coin_count();
        if !(2..=MAX_MINTER_COINS).contains(&n) {
            return Err(SwapError::InvalidPool(format!(
                "minter must hold 2..={MAX_MINTER_COINS} coins, got {n}"
            )));
        }
        if amp == 0 {
            return Err(SwapError::InvalidPool("zero amplification".into()));
        }
        if fee_denom == 0 {
            return Err(SwapError::InvalidPool("zero fee denominator".into()));
        }
        Ok(())
    }
}

/// Account balances: the native column plus per-token columns
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    native: HashMap<AccountId, Amount>,
    tokens: HashMap<AccountId, HashMap<TokenId, Amount>>,
}

impl Ledger {
    pub fn native_balance(&self, account: &AccountId) -> Amount {
        self.native.get(account).copied().unwrap_or(0)
    }

    pub fn token_balance(&self, account: &AccountId, token: &TokenId) -> Amount {
        self.tokens
            .get(account)
            .and_then(|held| held.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// All token balances of an account, sorted by token id
    pub fn token_balances(&self, account: &AccountId) -> Vec<(TokenId, Amount)> {
        let mut held: Vec<(TokenId, Amount)> = self
            .tokens
            .get(account)
            .map(|held| held.iter().map(|(t, a)| (t.clone(), *a)).collect())
            .unwrap_or_default();
        held.sort_by(|a, b| a.0.cmp(&b.0));
        held
    }

    pub fn credit_native(&mut self, account: &AccountId, amount: Amount) -> Result<(), SwapError> {
        let balance = self.native.entry(account.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(SwapError::Overflow("native balance"))?;
        Ok(())
    }

    pub fn credit_token(
        &mut self,
        account: &AccountId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<(), SwapError> {
        let balance = self
            .tokens
            .entry(account.clone())
            .or_default()
            .entry(token.clone())
            .or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(SwapError::Overflow("token balance"))?;
        Ok(())
    }

    pub fn debit_native(&mut self, account: &AccountId, amount: Amount) -> Result<(), SwapError> {
        let available = self.native_balance(account);
        if available < amount {
            return Err(SwapError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if let Some(balance) = self.native.get_mut(account) {
            *balance -= amount;
        }
        Ok(())
    }

    pub fn debit_token(
        &mut self,
        account: &AccountId,
        token: &TokenId,
        amount: Amount,
    ) -> Result<(), SwapError> {
        let available = self.token_balance(account, token);
        if available < amount {
            return Err(SwapError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        if let Some(balance) = self.tokens.get_mut(account).and_then(|h| h.get_mut(token)) {
            *balance -= amount;
        }
        Ok(())
    }
}

/// Pool and minter writes staged by a simulated path, applied in one step
#[derive(Debug, Clone, Default)]
pub struct StagedEffects {
    pub pools: HashMap<PoolId, PoolState>,
    pub minters: HashMap<Address, MinterState>,
}

impl StagedEffects {
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty() && self.minters.is_empty()
    }
}

/// Live market: pool states, minter states, and the ledger
#[derive(Debug, Clone, Default)]
pub struct Market {
    pools: HashMap<PoolId, PoolState>,
    minters: HashMap<Address, MinterState>,
    ledger: Ledger,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool_state(&self, pool_id: &PoolId) -> Option<&PoolState> {
        self.pools.get(pool_id)
    }

    pub fn minter(&self, minter: &Address) -> Option<&MinterState> {
        self.minters.get(minter)
    }

    /// Install or replace the live state behind a pool id
    pub fn install_pool_state(&mut self, pool_id: PoolId, state: PoolState) {
        self.pools.insert(pool_id, state);
    }

    /// Install or replace a minter's shared state
    pub fn install_minter(&mut self, minter: Address, state: MinterState) -> Result<(), SwapError> {
        state.validate()?;
        self.minters.insert(minter, state);
        Ok(())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Apply staged pool and minter writes
    pub fn commit(&mut self, effects: StagedEffects) {
        for (pool_id, state) in effects.pools {
            self.pools.insert(pool_id, state);
        }
        for (minter, state) in effects.minters {
            self.minters.insert(minter, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> AccountId {
        AccountId::new(name)
    }

    #[test]
    fn test_ledger_credit_debit_roundtrip() {
        let mut ledger = Ledger::default();
        let alice = account("alice");
        let usdt = TokenId::new("USDT");

        ledger.credit_token(&alice, &usdt, 500).unwrap();
        assert_eq!(ledger.token_balance(&alice, &usdt), 500);

        ledger.debit_token(&alice, &usdt, 200).unwrap();
        assert_eq!(ledger.token_balance(&alice, &usdt), 300);
    }

    #[test]
    fn test_ledger_rejects_overdraft() {
        let mut ledger = Ledger::default();
        let alice = account("alice");
        ledger.credit_native(&alice, 100).unwrap();

        let err = ledger.debit_native(&alice, 101).unwrap_err();
        assert!(matches!(
            err,
            SwapError::InsufficientBalance {
                required: 101,
                available: 100
            }
        ));
        assert_eq!(ledger.native_balance(&alice), 100);
    }

    #[test]
    fn test_ledger_unknown_account_is_zero() {
        let ledger = Ledger::default();
        assert_eq!(ledger.native_balance(&account("nobody")), 0);
        assert_eq!(
            ledger.token_balance(&account("nobody"), &TokenId::new("USDT")),
            0
        );
    }

    #[test]
    fn test_ledger_credit_overflow() {
        let mut ledger = Ledger::default();
        let alice = account("alice");
        ledger.credit_native(&alice, u128::MAX).unwrap();
        assert!(matches!(
            ledger.credit_native(&alice, 1),
            Err(SwapError::Overflow(_))
        ));
    }

    #[test]
    fn test_token_balances_sorted() {
        let mut ledger = Ledger::default();
        let alice = account("alice");
        ledger.credit_token(&alice, &TokenId::new("WBTC"), 1).unwrap();
        ledger.credit_token(&alice, &TokenId::new("DAI"), 2).unwrap();
        ledger.credit_token(&alice, &TokenId::new("USDT"), 3).unwrap();

        let held = ledger.token_balances(&alice);
        let ids: Vec<&str> = held.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(ids, vec!["DAI", "USDT", "WBTC"]);
    }

    #[test]
    fn test_minter_validation() {
        let mut market = Market::new();

        let one_coin = MinterState::Stable {
            balances: vec![1_000],
            amp: 100,
            fee_num: 4,
            fee_denom: 10_000,
        };
        assert!(matches!(
            market.install_minter(Address::new("bad"), one_coin),
            Err(SwapError::InvalidPool(_))
        ));

        let scale_mismatch = MinterState::Crypto {
            balances: vec![1_000, 1_000],
            price_scales: vec![1],
            amp: 100,
            fee_num: 4,
            fee_denom: 10_000,
        };
        assert!(matches!(
            market.install_minter(Address::new("bad"), scale_mismatch),
            Err(SwapError::InvalidPool(_))
        ));

        let zero_amp = MinterState::Stable {
            balances: vec![1_000, 1_000],
            amp: 0,
            fee_num: 4,
            fee_denom: 10_000,
        };
        assert!(matches!(
            market.install_minter(Address::new("bad"), zero_amp),
            Err(SwapError::InvalidPool(_))
        ));

        let good = MinterState::Stable {
            balances: vec![1_000, 1_000, 1_000],
            amp: 100,
            fee_num: 4,
            fee_denom: 10_000,
        };
        market.install_minter(Address::new("3pool"), good).unwrap();
        assert_eq!(
            market.minter(&Address::new("3pool")).unwrap().coin_count(),
            3
        );
    }

    #[test]
    fn test_commit_applies_staged_writes() {
        let mut market = Market::new();
        let pool_id = PoolId::new("univ2-weth-usdt");
        market.install_pool_state(
            pool_id.clone(),
            PoolState::ConstantProduct {
                reserve0: 1_000,
                reserve1: 2_000,
            },
        );

        let mut effects = StagedEffects::default();
        effects.pools.insert(
            pool_id.clone(),
            PoolState::ConstantProduct {
                reserve0: 1_100,
                reserve1: 1_820,
            },
        );
        market.commit(effects);

        assert_eq!(
            market.pool_state(&pool_id),
            Some(&PoolState::ConstantProduct {
                reserve0: 1_100,
                reserve1: 1_820,
            })
        );
    }
}
