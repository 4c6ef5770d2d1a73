use crate::chain;
use crate::error::KnockoutError;
use crate::invariants;
use crate::storage::{get_pivot, set_pivot};
use knockout_types::PivotKey;
use soroban_sdk::Env;

/// Add liquidity to a pivot's current epoch. Returns that epoch.
///
/// Every range sharing a pivot between two knockouts has the same width.
pub fn mint(env: &Env, key: &PivotKey, liquidity: u128, width: i32) -> Result<u32, KnockoutError> {
    let mut pivot = get_pivot(env, key);
    if pivot.active_liquidity > 0 && pivot.width != width {
        return Err(KnockoutError::InvalidRange);
    }
    pivot.width = width;
    pivot.active_liquidity = pivot
        .active_liquidity
        .checked_add(liquidity)
        .unwrap_or_else(|| panic!("Liquidity overflow"));
    set_pivot(env, key, &pivot);
    Ok(pivot.epoch)
}

/// Remove live liquidity minted at `epoch_at_mint`
pub fn burn(
    env: &Env,
    key: &PivotKey,
    epoch_at_mint: u32,
    liquidity: u128,
) -> Result<(), KnockoutError> {
    let mut pivot = get_pivot(env, key);
    if pivot.epoch != epoch_at_mint {
        return Err(KnockoutError::AlreadyKnockedOut);
    }
    pivot.active_liquidity = pivot
        .active_liquidity
        .checked_sub(liquidity)
        .ok_or(KnockoutError::InsufficientLiquidity)?;
    set_pivot(env, key, &pivot);
    Ok(())
}

/// Knock out everything live at a pivot, recording `mileage_x64` as the
/// mileage of the closing epoch. Returns the liquidity knocked out, zero when
/// nothing was live.
pub fn trigger_knockout(env: &Env, key: &PivotKey, mileage_x64: u128) -> u128 {
    let mut pivot = get_pivot(env, key);
    if pivot.active_liquidity == 0 {
        return 0;
    }

    let before = pivot.clone();
    let knocked = pivot.active_liquidity;
    pivot.last_mileage_x64 = mileage_x64;
    pivot.chain_root = chain::fold(env, &pivot.chain_root, pivot.epoch, mileage_x64);
    pivot.active_liquidity = 0;
    pivot.epoch += 1;
    debug_assert!(invariants::epoch_step_valid(&before, &pivot));
    set_pivot(env, key, &pivot);

    knocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::get_pivot;
    use knockout_types::Side;
    use soroban_sdk::{BytesN, Env};

    fn with_contract<F, R>(env: &Env, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let contract_id = env.register(crate::KnockoutPool, ());
        env.as_contract(&contract_id, f)
    }

    fn bid(tick: i32) -> PivotKey {
        PivotKey {
            side: Side::Bid,
            tick,
        }
    }

    #[test]
    fn test_mint_accumulates_at_current_epoch() {
        let env = Env::default();
        with_contract(&env, || {
            assert_eq!(mint(&env, &bid(64), 100, 64), Ok(0));
            assert_eq!(mint(&env, &bid(64), 50, 64), Ok(0));
            let pivot = get_pivot(&env, &bid(64));
            assert_eq!(pivot.active_liquidity, 150);
            assert_eq!(pivot.width, 64);
        });
    }

    #[test]
    fn test_mint_rejects_mixed_widths_while_live() {
        let env = Env::default();
        with_contract(&env, || {
            mint(&env, &bid(64), 100, 64).unwrap();
            assert_eq!(mint(&env, &bid(64), 100, 128), Err(KnockoutError::InvalidRange));

            trigger_knockout(&env, &bid(64), 5);
            assert_eq!(mint(&env, &bid(64), 100, 128), Ok(1));
        });
    }

    #[test]
    fn test_knockout_advances_epoch_and_chain() {
        let env = Env::default();
        with_contract(&env, || {
            mint(&env, &bid(64), 100, 64).unwrap();
            assert_eq!(trigger_knockout(&env, &bid(64), 777), 100);

            let pivot = get_pivot(&env, &bid(64));
            assert_eq!(pivot.active_liquidity, 0);
            assert_eq!(pivot.epoch, 1);
            assert_eq!(pivot.last_mileage_x64, 777);
            let zero = BytesN::from_array(&env, &[0u8; 32]);
            assert_eq!(pivot.chain_root, chain::fold(&env, &zero, 0, 777));
        });
    }

    #[test]
    fn test_knockout_without_liquidity_is_noop() {
        let env = Env::default();
        with_contract(&env, || {
            mint(&env, &bid(64), 100, 64).unwrap();
            trigger_knockout(&env, &bid(64), 777);
            let before = get_pivot(&env, &bid(64));

            assert_eq!(trigger_knockout(&env, &bid(64), 999), 0);
            assert_eq!(get_pivot(&env, &bid(64)), before);
        });
    }

    #[test]
    fn test_burn_requires_matching_epoch() {
        let env = Env::default();
        with_contract(&env, || {
            mint(&env, &bid(64), 100, 64).unwrap();
            assert_eq!(burn(&env, &bid(64), 0, 40), Ok(()));
            assert_eq!(burn(&env, &bid(64), 0, 61), Err(KnockoutError::InsufficientLiquidity));

            trigger_knockout(&env, &bid(64), 1);
            assert_eq!(burn(&env, &bid(64), 0, 10), Err(KnockoutError::AlreadyKnockedOut));
        });
    }
}
