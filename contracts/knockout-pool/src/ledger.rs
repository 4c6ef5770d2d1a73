use crate::chain;
use crate::curve::{
    add_range, collect, in_range, pay, pull_ambient, range_mileage, remove_range,
    reward_liquidity,
};
use crate::error::KnockoutError;
use crate::pivot;
use crate::storage::{
    get_config, get_knockout_config, get_pivot, get_position, get_state, set_position, set_state,
};
use knockout_math::{get_sqrt_ratio_at_tick, mul_div_rounding_up};
use knockout_types::{
    KnockoutConfig, KnockoutPosKey, PoolConfig, ProofStep, Side, MAX_TICK, MIN_TICK,
};
use soroban_sdk::{Address, BytesN, Env, Symbol, Vec};

fn position_key(
    owner: &Address,
    side: Side,
    tick_lower: i32,
    tick_upper: i32,
    epoch: u32,
) -> KnockoutPosKey {
    KnockoutPosKey {
        owner: owner.clone(),
        side,
        tick_lower,
        tick_upper,
        epoch,
    }
}

/// Liquidity deltas travel as i128 through the tick ledger
pub fn check_liquidity(liquidity: u128) -> Result<i128, KnockoutError> {
    i128::try_from(liquidity).map_err(|_| KnockoutError::InvalidQuantity)
}

/// Shape checks shared by every knockout entry point
fn check_range(
    config: &PoolConfig,
    knockout: &KnockoutConfig,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<(), KnockoutError> {
    let width = knockout.width();
    if tick_upper.checked_sub(tick_lower) != Some(width) {
        return Err(KnockoutError::InvalidRange);
    }
    if tick_lower % config.tick_spacing != 0 || tick_upper % config.tick_spacing != 0 {
        return Err(KnockoutError::InvalidGrid);
    }
    if knockout.on_grid && tick_lower.rem_euclid(width) != 0 {
        return Err(KnockoutError::InvalidGrid);
    }
    if tick_lower < MIN_TICK || tick_upper > MAX_TICK {
        return Err(KnockoutError::TickOutOfBounds);
    }
    Ok(())
}

/// Place knockout liquidity on `[tick_lower, tick_upper)`
///
/// Returns the (base, quote) collected from `owner`.
pub fn mint_knockout(
    env: &Env,
    owner: &Address,
    side: Side,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    inside_mid: bool,
) -> Result<(i128, i128), KnockoutError> {
    let config = get_config(env);
    let knockout = get_knockout_config(env);
    if !knockout.enabled {
        return Err(KnockoutError::KnockoutDisabled);
    }
    if liquidity == 0 {
        return Err(KnockoutError::ZeroLiquidity);
    }
    check_liquidity(liquidity)?;
    check_range(&config, &knockout, tick_lower, tick_upper)?;

    let mut state = get_state(env);

    // A range already past its pivot would be knocked out on arrival
    let eligible = match side {
        Side::Bid => state.tick >= tick_lower,
        Side::Ask => state.tick < tick_upper,
    };
    if !eligible {
        return Err(KnockoutError::InvalidMidMint);
    }
    if in_range(&state, tick_lower, tick_upper) && !inside_mid {
        return Err(KnockoutError::InvalidMidMint);
    }

    let pivot_key = side.pivot_key(tick_lower, tick_upper);
    let epoch = pivot::mint(env, &pivot_key, liquidity, knockout.width())?;

    let (base, quote) = add_range(env, &config, &mut state, tick_lower, tick_upper, liquidity);
    let mileage = range_mileage(env, &state, tick_lower, tick_upper);
    set_state(env, &state);

    let key = position_key(owner, side, tick_lower, tick_upper, epoch);
    let mut pos = get_position(env, &key);
    pos.mint_mileage_x64 = if pos.liquidity == 0 {
        mileage
    } else {
        // Weighted toward the newer reading, rounded against the owner
        let total = pos.liquidity + liquidity;
        let growth = mileage.wrapping_sub(pos.mint_mileage_x64);
        pos.mint_mileage_x64
            .wrapping_add(mul_div_rounding_up(env, growth, liquidity, total))
    };
    pos.liquidity += liquidity;
    set_position(env, &key, &pos);

    let flows = collect(env, &config, owner, base, quote);

    env.events().publish(
        (Symbol::new(env, "ko_mint"), owner.clone(), side),
        (tick_lower, tick_upper, epoch, liquidity, flows),
    );

    Ok(flows)
}

/// Withdraw live knockout liquidity at the current price, no reward
pub fn burn_knockout(
    env: &Env,
    owner: &Address,
    side: Side,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> Result<(i128, i128), KnockoutError> {
    if liquidity == 0 {
        return Err(KnockoutError::ZeroLiquidity);
    }
    check_liquidity(liquidity)?;
    let config = get_config(env);
    let pivot_key = side.pivot_key(tick_lower, tick_upper);
    let pivot = get_pivot(env, &pivot_key);

    let key = position_key(owner, side, tick_lower, tick_upper, pivot.epoch);
    let mut pos = get_position(env, &key);
    // Only the epoch just closed is checked; older knocked-out positions
    // fall through to InsufficientLiquidity
    if !pos.is_open()
        && pivot.epoch > 0
        && get_position(env, &key.at_epoch(pivot.epoch - 1)).is_open()
    {
        return Err(KnockoutError::AlreadyKnockedOut);
    }
    if pos.liquidity < liquidity {
        return Err(KnockoutError::InsufficientLiquidity);
    }

    pivot::burn(env, &pivot_key, pivot.epoch, liquidity)?;

    let mut state = get_state(env);
    let (base, quote) = remove_range(env, &config, &mut state, tick_lower, tick_upper, liquidity);
    set_state(env, &state);

    pos.liquidity -= liquidity;
    set_position(env, &key, &pos);

    let flows = pay(env, &config, owner, base, quote);

    env.events().publish(
        (Symbol::new(env, "ko_burn"), owner.clone(), side),
        (tick_lower, tick_upper, pivot.epoch, liquidity, flows),
    );

    Ok(flows)
}

/// Principal of a knocked-out range, fully converted across it
fn knocked_principal(
    env: &Env,
    side: Side,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> (u128, u128) {
    let lower = get_sqrt_ratio_at_tick(env, tick_lower);
    let upper = get_sqrt_ratio_at_tick(env, tick_upper);
    match side {
        // Price fell through the range: all quote
        Side::Bid => (0, knockout_math::get_quote_delta(env, lower, upper, liquidity, false)),
        // Price rose through the range: all base
        Side::Ask => (knockout_math::get_base_delta(env, lower, upper, liquidity, false), 0),
    }
}

/// Settle a knocked-out position with its principal and mileage reward
///
/// An empty `proof` claims the most recent knockout against the pivot's last
/// recorded mileage. Otherwise `proof` lists every knockout node from the
/// position's own through the latest, and `root` is the chain root before
/// the first of them.
pub fn claim_knockout(
    env: &Env,
    owner: &Address,
    side: Side,
    tick_lower: i32,
    tick_upper: i32,
    root: &BytesN<32>,
    proof: &Vec<ProofStep>,
) -> Result<(i128, i128), KnockoutError> {
    let pivot_key = side.pivot_key(tick_lower, tick_upper);
    let pivot = get_pivot(env, &pivot_key);

    let mint_epoch = match proof.first() {
        Some(step) => step.epoch,
        None => pivot.epoch.saturating_sub(1),
    };

    let key = position_key(owner, side, tick_lower, tick_upper, mint_epoch);
    let mut pos = get_position(env, &key);
    if pos.liquidity == 0 || pos.is_settled() {
        // Nothing to claim
        return Ok((0, 0));
    }
    if mint_epoch >= pivot.epoch {
        return Err(KnockoutError::NotKnockedOut);
    }

    let knockout_mileage = if proof.is_empty() {
        pivot.last_mileage_x64
    } else {
        chain::verify(env, &pivot, root, proof, mint_epoch)?
    };

    let config = get_config(env);
    let mut state = get_state(env);

    let (mut base, mut quote) = knocked_principal(env, side, tick_lower, tick_upper, pos.liquidity);
    let reward = reward_liquidity(
        env,
        knockout_mileage.wrapping_sub(pos.mint_mileage_x64),
        pos.liquidity,
    );
    let (reward_base, reward_quote) = pull_ambient(env, &mut state, reward);
    base += reward_base;
    quote += reward_quote;
    set_state(env, &state);

    pos.claimed = true;
    set_position(env, &key, &pos);

    let flows = pay(env, &config, owner, base, quote);

    env.events().publish(
        (Symbol::new(env, "ko_claim"), owner.clone(), side),
        (tick_lower, tick_upper, mint_epoch, reward, flows),
    );

    Ok(flows)
}

/// Settle the most recently knocked-out position for principal only, without
/// a proof
pub fn recover_knockout(
    env: &Env,
    owner: &Address,
    side: Side,
    tick_lower: i32,
    tick_upper: i32,
    mint_epoch: u32,
) -> Result<(i128, i128), KnockoutError> {
    let key = position_key(owner, side, tick_lower, tick_upper, mint_epoch);
    let pivot = get_pivot(env, &key.pivot());

    let mut pos = get_position(env, &key);
    if pos.liquidity == 0 || pos.is_settled() {
        return Ok((0, 0));
    }
    if mint_epoch >= pivot.epoch {
        return Err(KnockoutError::NotKnockedOut);
    }
    if mint_epoch + 1 != pivot.epoch {
        return Err(KnockoutError::ProofRequired);
    }

    let config = get_config(env);
    let (base, quote) = knocked_principal(env, side, tick_lower, tick_upper, pos.liquidity);

    pos.recovered = true;
    set_position(env, &key, &pos);

    let flows = pay(env, &config, owner, base, quote);

    env.events().publish(
        (Symbol::new(env, "ko_recover"), owner.clone(), side),
        (tick_lower, tick_upper, mint_epoch, flows),
    );

    Ok(flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    fn config(env: &Env, tick_spacing: i32) -> PoolConfig {
        PoolConfig {
            admin: Address::generate(env),
            base: Address::generate(env),
            quote: Address::generate(env),
            fee: 3000,
            tick_spacing,
        }
    }

    fn knockout(width_bits: u32, on_grid: bool) -> KnockoutConfig {
        KnockoutConfig {
            enabled: true,
            width_bits,
            on_grid,
        }
    }

    #[test]
    fn test_check_range_order() {
        let env = Env::default();
        let config = config(&env, 16);
        let on_grid = knockout(6, true);

        assert_eq!(check_range(&config, &on_grid, -64, 0), Ok(()));
        assert_eq!(check_range(&config, &on_grid, 0, 128), Err(KnockoutError::InvalidRange));
        // Width is checked before the grid
        assert_eq!(check_range(&config, &on_grid, -40, 8), Err(KnockoutError::InvalidRange));
        assert_eq!(check_range(&config, &on_grid, -72, -8), Err(KnockoutError::InvalidGrid));
        assert_eq!(check_range(&config, &on_grid, -48, 16), Err(KnockoutError::InvalidGrid));
        assert_eq!(check_range(&config, &knockout(6, false), -48, 16), Ok(()));
    }

    #[test]
    fn test_check_range_bounds() {
        let env = Env::default();
        let config = config(&env, 1);
        let ko = knockout(12, true);

        // 443636 is not a multiple of 4096, so the last grid ranges overhang
        let top = (MAX_TICK / 4096) * 4096;
        assert_eq!(check_range(&config, &ko, top - 4096, top), Ok(()));
        assert_eq!(check_range(&config, &ko, top, top + 4096), Err(KnockoutError::TickOutOfBounds));
        let bottom = (MIN_TICK / 4096) * 4096;
        assert_eq!(
            check_range(&config, &ko, bottom - 4096, bottom),
            Err(KnockoutError::TickOutOfBounds)
        );
    }

    #[test]
    fn test_knocked_principal_is_one_sided() {
        let env = Env::default();
        let (base, quote) = knocked_principal(&env, Side::Bid, -64, 0, 1_000_000);
        assert_eq!(base, 0);
        assert!(quote > 0);
        let (base, quote) = knocked_principal(&env, Side::Ask, 64, 128, 1_000_000);
        assert!(base > 0);
        assert_eq!(quote, 0);
    }
}
