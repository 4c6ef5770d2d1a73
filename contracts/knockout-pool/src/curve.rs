use crate::storage::{get_config, get_state, set_state};
use crate::tick::{get_mileage_inside, update_range};
use knockout_math::{
    add_delta, get_ambient_amounts, get_amounts_for_liquidity, get_liquidity_for_fee,
    get_sqrt_ratio_at_tick, mul_div,
};
use knockout_types::{PoolConfig, PoolState, Q64};
use soroban_sdk::{token, Address, Env};

/// Seed full-range liquidity. Returns the (base, quote) collected from `owner`.
pub fn mint_ambient(env: &Env, owner: &Address, liquidity: u128) -> (i128, i128) {
    let config = get_config(env);
    let mut state = get_state(env);

    let (base, quote) = get_ambient_amounts(env, state.sqrt_price_x96, liquidity, true);
    state.ambient_liquidity = add_delta(state.ambient_liquidity, liquidity as i128);
    state.liquidity = add_delta(state.liquidity, liquidity as i128);
    set_state(env, &state);

    collect(env, &config, owner, base, quote)
}

pub fn in_range(state: &PoolState, tick_lower: i32, tick_upper: i32) -> bool {
    tick_lower <= state.tick && state.tick < tick_upper
}

/// Add range liquidity to the tick ledger, and to active liquidity when the
/// range straddles price. Returns the (base, quote) owed, rounded up.
pub fn add_range(
    env: &Env,
    config: &PoolConfig,
    state: &mut PoolState,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> (u128, u128) {
    update_range(
        env,
        tick_lower,
        tick_upper,
        state.tick,
        liquidity as i128,
        state.mileage_global_x64,
        config.tick_spacing,
    );
    if in_range(state, tick_lower, tick_upper) {
        state.liquidity = add_delta(state.liquidity, liquidity as i128);
    }
    range_amounts(env, state, tick_lower, tick_upper, liquidity, true)
}

/// Inverse of [`add_range`]. Returns the (base, quote) released, rounded down.
pub fn remove_range(
    env: &Env,
    config: &PoolConfig,
    state: &mut PoolState,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
) -> (u128, u128) {
    let amounts = range_amounts(env, state, tick_lower, tick_upper, liquidity, false);
    update_range(
        env,
        tick_lower,
        tick_upper,
        state.tick,
        -(liquidity as i128),
        state.mileage_global_x64,
        config.tick_spacing,
    );
    if in_range(state, tick_lower, tick_upper) {
        state.liquidity = add_delta(state.liquidity, -(liquidity as i128));
    }
    amounts
}

pub fn range_amounts(
    env: &Env,
    state: &PoolState,
    tick_lower: i32,
    tick_upper: i32,
    liquidity: u128,
    round_up: bool,
) -> (u128, u128) {
    get_amounts_for_liquidity(
        env,
        state.sqrt_price_x96,
        get_sqrt_ratio_at_tick(env, tick_lower),
        get_sqrt_ratio_at_tick(env, tick_upper),
        liquidity,
        round_up,
    )
}

/// Mileage accrued inside `[tick_lower, tick_upper)` as seen from `state`
pub fn range_mileage(env: &Env, state: &PoolState, tick_lower: i32, tick_upper: i32) -> u128 {
    get_mileage_inside(
        env,
        tick_lower,
        tick_upper,
        state.tick,
        state.mileage_global_x64,
    )
}

/// Compound a swap fee into ambient liquidity and advance the global mileage
/// by the liquidity earned per unit of liquidity that was active
pub fn accrue_fee(env: &Env, state: &mut PoolState, fee: u128, fee_in_base: bool) {
    if fee == 0 || state.liquidity == 0 {
        return;
    }
    let earned = get_liquidity_for_fee(env, state.sqrt_price_x96, fee, fee_in_base);
    if earned == 0 {
        return;
    }
    let growth = mul_div(env, earned, Q64, state.liquidity);
    state.mileage_global_x64 = state.mileage_global_x64.wrapping_add(growth);
    state.ambient_liquidity = add_delta(state.ambient_liquidity, earned as i128);
    state.liquidity = add_delta(state.liquidity, earned as i128);
}

/// Ambient liquidity owed for `mileage_delta_x64` of mileage on `liquidity`
pub fn reward_liquidity(env: &Env, mileage_delta_x64: u128, liquidity: u128) -> u128 {
    mul_div(env, mileage_delta_x64, liquidity, Q64)
}

/// Take reward liquidity out of the ambient reserve. Returns the (base, quote)
/// it is worth at the current price, rounded down.
pub fn pull_ambient(env: &Env, state: &mut PoolState, liquidity: u128) -> (u128, u128) {
    let liquidity = liquidity.min(state.ambient_liquidity).min(state.liquidity);
    if liquidity == 0 {
        return (0, 0);
    }
    state.ambient_liquidity -= liquidity;
    state.liquidity -= liquidity;
    get_ambient_amounts(env, state.sqrt_price_x96, liquidity, false)
}

/// Pull tokens from `from` into the pool. Returns positive flows.
pub fn collect(
    env: &Env,
    config: &PoolConfig,
    from: &Address,
    base: u128,
    quote: u128,
) -> (i128, i128) {
    let pool = env.current_contract_address();
    let (base, quote) = (base as i128, quote as i128);
    if base > 0 {
        token::Client::new(env, &config.base).transfer(from, &pool, &base);
    }
    if quote > 0 {
        token::Client::new(env, &config.quote).transfer(from, &pool, &quote);
    }
    (base, quote)
}

/// Send tokens from the pool to `to`. Returns negative flows.
pub fn pay(env: &Env, config: &PoolConfig, to: &Address, base: u128, quote: u128) -> (i128, i128) {
    let pool = env.current_contract_address();
    let (base, quote) = (base as i128, quote as i128);
    if base > 0 {
        token::Client::new(env, &config.base).transfer(&pool, to, &base);
    }
    if quote > 0 {
        token::Client::new(env, &config.quote).transfer(&pool, to, &quote);
    }
    (-base, -quote)
}
