use crate::curve::range_mileage;
use crate::pivot::trigger_knockout;
use crate::invariants;
use crate::storage::{get_pivot, get_tick};
use crate::tick::update_range;
use knockout_types::{PivotKey, PoolState, Side};
use soroban_sdk::{Env, Symbol};

/// Hook run by the swap loop before it crosses the initialized tick `tick`
///
/// `state` is the loop's working state: price sits exactly on `tick` and
/// `state.tick` is still on the side being left. Knocks out the pivot on the
/// side this direction of travel closes, strips its range from the tick
/// ledger, and returns the liquidity the loop must drop from active
/// liquidity once it has applied the tick's remaining `liquidity_net`.
pub fn on_cross(env: &Env, state: &PoolState, tick_spacing: i32, tick: i32, moving_up: bool) -> u128 {
    let key = PivotKey {
        side: Side::knocked_by(moving_up),
        tick,
    };

    let pivot = get_pivot(env, &key);
    if pivot.active_liquidity == 0 {
        return 0;
    }

    let (tick_lower, tick_upper) = pivot.active_range(key.side, tick);
    debug_assert!(invariants::pivot_backed_by_ticks(
        &pivot,
        get_tick(env, tick_lower).liquidity_gross,
        get_tick(env, tick_upper).liquidity_gross
    ));
    let mileage = range_mileage(env, state, tick_lower, tick_upper);
    let knocked = trigger_knockout(env, &key, mileage);

    update_range(
        env,
        tick_lower,
        tick_upper,
        state.tick,
        -(knocked as i128),
        state.mileage_global_x64,
        tick_spacing,
    );

    // Everything an off-chain prover needs to rebuild the chain
    env.events().publish(
        (Symbol::new(env, "knockout"), key.side, tick),
        (pivot.epoch, mileage, knocked, get_pivot(env, &key).chain_root),
    );

    knocked
}
