use crate::crossing::on_cross;
use crate::curve::{accrue_fee, collect, pay};
use crate::error::KnockoutError;
use crate::invariants;
use crate::storage::{get_config, get_state, set_state, MAX_TICK_CROSSINGS_PER_SWAP};
use crate::tick::{cross, next_initialized_tick_within_one_word};
use knockout_math::{add_delta, compute_swap_step, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use knockout_types::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use soroban_sdk::{Address, Env, Symbol};

/// Execute an exact-input swap
///
/// Buying pays `qty` base and pushes price up, selling pays `qty` quote and
/// pushes it down. Stops at the price limit, when input runs out, or after
/// `MAX_TICK_CROSSINGS_PER_SWAP` initialized ticks; any unspent input stays
/// with the trader.
///
/// Returns (base, quote) flows, positive into the pool.
pub fn execute_swap(
    env: &Env,
    trader: &Address,
    is_buy: bool,
    qty: i128,
    limit_sqrt_price_x96: u128,
) -> Result<(i128, i128), KnockoutError> {
    if qty <= 0 {
        return Err(KnockoutError::InvalidQuantity);
    }

    let config = get_config(env);
    let mut state = get_state(env);

    // 0 means no limit
    let limit = if limit_sqrt_price_x96 == 0 {
        if is_buy {
            MAX_SQRT_RATIO - 1
        } else {
            MIN_SQRT_RATIO + 1
        }
    } else {
        limit_sqrt_price_x96
    };
    let limit_ok = if is_buy {
        limit > state.sqrt_price_x96 && limit < MAX_SQRT_RATIO
    } else {
        limit < state.sqrt_price_x96 && limit > MIN_SQRT_RATIO
    };
    if !limit_ok {
        return Err(KnockoutError::InvalidPriceLimit);
    }

    let sqrt_price_before_x96 = state.sqrt_price_x96;
    let mut amount_remaining = qty as u128;
    let mut amount_out: u128 = 0;
    let mut tick_crossings: u32 = 0;

    while amount_remaining != 0
        && state.sqrt_price_x96 != limit
        && tick_crossings < MAX_TICK_CROSSINGS_PER_SWAP
    {
        let (tick_next, initialized) =
            next_initialized_tick_within_one_word(env, state.tick, config.tick_spacing, !is_buy);
        let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
        let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(env, tick_next);

        let target = if is_buy {
            sqrt_price_next_x96.min(limit)
        } else {
            sqrt_price_next_x96.max(limit)
        };

        let sqrt_price_start_x96 = state.sqrt_price_x96;
        let step = compute_swap_step(
            env,
            state.sqrt_price_x96,
            target,
            state.liquidity,
            amount_remaining,
            config.fee,
        );

        amount_remaining -= step.amount_in + step.fee_amount;
        amount_out += step.amount_out;
        state.sqrt_price_x96 = step.sqrt_ratio_next_x96;

        // Fee is paid in the input token
        accrue_fee(env, &mut state, step.fee_amount, is_buy);

        if state.sqrt_price_x96 == sqrt_price_next_x96 {
            if initialized {
                let knocked = on_cross(env, &state, config.tick_spacing, tick_next, is_buy);
                let net = cross(env, tick_next, state.mileage_global_x64);
                let net = if is_buy { net } else { -net };
                state.liquidity = add_delta(state.liquidity, net);
                state.liquidity = add_delta(state.liquidity, -(knocked as i128));
                tick_crossings += 1;
            }
            state.tick = if is_buy { tick_next } else { tick_next - 1 };
        } else if state.sqrt_price_x96 != sqrt_price_start_x96 {
            state.tick = get_tick_at_sqrt_ratio(env, state.sqrt_price_x96);
        }
    }

    debug_assert!(invariants::price_in_bounds(&state) && invariants::tick_in_bounds(&state));
    debug_assert!(invariants::swap_direction_consistent(
        is_buy,
        sqrt_price_before_x96,
        state.sqrt_price_x96
    ));
    debug_assert!(invariants::swap_respects_limit(is_buy, state.sqrt_price_x96, limit));
    set_state(env, &state);

    let amount_in = qty - amount_remaining as i128;
    let (base_in, quote_in, base_out, quote_out) = if is_buy {
        (amount_in as u128, 0, 0, amount_out)
    } else {
        (0, amount_in as u128, amount_out, 0)
    };
    let (base_paid, quote_paid) = collect(env, &config, trader, base_in, quote_in);
    let (base_recv, quote_recv) = pay(env, &config, trader, base_out, quote_out);
    let flows = (base_paid + base_recv, quote_paid + quote_recv);

    env.events().publish(
        (Symbol::new(env, "swap"), trader.clone()),
        (is_buy, flows, state.sqrt_price_x96, state.tick, state.liquidity),
    );

    Ok(flows)
}
