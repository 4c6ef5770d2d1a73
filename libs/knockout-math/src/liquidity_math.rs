use crate::full_math::{mul_div, mul_div_rounding_up};
use crate::sqrt_price_math::{get_base_delta, get_quote_delta};
use knockout_types::Q96;
use soroban_sdk::Env;

/// Token amounts (base, quote) backing `liquidity` on a range at the current price
///
/// Below the range everything sits in quote, above it in base.
pub fn get_amounts_for_liquidity(
    env: &Env,
    sqrt_ratio_x96: u128,
    sqrt_ratio_lower_x96: u128,
    sqrt_ratio_upper_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> (u128, u128) {
    if sqrt_ratio_x96 <= sqrt_ratio_lower_x96 {
        let quote = get_quote_delta(env, sqrt_ratio_lower_x96, sqrt_ratio_upper_x96, liquidity, round_up);
        (0, quote)
    } else if sqrt_ratio_x96 < sqrt_ratio_upper_x96 {
        let base = get_base_delta(env, sqrt_ratio_lower_x96, sqrt_ratio_x96, liquidity, round_up);
        let quote = get_quote_delta(env, sqrt_ratio_x96, sqrt_ratio_upper_x96, liquidity, round_up);
        (base, quote)
    } else {
        let base = get_base_delta(env, sqrt_ratio_lower_x96, sqrt_ratio_upper_x96, liquidity, round_up);
        (base, 0)
    }
}

/// Token amounts (base, quote) backing full-range ambient liquidity
/// base = L * sqrt_p, quote = L / sqrt_p
pub fn get_ambient_amounts(
    env: &Env,
    sqrt_ratio_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> (u128, u128) {
    if round_up {
        (
            mul_div_rounding_up(env, liquidity, sqrt_ratio_x96, Q96),
            mul_div_rounding_up(env, liquidity, Q96, sqrt_ratio_x96),
        )
    } else {
        (
            mul_div(env, liquidity, sqrt_ratio_x96, Q96),
            mul_div(env, liquidity, Q96, sqrt_ratio_x96),
        )
    }
}

/// Ambient liquidity worth a single-sided fee, valued at the current price
///
/// One unit of ambient liquidity is worth 2 * sqrt_p base, so the fee buys
/// half as much liquidity as it would if paired. Rounds down so compounding
/// never mints liquidity the reserves cannot back.
pub fn get_liquidity_for_fee(env: &Env, sqrt_ratio_x96: u128, fee: u128, fee_in_base: bool) -> u128 {
    if fee_in_base {
        mul_div(env, fee, Q96, sqrt_ratio_x96) / 2
    } else {
        mul_div(env, fee, sqrt_ratio_x96, Q96) / 2
    }
}

/// Add signed liquidity delta to unsigned liquidity
pub fn add_delta(liquidity: u128, delta: i128) -> u128 {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .unwrap_or_else(|| panic!("Liquidity underflow"))
    } else {
        liquidity
            .checked_add(delta as u128)
            .unwrap_or_else(|| panic!("Liquidity overflow"))
    }
}
