use crate::full_math::{mul_div, mul_div_rounding_up};
use knockout_types::Q96;
use soroban_sdk::{Env, U256};

fn sorted(a: u128, b: u128) -> (u128, u128) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Base token held by `liquidity` between two sqrt prices
/// delta_base = L * (sqrt_pb - sqrt_pa)
pub fn get_base_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if round_up {
        mul_div_rounding_up(env, liquidity, upper - lower, Q96)
    } else {
        mul_div(env, liquidity, upper - lower, Q96)
    }
}

/// Quote token held by `liquidity` between two sqrt prices
/// delta_quote = L * (sqrt_pb - sqrt_pa) / (sqrt_pa * sqrt_pb)
pub fn get_quote_delta(
    env: &Env,
    sqrt_ratio_a_x96: u128,
    sqrt_ratio_b_x96: u128,
    liquidity: u128,
    round_up: bool,
) -> u128 {
    let (lower, upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if lower == 0 {
        panic!("sqrt_ratio_lower cannot be zero");
    }

    if round_up {
        let scaled = mul_div_rounding_up(env, liquidity, Q96, lower);
        mul_div_rounding_up(env, scaled, upper - lower, upper)
    } else {
        let scaled = mul_div(env, liquidity, Q96, lower);
        mul_div(env, scaled, upper - lower, upper)
    }
}

/// Price after `amount_in` enters the curve: base pushes price up, quote
/// pushes it down. Rounds against the trader in both directions.
pub fn get_next_sqrt_price_from_input(
    env: &Env,
    sqrt_price_x96: u128,
    liquidity: u128,
    amount_in: u128,
    is_buy: bool,
) -> u128 {
    if sqrt_price_x96 == 0 || liquidity == 0 {
        panic!("Invalid inputs");
    }
    if amount_in == 0 {
        return sqrt_price_x96;
    }

    if is_buy {
        // sqrt_p' = sqrt_p + amount / L
        sqrt_price_x96 + mul_div(env, amount_in, Q96, liquidity)
    } else {
        // sqrt_p' = L * sqrt_p / (L + amount * sqrt_p)
        let sqrt_price = U256::from_u128(env, sqrt_price_x96);
        let numerator = U256::from_u128(env, liquidity).mul(&U256::from_u128(env, Q96));
        let denominator = numerator.add(&U256::from_u128(env, amount_in).mul(&sqrt_price));
        let product = numerator.mul(&sqrt_price);
        let mut next = product.div(&denominator);
        if product.rem_euclid(&denominator) != U256::from_u32(env, 0) {
            next = next.add(&U256::from_u32(env, 1));
        }
        next.to_u128().unwrap_or(u128::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick_math::get_sqrt_ratio_at_tick;
    use soroban_sdk::Env;

    #[test]
    fn test_base_delta_one_to_four() {
        let env = Env::default();
        // sqrt price 1 -> 2 with L = 1000 holds 1000 base
        assert_eq!(get_base_delta(&env, Q96, Q96 * 2, 1000, false), 1000);
        assert_eq!(get_base_delta(&env, Q96 * 2, Q96, 1000, true), 1000);
    }

    #[test]
    fn test_quote_delta_one_to_four() {
        let env = Env::default();
        // L * (1/1 - 1/2) = 500
        assert_eq!(get_quote_delta(&env, Q96, Q96 * 2, 1000, false), 500);
    }

    #[test]
    fn test_deltas_round_up_never_below_round_down() {
        let env = Env::default();
        let lower = get_sqrt_ratio_at_tick(&env, 3200);
        let upper = get_sqrt_ratio_at_tick(&env, 3232);
        let liquidity = 5_120_000u128 * 1024;

        let base_down = get_base_delta(&env, lower, upper, liquidity, false);
        let base_up = get_base_delta(&env, lower, upper, liquidity, true);
        assert!(base_up - base_down <= 1);

        let quote_down = get_quote_delta(&env, lower, upper, liquidity, false);
        let quote_up = get_quote_delta(&env, lower, upper, liquidity, true);
        assert!(quote_up >= quote_down && quote_up - quote_down <= 2);
    }

    #[test]
    fn test_next_price_buy_moves_up() {
        let env = Env::default();
        let next = get_next_sqrt_price_from_input(&env, Q96, 1000, 1000, true);
        assert_eq!(next, Q96 * 2);
    }

    #[test]
    fn test_next_price_sell_moves_down() {
        let env = Env::default();
        // L = 1000 at price 1, 1000 quote in halves sqrt price
        let next = get_next_sqrt_price_from_input(&env, Q96, 1000, 1000, false);
        assert_eq!(next, Q96 / 2);
    }

    #[test]
    fn test_next_price_sell_consumes_quote_delta() {
        let env = Env::default();
        let start = get_sqrt_ratio_at_tick(&env, 4000);
        let liquidity = 10_000_000u128;
        let next = get_next_sqrt_price_from_input(&env, start, liquidity, 50_000, false);
        let used = get_quote_delta(&env, next, start, liquidity, true);
        assert!(used.abs_diff(50_000) <= 2, "used {}", used);
    }

    #[test]
    #[should_panic(expected = "Invalid inputs")]
    fn test_next_price_zero_liquidity() {
        let env = Env::default();
        get_next_sqrt_price_from_input(&env, Q96, 0, 1, true);
    }
}
