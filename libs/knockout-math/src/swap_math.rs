use crate::sqrt_price_math::{get_base_delta, get_next_sqrt_price_from_input, get_quote_delta};
use knockout_types::FEE_DENOMINATOR;
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::Env;

/// Result of a single swap step computation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SwapStepResult {
    /// The sqrt price after this step
    pub sqrt_ratio_next_x96: u128,
    /// Amount of input token consumed, fee excluded
    pub amount_in: u128,
    /// Amount of output token produced
    pub amount_out: u128,
    /// Fee amount taken from input
    pub fee_amount: u128,
}

/// Compute an exact-input swap within a single liquidity range
///
/// # Arguments
/// * `sqrt_ratio_current_x96` - Current sqrt price
/// * `sqrt_ratio_target_x96` - Target sqrt price (next tick boundary or price limit)
/// * `liquidity` - Active liquidity in this range
/// * `amount_remaining` - Input still to be swapped, fee included
/// * `fee_pips` - Fee in hundredths of a bip (e.g., 3000 = 0.3%)
pub fn compute_swap_step(
    env: &Env,
    sqrt_ratio_current_x96: u128,
    sqrt_ratio_target_x96: u128,
    liquidity: u128,
    amount_remaining: u128,
    fee_pips: u32,
) -> SwapStepResult {
    let is_buy = sqrt_ratio_target_x96 > sqrt_ratio_current_x96;

    // Empty range: price slides to the target for free
    if liquidity == 0 {
        return SwapStepResult {
            sqrt_ratio_next_x96: sqrt_ratio_target_x96,
            amount_in: 0,
            amount_out: 0,
            fee_amount: 0,
        };
    }

    let fee = fee_pips as i128;
    let denom = FEE_DENOMINATOR as i128;
    let amount_less_fee = (amount_remaining as i128)
        .fixed_mul_floor(denom - fee, denom)
        .unwrap_or_else(|| panic!("Swap amount overflow")) as u128;

    let amount_to_target = input_delta(
        env,
        sqrt_ratio_current_x96,
        sqrt_ratio_target_x96,
        liquidity,
        is_buy,
    );

    let (sqrt_ratio_next_x96, amount_in, fee_amount) = if amount_less_fee >= amount_to_target {
        let fee_amount = (amount_to_target as i128)
            .fixed_mul_ceil(fee, denom - fee)
            .unwrap_or_else(|| panic!("Swap amount overflow")) as u128;
        (sqrt_ratio_target_x96, amount_to_target, fee_amount)
    } else {
        let next = get_next_sqrt_price_from_input(
            env,
            sqrt_ratio_current_x96,
            liquidity,
            amount_less_fee,
            is_buy,
        );
        let amount_in = input_delta(env, sqrt_ratio_current_x96, next, liquidity, is_buy);
        // Whatever input is not spent on the curve is kept as fee
        (next, amount_in, amount_remaining.saturating_sub(amount_in))
    };

    let amount_out = if is_buy {
        get_quote_delta(env, sqrt_ratio_current_x96, sqrt_ratio_next_x96, liquidity, false)
    } else {
        get_base_delta(env, sqrt_ratio_next_x96, sqrt_ratio_current_x96, liquidity, false)
    };

    SwapStepResult {
        sqrt_ratio_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    }
}

fn input_delta(env: &Env, from: u128, to: u128, liquidity: u128, is_buy: bool) -> u128 {
    if is_buy {
        get_base_delta(env, from, to, liquidity, true)
    } else {
        get_quote_delta(env, to, from, liquidity, true)
    }
}
