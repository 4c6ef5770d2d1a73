use soroban_sdk::{Env, U256};

/// floor(a * b / denominator) with a 256-bit intermediate product
pub fn mul_div(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    if denominator == 0 {
        panic!("Division by zero");
    }
    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    narrow(env, &product.div(&U256::from_u128(env, denominator)))
}

/// ceil(a * b / denominator) with a 256-bit intermediate product
pub fn mul_div_rounding_up(env: &Env, a: u128, b: u128, denominator: u128) -> u128 {
    if denominator == 0 {
        panic!("Division by zero");
    }
    let denom = U256::from_u128(env, denominator);
    let product = U256::from_u128(env, a).mul(&U256::from_u128(env, b));
    let quotient = narrow(env, &product.div(&denom));
    if product.rem_euclid(&denom) == U256::from_u32(env, 0) {
        quotient
    } else {
        quotient + 1
    }
}

/// Unsigned division with rounding up
pub fn div_rounding_up(a: u128, b: u128) -> u128 {
    if b == 0 {
        panic!("Division by zero");
    }
    if a == 0 {
        return 0;
    }
    (a - 1) / b + 1
}

fn narrow(env: &Env, value: &U256) -> u128 {
    if value > &U256::from_u128(env, u128::MAX) {
        panic!("U256 overflow when converting to u128");
    }
    value.to_u128().unwrap_or(u128::MAX)
}
