// ============================================================================
// INVARIANTS MODULE
// ============================================================================
//
// Predicates over pool and knockout state. The swap loop asserts the price
// invariants in debug builds; the scenario tests check the ledger ones after
// every step.
//
// INVARIANT CATEGORIES:
//
// 1. PRICE INVARIANTS
//    - Price is always within valid bounds
//    - Swaps move price in their own direction and respect the limit
//
// 2. PIVOT INVARIANTS
//    - Active pivot liquidity equals the live positions at the current epoch
//    - The tick ledger holds at least the active pivot liquidity
//    - Epochs only move forward, one knockout at a time
//
// 3. SETTLEMENT INVARIANTS
//    - A position is claimed or recovered, never both
//
// ============================================================================

use knockout_types::{KnockoutPos, Pivot, PoolState, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};

// ============================================================================
// PRICE INVARIANTS
// ============================================================================

/// Invariant: sqrt_price is always within valid bounds
///
/// Property:
///   MIN_SQRT_RATIO < sqrt_price_x96 < MAX_SQRT_RATIO
pub fn price_in_bounds(state: &PoolState) -> bool {
    state.sqrt_price_x96 > MIN_SQRT_RATIO && state.sqrt_price_x96 < MAX_SQRT_RATIO
}

/// Invariant: tick is within valid bounds
pub fn tick_in_bounds(state: &PoolState) -> bool {
    state.tick >= MIN_TICK && state.tick <= MAX_TICK
}

/// Invariant: swap direction consistency
///
/// Property:
///   - is_buy => price does not fall
///   - !is_buy => price does not rise
pub fn swap_direction_consistent(is_buy: bool, sqrt_price_before: u128, sqrt_price_after: u128) -> bool {
    if is_buy {
        sqrt_price_after >= sqrt_price_before
    } else {
        sqrt_price_after <= sqrt_price_before
    }
}

/// Invariant: swap respects price limit
pub fn swap_respects_limit(is_buy: bool, sqrt_price_after: u128, sqrt_price_limit: u128) -> bool {
    if is_buy {
        sqrt_price_after <= sqrt_price_limit
    } else {
        sqrt_price_after >= sqrt_price_limit
    }
}

// ============================================================================
// PIVOT INVARIANTS
// ============================================================================

/// Invariant: pivot liquidity conservation
///
/// Property:
///   pivot.active_liquidity == sum(pos.liquidity) over unsettled positions
///   at (side, tick, pivot.epoch)
///
/// Positions are not enumerable on chain, so only the tests evaluate this.
#[allow(dead_code)]
pub fn pivot_conserved(pivot: &Pivot, live_positions: &[KnockoutPos]) -> bool {
    let total = live_positions
        .iter()
        .filter(|pos| !pos.is_settled())
        .try_fold(0u128, |acc, pos| acc.checked_add(pos.liquidity));
    total == Some(pivot.active_liquidity)
}

/// Invariant: knockout liquidity is backed by the tick ledger
///
/// Property:
///   liquidity_gross at each end of the active range >= active_liquidity
pub fn pivot_backed_by_ticks(pivot: &Pivot, lower_gross: u128, upper_gross: u128) -> bool {
    lower_gross >= pivot.active_liquidity && upper_gross >= pivot.active_liquidity
}

/// Invariant: an epoch step is a single knockout
///
/// Property:
///   new.epoch == old.epoch, or new.epoch == old.epoch + 1 with
///   new.active_liquidity == 0 and a changed chain root
pub fn epoch_step_valid(old: &Pivot, new: &Pivot) -> bool {
    if new.epoch == old.epoch {
        new.chain_root == old.chain_root
    } else {
        new.epoch == old.epoch + 1 && new.active_liquidity == 0 && new.chain_root != old.chain_root
    }
}

// ============================================================================
// SETTLEMENT INVARIANTS
// ============================================================================

/// Invariant: claim and recover are mutually exclusive
pub fn settlement_exclusive(pos: &KnockoutPos) -> bool {
    !(pos.claimed && pos.recovered)
}
