use crate::storage::{get_tick, get_tick_bitmap_word, set_tick, set_tick_bitmap_word};
use knockout_types::TickInfo;
use soroban_sdk::Env;

/// Update a tick with liquidity delta
/// Returns true if the tick was flipped (initialized or uninitialized)
pub fn update(
    env: &Env,
    tick: i32,
    tick_current: i32,
    liquidity_delta: i128,
    mileage_global_x64: u128,
    upper: bool,
) -> bool {
    let mut info = get_tick(env, tick);

    let liquidity_gross_before = info.liquidity_gross;
    let liquidity_gross_after = knockout_math::add_delta(liquidity_gross_before, liquidity_delta);

    let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

    if liquidity_gross_before == 0 {
        // By convention all mileage so far accrued below an initializing tick
        if tick <= tick_current {
            info.mileage_outside_x64 = mileage_global_x64;
        }
        info.initialized = true;
    }

    if liquidity_gross_after == 0 {
        set_tick(env, tick, &TickInfo::new());
        return flipped;
    }

    info.liquidity_gross = liquidity_gross_after;
    info.liquidity_net = if upper {
        info.liquidity_net - liquidity_delta
    } else {
        info.liquidity_net + liquidity_delta
    };

    set_tick(env, tick, &info);

    flipped
}

/// Cross a tick during a swap
/// Returns the liquidity_net to apply in the upward direction
pub fn cross(env: &Env, tick: i32, mileage_global_x64: u128) -> i128 {
    let mut info = get_tick(env, tick);
    if !info.initialized {
        return 0;
    }

    info.mileage_outside_x64 = mileage_global_x64.wrapping_sub(info.mileage_outside_x64);
    set_tick(env, tick, &info);

    info.liquidity_net
}

/// Mileage accrued per unit of liquidity while price sat inside a tick range
///
/// Differences wrap, so only deltas between two readings of the same range
/// are meaningful.
pub fn get_mileage_inside(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    mileage_global_x64: u128,
) -> u128 {
    let lower = get_tick(env, tick_lower);
    let upper = get_tick(env, tick_upper);

    let below = if tick_current >= tick_lower {
        lower.mileage_outside_x64
    } else {
        mileage_global_x64.wrapping_sub(lower.mileage_outside_x64)
    };

    let above = if tick_current < tick_upper {
        upper.mileage_outside_x64
    } else {
        mileage_global_x64.wrapping_sub(upper.mileage_outside_x64)
    };

    mileage_global_x64.wrapping_sub(below).wrapping_sub(above)
}

// === Tick Bitmap Operations ===
// Using u128 per word (128 ticks per word)

fn position(tick: i32, tick_spacing: i32) -> (i32, u8) {
    let compressed = tick.div_euclid(tick_spacing);
    (compressed >> 7, compressed.rem_euclid(128) as u8)
}

/// Flip a tick in the bitmap
pub fn flip_tick(env: &Env, tick: i32, tick_spacing: i32) {
    if tick % tick_spacing != 0 {
        panic!("Tick not on spacing");
    }

    let (word_pos, bit_pos) = position(tick, tick_spacing);
    let word = get_tick_bitmap_word(env, word_pos);
    set_tick_bitmap_word(env, word_pos, word ^ (1u128 << bit_pos));
}

/// Find the next initialized tick within one word
/// Returns (tick, initialized)
pub fn next_initialized_tick_within_one_word(
    env: &Env,
    tick: i32,
    tick_spacing: i32,
    lte: bool, // searching left, current tick included
) -> (i32, bool) {
    let compressed = tick.div_euclid(tick_spacing);

    if lte {
        let (word_pos, bit_pos) = position(tick, tick_spacing);

        // Bits at or below the current position
        let mask = (1u128 << bit_pos) - 1 + (1u128 << bit_pos);
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        let initialized = masked != 0;
        let next = if initialized {
            let msb = 127 - masked.leading_zeros() as i32;
            ((word_pos * 128) + msb) * tick_spacing
        } else {
            (word_pos * 128) * tick_spacing
        };

        (next, initialized)
    } else {
        let (word_pos, bit_pos) = position((compressed + 1) * tick_spacing, tick_spacing);

        // Bits at or above the next position
        let mask = !((1u128 << bit_pos) - 1);
        let masked = get_tick_bitmap_word(env, word_pos) & mask;

        let initialized = masked != 0;
        let next = if initialized {
            let lsb = masked.trailing_zeros() as i32;
            ((word_pos * 128) + lsb) * tick_spacing
        } else {
            ((word_pos * 128) + 127) * tick_spacing
        };

        (next, initialized)
    }
}

/// Add or remove range liquidity on both ends of `[tick_lower, tick_upper)`,
/// keeping the bitmap in step with tick initialization
pub fn update_range(
    env: &Env,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    liquidity_delta: i128,
    mileage_global_x64: u128,
    tick_spacing: i32,
) {
    if update(env, tick_lower, tick_current, liquidity_delta, mileage_global_x64, false) {
        flip_tick(env, tick_lower, tick_spacing);
    }
    if update(env, tick_upper, tick_current, liquidity_delta, mileage_global_x64, true) {
        flip_tick(env, tick_upper, tick_spacing);
    }
}
