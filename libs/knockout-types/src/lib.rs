#![no_std]

mod pivot;
mod pool;
mod position;
mod tick;

pub use pivot::*;
pub use pool::*;
pub use position::*;
pub use tick::*;

/// Q96 constant (2^96) for sqrt price fixed-point math
pub const Q96: u128 = 1 << 96;

/// Q64 constant (2^64), the scale of every mileage accumulator
pub const Q64: u128 = 1 << 64;

/// Minimum tick index
/// Limited by u128 representation (originally -887272 for uint160)
pub const MIN_TICK: i32 = -443636;

/// Maximum tick index
/// Limited by u128 representation (originally 887272 for uint160)
pub const MAX_TICK: i32 = 443636;

/// Minimum sqrt price (at MIN_TICK)
pub const MIN_SQRT_RATIO: u128 = 18446743374134;

/// Maximum sqrt price (at MAX_TICK), bounded by u128::MAX
pub const MAX_SQRT_RATIO: u128 = 340275971719517849884101479065584693834;

/// Fees are expressed in hundredths of a basis point (1e-6)
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Largest knockout width accepted by a pool config (2^12 ticks)
pub const MAX_KNOCKOUT_WIDTH_BITS: u32 = 12;
