use soroban_sdk::{contracttype, Address};

/// Current curve state - stored in Instance storage for frequent access
#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolState {
    /// Current sqrt(price) as Q64.96, price is base per quote
    pub sqrt_price_x96: u128,
    /// Current tick index
    pub tick: i32,
    /// Total liquidity currently active on the curve (ambient + in-range)
    pub liquidity: u128,
    /// Ambient (full range) liquidity, including compounded swap fees
    pub ambient_liquidity: u128,
    /// Cumulative ambient liquidity earned per unit of active liquidity (Q64.64)
    pub mileage_global_x64: u128,
}

impl PoolState {
    pub fn new(sqrt_price_x96: u128, tick: i32) -> Self {
        Self {
            sqrt_price_x96,
            tick,
            liquidity: 0,
            ambient_liquidity: 0,
            mileage_global_x64: 0,
        }
    }
}

/// Pool configuration - immutable after creation
#[contracttype]
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Account allowed to revise the knockout config
    pub admin: Address,
    /// Base token; range liquidity below price is held in base
    pub base: Address,
    /// Quote token; range liquidity above price is held in quote
    pub quote: Address,
    /// Swap fee in hundredths of bps
    pub fee: u32,
    /// Tick spacing for this pool
    pub tick_spacing: i32,
}

/// Knockout policy of a pool
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KnockoutConfig {
    /// Whether knockout liquidity may be minted at all
    pub enabled: bool,
    /// Position width is exactly 2^width_bits ticks
    pub width_bits: u32,
    /// Lower tick must sit on a multiple of the width
    pub on_grid: bool,
}

impl KnockoutConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            width_bits: 0,
            on_grid: true,
        }
    }

    /// Width of every knockout range in ticks
    pub fn width(&self) -> i32 {
        1i32 << self.width_bits
    }
}
