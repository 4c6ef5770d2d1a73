use soroban_sdk::{contracttype, BytesN, Env};

/// Which crossing direction knocks a boundary out
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    /// Pivot at the lower tick, knocked out when price falls through it
    Bid,
    /// Pivot at the upper tick, knocked out when price rises through it
    Ask,
}

impl Side {
    /// Tick of the boundary for a range on this side
    pub fn pivot_tick(&self, tick_lower: i32, tick_upper: i32) -> i32 {
        match self {
            Side::Bid => tick_lower,
            Side::Ask => tick_upper,
        }
    }

    /// Pivot holding a range on this side
    pub fn pivot_key(&self, tick_lower: i32, tick_upper: i32) -> PivotKey {
        PivotKey {
            side: *self,
            tick: self.pivot_tick(tick_lower, tick_upper),
        }
    }

    /// Range covered by a knockout position whose pivot sits at `tick`
    pub fn range(&self, tick: i32, width: i32) -> (i32, i32) {
        match self {
            Side::Bid => (tick, tick + width),
            Side::Ask => (tick - width, tick),
        }
    }

    /// Side whose pivots are checked when price crosses a tick in this direction
    pub fn knocked_by(moving_up: bool) -> Side {
        if moving_up {
            Side::Ask
        } else {
            Side::Bid
        }
    }
}

/// Boundary identifier within one pool
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PivotKey {
    pub side: Side,
    pub tick: i32,
}

/// Per-boundary knockout state
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pivot {
    /// Liquidity of live positions minted at the current epoch
    pub active_liquidity: u128,
    /// Width in ticks of the ranges holding `active_liquidity`
    pub width: i32,
    /// Number of knockouts this boundary has seen
    pub epoch: u32,
    /// Range mileage snapshot at the most recent knockout (Q64.64)
    pub last_mileage_x64: u128,
    /// Root of the knockout hash chain, all zero before the first knockout
    pub chain_root: BytesN<32>,
}

impl Pivot {
    pub fn new(env: &Env) -> Self {
        Self {
            active_liquidity: 0,
            width: 0,
            epoch: 0,
            last_mileage_x64: 0,
            chain_root: BytesN::from_array(env, &[0u8; 32]),
        }
    }

    /// Range of the liquidity currently active at a pivot on `side` at `tick`
    pub fn active_range(&self, side: Side, tick: i32) -> (i32, i32) {
        side.range(tick, self.width)
    }
}

/// One knockout node supplied by a claimant
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofStep {
    pub epoch: u32,
    pub mileage_x64: u128,
}
