use crate::{PivotKey, Side};
use soroban_sdk::{contracttype, Address};

/// Knockout position key, one per owner, range and mint epoch
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KnockoutPosKey {
    pub owner: Address,
    pub side: Side,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub epoch: u32,
}

impl KnockoutPosKey {
    pub fn pivot(&self) -> PivotKey {
        self.side.pivot_key(self.tick_lower, self.tick_upper)
    }

    /// Same position at another epoch
    pub fn at_epoch(&self, epoch: u32) -> Self {
        Self {
            epoch,
            ..self.clone()
        }
    }
}

/// Knockout position stored in the pool contract
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KnockoutPos {
    /// Liquidity in this position
    pub liquidity: u128,
    /// Range mileage at mint, liquidity-weighted across top-ups (Q64.64)
    pub mint_mileage_x64: u128,
    /// Settled with reward
    pub claimed: bool,
    /// Settled for principal only
    pub recovered: bool,
}

impl KnockoutPos {
    pub fn is_settled(&self) -> bool {
        self.claimed || self.recovered
    }

    /// Live, unsettled position with liquidity
    pub fn is_open(&self) -> bool {
        self.liquidity > 0 && !self.is_settled()
    }
}
