#![no_std]

mod chain;
mod crossing;
mod curve;
mod error;
mod invariants;
mod ledger;
mod pivot;
mod storage;
mod swap;
mod tick;


pub use error::KnockoutError;

use knockout_types::{
    KnockoutConfig, KnockoutPos, KnockoutPosKey, Pivot, PivotKey, PoolConfig, PoolState,
    ProofStep, Side, TickInfo, MAX_KNOCKOUT_WIDTH_BITS, MAX_SQRT_RATIO, MIN_SQRT_RATIO,
};
use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, Symbol, Vec};
use storage::{
    get_config, get_knockout_config, get_pivot, get_position, get_state, get_tick,
    is_initialized, set_config, set_knockout_config, set_state,
};

#[contract]
pub struct KnockoutPool;

fn check_knockout_config(config: &KnockoutConfig, tick_spacing: i32) -> Result<(), KnockoutError> {
    if config.width_bits > MAX_KNOCKOUT_WIDTH_BITS {
        return Err(KnockoutError::InvalidRange);
    }
    if config.enabled && config.width() % tick_spacing != 0 {
        return Err(KnockoutError::InvalidGrid);
    }
    Ok(())
}

#[contractimpl]
impl KnockoutPool {
    /// Initialize a new pool
    ///
    /// # Arguments
    /// * `admin` - Account allowed to revise the knockout config
    /// * `base` - Token held by range liquidity below price
    /// * `quote` - Token held by range liquidity above price
    /// * `fee` - Swap fee in hundredths of a bip
    /// * `tick_spacing` - Ticks usable as range boundaries
    /// * `sqrt_price_x96` - Starting sqrt price
    /// * `knockout` - Knockout policy
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        admin: Address,
        base: Address,
        quote: Address,
        fee: u32,
        tick_spacing: i32,
        sqrt_price_x96: u128,
        knockout: KnockoutConfig,
    ) -> Result<(), KnockoutError> {
        if is_initialized(&env) {
            return Err(KnockoutError::AlreadyInitialized);
        }
        if base == quote {
            panic!("base and quote must differ");
        }
        if tick_spacing <= 0 {
            return Err(KnockoutError::InvalidGrid);
        }
        if sqrt_price_x96 <= MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(KnockoutError::InvalidPriceLimit);
        }
        check_knockout_config(&knockout, tick_spacing)?;

        let tick = knockout_math::get_tick_at_sqrt_ratio(&env, sqrt_price_x96);

        set_config(
            &env,
            &PoolConfig {
                admin,
                base,
                quote,
                fee,
                tick_spacing,
            },
        );
        set_knockout_config(&env, &knockout);
        set_state(&env, &PoolState::new(sqrt_price_x96, tick));
        Ok(())
    }

    /// Replace the knockout policy. Live knockout liquidity keeps the width it
    /// was minted with.
    pub fn revise_knockout(env: Env, knockout: KnockoutConfig) -> Result<(), KnockoutError> {
        let config = get_config(&env);
        config.admin.require_auth();
        check_knockout_config(&knockout, config.tick_spacing)?;
        set_knockout_config(&env, &knockout);

        env.events()
            .publish((Symbol::new(&env, "ko_config"),), knockout);
        Ok(())
    }

    /// Add full-range liquidity
    ///
    /// # Returns
    /// (base, quote) - Token amounts deposited
    pub fn mint_ambient(env: Env, owner: Address, liquidity: u128) -> Result<(i128, i128), KnockoutError> {
        owner.require_auth();
        if liquidity == 0 {
            return Err(KnockoutError::ZeroLiquidity);
        }
        ledger::check_liquidity(liquidity)?;
        Ok(curve::mint_ambient(&env, &owner, liquidity))
    }

    /// Execute an exact-input swap
    ///
    /// # Arguments
    /// * `trader` - Pays the input and receives the output
    /// * `is_buy` - True to pay base and push price up, false to pay quote
    /// * `qty` - Input amount
    /// * `limit_sqrt_price_x96` - Price the swap may not pass, 0 for none
    ///
    /// # Returns
    /// (base, quote) - Positive values are paid in, negative paid out
    pub fn swap(
        env: Env,
        trader: Address,
        is_buy: bool,
        qty: i128,
        limit_sqrt_price_x96: u128,
    ) -> Result<(i128, i128), KnockoutError> {
        trader.require_auth();
        swap::execute_swap(&env, &trader, is_buy, qty, limit_sqrt_price_x96)
    }

    /// Place knockout liquidity
    ///
    /// `inside_mid` opts in to minting while price sits inside the range.
    ///
    /// # Returns
    /// (base, quote) - Token amounts deposited
    pub fn mint_knockout(
        env: Env,
        owner: Address,
        side: Side,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
        inside_mid: bool,
    ) -> Result<(i128, i128), KnockoutError> {
        owner.require_auth();
        ledger::mint_knockout(&env, &owner, side, tick_lower, tick_upper, liquidity, inside_mid)
    }

    /// Withdraw knockout liquidity that has not been knocked out
    ///
    /// # Returns
    /// (base, quote) - Token amounts withdrawn, as negative flows
    pub fn burn_knockout(
        env: Env,
        owner: Address,
        side: Side,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(i128, i128), KnockoutError> {
        owner.require_auth();
        ledger::burn_knockout(&env, &owner, side, tick_lower, tick_upper, liquidity)
    }

    /// Claim a knocked-out position with its mileage reward
    ///
    /// # Returns
    /// (base, quote) - Token amounts paid out, as negative flows; zeros when
    /// there is nothing to claim
    pub fn claim_knockout(
        env: Env,
        owner: Address,
        side: Side,
        tick_lower: i32,
        tick_upper: i32,
        root: BytesN<32>,
        proof: Vec<ProofStep>,
    ) -> Result<(i128, i128), KnockoutError> {
        owner.require_auth();
        ledger::claim_knockout(&env, &owner, side, tick_lower, tick_upper, &root, &proof)
    }

    /// Recover the principal of the latest knocked-out position, forfeiting
    /// its reward
    pub fn recover_knockout(
        env: Env,
        owner: Address,
        side: Side,
        tick_lower: i32,
        tick_upper: i32,
        mint_epoch: u32,
    ) -> Result<(i128, i128), KnockoutError> {
        owner.require_auth();
        ledger::recover_knockout(&env, &owner, side, tick_lower, tick_upper, mint_epoch)
    }

    // === View Functions ===

    pub fn get_state(env: Env) -> PoolState {
        get_state(&env)
    }

    pub fn get_config(env: Env) -> PoolConfig {
        get_config(&env)
    }

    pub fn get_knockout_config(env: Env) -> KnockoutConfig {
        get_knockout_config(&env)
    }

    pub fn liquidity(env: Env) -> u128 {
        get_state(&env).liquidity
    }

    pub fn tick(env: Env) -> i32 {
        get_state(&env).tick
    }

    pub fn get_tick(env: Env, tick: i32) -> TickInfo {
        get_tick(&env, tick)
    }

    pub fn get_pivot(env: Env, side: Side, tick: i32) -> Pivot {
        get_pivot(&env, &PivotKey { side, tick })
    }

    pub fn get_knockout_position(
        env: Env,
        owner: Address,
        side: Side,
        tick_lower: i32,
        tick_upper: i32,
        epoch: u32,
    ) -> KnockoutPos {
        get_position(
            &env,
            &KnockoutPosKey {
                owner,
                side,
                tick_lower,
                tick_upper,
                epoch,
            },
        )
    }

    /// Current mileage reading of a range (Q64.64, wrapping)
    pub fn range_mileage(env: Env, tick_lower: i32, tick_upper: i32) -> u128 {
        curve::range_mileage(&env, &get_state(&env), tick_lower, tick_upper)
    }
}
