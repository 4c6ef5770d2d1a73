use knockout_types::{
    KnockoutConfig, KnockoutPos, KnockoutPosKey, Pivot, PivotKey, PoolConfig, PoolState, TickInfo,
};
use soroban_sdk::{contracttype, Env};

// ============================================================================
// SOROBAN RESOURCE LIMITS
// ============================================================================
// - Write entries per tx: 50 entries / 132 KB
// - Read entries per tx: 100 entries / 200 KB
//
// Each crossing of an initialized tick writes the tick entry. A crossing that
// knocks a pivot out also writes the pivot, the far tick of the knocked range
// and possibly one bitmap word. The crossing cap below keeps the worst case
// inside the write limit with room for state and token balances.
//
// Knockout mint/burn/claim touch 2 ticks, 1 pivot, 1 position and state.
// ============================================================================

/// Maximum number of initialized tick crossings per swap
pub const MAX_TICK_CROSSINGS_PER_SWAP: u32 = 10;

/// Storage keys for the pool contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Pool configuration (Instance storage)
    Config,
    /// Knockout policy (Instance storage)
    KnockoutConfig,
    /// Current curve state (Instance storage)
    State,
    /// Tick data: tick_index -> TickInfo (Persistent storage)
    Tick(i32),
    /// Tick bitmap: word_position -> u128 bitmap (Persistent storage)
    TickBitmap(i32),
    /// Knockout pivot (Persistent storage, never removed)
    Pivot(PivotKey),
    /// Knockout position (Persistent storage)
    Position(KnockoutPosKey),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

// === Config ===

pub fn get_config(env: &Env) -> PoolConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic!("Pool not initialized"))
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

pub fn get_knockout_config(env: &Env) -> KnockoutConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::KnockoutConfig)
        .unwrap_or_else(KnockoutConfig::disabled)
}

pub fn set_knockout_config(env: &Env, config: &KnockoutConfig) {
    env.storage().instance().set(&DataKey::KnockoutConfig, config);
    extend_instance_ttl(env);
}

// === State ===

pub fn get_state(env: &Env) -> PoolState {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_else(|| panic!("Pool not initialized"))
}

pub fn set_state(env: &Env, state: &PoolState) {
    env.storage().instance().set(&DataKey::State, state);
    extend_instance_ttl(env);
}

// === Tick ===

pub fn get_tick(env: &Env, tick: i32) -> TickInfo {
    let key = DataKey::Tick(tick);
    env.storage().persistent().get(&key).unwrap_or_default()
}

pub fn set_tick(env: &Env, tick: i32, info: &TickInfo) {
    let key = DataKey::Tick(tick);
    if info.liquidity_gross == 0 && !info.initialized {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, info);
        extend_persistent_ttl(env, &key);
    }
}

// === Tick Bitmap ===

pub fn get_tick_bitmap_word(env: &Env, word_pos: i32) -> u128 {
    let key = DataKey::TickBitmap(word_pos);
    env.storage().persistent().get(&key).unwrap_or(0u128)
}

pub fn set_tick_bitmap_word(env: &Env, word_pos: i32, bitmap: u128) {
    let key = DataKey::TickBitmap(word_pos);
    if bitmap == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &bitmap);
        extend_persistent_ttl(env, &key);
    }
}

// === Pivot ===

pub fn get_pivot(env: &Env, key: &PivotKey) -> Pivot {
    let data_key = DataKey::Pivot(key.clone());
    let pivot = env.storage().persistent().get(&data_key);
    if pivot.is_some() {
        extend_persistent_ttl(env, &data_key);
    }
    pivot.unwrap_or_else(|| Pivot::new(env))
}

pub fn set_pivot(env: &Env, key: &PivotKey, pivot: &Pivot) {
    let data_key = DataKey::Pivot(key.clone());
    env.storage().persistent().set(&data_key, pivot);
    extend_persistent_ttl(env, &data_key);
}

// === Position ===

pub fn get_position(env: &Env, key: &KnockoutPosKey) -> KnockoutPos {
    let data_key = DataKey::Position(key.clone());
    env.storage()
        .persistent()
        .get(&data_key)
        .unwrap_or_default()
}

/// Fully burned live positions are removed. Settled positions stay behind as
/// exactly-once markers.
pub fn set_position(env: &Env, key: &KnockoutPosKey, pos: &KnockoutPos) {
    debug_assert!(crate::invariants::settlement_exclusive(pos));
    let data_key = DataKey::Position(key.clone());
    if pos.liquidity == 0 && !pos.is_settled() {
        env.storage().persistent().remove(&data_key);
    } else {
        env.storage().persistent().set(&data_key, pos);
        extend_persistent_ttl(env, &data_key);
    }
}
