use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum KnockoutError {
    /// Ticks off the pool spacing, or lower tick off the knockout grid
    InvalidGrid = 1,
    /// Range width differs from the configured knockout width
    InvalidRange = 2,
    /// Mint would start knocked out, or sits inside the range without opt-in
    InvalidMidMint = 3,
    /// Liquidity at this pivot was already knocked out
    AlreadyKnockedOut = 4,
    /// Proof does not reproduce the pivot's chain root
    BadProof = 5,
    KnockoutDisabled = 6,
    ZeroLiquidity = 7,
    InsufficientLiquidity = 8,
    /// Position is still live at the pivot's current epoch
    NotKnockedOut = 9,
    /// Position was knocked out before the latest knockout; claim with a proof
    ProofRequired = 10,
    AlreadyInitialized = 11,
    InvalidPriceLimit = 12,
    TickOutOfBounds = 13,
    /// Swap quantity not positive, or liquidity too large for a signed delta
    InvalidQuantity = 14,
}
