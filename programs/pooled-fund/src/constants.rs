// Constants for the Pooled Fund program

/// Seed for fund state PDA
pub const FUND_SEED: &[u8] = b"fund";

/// Seed for share mint PDA
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for the fund authority PDA (owns the fund's token accounts, mints shares)
pub const FUND_AUTHORITY_SEED: &[u8] = b"fund_authority";

/// Seed for the protocol registry PDA
pub const REGISTRY_SEED: &[u8] = b"registry";

/// Seed for the price sheet PDA
pub const PRICE_SHEET_SEED: &[u8] = b"prices";

/// 1.0 in 18-decimal fixed point
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Basis point denominator
pub const BPS_DENOMINATOR: u128 = 10_000;

pub const SECONDS_PER_DAY: i64 = 86_400;

pub const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

/// Enter/exit fees are capped at 10%
pub const MAX_ENTER_EXIT_FEE_BPS: u16 = 1_000;

/// Management fee is capped at 50% per year
pub const MAX_MANAGEMENT_FEE_PER_YEAR: u128 = WAD / 2;

/// Performance fee is capped at 50% of the gain
pub const MAX_PERFORMANCE_FEE: u128 = WAD / 2;

/// Strategist share of collected fees, up to 100%
pub const MAX_STRATEGIST_CUT: u128 = WAD;

/// Rebalance deviation tolerance is capped at 10%
pub const MAX_REBALANCE_DEVIATION: u128 = WAD / 10;

/// Deviation applied to new funds unless the owner changes it (0.3%)
pub const DEFAULT_REBALANCE_DEVIATION: u128 = 3_000_000_000_000_000;

/// Minimum time between two high-water-mark resets (3 months)
pub const HIGH_WATER_MARK_RESET_INTERVAL: i64 = 90 * SECONDS_PER_DAY;

/// Largest exponent accepted by `exp_wad` (e^44 still fits an i128 in WAD)
pub const MAX_EXP_INPUT: i128 = 44 * WAD as i128;

/// Below this exponent `exp_wad` rounds to zero
pub const MIN_EXP_INPUT: i128 = -42 * WAD as i128;

/// ln(2) in WAD
pub const LN_2: i128 = 693_147_180_559_945_309;

/// Maximum credit (and, separately, debt) positions per fund
pub const MAX_POSITIONS: usize = 16;

/// Maximum entries in the trusted position catalogue
pub const MAX_TRUSTED_POSITIONS: usize = 32;

/// Maximum assets priced by the price sheet
pub const MAX_PRICED_ASSETS: usize = 24;

/// Maximum distinct assets held idle in a fund wallet
pub const MAX_WALLET_ASSETS: usize = 16;

/// Maximum encoded length of a position configuration
pub const MAX_CONFIG_LEN: usize = 96;

/// Maximum length of a catalogue entry name
pub const MAX_NAME_LEN: usize = 32;

/// Maximum calls in one rebalance batch
pub const MAX_REBALANCE_CALLS: usize = 16;
