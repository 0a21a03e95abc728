use anchor_lang::prelude::*;

use crate::adaptors::AdaptorId;

/// Event emitted when the protocol registry is created
#[event]
pub struct RegistryInitialized {
    pub registry: Pubkey,
    pub authority: Pubkey,
    pub platform_payout: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a position is added to the trusted catalogue
#[event]
pub struct PositionTrusted {
    pub registry: Pubkey,
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
    pub name: String,
    pub timestamp: i64,
}

/// Event emitted when a catalogue entry is enabled or disabled
#[event]
pub struct PositionToggled {
    pub registry: Pubkey,
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
    pub enabled: bool,
    pub timestamp: i64,
}

/// Event emitted when the registry owner moves the platform fee payout
#[event]
pub struct PlatformPayoutUpdated {
    pub registry: Pubkey,
    pub previous: Pubkey,
    pub platform_payout: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when the registry owner relays a market position balance
#[event]
pub struct PositionReported {
    pub fund: Pubkey,
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
    pub balance: u64,
    pub locked: u64,
    pub timestamp: i64,
}

/// Event emitted when the registry owner updates an asset price
#[event]
pub struct PriceUpdated {
    pub mint: Pubkey,
    pub decimals: u8,
    pub usd_price: u128,
    pub timestamp: i64,
}

/// Event emitted when a new fund is initialized
#[event]
pub struct FundInitialized {
    pub fund: Pubkey,
    pub owner: Pubkey,
    pub strategist: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub timestamp: i64,
}

/// Event emitted on deposit and mint
#[event]
pub struct Deposited {
    pub fund: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_minted: u64,
    pub total_supply: u64,
    pub timestamp: i64,
}

/// Event emitted on withdraw and redeem
#[event]
pub struct Withdrawn {
    pub fund: Pubkey,
    pub user: Pubkey,
    pub receiver: Pubkey,
    pub asset_amount: u64,
    pub shares_burned: u64,
    pub total_supply: u64,
    pub timestamp: i64,
}

/// Event emitted after a rebalance batch passed the deviation check
#[event]
pub struct Rebalanced {
    pub fund: Pubkey,
    pub strategist: Pubkey,
    pub calls: u8,
    pub assets_before: u64,
    pub assets_after: u64,
    pub deviation: u128,
    pub timestamp: i64,
}

#[event]
pub struct PositionAdded {
    pub fund: Pubkey,
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
    pub index: u32,
    pub is_debt: bool,
    pub timestamp: i64,
}

#[event]
pub struct PositionRemoved {
    pub fund: Pubkey,
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
    pub index: u32,
    pub is_debt: bool,
    pub timestamp: i64,
}

#[event]
pub struct PositionsSwapped {
    pub fund: Pubkey,
    pub first: u32,
    pub second: u32,
    pub in_debt: bool,
    pub timestamp: i64,
}

#[event]
pub struct HoldingPositionSet {
    pub fund: Pubkey,
    pub adaptor: AdaptorId,
    pub config: Vec<u8>,
    pub timestamp: i64,
}

/// Event emitted whenever a settlement minted fee shares
#[event]
pub struct FeesAccrued {
    pub fund: Pubkey,
    pub management_shares: u64,
    pub performance_shares: u64,
    pub high_water_mark: u128,
    pub fee_collector_shares: u64,
    pub timestamp: i64,
}

/// Event emitted after any fee or tolerance setting changed
#[event]
pub struct FeeConfigUpdated {
    pub fund: Pubkey,
    pub enter_fee_bps: u16,
    pub exit_fee_bps: u16,
    pub management_fee_per_year: u128,
    pub performance_fee: u128,
    pub strategist_cut: u128,
    pub strategist_payout: Option<Pubkey>,
    pub high_water_mark_reset_threshold: u128,
    pub max_rebalance_deviation: u128,
    pub timestamp: i64,
}

#[event]
pub struct HighWaterMarkReset {
    pub fund: Pubkey,
    pub previous: u128,
    pub high_water_mark: u128,
    pub performance: i128,
    pub timestamp: i64,
}

/// Event emitted when fee collector shares are minted to their recipients
#[event]
pub struct FeesPaidOut {
    pub fund: Pubkey,
    pub strategist_payout: Option<Pubkey>,
    pub strategist_shares: u64,
    pub platform_payout: Pubkey,
    pub platform_shares: u64,
    pub timestamp: i64,
}
