// Pooled Fund - share-based fund whose strategist allocates deposits across
// trusted positions, with continuous management fees, high-water-mark
// performance fees and a deviation guard around every rebalance.
// Architecture: Registry + Whitelist for positions, plain Rust accounting core

use anchor_lang::prelude::*;

pub mod accounting;
pub mod adaptors;
pub mod constants;
pub mod errors;
pub mod events;
pub mod fees;
pub mod fund;
pub mod guard;
pub mod instructions;
pub mod ledger;
pub mod math;
pub mod oracle;
pub mod state;
pub mod valuation;

use adaptors::AdaptorId;
use fund::AdaptorCall;
use instructions::*;

declare_id!("FUNDpmDq5r8v6Wqz1Gm7hYxT3kAeN9cJbLs2RfUoVXt");

#[program]
pub mod pooled_fund {
    use super::*;

    /// Create the protocol registry and price sheet
    ///
    /// Security considerations:
    /// - Signer becomes the registry owner
    /// - Single registry PDA shared by every fund
    pub fn initialize_registry(
        ctx: Context<InitializeRegistry>,
        platform_payout: Pubkey,
    ) -> Result<()> {
        instructions::initialize_registry::handler(ctx, platform_payout)
    }

    /// Add an (adaptor, config) pair to the trusted catalogue
    ///
    /// Security considerations:
    /// - Registry owner only (has_one constraint)
    /// - Config must decode for its adaptor
    /// - Enforces catalogue size limits
    pub fn trust_position(
        ctx: Context<TrustPosition>,
        adaptor: AdaptorId,
        config: Vec<u8>,
        name: String,
    ) -> Result<()> {
        instructions::trust_position::handler(ctx, adaptor, config, name)
    }

    /// Enable or disable a catalogue entry
    ///
    /// Security considerations:
    /// - Registry owner only
    /// - Disabled positions can no longer be added or called by any fund
    pub fn toggle_position(
        ctx: Context<TogglePosition>,
        adaptor: AdaptorId,
        config: Vec<u8>,
        enabled: bool,
    ) -> Result<()> {
        instructions::toggle_position::handler(ctx, adaptor, config, enabled)
    }

    /// Change the platform fee payout address
    ///
    /// Security considerations:
    /// - Registry owner only (has_one constraint)
    /// - Applies to every fund's next fee payout
    pub fn set_platform_payout_address(
        ctx: Context<SetPlatformPayout>,
        platform_payout: Pubkey,
    ) -> Result<()> {
        instructions::set_platform_payout::handler(ctx, platform_payout)
    }

    /// Set the USD price (WAD per whole token) of an asset
    pub fn update_price(ctx: Context<UpdatePrice>, usd_price: u128) -> Result<()> {
        instructions::update_price::handler(ctx, usd_price)
    }

    /// Initialize a new fund for a given asset token
    ///
    /// Security considerations:
    /// - Validates fee settings against their caps
    /// - Creates share mint with the fund authority PDA as mint authority
    pub fn initialize_fund(
        ctx: Context<InitializeFund>,
        params: InitializeFundParams,
    ) -> Result<()> {
        instructions::initialize_fund::handler(ctx, params)
    }

    /// Deposit assets and receive shares
    ///
    /// Security considerations:
    /// - Settles pending fees before pricing the join
    /// - First deposit must reach the minimum initial deposit
    /// - Follows checks-effects-interactions pattern
    pub fn deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
        assets: u64,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, assets)
    }

    /// Mint an exact number of shares
    pub fn mint<'info>(ctx: Context<'_, '_, '_, 'info, Deposit<'info>>, shares: u64) -> Result<()> {
        instructions::mint_shares::handler(ctx, shares)
    }

    /// Withdraw an exact amount of assets by burning shares
    ///
    /// Security considerations:
    /// - Settles pending fees before pricing the exit
    /// - Rejects amounts above what liquid positions can pay
    /// - Payout accounts passed as remaining accounts
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        assets: u64,
        receiver: Pubkey,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, assets, receiver)
    }

    /// Redeem an exact number of shares
    pub fn redeem<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        shares: u64,
        receiver: Pubkey,
    ) -> Result<()> {
        instructions::redeem::handler(ctx, shares, receiver)
    }

    /// Run a batch of adaptor calls against the fund's positions
    ///
    /// Architecture: Validates every call against the registry catalogue
    /// Security considerations:
    /// - Strategist or owner only
    /// - Whole batch reverts when total assets move beyond the tolerance
    pub fn rebalance<'info>(
        ctx: Context<'_, '_, '_, 'info, Rebalance<'info>>,
        calls: Vec<AdaptorCall>,
    ) -> Result<()> {
        instructions::rebalance::handler(ctx, calls)
    }

    pub fn add_position(
        ctx: Context<ManagePositions>,
        index: u32,
        adaptor: AdaptorId,
        config: Vec<u8>,
        is_debt: bool,
        is_liquid: bool,
    ) -> Result<()> {
        instructions::manage_positions::add(ctx, index, adaptor, config, is_debt, is_liquid)
    }

    pub fn remove_position(ctx: Context<ManagePositions>, index: u32, in_debt: bool) -> Result<()> {
        instructions::manage_positions::remove(ctx, index, in_debt)
    }

    pub fn swap_positions(
        ctx: Context<ManagePositions>,
        first: u32,
        second: u32,
        in_debt: bool,
    ) -> Result<()> {
        instructions::manage_positions::swap(ctx, first, second, in_debt)
    }

    pub fn set_holding_position(
        ctx: Context<ManagePositions>,
        adaptor: AdaptorId,
        config: Vec<u8>,
    ) -> Result<()> {
        instructions::manage_positions::set_holding(ctx, adaptor, config)
    }

    /// Change the yearly management fee (WAD); pending fees settle first
    pub fn set_management_fees_per_year(ctx: Context<ConfigureFund>, fee: u128) -> Result<()> {
        instructions::configure_fund::handler(ctx, FundSetting::ManagementFeesPerYear(fee))
    }

    /// Change the performance fee (WAD); pending fees settle first
    pub fn set_performance_fees(ctx: Context<ConfigureFund>, fee: u128) -> Result<()> {
        instructions::configure_fund::handler(ctx, FundSetting::PerformanceFees(fee))
    }

    pub fn set_enter_fees(ctx: Context<ConfigureFund>, bps: u16) -> Result<()> {
        instructions::configure_fund::handler(ctx, FundSetting::EnterFees(bps))
    }

    pub fn set_exit_fees(ctx: Context<ConfigureFund>, bps: u16) -> Result<()> {
        instructions::configure_fund::handler(ctx, FundSetting::ExitFees(bps))
    }

    pub fn set_strategist_payout_address(
        ctx: Context<ConfigureFund>,
        payout: Pubkey,
    ) -> Result<()> {
        instructions::configure_fund::handler(ctx, FundSetting::StrategistPayoutAddress(payout))
    }

    /// Registry owner only
    pub fn set_strategist_platform_cut(ctx: Context<ConfigureFund>, cut: u128) -> Result<()> {
        instructions::configure_fund::handler(ctx, FundSetting::StrategistPlatformCut(cut))
    }

    pub fn set_high_water_mark_reset_threshold(
        ctx: Context<ConfigureFund>,
        threshold: u128,
    ) -> Result<()> {
        instructions::configure_fund::handler(
            ctx,
            FundSetting::HighWaterMarkResetThreshold(threshold),
        )
    }

    pub fn set_rebalance_deviation(ctx: Context<ConfigureFund>, deviation: u128) -> Result<()> {
        instructions::configure_fund::handler(ctx, FundSetting::RebalanceDeviation(deviation))
    }

    /// Report the balance and locked amount of a lending, debt or staking position
    ///
    /// Security considerations:
    /// - Registry owner only
    /// - Holding balances are never reported; they are read from token accounts
    pub fn report_position(
        ctx: Context<ReportPosition>,
        adaptor: AdaptorId,
        config: Vec<u8>,
        balance: u64,
        locked: u64,
    ) -> Result<()> {
        instructions::report_position::handler(ctx, adaptor, config, balance, locked)
    }

    /// Reset the high-water mark
    ///
    /// Security considerations:
    /// - Owner only
    /// - Allowed after the cooldown, or once assets moved past the threshold
    /// - Settles performance fees at the old mark first
    pub fn reset_high_water_mark(ctx: Context<ConfigureFund>) -> Result<()> {
        instructions::reset_high_water_mark::handler(ctx)
    }

    /// Settle fees and mint fee shares to the strategist and the platform
    pub fn payout_fees(ctx: Context<PayoutFees>) -> Result<()> {
        instructions::payout_fees::handler(ctx)
    }
}
