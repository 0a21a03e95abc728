use anchor_lang::prelude::*;

use crate::{
    constants::*, events::*, fees::FeeSettlement, fund::Fund,
    instructions::transfers::observe_holdings, state::*,
};

/// One fee or tolerance setting
///
/// Every variant except `StrategistPlatformCut` belongs to the fund owner;
/// the platform cut is protocol-wide and belongs to the registry owner.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundSetting {
    /// Yearly management fee (WAD); settles pending fees at the old rate
    ManagementFeesPerYear(u128),
    /// Performance fee (WAD); settles pending fees at the old rate
    PerformanceFees(u128),
    EnterFees(u16),
    ExitFees(u16),
    StrategistPayoutAddress(Pubkey),
    StrategistPlatformCut(u128),
    HighWaterMarkResetThreshold(u128),
    RebalanceDeviation(u128),
}

impl FundSetting {
    /// Whether changing the setting settles pending fees first
    pub fn settles_fees(&self) -> bool {
        matches!(
            self,
            FundSetting::ManagementFeesPerYear(_) | FundSetting::PerformanceFees(_)
        )
    }
}

/// Change fee settings of a fund
///
/// Settings that settle fees need the fund's associated token account of
/// every holding position in the remaining accounts.
#[derive(Accounts)]
pub struct ConfigureFund<'info> {
    /// Fund owner, or registry owner for protocol-wide settings
    /// Security: Must be signer, checked against state by the core
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [FUND_SEED, fund_state.asset_mint.as_ref(), fund_state.owner.as_ref()],
        bump = fund_state.bump,
        has_one = registry,
    )]
    pub fund_state: Account<'info, FundState>,

    #[account(
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    #[account(
        seeds = [PRICE_SHEET_SEED],
        bump = price_sheet.bump,
    )]
    pub price_sheet: Account<'info, PriceSheet>,
}

pub fn handler(ctx: Context<ConfigureFund>, setting: FundSetting) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.caller.key();
    let accounts = &mut *ctx.accounts;

    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    if setting.settles_fees() {
        observe_holdings(&mut fund, ctx.remaining_accounts)?;
    }
    let settlement = match setting {
        FundSetting::ManagementFeesPerYear(fee) => {
            Some(fund.set_management_fees_per_year(caller, fee)?)
        }
        FundSetting::PerformanceFees(fee) => Some(fund.set_performance_fees(caller, fee)?),
        FundSetting::EnterFees(bps) => fund.set_enter_fees(caller, bps).map(|_| None)?,
        FundSetting::ExitFees(bps) => fund.set_exit_fees(caller, bps).map(|_| None)?,
        FundSetting::StrategistPayoutAddress(payout) => fund
            .set_strategist_payout_address(caller, payout)
            .map(|_| None)?,
        FundSetting::StrategistPlatformCut(cut) => fund
            .set_strategist_platform_cut(caller, cut)
            .map(|_| None)?,
        FundSetting::HighWaterMarkResetThreshold(threshold) => fund
            .set_high_water_mark_reset_threshold(caller, threshold)
            .map(|_| None)?,
        FundSetting::RebalanceDeviation(deviation) => fund
            .set_rebalance_deviation(caller, deviation)
            .map(|_| None)?,
    };

    let fund_key = accounts.fund_state.key();
    if let Some(fees) = settlement {
        emit_fees_accrued(fund_key, &accounts.fund_state, &fees, now)?;
    }
    emit_fee_config(fund_key, &accounts.fund_state, now);

    Ok(())
}

pub(crate) fn emit_fees_accrued(
    fund: Pubkey,
    state: &FundState,
    fees: &FeeSettlement,
    now: i64,
) -> Result<()> {
    if fees.total_shares()? > 0 {
        emit!(FeesAccrued {
            fund,
            management_shares: fees.management_shares,
            performance_shares: fees.performance_shares,
            high_water_mark: fees.high_water_mark,
            fee_collector_shares: state.fee_collector_shares,
            timestamp: now,
        });
    }
    Ok(())
}

fn emit_fee_config(fund: Pubkey, state: &FundState, now: i64) {
    emit!(FeeConfigUpdated {
        fund,
        enter_fee_bps: state.fees.enter_fee_bps,
        exit_fee_bps: state.fees.exit_fee_bps,
        management_fee_per_year: state.fees.management_fee_per_year,
        performance_fee: state.fees.performance_fee,
        strategist_cut: state.fees.strategist_cut,
        strategist_payout: state.fees.strategist_payout,
        high_water_mark_reset_threshold: state.fees.high_water_mark_reset_threshold,
        max_rebalance_deviation: state.max_rebalance_deviation,
        timestamp: now,
    });
}
