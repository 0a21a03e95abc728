use anchor_lang::prelude::*;

use crate::{
    events::*,
    fund::Fund,
    instructions::{
        configure_fund::{emit_fees_accrued, ConfigureFund},
        transfers::observe_holdings,
    },
};

/// Reset the high-water mark after the cooldown or a large enough asset move
///
/// Remaining accounts: the fund's associated token account of every holding
/// position
pub fn handler(ctx: Context<ConfigureFund>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let caller = ctx.accounts.caller.key();
    let accounts = &mut *ctx.accounts;

    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    observe_holdings(&mut fund, ctx.remaining_accounts)?;
    let receipt = fund.reset_high_water_mark(caller)?;

    let fund_key = accounts.fund_state.key();
    emit_fees_accrued(fund_key, &accounts.fund_state, &receipt.fees, now)?;
    emit!(HighWaterMarkReset {
        fund: fund_key,
        previous: receipt.previous,
        high_water_mark: receipt.high_water_mark,
        performance: receipt.performance,
        timestamp: now,
    });

    Ok(())
}
