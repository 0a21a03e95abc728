use anchor_lang::prelude::*;

use crate::{
    fund::Fund,
    instructions::{deposit::*, transfers::observe_holdings},
};

/// Mint an exact number of shares, paying whatever assets they cost
pub fn handler<'info>(ctx: Context<'_, '_, '_, 'info, Deposit<'info>>, shares: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let candidates = holding_candidates(&ctx);

    let accounts = &mut *ctx.accounts;
    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    observe_holdings(&mut fund, &candidates)?;
    let receipt = fund.mint(shares)?;

    complete_join(accounts, &receipt, now)
}
