use anchor_lang::prelude::*;

use crate::{
    fund::Fund,
    instructions::{transfers::observe_holdings, withdraw::*},
};

/// Burn an exact number of shares and receive what they are worth
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    shares: u64,
    receiver: Pubkey,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;
    let owner_shares = accounts.user_share_account.amount;

    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    observe_holdings(&mut fund, ctx.remaining_accounts)?;
    let receipt = fund.redeem(shares, receiver, owner_shares)?;

    complete_exit(accounts, ctx.remaining_accounts, &receipt, receiver, now)
}
