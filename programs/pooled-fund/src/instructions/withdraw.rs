use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};

use crate::{
    constants::*,
    errors::*,
    events::*,
    fund::{ExitReceipt, Fund},
    instructions::transfers::{fund_authority_seeds, observe_holdings, send_payouts},
    state::*,
};

/// Withdraw assets from the fund by burning shares
///
/// Payouts are paid in kind from liquid positions in ledger order. The
/// remaining accounts must contain the fund authority's associated token
/// account of every holding position, and the receiver's token account for
/// every asset paid out.
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: User must be signer and owner of the burned shares
/// ✅ 2. ACCOUNT OWNERSHIP: Fund state PDA validated with seeds
/// ✅ 6. MATH SAFETY: Checked operations throughout the fund core
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Payout accounts matched on owner and mint
/// ✅ 8. BUSINESS LOGIC: Checks-effects-interactions pattern
/// ✅ 10. EVENTS: Emits Withdrawn event
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// Share owner
    /// Security: Must be signer
    #[account(mut)]
    pub user: Signer<'info>,

    /// Fund state PDA
    #[account(
        mut,
        seeds = [FUND_SEED, fund_state.asset_mint.as_ref(), fund_state.owner.as_ref()],
        bump = fund_state.bump,
        has_one = registry,
        has_one = share_mint,
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

    #[account(mut)]
    pub share_mint: Account<'info, Mint>,

    /// Fund authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [FUND_AUTHORITY_SEED, fund_state.key().as_ref()],
        bump = fund_state.authority_bump,
    )]
    pub fund_authority: UncheckedAccount<'info>,

    /// User's share token account (burned from)
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_share_account.mint == fund_state.share_mint @ FundError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ FundError::InvalidOwner,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    assets: u64,
    receiver: Pubkey,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;
    let owner_shares = accounts.user_share_account.amount;

    // CHECKS + EFFECTS: Settle fees, price the exit, burn supply in state
    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    observe_holdings(&mut fund, ctx.remaining_accounts)?;
    let receipt = fund.withdraw(assets, receiver, owner_shares)?;

    // INTERACTIONS
    complete_exit(accounts, ctx.remaining_accounts, &receipt, receiver, now)
}

/// Burn the shares, send the payouts and emit events for a finished exit
pub(crate) fn complete_exit<'info>(
    accounts: &Withdraw<'info>,
    remaining_accounts: &[AccountInfo<'info>],
    receipt: &ExitReceipt,
    receiver: Pubkey,
    now: i64,
) -> Result<()> {
    let burn_ctx = CpiContext::new(
        accounts.token_program.to_account_info(),
        Burn {
            mint: accounts.share_mint.to_account_info(),
            from: accounts.user_share_account.to_account_info(),
            authority: accounts.user.to_account_info(),
        },
    );
    token::burn(burn_ctx, receipt.shares)?;

    let fund_key = accounts.fund_state.key();
    let bump = [accounts.fund_state.authority_bump];
    let authority_seeds = fund_authority_seeds(&fund_key, &bump);
    send_payouts(
        &receipt.payouts,
        remaining_accounts,
        &accounts.fund_authority.to_account_info(),
        &accounts.token_program.to_account_info(),
        &[&authority_seeds[..]],
    )?;

    if receipt.fees.total_shares()? > 0 {
        emit!(FeesAccrued {
            fund: fund_key,
            management_shares: receipt.fees.management_shares,
            performance_shares: receipt.fees.performance_shares,
            high_water_mark: receipt.fees.high_water_mark,
            fee_collector_shares: accounts.fund_state.fee_collector_shares,
            timestamp: now,
        });
    }
    emit!(Withdrawn {
        fund: fund_key,
        user: accounts.user.key(),
        receiver,
        asset_amount: receipt.assets,
        shares_burned: receipt.shares,
        total_supply: accounts.fund_state.total_supply,
        timestamp: now,
    });

    Ok(())
}
