use anchor_lang::prelude::*;
use anchor_spl::token::Token;

use crate::{
    constants::*,
    events::*,
    fund::{AdaptorCall, Fund},
    instructions::transfers::{fund_authority_seeds, observe_holdings, send_payouts},
    state::*,
};

/// Run a batch of adaptor calls on behalf of the fund
///
/// Architecture: Registry + Whitelist
/// - Every call must target a position in the fund ledger that the registry
///   currently trusts
/// - Total assets before and after the batch must stay within the fund's
///   rebalance deviation, otherwise the whole batch reverts
#[derive(Accounts)]
pub struct Rebalance<'info> {
    /// Strategist (or fund owner)
    /// Security: Must be signer, checked against fund state by the core
    pub strategist: Signer<'info>,

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

    /// Fund authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [FUND_AUTHORITY_SEED, fund_state.key().as_ref()],
        bump = fund_state.authority_bump,
    )]
    pub fund_authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Rebalance<'info>>,
    calls: Vec<AdaptorCall>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;
    let strategist = accounts.strategist.key();

    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    observe_holdings(&mut fund, ctx.remaining_accounts)?;
    let receipt = fund.rebalance(strategist, &calls)?;

    // INTERACTIONS: Tokens sent to receivers outside the fund
    let fund_key = accounts.fund_state.key();
    let bump = [accounts.fund_state.authority_bump];
    let authority_seeds = fund_authority_seeds(&fund_key, &bump);
    send_payouts(
        &receipt.payouts,
        ctx.remaining_accounts,
        &accounts.fund_authority.to_account_info(),
        &accounts.token_program.to_account_info(),
        &[&authority_seeds[..]],
    )?;

    emit!(Rebalanced {
        fund: fund_key,
        strategist,
        calls: calls.len() as u8,
        assets_before: receipt.assets_before,
        assets_after: receipt.assets_after,
        deviation: receipt.deviation,
        timestamp: now,
    });

    Ok(())
}
