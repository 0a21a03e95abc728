use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount};

use crate::{
    constants::*,
    errors::*,
    events::*,
    fund::Fund,
    instructions::{
        configure_fund::emit_fees_accrued,
        transfers::{fund_authority_seeds, observe_holdings},
    },
    state::*,
};

/// Settle fees and mint the fee collector's shares to their recipients
///
/// Remaining accounts: the fund's associated token account of every holding
/// position
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Anyone may pay for the call; recipients are fixed by state
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Recipient accounts matched on owner and share mint
/// ✅ 10. EVENTS: Emits FeesPaidOut event
#[derive(Accounts)]
pub struct PayoutFees<'info> {
    pub payer: Signer<'info>,

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

    /// Fund authority PDA - mint authority of the share mint
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [FUND_AUTHORITY_SEED, fund_state.key().as_ref()],
        bump = fund_state.authority_bump,
    )]
    pub fund_authority: UncheckedAccount<'info>,

    /// Share account of the registry's platform payout address
    #[account(
        mut,
        constraint = platform_share_account.mint == fund_state.share_mint @ FundError::InvalidMint,
        constraint = platform_share_account.owner == registry.platform_payout @ FundError::InvalidPayoutAccount,
    )]
    pub platform_share_account: Account<'info, TokenAccount>,

    /// Share account of the strategist payout address; required when the
    /// strategist cut is non-zero
    #[account(
        mut,
        constraint = strategist_share_account.mint == fund_state.share_mint @ FundError::InvalidMint,
    )]
    pub strategist_share_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

impl<'info> PayoutFees<'info> {
    fn mint_shares(&self, to: AccountInfo<'info>, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let fund_key = self.fund_state.key();
        let bump = [self.fund_state.authority_bump];
        let authority_seeds = fund_authority_seeds(&fund_key, &bump);
        let signer_seeds = &[&authority_seeds[..]];

        let mint_ctx = CpiContext::new_with_signer(
            self.token_program.to_account_info(),
            MintTo {
                mint: self.share_mint.to_account_info(),
                to,
                authority: self.fund_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::mint_to(mint_ctx, amount)
    }
}

pub fn handler(ctx: Context<PayoutFees>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = &mut *ctx.accounts;

    // EFFECTS: Settle and clear the fee collector balance
    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    observe_holdings(&mut fund, ctx.remaining_accounts)?;
    let payout = fund.payout_fees()?;

    // INTERACTIONS: Mint share tokens to both recipients
    if payout.strategist_shares > 0 {
        let account = accounts
            .strategist_share_account
            .as_ref()
            .ok_or(FundError::InvalidPayoutAccount)?;
        require!(
            Some(account.owner) == payout.strategist,
            FundError::InvalidPayoutAccount
        );
        accounts.mint_shares(account.to_account_info(), payout.strategist_shares)?;
    }
    accounts.mint_shares(
        accounts.platform_share_account.to_account_info(),
        payout.platform_shares,
    )?;

    let fund_key = accounts.fund_state.key();
    emit_fees_accrued(fund_key, &accounts.fund_state, &payout.fees, now)?;
    emit!(FeesPaidOut {
        fund: fund_key,
        strategist_payout: payout.strategist,
        strategist_shares: payout.strategist_shares,
        platform_payout: payout.platform,
        platform_shares: payout.platform_shares,
        timestamp: now,
    });

    Ok(())
}
