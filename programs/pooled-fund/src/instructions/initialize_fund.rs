use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, fees::FeeState, state::*};

/// Settings a fund starts with
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InitializeFundParams {
    pub strategist: Pubkey,
    pub min_initial_deposit: u64,
    pub enter_fee_bps: u16,
    pub exit_fee_bps: u16,
    /// WAD
    pub management_fee_per_year: u128,
    /// WAD
    pub performance_fee: u128,
    /// WAD; 0 only allows resets after the cooldown
    pub high_water_mark_reset_threshold: u128,
}

impl InitializeFundParams {
    /// Validated fee state with every checkpoint at `now`
    pub fn fee_state(&self, now: i64) -> Result<FeeState> {
        require!(
            self.min_initial_deposit > 0,
            FundError::InvalidMinimumDeposit
        );
        let mut fees = FeeState::new(now);
        fees.set_enter_fees(self.enter_fee_bps)?;
        fees.set_exit_fees(self.exit_fee_bps)?;
        fees.set_management_fees_per_year(self.management_fee_per_year)?;
        fees.set_performance_fees(self.performance_fee)?;
        fees.set_high_water_mark_reset_threshold(self.high_water_mark_reset_threshold)?;
        Ok(fees)
    }
}

/// Initialize a new fund for a given asset token
#[derive(Accounts)]
pub struct InitializeFund<'info> {
    /// Fund owner - configures fees, tolerance and positions
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Protocol registry every operation of this fund is checked against
    #[account(
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    /// Fund state PDA
    /// Security: Initialized with proper space and padding for upgrades
    #[account(
        init,
        payer = owner,
        space = FundState::SPACE,
        seeds = [FUND_SEED, asset_mint.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub fund_state: Account<'info, FundState>,

    /// Base asset the fund is denominated in
    pub asset_mint: Account<'info, Mint>,

    /// Share token mint PDA
    /// Security: Mint authority is fund_authority PDA
    #[account(
        init,
        payer = owner,
        seeds = [SHARE_MINT_SEED, fund_state.key().as_ref()],
        bump,
        mint::decimals = asset_mint.decimals,
        mint::authority = fund_authority,
    )]
    pub share_mint: Account<'info, Mint>,

    /// Fund authority PDA - holds fund tokens and mints shares
    /// CHECK: PDA used as token owner and mint authority, validated by seeds
    #[account(
        seeds = [FUND_AUTHORITY_SEED, fund_state.key().as_ref()],
        bump
    )]
    pub fund_authority: UncheckedAccount<'info>,

    /// Fund's token account for the base asset
    #[account(
        init,
        payer = owner,
        associated_token::mint = asset_mint,
        associated_token::authority = fund_authority,
    )]
    pub fund_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeFund>, params: InitializeFundParams) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    // CHECKS: Fee settings within range
    let fees = params.fee_state(now)?;

    // EFFECTS: Initialize fund state; custody acts as the fund authority
    let mut state = FundState::new(
        ctx.accounts.fund_authority.key(),
        ctx.accounts.owner.key(),
        params.strategist,
        ctx.accounts.registry.key(),
        ctx.accounts.asset_mint.key(),
        ctx.accounts.share_mint.key(),
        params.min_initial_deposit,
        fees,
    );
    state.bump = ctx.bumps.fund_state;
    state.share_bump = ctx.bumps.share_mint;
    state.authority_bump = ctx.bumps.fund_authority;
    ctx.accounts.fund_state.set_inner(state);

    emit!(FundInitialized {
        fund: ctx.accounts.fund_state.key(),
        owner: ctx.accounts.owner.key(),
        strategist: params.strategist,
        asset_mint: ctx.accounts.asset_mint.key(),
        share_mint: ctx.accounts.share_mint.key(),
        timestamp: now,
    });

    Ok(())
}
