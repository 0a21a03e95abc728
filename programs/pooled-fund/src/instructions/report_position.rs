use anchor_lang::prelude::*;

use crate::{
    adaptors::{AdaptorId, PositionKey},
    constants::*,
    errors::*,
    events::*,
    fund::Fund,
    state::*,
};

/// Relay what a lending, debt or staking market holds for a fund
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Registry owner must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Fund state PDA validated with seeds and registry link
/// ✅ 8. BUSINESS LOGIC: Position must be part of the fund; locked <= balance
/// ✅ 10. EVENTS: Emits PositionReported event
#[derive(Accounts)]
pub struct ReportPosition<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ FundError::NotRegistryOwner,
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    #[account(
        seeds = [PRICE_SHEET_SEED],
        bump = price_sheet.bump,
    )]
    pub price_sheet: Account<'info, PriceSheet>,

    #[account(
        mut,
        seeds = [FUND_SEED, fund_state.asset_mint.as_ref(), fund_state.owner.as_ref()],
        bump = fund_state.bump,
        has_one = registry,
    )]
    pub fund_state: Account<'info, FundState>,
}

pub fn handler(
    ctx: Context<ReportPosition>,
    adaptor: AdaptorId,
    config: Vec<u8>,
    balance: u64,
    locked: u64,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let authority = ctx.accounts.authority.key();
    let accounts = &mut *ctx.accounts;

    Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    )
    .report_position(authority, PositionKey::new(adaptor, config.clone()), balance, locked)?;

    emit!(PositionReported {
        fund: accounts.fund_state.key(),
        adaptor,
        config,
        balance,
        locked,
        timestamp: now,
    });

    Ok(())
}
