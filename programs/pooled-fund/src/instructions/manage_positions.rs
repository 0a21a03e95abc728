use anchor_lang::prelude::*;

use crate::{
    adaptors::{AdaptorId, PositionKey},
    constants::*,
    events::*,
    fund::Fund,
    instructions::transfers::observe_holdings,
    state::*,
};

/// Edit the fund's credit and debt position lists
///
/// Security considerations:
/// - Strategist or fund owner only (checked by the core against fund state)
/// - New positions must be trusted by the registry and priced by the sheet
/// - Removal requires an empty, non-holding position; its remaining accounts
///   carry the fund's associated token account of every holding position
#[derive(Accounts)]
pub struct ManagePositions<'info> {
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

impl<'info> ManagePositions<'info> {
    fn fund(&mut self) -> Result<Fund<'_>> {
        let now = Clock::get()?.unix_timestamp;
        Ok(Fund::new(
            &mut self.fund_state,
            &self.registry,
            &*self.price_sheet,
            now,
        ))
    }
}

pub fn add(
    ctx: Context<ManagePositions>,
    index: u32,
    adaptor: AdaptorId,
    config: Vec<u8>,
    is_debt: bool,
    is_liquid: bool,
) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    let position = PositionKey::new(adaptor, config.clone());
    ctx.accounts
        .fund()?
        .add_position(caller, index, position, is_debt, is_liquid)?;

    emit!(PositionAdded {
        fund: ctx.accounts.fund_state.key(),
        adaptor,
        config,
        index,
        is_debt,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn remove(ctx: Context<ManagePositions>, index: u32, in_debt: bool) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    let mut fund = ctx.accounts.fund()?;
    observe_holdings(&mut fund, ctx.remaining_accounts)?;
    let removed = fund.remove_position(caller, index, in_debt)?;

    emit!(PositionRemoved {
        fund: ctx.accounts.fund_state.key(),
        adaptor: removed.position.adaptor,
        config: removed.position.config,
        index,
        is_debt: removed.is_debt,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn swap(ctx: Context<ManagePositions>, first: u32, second: u32, in_debt: bool) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    ctx.accounts
        .fund()?
        .swap_positions(caller, first, second, in_debt)?;

    emit!(PositionsSwapped {
        fund: ctx.accounts.fund_state.key(),
        first,
        second,
        in_debt,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}

pub fn set_holding(ctx: Context<ManagePositions>, adaptor: AdaptorId, config: Vec<u8>) -> Result<()> {
    let caller = ctx.accounts.caller.key();
    ctx.accounts
        .fund()?
        .set_holding_position(caller, PositionKey::new(adaptor, config.clone()))?;

    emit!(HoldingPositionSet {
        fund: ctx.accounts.fund_state.key(),
        adaptor,
        config,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
