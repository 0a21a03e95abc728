use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::{constants::*, errors::*, events::*, state::*};

/// Set the USD price of an asset
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Registry owner must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Price sheet PDA validated with seeds and registry link
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Decimals read from the mint itself
#[derive(Accounts)]
pub struct UpdatePrice<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ FundError::NotRegistryOwner,
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    #[account(
        mut,
        seeds = [PRICE_SHEET_SEED],
        bump = price_sheet.bump,
        has_one = registry,
    )]
    pub price_sheet: Account<'info, PriceSheet>,

    /// Asset being priced
    pub asset_mint: Account<'info, Mint>,
}

pub fn handler(ctx: Context<UpdatePrice>, usd_price: u128) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let price = AssetPrice {
        mint: ctx.accounts.asset_mint.key(),
        decimals: ctx.accounts.asset_mint.decimals,
        usd_price,
        updated_at: now,
    };
    ctx.accounts.price_sheet.set_price(price)?;

    emit!(PriceUpdated {
        mint: price.mint,
        decimals: price.decimals,
        usd_price,
        timestamp: now,
    });

    Ok(())
}
