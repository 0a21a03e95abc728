use anchor_lang::prelude::*;

use crate::{constants::*, events::*, state::*};

/// Create the protocol registry and its price sheet
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Authority must be signer and becomes registry owner
/// ✅ 2. ACCOUNT OWNERSHIP: Registry and price sheet are PDAs created here
/// ✅ 10. EVENTS: Emits RegistryInitialized event
#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    /// Registry owner
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Protocol registry PDA (one per program)
    #[account(
        init,
        payer = authority,
        space = ProtocolRegistry::SPACE,
        seeds = [REGISTRY_SEED],
        bump
    )]
    pub registry: Account<'info, ProtocolRegistry>,

    /// Price sheet PDA maintained by the registry owner
    #[account(
        init,
        payer = authority,
        space = PriceSheet::SPACE,
        seeds = [PRICE_SHEET_SEED],
        bump
    )]
    pub price_sheet: Account<'info, PriceSheet>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeRegistry>, platform_payout: Pubkey) -> Result<()> {
    let registry_key = ctx.accounts.registry.key();

    // EFFECTS: Initialize registry and empty price sheet
    ctx.accounts.registry.set_inner(ProtocolRegistry {
        authority: ctx.accounts.authority.key(),
        platform_payout,
        trusted_positions: Vec::new(),
        bump: ctx.bumps.registry,
    });
    ctx.accounts.price_sheet.set_inner(PriceSheet {
        registry: registry_key,
        prices: Vec::new(),
        bump: ctx.bumps.price_sheet,
    });

    emit!(RegistryInitialized {
        registry: registry_key,
        authority: ctx.accounts.authority.key(),
        platform_payout,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
