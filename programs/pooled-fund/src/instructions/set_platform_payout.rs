use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Change where the platform share of every fund's fees is paid
#[derive(Accounts)]
pub struct SetPlatformPayout<'info> {
    /// Registry owner
    /// Security: Must be signer and match registry.authority
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ FundError::NotRegistryOwner,
    )]
    pub registry: Account<'info, ProtocolRegistry>,
}

pub fn handler(ctx: Context<SetPlatformPayout>, platform_payout: Pubkey) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let registry = &mut ctx.accounts.registry;
    let previous = registry.platform_payout;
    registry.set_platform_payout(authority, platform_payout)?;

    emit!(PlatformPayoutUpdated {
        registry: registry.key(),
        previous,
        platform_payout,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
