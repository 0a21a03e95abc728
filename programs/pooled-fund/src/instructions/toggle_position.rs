use anchor_lang::prelude::*;

use crate::{
    adaptors::{AdaptorId, PositionKey},
    constants::*,
    errors::*,
    events::*,
    state::*,
};

/// Enable or disable a catalogue entry
#[derive(Accounts)]
pub struct TogglePosition<'info> {
    /// Registry owner - only they can manage the catalogue
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Protocol registry PDA
    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ FundError::NotRegistryOwner,
    )]
    pub registry: Account<'info, ProtocolRegistry>,
}

pub fn handler(
    ctx: Context<TogglePosition>,
    adaptor: AdaptorId,
    config: Vec<u8>,
    enabled: bool,
) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    registry.toggle_position(&PositionKey::new(adaptor, config.clone()), enabled)?;

    emit!(PositionToggled {
        registry: registry.key(),
        adaptor,
        config,
        enabled,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
