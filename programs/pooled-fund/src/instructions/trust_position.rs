use anchor_lang::prelude::*;

use crate::{
    adaptors::{adaptor_for, AdaptorId, PositionKey},
    constants::*,
    errors::*,
    events::*,
    state::*,
};

/// Add an (adaptor, config) pair to the trusted catalogue
///
/// Architecture: Registry + Whitelist
/// - Funds can only add and call positions found in the catalogue
/// - Config must decode for the adaptor it is registered under
#[derive(Accounts)]
pub struct TrustPosition<'info> {
    /// Registry owner - only they can manage the catalogue
    /// Security: Must be signer and match registry.authority
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Protocol registry PDA
    /// Security: has_one constraint validates authority from state
    #[account(
        mut,
        seeds = [REGISTRY_SEED],
        bump = registry.bump,
        has_one = authority @ FundError::NotRegistryOwner,
    )]
    pub registry: Account<'info, ProtocolRegistry>,
}

pub fn handler(
    ctx: Context<TrustPosition>,
    adaptor: AdaptorId,
    config: Vec<u8>,
    name: String,
) -> Result<()> {
    // CHECKS: Config must be meaningful to its adaptor
    adaptor_for(adaptor).asset_of(&config)?;

    // EFFECTS: Add entry to catalogue
    let registry = &mut ctx.accounts.registry;
    registry.trust_position(PositionKey::new(adaptor, config.clone()), name.clone())?;

    emit!(PositionTrusted {
        registry: registry.key(),
        adaptor,
        config,
        name,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
