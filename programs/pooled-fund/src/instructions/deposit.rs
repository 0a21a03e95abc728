use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::get_associated_token_address,
    token::{self, Mint, MintTo, Token, TokenAccount, Transfer},
};

use crate::{
    constants::*,
    errors::*,
    events::*,
    fund::{Fund, JoinReceipt},
    instructions::transfers::{fund_authority_seeds, observe_holdings},
    state::*,
};

/// Deposit assets into the fund and receive shares
///
/// Remaining accounts carry the fund's associated token account of every
/// other holding position, so total assets reflect what they hold.
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: User must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Fund state PDA validated with seeds
/// ✅ 6. MATH SAFETY: Checked operations throughout the fund core
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Checks-effects-interactions pattern
/// ✅ 10. EVENTS: Emits Deposited event
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// User depositing assets
    /// Security: Must be signer
    #[account(mut)]
    pub user: Signer<'info>,

    /// Fund state PDA
    /// Security: Validated by seeds, linked to registry and share mint
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

    /// Share mint
    /// Security: Must match fund_state.share_mint
    #[account(mut)]
    pub share_mint: Account<'info, Mint>,

    /// Fund authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [FUND_AUTHORITY_SEED, fund_state.key().as_ref()],
        bump = fund_state.authority_bump,
    )]
    pub fund_authority: UncheckedAccount<'info>,

    /// User's asset token account (source)
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_asset_account.mint == fund_state.asset_mint @ FundError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ FundError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// User's share token account (destination)
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_share_account.mint == fund_state.share_mint @ FundError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ FundError::InvalidOwner,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// Fund's associated token account for the base asset
    /// Security: Must be correct mint and the fund_authority ATA
    #[account(
        mut,
        constraint = fund_token_account.mint == fund_state.asset_mint @ FundError::InvalidMint,
        constraint = fund_token_account.key()
            == get_associated_token_address(&fund_authority.key(), &fund_state.asset_mint)
            @ FundError::InvalidOwner,
    )]
    pub fund_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(ctx: Context<'_, '_, '_, 'info, Deposit<'info>>, assets: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    let candidates = holding_candidates(&ctx);

    // CHECKS + EFFECTS: Settle fees, price the join and update state
    let accounts = &mut *ctx.accounts;
    let mut fund = Fund::new(
        &mut accounts.fund_state,
        &accounts.registry,
        &*accounts.price_sheet,
        now,
    );
    observe_holdings(&mut fund, &candidates)?;
    let receipt = fund.deposit(assets)?;

    // INTERACTIONS: External calls after state updates
    complete_join(accounts, &receipt, now)
}

/// Accounts holding balances are observed from on a join
pub(crate) fn holding_candidates<'info>(
    ctx: &Context<'_, '_, '_, 'info, Deposit<'info>>,
) -> Vec<AccountInfo<'info>> {
    let mut candidates = ctx.remaining_accounts.to_vec();
    candidates.push(ctx.accounts.fund_token_account.to_account_info());
    candidates
}

/// Pull the assets in, mint the shares and emit events for a finished join
pub(crate) fn complete_join(accounts: &Deposit, receipt: &JoinReceipt, now: i64) -> Result<()> {
    // Transfer assets from user to fund
    let transfer_ctx = CpiContext::new(
        accounts.token_program.to_account_info(),
        Transfer {
            from: accounts.user_asset_account.to_account_info(),
            to: accounts.fund_token_account.to_account_info(),
            authority: accounts.user.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, receipt.assets)?;

    // Mint shares to user
    let fund_key = accounts.fund_state.key();
    let bump = [accounts.fund_state.authority_bump];
    let authority_seeds = fund_authority_seeds(&fund_key, &bump);
    let signer_seeds = &[&authority_seeds[..]];

    let mint_ctx = CpiContext::new_with_signer(
        accounts.token_program.to_account_info(),
        MintTo {
            mint: accounts.share_mint.to_account_info(),
            to: accounts.user_share_account.to_account_info(),
            authority: accounts.fund_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::mint_to(mint_ctx, receipt.shares)?;

    if receipt.fees.total_shares()? > 0 {
        emit!(FeesAccrued {
            fund: fund_key,
            management_shares: receipt.fees.management_shares,
            performance_shares: receipt.fees.performance_shares,
            high_water_mark: receipt.fees.high_water_mark,
            fee_collector_shares: accounts.fund_state.fee_collector_shares,
            timestamp: now,
        });
    }
    emit!(Deposited {
        fund: fund_key,
        user: accounts.user.key(),
        asset_amount: receipt.assets,
        shares_minted: receipt.shares,
        total_supply: accounts.fund_state.total_supply,
        timestamp: now,
    });

    Ok(())
}
