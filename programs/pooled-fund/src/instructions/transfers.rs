use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::get_associated_token_address,
    token::{self, TokenAccount, Transfer},
};

use crate::{adaptors::OutboundTransfer, constants::*, errors::*, fund::Fund};

/// Signer seeds of the fund authority PDA
pub fn fund_authority_seeds<'a>(fund: &'a Pubkey, bump: &'a [u8; 1]) -> [&'a [u8]; 3] {
    [FUND_AUTHORITY_SEED, fund.as_ref(), bump]
}

/// Token account among `candidates` with the given owner and mint
fn find_token_account<'info>(
    candidates: &[AccountInfo<'info>],
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Option<(AccountInfo<'info>, TokenAccount)>> {
    for info in candidates {
        if info.owner != &token::ID {
            continue;
        }
        let data = info.try_borrow_data()?;
        let Ok(account) = TokenAccount::try_deserialize(&mut &data[..]) else {
            continue;
        };
        if account.owner == *owner && account.mint == *mint {
            return Ok(Some((info.clone(), account)));
        }
    }
    Ok(None)
}

/// The fund's associated token account for `mint` among `candidates`
fn find_fund_token_account<'info>(
    candidates: &[AccountInfo<'info>],
    fund_authority: &Pubkey,
    mint: &Pubkey,
) -> Option<(AccountInfo<'info>, TokenAccount)> {
    let address = get_associated_token_address(fund_authority, mint);
    let info = candidates.iter().find(|info| info.key == &address)?;
    let data = info.try_borrow_data().ok()?;
    let account = TokenAccount::try_deserialize(&mut &data[..]).ok()?;
    Some((info.clone(), account))
}

/// Live balance of the fund's token account for `mint`
fn holding_balance(
    candidates: &[AccountInfo<'_>],
    fund_authority: &Pubkey,
    mint: &Pubkey,
) -> Result<u64> {
    match find_fund_token_account(candidates, fund_authority, mint) {
        Some((_, account)) => Ok(account.amount),
        None => err!(FundError::MissingHoldingAccount),
    }
}

/// Bring every holding balance of `fund` in line with the fund's associated
/// token accounts, which must all be among `candidates`
pub fn observe_holdings(fund: &mut Fund<'_>, candidates: &[AccountInfo<'_>]) -> Result<()> {
    let fund_authority = fund.state().custody.owner;
    fund.observe_holdings(|mint| holding_balance(candidates, &fund_authority, mint))
}

/// Execute payouts the core left in custody
///
/// Each payout needs two token accounts in `candidates` (remaining accounts):
/// the fund authority's associated account for the mint and the receiver's
/// account.
pub fn send_payouts<'info>(
    payouts: &[OutboundTransfer],
    candidates: &[AccountInfo<'info>],
    fund_authority: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    for payout in payouts {
        let (from, _) = find_fund_token_account(candidates, fund_authority.key, &payout.mint)
            .ok_or(FundError::InvalidPayoutAccount)?;
        let (to, _) = find_token_account(candidates, &payout.receiver, &payout.mint)?
            .ok_or(FundError::InvalidPayoutAccount)?;

        let transfer_ctx = CpiContext::new_with_signer(
            token_program.clone(),
            Transfer {
                from,
                to,
                authority: fund_authority.clone(),
            },
            signer_seeds,
        );
        token::transfer(transfer_ctx, payout.amount)?;
    }
    Ok(())
}
