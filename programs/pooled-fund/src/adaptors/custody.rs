use anchor_lang::prelude::*;

use crate::adaptors::PositionKey;
use crate::constants::{MAX_POSITIONS, MAX_WALLET_ASSETS};
use crate::errors::FundError;

/// Idle balance of one asset in the fund wallet
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AssetBalance {
    pub mint: Pubkey,
    pub amount: u64,
}

/// Balance an adaptor keeps for one position
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PositionBook {
    pub position: PositionKey,
    pub balance: u64,
    /// Part of the balance the underlying market cannot release right now
    pub locked: u64,
}

/// Tokens that left custody for an external receiver and still have to be
/// transferred by the caller
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct OutboundTransfer {
    pub receiver: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

/// Everything the fund holds, as seen by its adaptors.
///
/// Market books are kept by the fund; their tokens never leave its token
/// accounts until paid out. `token_accounts` is what those accounts held
/// after the last operation, so tokens that arrive from outside show up as
/// the difference on the next observation.
///
/// Space: 32 (owner) + 4 + 16 * 40 (wallet) + 4 + 16 * 40 (token accounts)
/// + 4 + 32 * (1 + 4 + 96 + 16) (books) + 4 + 8 * 72 (outbound)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Custody {
    /// Identity adaptors act as; transfers to it stay in the wallet
    pub owner: Pubkey,
    pub wallet: Vec<AssetBalance>,
    pub token_accounts: Vec<AssetBalance>,
    pub books: Vec<PositionBook>,
    pub outbound: Vec<OutboundTransfer>,
}

impl Custody {
    pub const MAX_OUTBOUND: usize = 8;

    pub const SPACE: usize = 32
        + 4
        + MAX_WALLET_ASSETS * (32 + 8)
        + 4
        + MAX_WALLET_ASSETS * (32 + 8)
        + 4
        + 2 * MAX_POSITIONS * (1 + 4 + crate::constants::MAX_CONFIG_LEN + 8 + 8)
        + 4
        + Self::MAX_OUTBOUND * (32 + 32 + 8);

    pub fn new(owner: Pubkey) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    pub fn wallet_balance(&self, mint: &Pubkey) -> u64 {
        self.wallet
            .iter()
            .find(|b| b.mint == *mint)
            .map_or(0, |b| b.amount)
    }

    pub fn credit_wallet(&mut self, mint: Pubkey, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        if let Some(balance) = self.wallet.iter_mut().find(|b| b.mint == mint) {
            balance.amount = balance
                .amount
                .checked_add(amount)
                .ok_or(FundError::MathOverflow)?;
            return Ok(());
        }
        require!(self.wallet.len() < MAX_WALLET_ASSETS, FundError::CustodyFull);
        self.wallet.push(AssetBalance { mint, amount });
        Ok(())
    }

    pub fn token_account_balance(&self, mint: &Pubkey) -> u64 {
        self.token_accounts
            .iter()
            .find(|b| b.mint == *mint)
            .map_or(0, |b| b.amount)
    }

    fn set_token_account(&mut self, mint: Pubkey, amount: u64) -> Result<()> {
        if let Some(balance) = self.token_accounts.iter_mut().find(|b| b.mint == mint) {
            balance.amount = amount;
        } else if amount > 0 {
            require!(
                self.token_accounts.len() < MAX_WALLET_ASSETS,
                FundError::CustodyFull
            );
            self.token_accounts.push(AssetBalance { mint, amount });
        }
        self.token_accounts.retain(|b| b.amount > 0);
        Ok(())
    }

    /// Tokens a depositor transferred into the fund's token account
    pub fn receive(&mut self, mint: Pubkey, amount: u64) -> Result<()> {
        self.credit_wallet(mint, amount)?;
        let held = self
            .token_account_balance(&mint)
            .checked_add(amount)
            .ok_or(FundError::MathOverflow)?;
        self.set_token_account(mint, held)
    }

    /// Reconcile with the live balance of the fund's token account for
    /// `mint`: tokens that arrived outside the fund's own operations are
    /// credited to the wallet, tokens that went missing are debited from it
    pub fn observe_token_account(&mut self, mint: Pubkey, amount: u64) -> Result<()> {
        let known = self.token_account_balance(&mint);
        if amount > known {
            self.credit_wallet(mint, amount - known)?;
        } else if amount < known {
            // Books are not touched; at most the idle balance goes
            let missing = (known - amount).min(self.wallet_balance(&mint));
            self.debit_wallet(&mint, missing)?;
        }
        self.set_token_account(mint, amount)
    }

    pub fn debit_wallet(&mut self, mint: &Pubkey, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self
            .wallet
            .iter_mut()
            .find(|b| b.mint == *mint)
            .ok_or(FundError::InsufficientBalance)?;
        balance.amount = balance
            .amount
            .checked_sub(amount)
            .ok_or(FundError::InsufficientBalance)?;
        self.wallet.retain(|b| b.amount > 0);
        Ok(())
    }

    pub fn book(&self, position: &PositionKey) -> Option<&PositionBook> {
        self.books.iter().find(|b| b.position == *position)
    }

    pub fn book_balance(&self, position: &PositionKey) -> u64 {
        self.book(position).map_or(0, |b| b.balance)
    }

    fn book_mut(&mut self, position: &PositionKey) -> Result<&mut PositionBook> {
        if let Some(index) = self.books.iter().position(|b| b.position == *position) {
            return Ok(&mut self.books[index]);
        }
        require!(self.books.len() < 2 * MAX_POSITIONS, FundError::CustodyFull);
        self.books.push(PositionBook {
            position: position.clone(),
            balance: 0,
            locked: 0,
        });
        let last = self.books.len() - 1;
        Ok(&mut self.books[last])
    }

    pub fn credit_book(&mut self, position: &PositionKey, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let book = self.book_mut(position)?;
        book.balance = book
            .balance
            .checked_add(amount)
            .ok_or(FundError::MathOverflow)?;
        Ok(())
    }

    pub fn debit_book(&mut self, position: &PositionKey, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let book = self
            .books
            .iter_mut()
            .find(|b| b.position == *position)
            .ok_or(FundError::InsufficientBalance)?;
        book.balance = book
            .balance
            .checked_sub(amount)
            .ok_or(FundError::InsufficientBalance)?;
        self.books.retain(|b| b.balance > 0 || b.locked > 0);
        Ok(())
    }

    /// Overwrite a position book with the balance the underlying market
    /// reports and the part of it that cannot be released right now
    pub fn report_book(&mut self, position: &PositionKey, balance: u64, locked: u64) -> Result<()> {
        let book = self.book_mut(position)?;
        book.balance = balance;
        book.locked = locked;
        self.books.retain(|b| b.balance > 0 || b.locked > 0);
        Ok(())
    }

    /// Move tokens to `receiver`; sending to the owner keeps them in the
    /// wallet, anything else leaves the fund's token account
    pub fn send(&mut self, receiver: Pubkey, mint: Pubkey, amount: u64) -> Result<()> {
        if receiver == self.owner {
            return self.credit_wallet(mint, amount);
        }
        if amount == 0 {
            return Ok(());
        }
        let held = self
            .token_account_balance(&mint)
            .checked_sub(amount)
            .ok_or(FundError::InsufficientBalance)?;
        self.set_token_account(mint, held)?;
        if let Some(transfer) = self
            .outbound
            .iter_mut()
            .find(|t| t.receiver == receiver && t.mint == mint)
        {
            transfer.amount = transfer
                .amount
                .checked_add(amount)
                .ok_or(FundError::MathOverflow)?;
            return Ok(());
        }
        require!(self.outbound.len() < Self::MAX_OUTBOUND, FundError::CustodyFull);
        self.outbound.push(OutboundTransfer {
            receiver,
            mint,
            amount,
        });
        Ok(())
    }

    /// Drain the transfers the caller now has to execute
    pub fn take_outbound(&mut self) -> Vec<OutboundTransfer> {
        std::mem::take(&mut self.outbound)
    }
}
