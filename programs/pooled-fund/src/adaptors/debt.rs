use anchor_lang::prelude::*;

use crate::adaptors::{decode_config, AdaptorId, Custody, Initiator, MarketConfig, PositionAdaptor};
use crate::errors::FundError;

/// Borrowed balance in a lending market.
///
/// `withdraw` borrows more, `deposit` repays. Users can never touch debt.
pub struct DebtAdaptor;

impl PositionAdaptor for DebtAdaptor {
    fn id(&self) -> AdaptorId {
        AdaptorId::Debt
    }

    fn is_debt(&self) -> bool {
        true
    }

    fn asset_of(&self, config: &[u8]) -> Result<Pubkey> {
        Ok(decode_config::<MarketConfig>(config)?.asset)
    }

    fn balance_of(&self, config: &[u8], custody: &Custody) -> Result<u64> {
        Ok(custody.book_balance(&self.key(config)))
    }

    fn withdrawable_from(&self, _config: &[u8], _custody: &Custody) -> Result<u64> {
        Ok(0)
    }

    fn deposit(
        &self,
        amount: u64,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()> {
        require!(
            initiator == Initiator::Strategist,
            FundError::UserOperationNotPermitted
        );
        let asset = self.asset_of(config)?;
        custody.debit_wallet(&asset, amount)?;
        custody.debit_book(&self.key(config), amount)
    }

    fn withdraw(
        &self,
        amount: u64,
        receiver: Pubkey,
        config: &[u8],
        custody: &mut Custody,
        initiator: Initiator,
    ) -> Result<()> {
        require!(
            initiator == Initiator::Strategist,
            FundError::UserOperationNotPermitted
        );
        custody.credit_book(&self.key(config), amount)?;
        custody.send(receiver, self.asset_of(config)?, amount)
    }
}
